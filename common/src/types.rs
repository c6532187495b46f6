//! Core enums and element types shared by the codec and the exporter

use crate::hash::TxHash;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Errors raised when parsing user-facing selectors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unsupported era: {0}")]
    UnsupportedEra(String),

    #[error("Unsupported collection policy: {0}")]
    UnsupportedPolicy(String),
}

/// Protocol era whose CDDL schema drives the re-encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Era {
    Babbage,
    Conway,
}

impl Era {
    pub const ALL: [Era; 2] = [Era::Babbage, Era::Conway];

    pub fn name(&self) -> &'static str {
        match self {
            Era::Babbage => "Babbage",
            Era::Conway => "Conway",
        }
    }
}

impl fmt::Display for Era {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Era {
    type Err = ParseError;

    /// Accepts `babbage`, `Conway`, `ConwayEra` and similar spellings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.strip_suffix("era").unwrap_or(&lower).trim() {
            "babbage" => Ok(Era::Babbage),
            "conway" => Ok(Era::Conway),
            _ => Err(ParseError::UnsupportedEra(s.to_string())),
        }
    }
}

/// Caller-requested collection policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectionPolicy {
    /// Whatever the target era's schema mandates for each field
    #[default]
    Default,
    /// Plain sequences everywhere the schema allows
    List,
    /// The era's set form everywhere the schema allows
    Set,
}

impl fmt::Display for CollectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CollectionPolicy::Default => "Default",
            CollectionPolicy::List => "List",
            CollectionPolicy::Set => "Set",
        })
    }
}

impl FromStr for CollectionPolicy {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(CollectionPolicy::Default),
            "list" => Ok(CollectionPolicy::List),
            "set" => Ok(CollectionPolicy::Set),
            _ => Err(ParseError::UnsupportedPolicy(s.to_string())),
        }
    }
}

/// How a variable-cardinality field is serialized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Representation {
    /// Plain CBOR array, decode order and duplicates kept
    Sequence,
    /// Tag 258 array, deduplicated
    OrderedSet,
    /// Tag 258 array, deduplicated, never written while empty
    NonEmptyOrderedSet,
}

impl Representation {
    pub fn is_set(&self) -> bool {
        !matches!(self, Representation::Sequence)
    }
}

/// Identifies every variable-cardinality field the resolver knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldId {
    Inputs,
    Outputs,
    Certificates,
    Collateral,
    RequiredSigners,
    ReferenceInputs,
    VKeyWitnesses,
    NativeScripts,
    BootstrapWitnesses,
    PlutusV1Scripts,
    PlutusV2Scripts,
    PlutusV3Scripts,
    PlutusData,
    Redeemers,
    PoolOwners,
}

impl FieldId {
    pub const COUNT: usize = 15;

    pub const ALL: [FieldId; FieldId::COUNT] = [
        FieldId::Inputs,
        FieldId::Outputs,
        FieldId::Certificates,
        FieldId::Collateral,
        FieldId::RequiredSigners,
        FieldId::ReferenceInputs,
        FieldId::VKeyWitnesses,
        FieldId::NativeScripts,
        FieldId::BootstrapWitnesses,
        FieldId::PlutusV1Scripts,
        FieldId::PlutusV2Scripts,
        FieldId::PlutusV3Scripts,
        FieldId::PlutusData,
        FieldId::Redeemers,
        FieldId::PoolOwners,
    ];

    /// Position of this field in per-era rule tables
    pub const fn index(self) -> usize {
        self as usize
    }


    /// CDDL field name
    pub fn name(&self) -> &'static str {
        match self {
            FieldId::Inputs => "inputs",
            FieldId::Outputs => "outputs",
            FieldId::Certificates => "certificates",
            FieldId::Collateral => "collateral",
            FieldId::RequiredSigners => "required_signers",
            FieldId::ReferenceInputs => "reference_inputs",
            FieldId::VKeyWitnesses => "vkey_witnesses",
            FieldId::NativeScripts => "native_scripts",
            FieldId::BootstrapWitnesses => "bootstrap_witnesses",
            FieldId::PlutusV1Scripts => "plutus_v1_scripts",
            FieldId::PlutusV2Scripts => "plutus_v2_scripts",
            FieldId::PlutusV3Scripts => "plutus_v3_scripts",
            FieldId::PlutusData => "plutus_data",
            FieldId::Redeemers => "redeemers",
            FieldId::PoolOwners => "pool_owners",
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reference to a transaction output being spent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionInput {
    pub transaction_id: TxHash,
    pub index: u64,
}

impl TransactionInput {
    pub fn new(transaction_id: TxHash, index: u64) -> Self {
        Self {
            transaction_id,
            index,
        }
    }
}

impl fmt::Display for TransactionInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.transaction_id, self.index)
    }
}

/// A single CBOR data item kept exactly as it was encoded
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RawCbor(Vec<u8>);

impl RawCbor {
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl From<&[u8]> for RawCbor {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for RawCbor {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for RawCbor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawCbor").field(&hex::encode(&self.0)).finish()
    }
}

impl Serialize for RawCbor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for RawCbor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        hex::decode(s).map(Self).map_err(serde::de::Error::custom)
    }
}
