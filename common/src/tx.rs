//! Decoded transaction model
//!
//! The model is a plain value: it is built once by the codec and never mutated
//! afterwards. Normalisation produces a new model alongside the source.

use crate::certificate::Certificate;
use crate::collection::Collection;
use crate::hash::{AddrKeyhash, Hash};
use crate::types::{RawCbor, TransactionInput};
use serde::Serialize;
use std::collections::BTreeMap;

/// Transaction body. Field names follow the CDDL map keys noted on each field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionBody {
    /// 0
    pub inputs: Collection<TransactionInput>,

    /// 1 - always a plain sequence, order is significant
    pub outputs: Vec<RawCbor>,

    /// 2
    pub fee: u64,

    /// 3
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,

    /// 4
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificates: Option<Collection<Certificate>>,

    /// 5
    #[serde(skip_serializing_if = "Option::is_none")]
    pub withdrawals: Option<RawCbor>,

    /// 6 - Babbage protocol parameter update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<RawCbor>,

    /// 7
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auxiliary_data_hash: Option<Hash<32>>,

    /// 8
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validity_interval_start: Option<u64>,

    /// 9
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mint: Option<RawCbor>,

    /// 11
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_data_hash: Option<Hash<32>>,

    /// 13
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collateral: Option<Collection<TransactionInput>>,

    /// 14
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_signers: Option<Collection<AddrKeyhash>>,

    /// 15
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_id: Option<u8>,

    /// 16
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collateral_return: Option<RawCbor>,

    /// 17
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_collateral: Option<u64>,

    /// 18
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_inputs: Option<Collection<TransactionInput>>,

    /// Any other key (Conway governance fields 19-22 and later additions), kept as encoded
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub other_fields: BTreeMap<u64, RawCbor>,
}

impl TransactionBody {
    /// A body with the three mandatory fields and nothing else
    pub fn new(inputs: Collection<TransactionInput>, outputs: Vec<RawCbor>, fee: u64) -> Self {
        Self {
            inputs,
            outputs,
            fee,
            ttl: None,
            certificates: None,
            withdrawals: None,
            update: None,
            auxiliary_data_hash: None,
            validity_interval_start: None,
            mint: None,
            script_data_hash: None,
            collateral: None,
            required_signers: None,
            network_id: None,
            collateral_return: None,
            total_collateral: None,
            reference_inputs: None,
            other_fields: BTreeMap::new(),
        }
    }
}

/// Redeemers come either as a list of `[tag, index, data, ex_units]` or, from Conway,
/// as a map keyed by `[tag, index]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Redeemers {
    List(Collection<RawCbor>),
    Map(RawCbor),
}

/// Transaction witness set. Field names follow the CDDL map keys noted on each field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WitnessSet {
    /// 0
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vkey_witnesses: Option<Collection<RawCbor>>,

    /// 1
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_scripts: Option<Collection<RawCbor>>,

    /// 2
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootstrap_witnesses: Option<Collection<RawCbor>>,

    /// 3
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plutus_v1_scripts: Option<Collection<RawCbor>>,

    /// 4
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plutus_data: Option<Collection<RawCbor>>,

    /// 5
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redeemers: Option<Redeemers>,

    /// 6
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plutus_v2_scripts: Option<Collection<RawCbor>>,

    /// 7
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plutus_v3_scripts: Option<Collection<RawCbor>>,
}

impl WitnessSet {
    /// True when no witness field is present at all
    pub fn is_empty(&self) -> bool {
        self.vkey_witnesses.is_none()
            && self.native_scripts.is_none()
            && self.bootstrap_witnesses.is_none()
            && self.plutus_v1_scripts.is_none()
            && self.plutus_data.is_none()
            && self.redeemers.is_none()
            && self.plutus_v2_scripts.is_none()
            && self.plutus_v3_scripts.is_none()
    }
}

/// A complete transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionModel {
    pub body: TransactionBody,
    pub witness_set: WitnessSet,
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auxiliary_data: Option<RawCbor>,
}

impl TransactionModel {
    pub fn new(body: TransactionBody, witness_set: WitnessSet) -> Self {
        Self {
            body,
            witness_set,
            is_valid: true,
            auxiliary_data: None,
        }
    }

    /// True when any witness field is present, whether or not it has entries
    pub fn is_signed(&self) -> bool {
        !self.witness_set.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Representation;

    fn minimal() -> TransactionModel {
        TransactionModel::new(
            TransactionBody::new(
                Collection::decoded(Representation::OrderedSet, vec![]),
                vec![],
                0,
            ),
            WitnessSet::default(),
        )
    }

    #[test]
    fn empty_witness_set_is_unsigned() {
        assert!(!minimal().is_signed());
    }

    #[test]
    fn present_but_empty_witness_field_is_signed() {
        let mut tx = minimal();
        tx.witness_set.vkey_witnesses = Some(Collection::sequence(vec![]));
        assert!(tx.is_signed());
    }

    #[test]
    fn json_dump_omits_absent_fields() {
        let json = serde_json::to_value(minimal()).unwrap();
        let body = json.get("body").unwrap().as_object().unwrap();
        assert!(body.contains_key("inputs"));
        assert!(!body.contains_key("certificates"));
        assert!(!body.contains_key("other_fields"));
        assert!(json.get("witness_set").unwrap().as_object().unwrap().is_empty());
    }
}
