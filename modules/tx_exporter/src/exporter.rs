//! Export facade: normalise, then serialise to the requested format

use crate::normalizer::{NormalizeError, normalize};
use std::{fmt, path::PathBuf, str::FromStr};
use thiserror::Error;
use tracing::info;
use tx_sanitizer_codec::{DecodeError, EncodeError, encode, transaction_id};
use tx_sanitizer_common::{CollectionPolicy, Era, ParseError, TransactionModel};

/// Everything that can go wrong between loading a transaction and writing it out
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No transaction loaded. Load a transaction before exporting")]
    NoTransactionLoaded,

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Input file must contain a '{0}' field")]
    MissingField(String),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Output format of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Human readable structural dump of the normalised model
    Json,
    CborBytes,
    HexString,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Json => "json",
            ExportFormat::CborBytes => "cbor",
            ExportFormat::HexString => "hex",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "cbor" => Ok(ExportFormat::CborBytes),
            "hex" | "cbor-hex" => Ok(ExportFormat::HexString),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportedArtifact {
    Json(String),
    CborBytes(Vec<u8>),
    HexString(String),
}

impl ExportedArtifact {
    /// Text for display; raw CBOR is shown as hex
    pub fn to_text(&self) -> String {
        match self {
            ExportedArtifact::Json(s) | ExportedArtifact::HexString(s) => s.clone(),
            ExportedArtifact::CborBytes(bytes) => hex::encode(bytes),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ExportedArtifact::Json(s) | ExportedArtifact::HexString(s) => s.as_bytes(),
            ExportedArtifact::CborBytes(bytes) => bytes,
        }
    }
}

/// Normalise `tx` for `era` under `policy` and serialise it as `format`
pub fn export(
    tx: &TransactionModel,
    era: Era,
    policy: CollectionPolicy,
    format: ExportFormat,
) -> Result<ExportedArtifact, ExportError> {
    let normalized = normalize(tx, era, policy)?;
    info!(
        "Exporting transaction {} as {era} era with {policy} collections ({format})",
        transaction_id(&normalized)?
    );

    Ok(match format {
        ExportFormat::Json => ExportedArtifact::Json(serde_json::to_string_pretty(&normalized)?),
        ExportFormat::CborBytes => ExportedArtifact::CborBytes(encode(&normalized)?),
        ExportFormat::HexString => ExportedArtifact::HexString(hex::encode(encode(&normalized)?)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;
    use tx_sanitizer_codec::decode;
    use tx_sanitizer_test_utils::TxFixture;

    #[test_case("json" => Some(ExportFormat::Json))]
    #[test_case("CBOR" => Some(ExportFormat::CborBytes))]
    #[test_case("hex" => Some(ExportFormat::HexString))]
    #[test_case("yaml" => None)]
    fn parse_format(s: &str) -> Option<ExportFormat> {
        s.parse().ok()
    }

    #[test]
    fn hex_is_lowercase_hex_of_cbor() {
        let tx = decode(&TxFixture::default().with_pool_registration().cbor()).unwrap();
        let cbor = export(&tx, Era::Conway, CollectionPolicy::Default, ExportFormat::CborBytes)
            .unwrap();
        let hex = export(&tx, Era::Conway, CollectionPolicy::Default, ExportFormat::HexString)
            .unwrap();
        assert_eq!(hex.to_text(), hex::encode(cbor.as_bytes()));
        assert_eq!(hex.to_text(), hex.to_text().to_lowercase());
    }

    #[test]
    fn json_is_a_structural_dump() {
        let tx = decode(&TxFixture::default().with_vkey_witnesses(1).cbor()).unwrap();
        let ExportedArtifact::Json(json) =
            export(&tx, Era::Conway, CollectionPolicy::Default, ExportFormat::Json).unwrap()
        else {
            panic!("json expected");
        };
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["body"]["inputs"]["representation"], "ordered_set");
        assert_eq!(
            value["witness_set"]["vkey_witnesses"]["representation"],
            "non_empty_ordered_set"
        );
        assert_eq!(value["body"]["fee"], 170_000);
    }

    #[test]
    fn unsupported_format_names_the_format() {
        let err = "xml".parse::<ExportFormat>().unwrap_err();
        assert_eq!(err.to_string(), "Unsupported output format: xml");
    }
}
