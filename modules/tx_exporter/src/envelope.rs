//! Text envelope files: `{"type", "description", "cborHex"}`

use crate::exporter::ExportError;
use serde::Serialize;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};
use tracing::info;
use tx_sanitizer_codec::encode_hex;
use tx_sanitizer_common::{Era, TransactionModel};

pub const ENVELOPE_DESCRIPTION: &str = "Generated by Cardano Transaction Sanitizer";

const CBOR_HEX_FIELD: &str = "cborHex";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEnvelope {
    #[serde(rename = "type")]
    pub envelope_type: String,
    pub description: String,
    #[serde(rename = "cborHex")]
    pub cbor_hex: String,
}

fn io_error(path: &Path, source: std::io::Error) -> ExportError {
    ExportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// `"Signed Tx ConwayEra"` when any witness field is present,
/// `"Unwitnessed Tx ConwayEra"` otherwise
pub fn envelope_type(tx: &TransactionModel, era: Era) -> String {
    let status = if tx.is_signed() { "Signed" } else { "Unwitnessed" };
    format!("{status} Tx {}Era", era.name())
}

/// Extract the `cborHex` field from envelope JSON text
pub fn cbor_hex_from_json(text: &str) -> Result<String, ExportError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    value
        .get(CBOR_HEX_FIELD)
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ExportError::MissingField(CBOR_HEX_FIELD.to_string()))
}

/// Read the `cborHex` field of an envelope file. Other fields are not required.
pub fn read_cbor_hex(path: &Path) -> Result<String, ExportError> {
    if !path.is_file() {
        return Err(io_error(
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
        ));
    }
    let text = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    cbor_hex_from_json(text.trim())
}

impl TextEnvelope {
    /// Envelope holding the canonical encoding of `tx` as given
    pub fn for_transaction(tx: &TransactionModel, era: Era) -> Result<Self, ExportError> {
        Ok(Self {
            envelope_type: envelope_type(tx, era),
            description: ENVELOPE_DESCRIPTION.to_string(),
            cbor_hex: encode_hex(tx)?,
        })
    }

    /// Write as four-space indented JSON
    pub fn write(&self, path: &Path) -> Result<(), ExportError> {
        let file = File::create(path).map_err(|e| io_error(path, e))?;
        let mut writer = BufWriter::new(file);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
        self.serialize(&mut serializer)?;
        writer.flush().map_err(|e| io_error(path, e))?;
        info!("Saved {} to {}", self.envelope_type, path.display());
        Ok(())
    }
}
