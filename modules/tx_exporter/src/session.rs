//! Export session: holds at most one loaded transaction

use crate::{
    envelope::{TextEnvelope, read_cbor_hex},
    exporter::{ExportError, ExportFormat, ExportedArtifact, export},
};
use std::path::Path;
use tracing::{error, info};
use tx_sanitizer_codec::decode_hex;
use tx_sanitizer_common::{CollectionPolicy, Era, TransactionModel};

/// A decoded transaction together with the hex it was decoded from
#[derive(Debug, Clone)]
pub struct LoadedTransaction {
    pub cbor_hex: String,
    pub transaction: TransactionModel,
}

#[derive(Debug, Default)]
pub struct ExportSession {
    loaded: Option<LoadedTransaction>,
}

impl ExportSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a text envelope file. A failed load leaves the session empty.
    pub fn load_text_envelope(&mut self, path: &Path) -> Result<&LoadedTransaction, ExportError> {
        self.loaded = None;
        let cbor_hex = read_cbor_hex(path).inspect_err(|e| {
            error!("Failed to read {}: {e}", path.display());
        })?;
        info!("Loaded text envelope {}", path.display());
        self.load_cbor_hex(&cbor_hex)
    }

    /// Load from a hex string. A failed load leaves the session empty.
    pub fn load_cbor_hex(&mut self, cbor_hex: &str) -> Result<&LoadedTransaction, ExportError> {
        self.loaded = None;
        let cbor_hex = cbor_hex.trim();
        let transaction = decode_hex(cbor_hex).inspect_err(|e| {
            error!("Failed to decode transaction: {e}");
        })?;
        info!(
            "Decoded transaction with {} inputs and {} outputs",
            transaction.body.inputs.len(),
            transaction.body.outputs.len()
        );
        let loaded = self.loaded.insert(LoadedTransaction {
            cbor_hex: cbor_hex.to_string(),
            transaction,
        });
        Ok(&*loaded)
    }

    pub fn loaded(&self) -> Option<&LoadedTransaction> {
        self.loaded.as_ref()
    }

    fn current(&self) -> Result<&LoadedTransaction, ExportError> {
        self.loaded.as_ref().ok_or(ExportError::NoTransactionLoaded)
    }

    /// Structural JSON dump of the loaded transaction as decoded
    pub fn view(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(&self.current()?.transaction)?)
    }

    pub fn export(
        &self,
        era: Era,
        policy: CollectionPolicy,
        format: ExportFormat,
    ) -> Result<ExportedArtifact, ExportError> {
        export(&self.current()?.transaction, era, policy, format)
    }

    /// Write the loaded transaction, re-encoded as given, to a text envelope
    pub fn save_text_envelope(&self, path: &Path, era: Era) -> Result<TextEnvelope, ExportError> {
        let envelope = TextEnvelope::for_transaction(&self.current()?.transaction, era)?;
        envelope.write(path)?;
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tx_sanitizer_test_utils::TxFixture;

    #[test]
    fn empty_session_refuses_to_export() {
        let session = ExportSession::new();
        assert!(matches!(
            session.export(Era::Conway, CollectionPolicy::Default, ExportFormat::HexString),
            Err(ExportError::NoTransactionLoaded)
        ));
        assert!(matches!(session.view(), Err(ExportError::NoTransactionLoaded)));
    }

    #[test]
    fn empty_session_refuses_to_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let session = ExportSession::new();
        assert!(matches!(
            session.save_text_envelope(&path, Era::Conway),
            Err(ExportError::NoTransactionLoaded)
        ));
        assert!(!path.exists());
    }

    #[test]
    fn failed_load_clears_previous_transaction() {
        let mut session = ExportSession::new();
        session.load_cbor_hex(&TxFixture::default().cbor_hex()).unwrap();
        assert!(session.loaded().is_some());

        assert!(matches!(session.load_cbor_hex("zzzz"), Err(ExportError::Decode(_))));
        assert!(session.loaded().is_none());
    }

    #[test]
    fn load_keeps_source_hex() {
        let hex = TxFixture::default().cbor_hex();
        let mut session = ExportSession::new();
        let loaded = session.load_cbor_hex(&format!("  {hex}\n")).unwrap();
        assert_eq!(loaded.cbor_hex, hex);
        assert_eq!(loaded.transaction.body.fee, 170_000);
    }

    #[test]
    fn load_envelope_without_cbor_hex() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tx.json");
        std::fs::write(&path, "{}").unwrap();

        let mut session = ExportSession::new();
        assert!(matches!(
            session.load_text_envelope(&path),
            Err(ExportError::MissingField(_))
        ));
        assert!(session.loaded().is_none());
    }

    #[test]
    fn view_shows_fee() {
        let mut session = ExportSession::new();
        session.load_cbor_hex(&TxFixture::default().cbor_hex()).unwrap();
        assert!(session.view().unwrap().contains("\"fee\": 170000"));
    }
}
