//! Transaction normaliser
//!
//! Rebuilds a decoded transaction so that every variable-cardinality field uses the
//! representation the resolver selects. The source transaction is only read.

use crate::resolver::{Cardinality, resolve};
use thiserror::Error;
use tracing::{debug, warn};
use tx_sanitizer_common::{
    Certificate, Collection, CollectionPolicy, Era, FieldId, PoolParams, PoolRegistration,
    Redeemers, TransactionBody, TransactionModel, WitnessSet,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("Certificate {index} is a pool registration without pool parameters")]
    Structural { index: usize },
}

/// Normalises transactions for one (era, policy) pair
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    era: Era,
    policy: CollectionPolicy,
}

impl Normalizer {
    pub fn new(era: Era, policy: CollectionPolicy) -> Self {
        Self { era, policy }
    }

    /// Produce a new transaction with every policy-dependent field re-shaped
    pub fn normalize(&self, tx: &TransactionModel) -> Result<TransactionModel, NormalizeError> {
        Ok(TransactionModel {
            body: self.body(&tx.body)?,
            witness_set: self.witness_set(&tx.witness_set),
            is_valid: tx.is_valid,
            auxiliary_data: tx.auxiliary_data.clone(),
        })
    }

    /// Re-shape one field. `None` means the field is omitted from the output.
    fn reshape<T: Clone + PartialEq>(
        &self,
        field: FieldId,
        source: Option<&Collection<T>>,
    ) -> Option<Collection<T>> {
        let cardinality = Cardinality::of(source);
        let representation = resolve(self.era, field, self.policy, cardinality);
        debug!("{field}: {cardinality:?} -> {representation:?}");

        let (source, representation) = (source?, representation?);
        let reshaped = Collection::materialize(representation, source.iter().cloned())?;
        if reshaped.len() < source.len() {
            warn!(
                "{field}: dropped {} duplicate entries for {representation:?}",
                source.len() - reshaped.len()
            );
        }
        Some(reshaped)
    }

    fn body(&self, body: &TransactionBody) -> Result<TransactionBody, NormalizeError> {
        Ok(TransactionBody {
            // Inputs never resolve to a non-empty set, so the fallback is not taken
            inputs: self
                .reshape(FieldId::Inputs, Some(&body.inputs))
                .unwrap_or_else(|| body.inputs.clone()),
            outputs: body.outputs.clone(),
            certificates: self.certificates(body.certificates.as_ref())?,
            collateral: self.reshape(FieldId::Collateral, body.collateral.as_ref()),
            required_signers: self
                .reshape(FieldId::RequiredSigners, body.required_signers.as_ref()),
            reference_inputs: self
                .reshape(FieldId::ReferenceInputs, body.reference_inputs.as_ref()),
            ..body.clone()
        })
    }

    fn certificates(
        &self,
        certificates: Option<&Collection<Certificate>>,
    ) -> Result<Option<Collection<Certificate>>, NormalizeError> {
        let Some(certificates) = certificates else {
            return Ok(None);
        };

        let rebuilt = certificates
            .iter()
            .enumerate()
            .map(|(index, cert)| self.certificate(index, cert))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(self.reshape(
            FieldId::Certificates,
            Some(&Collection::decoded(certificates.representation(), rebuilt)),
        ))
    }

    fn certificate(&self, index: usize, cert: &Certificate) -> Result<Certificate, NormalizeError> {
        match cert {
            Certificate::PoolRegistration(PoolRegistration { params: None }) => {
                Err(NormalizeError::Structural { index })
            }
            Certificate::PoolRegistration(PoolRegistration {
                params: Some(params),
            }) => {
                debug!("Rebuilding pool registration for operator {}", params.operator);
                Ok(Certificate::PoolRegistration(PoolRegistration {
                    params: Some(self.pool_params(params)),
                }))
            }
            other => Ok(other.clone()),
        }
    }

    fn pool_params(&self, params: &PoolParams) -> PoolParams {
        PoolParams {
            pool_owners: self
                .reshape(FieldId::PoolOwners, Some(&params.pool_owners))
                .unwrap_or_else(|| params.pool_owners.clone()),
            ..params.clone()
        }
    }

    fn witness_set(&self, ws: &WitnessSet) -> WitnessSet {
        WitnessSet {
            vkey_witnesses: self.reshape(FieldId::VKeyWitnesses, ws.vkey_witnesses.as_ref()),
            native_scripts: self.reshape(FieldId::NativeScripts, ws.native_scripts.as_ref()),
            bootstrap_witnesses: self
                .reshape(FieldId::BootstrapWitnesses, ws.bootstrap_witnesses.as_ref()),
            plutus_v1_scripts: self
                .reshape(FieldId::PlutusV1Scripts, ws.plutus_v1_scripts.as_ref()),
            plutus_data: self.reshape(FieldId::PlutusData, ws.plutus_data.as_ref()),
            redeemers: self.redeemers(ws.redeemers.as_ref()),
            plutus_v2_scripts: self
                .reshape(FieldId::PlutusV2Scripts, ws.plutus_v2_scripts.as_ref()),
            plutus_v3_scripts: self
                .reshape(FieldId::PlutusV3Scripts, ws.plutus_v3_scripts.as_ref()),
        }
    }

    fn redeemers(&self, redeemers: Option<&Redeemers>) -> Option<Redeemers> {
        match redeemers? {
            Redeemers::List(list) => {
                self.reshape(FieldId::Redeemers, Some(list)).map(Redeemers::List)
            }
            Redeemers::Map(raw) => {
                debug!("redeemers: keyed map form kept as decoded");
                Some(Redeemers::Map(raw.clone()))
            }
        }
    }
}

/// Normalise `tx` for `era` under `policy`
pub fn normalize(
    tx: &TransactionModel,
    era: Era,
    policy: CollectionPolicy,
) -> Result<TransactionModel, NormalizeError> {
    Normalizer::new(era, policy).normalize(tx)
}
