//! Certificate type definitions
//!
//! Only pool registration carries a nested variable-cardinality field, so it is the
//! only variant decoded into structure. Every other certificate is kept as encoded.

use crate::collection::Collection;
use crate::hash::{AddrKeyhash, PoolKeyhash, VrfKeyhash};
use crate::types::RawCbor;
use serde::Serialize;
use serde_with::{hex::Hex, serde_as};
use std::fmt;

/// Certificate kinds by their CDDL tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateKind {
    StakeRegistration,
    StakeDeregistration,
    StakeDelegation,
    PoolRegistration,
    PoolRetirement,
    GenesisKeyDelegation,
    MoveInstantaneousRewards,
    Registration,
    Deregistration,
    VoteDelegation,
    StakeVoteDelegation,
    StakeRegistrationDelegation,
    VoteRegistrationDelegation,
    StakeVoteRegistrationDelegation,
    AuthCommitteeHot,
    ResignCommitteeCold,
    DRepRegistration,
    DRepDeregistration,
    DRepUpdate,
}

impl CertificateKind {
    pub fn from_tag(tag: u64) -> Option<Self> {
        use CertificateKind::*;
        Some(match tag {
            0 => StakeRegistration,
            1 => StakeDeregistration,
            2 => StakeDelegation,
            3 => PoolRegistration,
            4 => PoolRetirement,
            5 => GenesisKeyDelegation,
            6 => MoveInstantaneousRewards,
            7 => Registration,
            8 => Deregistration,
            9 => VoteDelegation,
            10 => StakeVoteDelegation,
            11 => StakeRegistrationDelegation,
            12 => VoteRegistrationDelegation,
            13 => StakeVoteRegistrationDelegation,
            14 => AuthCommitteeHot,
            15 => ResignCommitteeCold,
            16 => DRepRegistration,
            17 => DRepDeregistration,
            18 => DRepUpdate,
            _ => return None,
        })
    }

    pub fn tag(&self) -> u64 {
        *self as u64
    }
}

impl fmt::Display for CertificateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}({})", self.tag())
    }
}

/// Pool parameters carried by a pool registration certificate
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PoolParams {
    /// Operator pool key hash
    pub operator: PoolKeyhash,

    /// VRF key hash
    pub vrf_keyhash: VrfKeyhash,

    /// Pledged lovelace
    pub pledge: u64,

    /// Fixed cost in lovelace
    pub cost: u64,

    /// Margin, a tagged unit interval kept as encoded
    pub margin: RawCbor,

    /// Reward account bytes
    #[serde_as(as = "Hex")]
    pub reward_account: Vec<u8>,

    /// Owners by their address key hash
    pub pool_owners: Collection<AddrKeyhash>,

    /// Relay array kept as encoded
    pub relays: RawCbor,

    /// Metadata (`[url, hash]` or null) kept as encoded
    pub pool_metadata: RawCbor,
}

/// Pool registration certificate.
///
/// `params` is `None` only when the certificate carried its kind tag and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PoolRegistration {
    pub params: Option<PoolParams>,
}

/// A transaction certificate
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Certificate {
    PoolRegistration(PoolRegistration),

    /// Any other certificate, byte-for-byte
    Other { kind: CertificateKind, raw: RawCbor },
}

impl Certificate {
    pub fn kind(&self) -> CertificateKind {
        match self {
            Certificate::PoolRegistration(_) => CertificateKind::PoolRegistration,
            Certificate::Other { kind, .. } => *kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tags_round_trip() {
        for tag in 0..=18 {
            let kind = CertificateKind::from_tag(tag).unwrap();
            assert_eq!(kind.tag(), tag);
        }
        assert_eq!(CertificateKind::from_tag(19), None);
    }

    #[test]
    fn certificate_kind() {
        let cert = Certificate::PoolRegistration(PoolRegistration { params: None });
        assert_eq!(cert.kind(), CertificateKind::PoolRegistration);

        let cert = Certificate::Other {
            kind: CertificateKind::PoolRetirement,
            raw: RawCbor::from(&[0x83, 0x04][..]),
        };
        assert_eq!(cert.kind(), CertificateKind::PoolRetirement);
    }
}
