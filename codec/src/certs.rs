use crate::utils::*;
use pallas::codec::minicbor::{self, Decoder, data::Type};
use tx_sanitizer_common::{Certificate, CertificateKind, PoolParams, PoolRegistration, RawCbor};

/// Number of array elements in a pool registration: the kind tag plus nine parameters
const POOL_REGISTRATION_LEN: u64 = 10;

fn pool_params(d: &mut Decoder<'_>) -> DecodeResult<PoolParams> {
    Ok(PoolParams {
        operator: hash::<28>(d)?,
        vrf_keyhash: hash::<32>(d)?,
        pledge: d.u64()?,
        cost: d.u64()?,
        margin: raw_item(d)?,
        reward_account: d.bytes()?.to_vec(),
        pool_owners: collection(d, hash::<28>)?,
        relays: raw_item(d)?,
        pool_metadata: raw_item(d)?,
    })
}

fn pool_registration(d: &mut Decoder<'_>, len: Option<u64>) -> DecodeResult<PoolRegistration> {
    let params = match len {
        Some(1) => None,
        Some(POOL_REGISTRATION_LEN) => Some(pool_params(d)?),
        Some(n) => {
            return Err(minicbor::decode::Error::message(format!(
                "pool registration expects {POOL_REGISTRATION_LEN} elements, got {n}"
            )));
        }
        None if d.datatype()? == Type::Break => None,
        None => Some(pool_params(d)?),
    };
    expect_break(d, len)?;
    Ok(PoolRegistration { params })
}

/// Decode a certificate. Pool registrations are decoded into structure, everything
/// else is kept as encoded after checking its kind tag.
pub fn certificate(d: &mut Decoder<'_>) -> DecodeResult<Certificate> {
    let start = d.position();
    let len = d.array()?;
    if len == Some(0) {
        return Err(minicbor::decode::Error::message("empty certificate"));
    }

    let tag = d.u64()?;
    let Some(kind) = CertificateKind::from_tag(tag) else {
        return Err(minicbor::decode::Error::message(format!(
            "unknown certificate kind {tag}"
        )));
    };

    if kind == CertificateKind::PoolRegistration {
        return Ok(Certificate::PoolRegistration(pool_registration(d, len)?));
    }

    match len {
        Some(n) => {
            for _ in 1..n {
                d.skip()?;
            }
        }
        None => {
            while d.datatype()? != Type::Break {
                d.skip()?;
            }
            d.skip()?;
        }
    }

    let end = d.position();
    Ok(Certificate::Other {
        kind,
        raw: RawCbor::from(&d.input()[start..end]),
    })
}

pub fn write_certificate(e: &mut Enc, cert: &Certificate) -> EncodeResult {
    match cert {
        Certificate::PoolRegistration(PoolRegistration { params: None }) => {
            e.array(1)?;
            e.u64(CertificateKind::PoolRegistration.tag())?;
        }
        Certificate::PoolRegistration(PoolRegistration {
            params: Some(params),
        }) => {
            e.array(POOL_REGISTRATION_LEN)?;
            e.u64(CertificateKind::PoolRegistration.tag())?;
            write_hash(e, &params.operator)?;
            write_hash(e, &params.vrf_keyhash)?;
            e.u64(params.pledge)?;
            e.u64(params.cost)?;
            write_raw_item(e, &params.margin)?;
            e.bytes(&params.reward_account)?;
            write_collection(e, &params.pool_owners, write_hash)?;
            write_raw_item(e, &params.relays)?;
            write_raw_item(e, &params.pool_metadata)?;
        }
        Certificate::Other { raw, .. } => write_raw_item(e, raw)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tx_sanitizer_common::Representation;
    use tx_sanitizer_test_utils::pool_registration_cbor;

    #[test]
    fn stake_delegation_is_kept_verbatim() {
        // [2, [0, h'00..'], h'11..']
        let bytes = hex::decode(format!(
            "83028200581c{}581c{}",
            "00".repeat(28),
            "11".repeat(28)
        ))
        .unwrap();
        let cert = certificate(&mut Decoder::new(&bytes)).unwrap();
        match &cert {
            Certificate::Other { kind, raw } => {
                assert_eq!(*kind, CertificateKind::StakeDelegation);
                assert_eq!(raw.as_slice(), bytes.as_slice());
            }
            other => panic!("unexpected certificate {other:?}"),
        }
        assert_eq!(to_bytes(|e| write_certificate(e, &cert)).unwrap(), bytes);
    }

    #[test]
    fn pool_registration_is_decoded() {
        let bytes = pool_registration_cbor(&[[0xa1; 28], [0xb2; 28]], true);
        let cert = certificate(&mut Decoder::new(&bytes)).unwrap();
        let Certificate::PoolRegistration(PoolRegistration {
            params: Some(params),
        }) = &cert
        else {
            panic!("expected pool registration, got {cert:?}");
        };
        assert_eq!(params.pool_owners.representation(), Representation::OrderedSet);
        assert_eq!(params.pool_owners.len(), 2);
        assert_eq!(params.pledge, 500_000_000);
        assert_eq!(to_bytes(|e| write_certificate(e, &cert)).unwrap(), bytes);
    }

    #[test]
    fn pool_registration_without_params() {
        let bytes = hex::decode("8103").unwrap();
        let cert = certificate(&mut Decoder::new(&bytes)).unwrap();
        assert_eq!(cert, Certificate::PoolRegistration(PoolRegistration { params: None }));
        assert_eq!(to_bytes(|e| write_certificate(e, &cert)).unwrap(), bytes);
    }

    #[test]
    fn truncated_pool_registration_is_rejected() {
        let bytes = hex::decode("8203581c".to_owned() + &"00".repeat(28)).unwrap();
        assert!(certificate(&mut Decoder::new(&bytes)).is_err());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let bytes = hex::decode("811863").unwrap();
        assert!(certificate(&mut Decoder::new(&bytes)).is_err());
    }
}
