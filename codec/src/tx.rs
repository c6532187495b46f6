use crate::{
    DecodeError, EncodeError,
    certs::{certificate, write_certificate},
    utils::*,
    witness::{witness_set, write_witness_set},
};
use pallas::{
    codec::minicbor::{self, Decoder, data::Type},
    crypto::hash::Hasher,
};
use std::collections::BTreeMap;
use tracing::debug;
use tx_sanitizer_common::{Collection, TransactionBody, TransactionModel, TxHash};

fn transaction_body(d: &mut Decoder<'_>) -> DecodeResult<TransactionBody> {
    let mut inputs = None;
    let mut outputs = None;
    let mut fee = None;
    let mut body = TransactionBody::new(Collection::sequence(Vec::new()), Vec::new(), 0);

    keyed_map(d, "transaction body", |d, key| {
        match key {
            0 => inputs = Some(collection(d, transaction_input)?),
            1 => outputs = Some(array(d, raw_item)?),
            2 => fee = Some(d.u64()?),
            3 => body.ttl = Some(d.u64()?),
            4 => body.certificates = Some(collection(d, certificate)?),
            5 => body.withdrawals = Some(raw_item(d)?),
            6 => body.update = Some(raw_item(d)?),
            7 => body.auxiliary_data_hash = Some(hash::<32>(d)?),
            8 => body.validity_interval_start = Some(d.u64()?),
            9 => body.mint = Some(raw_item(d)?),
            11 => body.script_data_hash = Some(hash::<32>(d)?),
            13 => body.collateral = Some(collection(d, transaction_input)?),
            14 => body.required_signers = Some(collection(d, hash::<28>)?),
            15 => body.network_id = Some(d.u8()?),
            16 => body.collateral_return = Some(raw_item(d)?),
            17 => body.total_collateral = Some(d.u64()?),
            18 => body.reference_inputs = Some(collection(d, transaction_input)?),
            _ => {
                body.other_fields.insert(key, raw_item(d)?);
            }
        }
        Ok(())
    })?;

    let missing = |name: &str, key: u64| {
        minicbor::decode::Error::message(format!("transaction body is missing {name} (key {key})"))
    };
    body.inputs = inputs.ok_or_else(|| missing("inputs", 0))?;
    body.outputs = outputs.ok_or_else(|| missing("outputs", 1))?;
    body.fee = fee.ok_or_else(|| missing("fee", 2))?;
    Ok(body)
}

fn transaction(d: &mut Decoder<'_>) -> DecodeResult<TransactionModel> {
    heterogeneous_array(d, |d, assert_len| {
        assert_len(4)?;
        let body = transaction_body(d)?;
        let witness_set = witness_set(d)?;
        let is_valid = d.bool()?;
        let auxiliary_data = if d.datatype()? == Type::Null {
            d.skip()?;
            None
        } else {
            Some(raw_item(d)?)
        };
        Ok(TransactionModel {
            body,
            witness_set,
            is_valid,
            auxiliary_data,
        })
    })
}

/// Decode a Babbage or Conway transaction from its CBOR bytes
pub fn decode(bytes: &[u8]) -> Result<TransactionModel, DecodeError> {
    let mut d = Decoder::new(bytes);
    let tx = transaction(&mut d)?;

    let trailing = bytes.len() - d.position();
    if trailing > 0 {
        return Err(DecodeError::TrailingBytes(trailing));
    }

    debug!(
        "Decoded transaction with {} inputs, {} outputs, {} certificates",
        tx.body.inputs.len(),
        tx.body.outputs.len(),
        tx.body.certificates.as_ref().map_or(0, |c| c.len())
    );
    Ok(tx)
}

/// Decode a transaction from hex-encoded CBOR
pub fn decode_hex(cbor_hex: &str) -> Result<TransactionModel, DecodeError> {
    let bytes = hex::decode(cbor_hex.trim())?;
    decode(&bytes)
}

/// Encode a transaction body with keys in ascending order
pub fn encode_body(body: &TransactionBody) -> Result<Vec<u8>, EncodeError> {
    let mut entries: BTreeMap<u64, Vec<u8>> = BTreeMap::new();

    entries.insert(0, to_bytes(|e| write_collection(e, &body.inputs, write_transaction_input))?);
    entries.insert(
        1,
        to_bytes(|e| {
            e.array(body.outputs.len() as u64)?;
            for output in &body.outputs {
                write_raw_item(e, output)?;
            }
            Ok(())
        })?,
    );
    entries.insert(2, to_bytes(|e| e.u64(body.fee).map(|_| ()))?);

    if let Some(ttl) = body.ttl {
        entries.insert(3, to_bytes(|e| e.u64(ttl).map(|_| ()))?);
    }
    if let Some(certs) = &body.certificates {
        entries.insert(4, to_bytes(|e| write_collection(e, certs, write_certificate))?);
    }
    if let Some(raw) = &body.withdrawals {
        entries.insert(5, raw.as_slice().to_vec());
    }
    if let Some(raw) = &body.update {
        entries.insert(6, raw.as_slice().to_vec());
    }
    if let Some(h) = &body.auxiliary_data_hash {
        entries.insert(7, to_bytes(|e| write_hash(e, h))?);
    }
    if let Some(start) = body.validity_interval_start {
        entries.insert(8, to_bytes(|e| e.u64(start).map(|_| ()))?);
    }
    if let Some(raw) = &body.mint {
        entries.insert(9, raw.as_slice().to_vec());
    }
    if let Some(h) = &body.script_data_hash {
        entries.insert(11, to_bytes(|e| write_hash(e, h))?);
    }
    if let Some(c) = &body.collateral {
        entries.insert(13, to_bytes(|e| write_collection(e, c, write_transaction_input))?);
    }
    if let Some(c) = &body.required_signers {
        entries.insert(14, to_bytes(|e| write_collection(e, c, write_hash))?);
    }
    if let Some(id) = body.network_id {
        entries.insert(15, to_bytes(|e| e.u8(id).map(|_| ()))?);
    }
    if let Some(raw) = &body.collateral_return {
        entries.insert(16, raw.as_slice().to_vec());
    }
    if let Some(total) = body.total_collateral {
        entries.insert(17, to_bytes(|e| e.u64(total).map(|_| ()))?);
    }
    if let Some(c) = &body.reference_inputs {
        entries.insert(18, to_bytes(|e| write_collection(e, c, write_transaction_input))?);
    }

    // Typed fields win over a clashing pass-through key
    for (key, raw) in &body.other_fields {
        entries.entry(*key).or_insert_with(|| raw.as_slice().to_vec());
    }

    to_bytes(|e| write_keyed_map(e, &entries))
}

/// Encode a transaction to canonical CBOR
pub fn encode(tx: &TransactionModel) -> Result<Vec<u8>, EncodeError> {
    let body = encode_body(&tx.body)?;

    let mut e = minicbor::Encoder::new(Vec::new());
    let fail =
        |err: minicbor::encode::Error<std::convert::Infallible>| EncodeError(err.to_string());

    e.array(4).map_err(fail)?;
    write_raw(&mut e, &body).map_err(fail)?;
    write_witness_set(&mut e, &tx.witness_set)?;
    e.bool(tx.is_valid).map_err(fail)?;
    match &tx.auxiliary_data {
        Some(raw) => write_raw_item(&mut e, raw).map_err(fail)?,
        None => {
            e.null().map_err(fail)?;
        }
    }

    Ok(e.into_writer())
}

/// Encode a transaction to lowercase hex
pub fn encode_hex(tx: &TransactionModel) -> Result<String, EncodeError> {
    Ok(hex::encode(encode(tx)?))
}

/// Blake2b-256 of the canonical body encoding
pub fn transaction_id(tx: &TransactionModel) -> Result<TxHash, EncodeError> {
    let body = encode_body(&tx.body)?;
    Ok(TxHash::new(*Hasher::<256>::hash(&body)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;
    use tx_sanitizer_common::{Certificate, Representation};
    use tx_sanitizer_test_utils::{TxFixture, body_cbor, tx_cbor};

    #[test]
    fn decode_encode_is_identity_for_canonical_input() {
        let bytes = TxFixture::default().with_pool_registration().with_vkey_witnesses(2).cbor();
        let tx = decode(&bytes).unwrap();
        assert_eq!(encode(&tx).unwrap(), bytes);
    }

    #[test]
    fn decode_records_representations() {
        let bytes = TxFixture::default().tagged_inputs(true).with_pool_registration().cbor();
        let tx = decode(&bytes).unwrap();
        assert_eq!(tx.body.inputs.representation(), Representation::OrderedSet);
        assert_eq!(
            tx.body.certificates.as_ref().map(Collection::representation),
            Some(Representation::Sequence)
        );
        assert!(matches!(
            tx.body.certificates.as_ref().unwrap().items()[0],
            Certificate::PoolRegistration(_)
        ));
    }

    #[test]
    fn governance_fields_pass_through() {
        let bytes = TxFixture::default().with_other_field(22, vec![0x19, 0x03, 0xe8]).cbor();
        let tx = decode(&bytes).unwrap();
        assert_eq!(
            tx.body.other_fields.get(&22).map(|r| r.as_slice()),
            Some(&[0x19, 0x03, 0xe8][..])
        );
        assert_eq!(encode(&tx).unwrap(), bytes);
    }

    #[test_case("zzzz" ; "not hex")]
    #[test_case("abc" ; "odd length")]
    #[test_case("" ; "empty")]
    #[test_case("a0" ; "not an array")]
    #[test_case("8400" ; "truncated")]
    fn malformed_input_is_rejected(cbor_hex: &str) {
        assert!(decode_hex(cbor_hex).is_err());
    }

    #[test]
    fn invalid_hex_is_reported_as_such() {
        assert!(matches!(decode_hex("zzzz"), Err(DecodeError::InvalidHex(_))));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut bytes = TxFixture::default().cbor();
        bytes.push(0x00);
        assert!(matches!(decode(&bytes), Err(DecodeError::TrailingBytes(1))));
    }

    #[test]
    fn body_without_fee_is_rejected() {
        // {0: [], 1: []}
        let body = hex::decode("a200800180").unwrap();
        let bytes = tx_cbor(&body, &[0xa0], true, None);
        assert!(matches!(decode(&bytes), Err(DecodeError::Cbor(_))));
    }

    #[test]
    fn body_keys_are_written_in_ascending_order() {
        // {2: 0, 0: [], 1: []} decodes and comes back sorted
        let body = hex::decode("a3020000800180").unwrap();
        let tx = decode(&tx_cbor(&body, &[0xa0], true, None)).unwrap();
        assert_eq!(encode_body(&tx.body).unwrap(), hex::decode("a3008001800200").unwrap());
    }

    #[test]
    fn auxiliary_data_and_validity_survive() {
        let body = body_cbor(&TxFixture::default());
        let bytes = tx_cbor(&body, &[0xa0], false, Some(&[0xa0]));
        let tx = decode(&bytes).unwrap();
        assert!(!tx.is_valid);
        assert_eq!(tx.auxiliary_data.as_ref().map(|a| a.as_slice()), Some(&[0xa0][..]));
        assert_eq!(encode(&tx).unwrap(), bytes);
    }

    #[test]
    fn transaction_id_depends_only_on_body() {
        let unsigned = decode(&TxFixture::default().cbor()).unwrap();
        let signed = decode(&TxFixture::default().with_vkey_witnesses(1).cbor()).unwrap();
        assert_eq!(transaction_id(&unsigned).unwrap(), transaction_id(&signed).unwrap());
    }
}
