//! Shared CBOR helpers for the transaction codec

use pallas::codec::minicbor::{
    self, Decoder, Encoder,
    data::{Tag, Type},
};
use std::{collections::BTreeSet, convert::Infallible};
use tx_sanitizer_common::{Collection, Hash, RawCbor, Representation, TransactionInput};

/// CBOR tag marking a set (RFC 8949 registry, used by the Conway CDDL)
pub const SET_TAG: u64 = 258;

pub type DecodeResult<T> = Result<T, minicbor::decode::Error>;
pub type EncodeResult = Result<(), minicbor::encode::Error<Infallible>>;
pub type Enc = Encoder<Vec<u8>>;

// Decoding
// ----------------------------------------------------------------------------

/// Consume a break if the enclosing container is indefinite, and insist on it.
pub fn expect_break(d: &mut Decoder<'_>, len: Option<u64>) -> DecodeResult<()> {
    if len.is_none() {
        if d.datatype()? != Type::Break {
            return Err(minicbor::decode::Error::message(
                "indefinite array has more elements than expected",
            ));
        }
        d.skip()?;
    }
    Ok(())
}

/// Decode a fixed-shape array, definite or indefinite.
///
/// `elems` gets a length check that is a no-op for indefinite arrays.
pub fn heterogeneous_array<'d, A>(
    d: &mut Decoder<'d>,
    elems: impl FnOnce(
        &mut Decoder<'d>,
        Box<dyn FnOnce(u64) -> DecodeResult<()>>,
    ) -> DecodeResult<A>,
) -> DecodeResult<A> {
    let len = d.array()?;

    let result = match len {
        None => elems(d, Box::new(|_| Ok(())))?,
        Some(len) => elems(
            d,
            Box::new(move |expected_len| {
                if len != expected_len {
                    return Err(minicbor::decode::Error::message(format!(
                        "CBOR array length mismatch: expected {expected_len} got {len}"
                    )));
                }
                Ok(())
            }),
        )?,
    };

    expect_break(d, len)?;
    Ok(result)
}

/// Decode a homogeneous array, definite or indefinite
pub fn array<'d, T>(
    d: &mut Decoder<'d>,
    mut item: impl FnMut(&mut Decoder<'d>) -> DecodeResult<T>,
) -> DecodeResult<Vec<T>> {
    let mut items = Vec::new();
    match d.array()? {
        Some(len) => {
            for _ in 0..len {
                items.push(item(d)?);
            }
        }
        None => {
            while d.datatype()? != Type::Break {
                items.push(item(d)?);
            }
            d.skip()?;
        }
    }
    Ok(items)
}

/// Decode an array that may be wrapped in the set tag, recording which form was found
pub fn collection<'d, T>(
    d: &mut Decoder<'d>,
    item: impl FnMut(&mut Decoder<'d>) -> DecodeResult<T>,
) -> DecodeResult<Collection<T>> {
    let representation = if d.datatype()? == Type::Tag {
        let tag = d.tag()?;
        if tag != Tag::new(SET_TAG) {
            return Err(minicbor::decode::Error::message(format!(
                "invalid CBOR tag: expected {SET_TAG} got {}",
                tag.as_u64()
            )));
        }
        Representation::OrderedSet
    } else {
        Representation::Sequence
    };

    Ok(Collection::decoded(representation, array(d, item)?))
}

/// Decode a map keyed by unsigned integers, rejecting duplicate keys
pub fn keyed_map<'d>(
    d: &mut Decoder<'d>,
    what: &str,
    mut entry: impl FnMut(&mut Decoder<'d>, u64) -> DecodeResult<()>,
) -> DecodeResult<()> {
    let len = d.map()?;
    let mut seen = BTreeSet::new();
    let mut remaining = len;

    loop {
        match remaining {
            Some(0) => break,
            Some(n) => remaining = Some(n - 1),
            None => {
                if d.datatype()? == Type::Break {
                    d.skip()?;
                    break;
                }
            }
        }

        let key = d.u64()?;
        if !seen.insert(key) {
            return Err(minicbor::decode::Error::message(format!(
                "duplicate key {key} in {what}"
            )));
        }
        entry(d, key)?;
    }

    Ok(())
}

/// Capture the next data item exactly as encoded
pub fn raw_item(d: &mut Decoder<'_>) -> DecodeResult<RawCbor> {
    let start = d.position();
    d.skip()?;
    let end = d.position();
    Ok(RawCbor::from(&d.input()[start..end]))
}

pub fn hash<const N: usize>(d: &mut Decoder<'_>) -> DecodeResult<Hash<N>> {
    let bytes = d.bytes()?;
    Hash::try_from(bytes).map_err(|_| {
        minicbor::decode::Error::message(format!(
            "invalid hash: expected {N} bytes got {}",
            bytes.len()
        ))
    })
}

pub fn transaction_input(d: &mut Decoder<'_>) -> DecodeResult<TransactionInput> {
    heterogeneous_array(d, |d, assert_len| {
        assert_len(2)?;
        let transaction_id = hash::<32>(d)?;
        let index = d.u64()?;
        Ok(TransactionInput::new(transaction_id, index))
    })
}

// Encoding
// ----------------------------------------------------------------------------

/// Encode a single item into its own buffer
pub fn to_bytes(f: impl FnOnce(&mut Enc) -> EncodeResult) -> Result<Vec<u8>, crate::EncodeError> {
    let mut e = Encoder::new(Vec::new());
    f(&mut e).map_err(|err| crate::EncodeError(err.to_string()))?;
    Ok(e.into_writer())
}

/// Copy an already-encoded item into the output
pub fn write_raw(e: &mut Enc, raw: &[u8]) -> EncodeResult {
    e.writer_mut().extend_from_slice(raw);
    Ok(())
}

/// Encode a collection in its recorded representation
pub fn write_collection<T>(
    e: &mut Enc,
    collection: &Collection<T>,
    mut item: impl FnMut(&mut Enc, &T) -> EncodeResult,
) -> EncodeResult {
    if collection.representation().is_set() {
        e.tag(Tag::new(SET_TAG))?;
    }
    e.array(collection.len() as u64)?;
    for x in collection {
        item(e, x)?;
    }
    Ok(())
}

pub fn write_transaction_input(e: &mut Enc, input: &TransactionInput) -> EncodeResult {
    e.array(2)?;
    e.bytes(input.transaction_id.as_ref())?;
    e.u64(input.index)?;
    Ok(())
}

pub fn write_hash<const N: usize>(e: &mut Enc, hash: &Hash<N>) -> EncodeResult {
    e.bytes(hash.as_ref())?;
    Ok(())
}

pub fn write_raw_item(e: &mut Enc, raw: &RawCbor) -> EncodeResult {
    write_raw(e, raw.as_slice())
}

/// Write a map with the given already-encoded entries, keys ascending
pub fn write_keyed_map(
    e: &mut Enc,
    entries: &std::collections::BTreeMap<u64, Vec<u8>>,
) -> EncodeResult {
    e.map(entries.len() as u64)?;
    for (key, value) in entries {
        e.u64(*key)?;
        write_raw(e, value)?;
    }
    Ok(())
}
