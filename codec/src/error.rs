use pallas::codec::minicbor;
use thiserror::Error;

/// Input bytes or hex could not be turned into a transaction
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Invalid CBOR hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("Invalid transaction CBOR: {0}")]
    Cbor(#[from] minicbor::decode::Error),

    #[error("{0} unexpected trailing bytes after transaction")]
    TrailingBytes(usize),
}

/// The encoder refused to serialise a model
#[derive(Debug, Error)]
#[error("Failed to encode transaction: {0}")]
pub struct EncodeError(pub String);
