use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// A fixed-size digest of `BYTES` bytes, shown and serialised as lowercase hex.
///
/// Transaction ids, VRF key hashes and data hashes are 32 bytes. Address and pool
/// key hashes are 28.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash<const BYTES: usize>([u8; BYTES]);

impl<const BYTES: usize> Hash<BYTES> {
    pub const fn new(bytes: [u8; BYTES]) -> Self {
        Self(bytes)
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl<const BYTES: usize> TryFrom<&[u8]> for Hash<BYTES> {
    type Error = std::array::TryFromSliceError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Ok(Self(value.try_into()?))
    }
}

impl<const BYTES: usize> AsRef<[u8]> for Hash<BYTES> {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl<const BYTES: usize> fmt::Debug for Hash<BYTES> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash<{BYTES}>({self})")
    }
}

impl<const BYTES: usize> fmt::Display for Hash<BYTES> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl<const BYTES: usize> FromStr for Hash<BYTES> {
    type Err = hex::FromHexError;

    /// Fails unless `s` is hex for exactly `BYTES` bytes
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0; BYTES];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl<const BYTES: usize> Serialize for Hash<BYTES> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, const BYTES: usize> Deserialize<'de> for Hash<BYTES> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Address key hash: required signers and pool owners
pub type AddrKeyhash = Hash<28>;

pub type PoolKeyhash = Hash<28>;

/// Transaction id, Blake2b-256 of the encoded body
pub type TxHash = Hash<32>;

pub type VrfKeyhash = Hash<32>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pool_and_tx_hashes() {
        let pool: PoolKeyhash =
            "276fd18711931e2c0e21430192dbeac0e458093cd9d1fcd7210f64b3".parse().unwrap();
        assert_eq!(pool.to_vec()[0], 0x27);

        let tx: TxHash =
            "0d8d00cdd4657ac84d82f0a56067634a7adfdf43da41cb534bcaa45060973d21".parse().unwrap();
        assert_eq!(tx.to_string().len(), 64);
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert!("27".parse::<AddrKeyhash>().is_err());
        assert!("0d8d00cdd465".parse::<TxHash>().is_err());
        assert!(AddrKeyhash::try_from([0u8; 27].as_slice()).is_err());
    }

    #[test]
    fn json_form_is_hex() {
        let hash = AddrKeyhash::new([0xab; 28]);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(28)));
        assert_eq!(serde_json::from_str::<AddrKeyhash>(&json).unwrap(), hash);
    }

    #[test]
    fn debug_shows_width_and_hex() {
        assert_eq!(format!("{:?}", Hash::new([0x01u8; 2])), "Hash<2>(0101)");
    }
}
