//! An arbitrary-precision unsigned integer for zerocoin values.

use std::hash::{Hash, Hasher};
use std::{fmt, io};

use num_bigint::BigUint;
use num_traits::Zero;

use crate::serialization::{BzxDeserialize, BzxSerialize, ReadBzxExt, SerializationError, WriteBzxExt};

/// Big integers larger than this are rejected during deserialization.
const MAX_SERIALIZED_LEN: u64 = 8192;

/// An unsigned big integer, used for public coin commitments, spend
/// serials, and accumulator values.
#[derive(Clone, Default, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct BigNum(BigUint);

impl BigNum {
    /// Construct from little-endian bytes.
    pub fn from_bytes_le(bytes: &[u8]) -> Self {
        BigNum(BigUint::from_bytes_le(bytes))
    }

    /// Return the little-endian byte representation; zero is empty.
    pub fn to_bytes_le(&self) -> Vec<u8> {
        if self.0.is_zero() {
            Vec::new()
        } else {
            self.0.to_bytes_le()
        }
    }

    /// Parse from a big-endian hex string.
    pub fn from_hex(hex: &str) -> Option<Self> {
        BigUint::parse_bytes(hex.as_bytes(), 16).map(BigNum)
    }

    /// Returns true if this value is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Modular exponentiation: `self ^ exponent mod modulus`.
    pub fn modpow(&self, exponent: &BigNum, modulus: &BigNum) -> BigNum {
        BigNum(self.0.modpow(&exponent.0, &modulus.0))
    }
}

impl From<u64> for BigNum {
    fn from(value: u64) -> Self {
        BigNum(BigUint::from(value))
    }
}

impl Hash for BigNum {
    /// Hash policy shared with the original chain state: these are almost
    /// random big numbers, so eight low-order bytes make a good hash.
    /// Values shorter than 24 bytes all land in one bucket; they are rare
    /// enough that the collisions don't matter.
    fn hash<H: Hasher>(&self, state: &mut H) {
        let bytes = self.to_bytes_le();
        let bucket = if bytes.len() < 24 {
            0
        } else {
            u64::from_le_bytes(bytes[8..16].try_into().expect("slice is 8 bytes"))
        };
        state.write_u64(bucket);
    }
}

impl fmt::Debug for BigNum {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let hex = self.0.to_str_radix(16);
        if hex.len() > 16 {
            write!(f, "BigNum({}…)", &hex[..16])
        } else {
            write!(f, "BigNum({hex})")
        }
    }
}

impl BzxSerialize for BigNum {
    fn bzx_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        let bytes = self.to_bytes_le();
        writer.write_compactsize(bytes.len() as u64)?;
        writer.write_all(&bytes)
    }
}

impl BzxDeserialize for BigNum {
    fn bzx_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let len = reader.read_compactsize()?;
        if len > MAX_SERIALIZED_LEN {
            return Err(SerializationError::Parse("oversized big integer"));
        }
        let mut bytes = vec![0u8; len as usize];
        reader.read_exact(&mut bytes)?;
        Ok(BigNum::from_bytes_le(&bytes))
    }
}
