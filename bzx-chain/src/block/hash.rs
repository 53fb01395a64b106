use std::{fmt, io};

use crate::serialization::{BzxSerialize, SerializationError};
use crate::sha256d_writer::Sha256dWriter;

use super::Header;

/// A SHA-256d hash of a block [`Header`].
///
/// This is usually called a 'block hash', as it is frequently used
/// to identify the entire block, since the hash preimage includes
/// the merkle root of the transactions in this block. But
/// _technically_, this is just a hash of the block _header_, not
/// the direct bytes of the transactions as well as the header.
///
/// Displayed and parsed in big-endian byte order (the reverse of the
/// in-memory order), following the Bitcoin convention.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    /// The all-zero hash, used as the "null" sentinel for optional hash
    /// fields such as a spend's accumulator block hash.
    pub const NULL: Hash = Hash([0; 32]);

    /// Returns true if this is the null sentinel hash.
    pub fn is_null(&self) -> bool {
        *self == Hash::NULL
    }

    fn bytes_in_display_order(&self) -> [u8; 32] {
        let mut reversed = self.0;
        reversed.reverse();
        reversed
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("block::Hash")
            .field(&hex::encode(self.bytes_in_display_order()))
            .finish()
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&hex::encode(self.bytes_in_display_order()))
    }
}

impl From<&Header> for Hash {
    fn from(header: &Header) -> Self {
        let mut hash_writer = Sha256dWriter::default();
        header
            .bzx_serialize(&mut hash_writer)
            .expect("Sha256dWriter is infallible");
        Self(hash_writer.finish())
    }
}

impl BzxSerialize for Hash {
    fn bzx_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_all(&self.0)
    }
}

impl std::str::FromStr for Hash {
    type Err = SerializationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0; 32];
        if hex::decode_to_slice(s, &mut bytes[..]).is_err() {
            Err(SerializationError::Parse("hex decoding error"))
        } else {
            bytes.reverse();
            Ok(Hash(bytes))
        }
    }
}
