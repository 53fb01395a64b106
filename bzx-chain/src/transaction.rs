//! Transactions and transaction hashing.

use std::{fmt, io};

use byteorder::{LittleEndian, WriteBytesExt};

use crate::serialization::{BzxSerialize, SerializationError, WriteBzxExt};
use crate::sha256d_writer::Sha256dWriter;
use crate::transparent::{Input, OutPoint, Output};

/// A SHA-256d hash of a serialized [`Transaction`].
///
/// Displayed and parsed in big-endian byte order, following the Bitcoin
/// convention.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash(pub [u8; 32]);

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut reversed = self.0;
        reversed.reverse();
        f.debug_tuple("transaction::Hash")
            .field(&hex::encode(reversed))
            .finish()
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

/// A BitcoinZero transaction.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The transaction version.
    pub version: i32,
    /// The transparent inputs.
    pub inputs: Vec<Input>,
    /// The transparent outputs.
    pub outputs: Vec<Output>,
    /// The earliest time or block height this transaction can be added to the
    /// chain.
    pub lock_time: u32,
}

impl Transaction {
    /// Compute the hash of this transaction.
    pub fn hash(&self) -> Hash {
        let mut hash_writer = Sha256dWriter::default();
        self.bzx_serialize(&mut hash_writer)
            .expect("Sha256dWriter is infallible");
        Hash(hash_writer.finish())
    }

    /// Returns true if this transaction is shaped like a zerocoin spend:
    /// its first input carries a spend-marked script.
    pub fn is_zerocoin_spend(&self) -> bool {
        self.inputs
            .first()
            .map(|input| input.unlock_script.is_zerocoin_spend())
            .unwrap_or(false)
    }

    /// Compute the hash of this transaction with every zerocoin spend input
    /// blanked: the spend script cleared and the outpoint nulled.
    ///
    /// Spend proofs of version 1.5 and later commit to this hash, so it must
    /// not depend on the proof bytes themselves.
    pub fn hash_without_zerocoin_spends(&self) -> Hash {
        let mut stripped = self.clone();
        for input in &mut stripped.inputs {
            if input.unlock_script.is_zerocoin_spend() {
                input.unlock_script.0.clear();
                input.outpoint = OutPoint::NULL;
            }
        }
        stripped.hash()
    }
}

impl BzxSerialize for Transaction {
    fn bzx_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_i32::<LittleEndian>(self.version)?;
        writer.write_compactsize(self.inputs.len() as u64)?;
        for input in &self.inputs {
            input.bzx_serialize(&mut writer)?;
        }
        writer.write_compactsize(self.outputs.len() as u64)?;
        for output in &self.outputs {
            output.bzx_serialize(&mut writer)?;
        }
        writer.write_u32::<LittleEndian>(self.lock_time)
    }
}
