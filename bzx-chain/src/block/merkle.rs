//! The Bitcoin-style binary hash tree committing a block to its transactions.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::transaction::Transaction;

/// The root of the transaction merkle tree.
///
/// Displayed and parsed in big-endian byte order, like block and
/// transaction hashes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Root(pub [u8; 32]);

impl fmt::Debug for Root {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut reversed = self.0;
        reversed.reverse();
        f.debug_tuple("merkle::Root")
            .field(&hex::encode(reversed))
            .finish()
    }
}

impl std::str::FromStr for Root {
    type Err = crate::serialization::SerializationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0; 32];
        if hex::decode_to_slice(s, &mut bytes[..]).is_err() {
            Err(crate::serialization::SerializationError::Parse(
                "hex decoding error",
            ))
        } else {
            bytes.reverse();
            Ok(Root(bytes))
        }
    }
}

fn hash_pair(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut data = Vec::with_capacity(64);
    data.extend_from_slice(left);
    data.extend_from_slice(right);
    let first = Sha256::digest(&data);
    let second = Sha256::digest(first);
    let mut result = [0u8; 32];
    result.copy_from_slice(&second);
    result
}

impl Root {
    /// Compute the merkle root of a block's transactions.
    ///
    /// Odd levels duplicate their last hash, following the Bitcoin rule.
    ///
    /// # Panics
    ///
    /// If `transactions` is empty; valid blocks always carry a coinbase.
    pub fn from_transactions(transactions: &[Transaction]) -> Root {
        assert!(
            !transactions.is_empty(),
            "valid blocks have at least one transaction"
        );

        let mut level: Vec<[u8; 32]> = transactions.iter().map(|tx| tx.hash().0).collect();

        while level.len() > 1 {
            if level.len() % 2 != 0 {
                let last = *level.last().expect("level is non-empty");
                level.push(last);
            }
            level = level
                .chunks(2)
                .map(|pair| hash_pair(&pair[0], &pair[1]))
                .collect();
        }

        Root(level[0])
    }
}
