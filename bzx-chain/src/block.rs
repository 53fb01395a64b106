//! Blocks and block-related structures.

use std::collections::{BTreeMap, HashSet};

use crate::serialization::BzxSerialize;
use crate::transaction::{self, Transaction};
use crate::zerocoin::{BigNum, Denomination};

mod genesis;
mod hash;
mod header;
mod height;
pub mod merkle;

pub use genesis::genesis_block;
pub use hash::Hash;
pub use header::Header;
pub use height::Height;

/// A BitcoinZero block, containing a header and a list of transactions.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    /// The block header, containing block metadata.
    pub header: Header,
    /// The block transactions.
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Compute the hash of this block's header.
    pub fn hash(&self) -> Hash {
        Hash::from(&self.header)
    }
}

/// The zerocoin effects of a single block, accumulated while its
/// transactions are validated and projected into the chain state when the
/// block is connected.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ZerocoinTxInfo {
    /// Mints in validation order, as `(denomination, public coin)` pairs.
    pub mints: Vec<(Denomination, BigNum)>,
    /// Serial numbers consumed by spends in this block, with the spend's
    /// denomination.
    pub spent_serials: BTreeMap<BigNum, Denomination>,
    /// Hashes of the transactions that contributed mints or spends.
    pub zc_transactions: HashSet<transaction::Hash>,
    /// True when the block contains at least one version 1 spend.
    pub has_spend_v1: bool,
    complete: bool,
}

impl ZerocoinTxInfo {
    /// Seal this info, fixing the final mint order.
    ///
    /// Mints are sorted lexicographically by the serialized value of the
    /// public coin; the accumulator values recorded on the chain depend on
    /// this order. Denomination doesn't matter, but we sort by it as well.
    pub fn complete(&mut self) {
        self.mints.sort_by(|(d1, c1), (d2, c2)| {
            d1.cmp(d2)
                .then_with(|| c1.bzx_serialize_to_vec().cmp(&c2.bzx_serialize_to_vec()))
        });
        self.complete = true;
    }

    /// Returns true once [`complete`](Self::complete) has been called.
    pub fn is_complete(&self) -> bool {
        self.complete
    }
}
