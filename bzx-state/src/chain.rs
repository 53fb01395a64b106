//! The block index arena.
//!
//! Block index nodes form a backward-linked chain. The arena owns every
//! node and hands out stable indices; `prev` is a back-index, never
//! ownership, so the zerocoin state can hold non-owning references into
//! the chain without cycles.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bzx_chain::block::{self, Height};
use bzx_chain::work::difficulty::CompactDifficulty;
use bzx_chain::zerocoin::{BigNum, Denomination};

/// A stable index of a block in the [`Chain`] arena.
///
/// For a linear chain the index equals the block height.
pub type BlockId = usize;

/// The key identifying one accumulator group: a denomination and a
/// monotonically increasing group id.
pub type GroupKey = (Denomination, u32);

/// The accumulator evolution recorded by one block for one group: the
/// value after the block's mints, and how many mints the block added.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AccumulatorChange {
    /// The accumulator value after this block's mints were added.
    pub value: BigNum,
    /// The number of coins this block added to the group.
    pub count: u32,
}

/// One node of the block index.
///
/// The zerocoin maps are written by block connection and read everywhere
/// else; external storage persists them alongside the header fields so
/// that replaying [`ZerocoinState::add_block`](crate::ZerocoinState::add_block)
/// over a deserialized chain reproduces the online state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockIndex {
    /// The height of this block in the chain.
    pub height: Height,
    /// The hash of this block's header.
    pub hash: block::Hash,
    /// The block time from the header.
    pub time: DateTime<Utc>,
    /// The difficulty threshold from the header.
    pub difficulty_threshold: CompactDifficulty,
    /// The arena index of the previous block, if any.
    pub prev: Option<BlockId>,

    /// The public coins this block minted, in mint order, per group.
    #[serde(with = "crate::serde_helpers::group_map")]
    pub minted_pub_coins: BTreeMap<GroupKey, Vec<BigNum>>,
    /// The accumulator changes under each group's native modulus.
    #[serde(with = "crate::serde_helpers::group_map")]
    pub accumulator_changes: BTreeMap<GroupKey, AccumulatorChange>,
    /// Lazily materialized accumulator changes under the opposite modulus.
    #[serde(with = "crate::serde_helpers::group_map")]
    pub alternative_accumulator_changes: BTreeMap<GroupKey, AccumulatorChange>,
    /// The serials consumed by this block's spends.
    pub spent_serials: BTreeSet<BigNum>,
}

impl BlockIndex {
    /// Create an index node with empty zerocoin maps.
    pub fn new(
        height: Height,
        hash: block::Hash,
        time: DateTime<Utc>,
        difficulty_threshold: CompactDifficulty,
        prev: Option<BlockId>,
    ) -> Self {
        BlockIndex {
            height,
            hash,
            time,
            difficulty_threshold,
            prev,
            minted_pub_coins: BTreeMap::new(),
            accumulator_changes: BTreeMap::new(),
            alternative_accumulator_changes: BTreeMap::new(),
            spent_serials: BTreeSet::new(),
        }
    }
}

/// The arena owning the active chain's block index nodes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    blocks: Vec<BlockIndex>,
}

impl Chain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Chain::default()
    }

    /// Append a new tip with the given header fields and empty zerocoin
    /// maps, returning its arena index.
    pub fn push(
        &mut self,
        hash: block::Hash,
        time: DateTime<Utc>,
        difficulty_threshold: CompactDifficulty,
    ) -> BlockId {
        let id = self.blocks.len();
        let prev = id.checked_sub(1);
        self.blocks.push(BlockIndex::new(
            Height(id as u32),
            hash,
            time,
            difficulty_threshold,
            prev,
        ));
        id
    }

    /// Append a deserialized index node as the new tip.
    ///
    /// # Panics
    ///
    /// If the node's height or back-reference don't continue this chain.
    pub fn push_index(&mut self, index: BlockIndex) -> BlockId {
        let id = self.blocks.len();
        assert_eq!(index.height, Height(id as u32), "index must extend the tip");
        assert_eq!(index.prev, id.checked_sub(1), "index must point at the tip");
        self.blocks.push(index);
        id
    }

    /// Remove and return the tip node.
    ///
    /// # Panics
    ///
    /// If the chain is empty.
    pub fn pop_tip(&mut self) -> BlockIndex {
        self.blocks.pop().expect("only called while blocks is populated")
    }

    /// The arena index of the tip, if the chain is non-empty.
    pub fn tip(&self) -> Option<BlockId> {
        self.blocks.len().checked_sub(1)
    }

    /// The height of the tip, if the chain is non-empty.
    pub fn tip_height(&self) -> Option<Height> {
        self.tip().map(|id| self.blocks[id].height)
    }

    /// Borrow the node at `id`.
    ///
    /// # Panics
    ///
    /// If `id` is not in the arena.
    pub fn block(&self, id: BlockId) -> &BlockIndex {
        &self.blocks[id]
    }

    /// Mutably borrow the node at `id`.
    ///
    /// # Panics
    ///
    /// If `id` is not in the arena.
    pub fn block_mut(&mut self, id: BlockId) -> &mut BlockIndex {
        &mut self.blocks[id]
    }

    /// The arena index of the block at `height`, if present.
    pub fn at_height(&self, height: Height) -> Option<BlockId> {
        let id = height.0 as usize;
        (id < self.blocks.len()).then_some(id)
    }

    /// The number of blocks in the chain.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns true if the chain has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate the arena indices in height order.
    pub fn ids(&self) -> impl Iterator<Item = BlockId> {
        0..self.blocks.len()
    }
}
