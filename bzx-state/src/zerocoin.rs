//! The zerocoin state engine.
//!
//! [`ZerocoinState`] indexes, per (denomination, group id), the set of
//! minted public coins and their accumulator evolution, plus the global
//! set of spent serials and the serials reserved by mempool transactions.
//! It supports atomic block connect/disconnect, witness generation for
//! spend proofs, and lazy migration between the two trusted parameter
//! sets.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::{debug, instrument, warn};

use bzx_chain::block::{self, Height};
use bzx_chain::parameters::Parameters;
use bzx_chain::transaction;
use bzx_chain::zerocoin::{
    Accumulator, AccumulatorWitness, BigNum, Denomination, ParamSet, PublicCoin,
};

use crate::chain::{AccumulatorChange, BlockId, Chain, GroupKey};

/// One accumulator group's span of the chain: the endpoints of the blocks
/// that minted into it, and its coin count.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CoinGroupInfo {
    /// The first block that minted into this group.
    pub first_block: BlockId,
    /// The last block that minted into this group.
    pub last_block: BlockId,
    /// The number of coins minted into this group.
    pub coins: u32,
}

/// Where one public coin was minted.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct MintedCoinInfo {
    /// The coin's denomination.
    pub denomination: Denomination,
    /// The group the coin was minted into.
    pub id: u32,
    /// The height of the minting block.
    pub height: Height,
}

/// The in-memory zerocoin index.
///
/// All methods assume the caller holds the chain lock; there are no
/// internal locks, and no method blocks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ZerocoinState {
    /// Group endpoints and counts, per (denomination, id).
    coin_groups: HashMap<GroupKey, CoinGroupInfo>,
    /// Every minted public coin and where it was minted. A multimap:
    /// the same public coin value can legally be minted more than once.
    minted_pub_coins: HashMap<BigNum, Vec<MintedCoinInfo>>,
    /// Serials consumed by spends on the connected chain.
    used_coin_serials: HashSet<BigNum>,
    /// The highest allocated group id per denomination.
    latest_coin_ids: HashMap<Denomination, u32>,
    /// Serials reserved by mempool transactions, with the reserving
    /// transaction's hash.
    mempool_coin_serials: HashMap<BigNum, transaction::Hash>,
}

impl ZerocoinState {
    /// Create an empty state.
    pub fn new() -> Self {
        ZerocoinState::default()
    }

    /// The highest allocated group id for `denomination`, or zero.
    pub fn latest_coin_id(&self, denomination: Denomination) -> u32 {
        self.latest_coin_ids
            .get(&denomination)
            .copied()
            .unwrap_or(0)
    }

    /// Record a mint into the current group of `denomination`, allocating
    /// a new group when the current one is full.
    ///
    /// Mints added in the same block always share the block's group even
    /// past the capacity limit, because a group's accumulator lineage must
    /// not fork inside a block.
    ///
    /// Returns the group id the coin landed in, and the group's
    /// accumulator value before this mint (`None` for the first coin of a
    /// group).
    pub fn add_mint(
        &mut self,
        chain: &Chain,
        block: BlockId,
        denomination: Denomination,
        pub_coin: &BigNum,
        params: &Parameters,
    ) -> (u32, Option<BigNum>) {
        let mut mint_id = self.latest_coin_id(denomination).max(1);
        self.latest_coin_ids.insert(denomination, mint_id);

        let coins_per_id = params.coins_per_group(denomination, mint_id);
        let mut previous_acc = None;

        match self.coin_groups.get_mut(&(denomination, mint_id)) {
            Some(group) if group.coins < coins_per_id || group.last_block == block => {
                previous_acc = chain
                    .block(group.last_block)
                    .accumulator_changes
                    .get(&(denomination, mint_id))
                    .map(|change| change.value.clone());
                group.last_block = block;
                group.coins += 1;
            }
            Some(_full_group) => {
                mint_id += 1;
                self.latest_coin_ids.insert(denomination, mint_id);
                self.coin_groups.insert(
                    (denomination, mint_id),
                    CoinGroupInfo {
                        first_block: block,
                        last_block: block,
                        coins: 1,
                    },
                );
            }
            None => {
                self.coin_groups.insert(
                    (denomination, mint_id),
                    CoinGroupInfo {
                        first_block: block,
                        last_block: block,
                        coins: 1,
                    },
                );
            }
        }

        self.minted_pub_coins
            .entry(pub_coin.clone())
            .or_default()
            .push(MintedCoinInfo {
                denomination,
                id: mint_id,
                height: chain.block(block).height,
            });

        (mint_id, previous_acc)
    }

    /// Record a serial as consumed by a connected spend.
    pub fn add_spend(&mut self, serial: BigNum) {
        self.used_coin_serials.insert(serial);
    }

    /// Has this serial been consumed by a connected spend?
    pub fn is_used(&self, serial: &BigNum) -> bool {
        self.used_coin_serials.contains(serial)
    }

    /// Has this public coin been minted on the connected chain?
    pub fn has_coin(&self, pub_coin: &BigNum) -> bool {
        self.minted_pub_coins.contains_key(pub_coin)
    }

    /// Look up one group's endpoints and count.
    pub fn get_coin_group_info(
        &self,
        denomination: Denomination,
        id: u32,
    ) -> Option<CoinGroupInfo> {
        self.coin_groups.get(&(denomination, id)).copied()
    }

    /// The mint height and group id of `pub_coin` for `denomination`, if
    /// it was minted.
    pub fn minted_coin_height_and_id(
        &self,
        pub_coin: &BigNum,
        denomination: Denomination,
    ) -> Option<(Height, u32)> {
        self.minted_pub_coins
            .get(pub_coin)?
            .iter()
            .find(|info| info.denomination == denomination)
            .map(|info| (info.height, info.id))
    }

    /// Idempotent projection of a block's own zerocoin maps into the
    /// state, used when rebuilding from a persisted index.
    pub fn add_block(&mut self, chain: &Chain, block: BlockId, params: &Parameters) {
        let index = chain.block(block);

        for (key, change) in &index.accumulator_changes {
            let group = self.coin_groups.entry(*key).or_insert(CoinGroupInfo {
                first_block: block,
                last_block: block,
                coins: 0,
            });
            group.last_block = block;
            group.coins += change.count;
        }

        for (key, coins) in &index.minted_pub_coins {
            self.latest_coin_ids.insert(key.0, key.1);
            for coin in coins {
                self.minted_pub_coins
                    .entry(coin.clone())
                    .or_default()
                    .push(MintedCoinInfo {
                        denomination: key.0,
                        id: key.1,
                        height: index.height,
                    });
            }
        }

        if index.height > params.check_bug_fixed_at_block {
            for serial in &index.spent_serials {
                self.used_coin_serials.insert(serial.clone());
            }
        }
    }

    /// Remove a disconnected block's zerocoin effects, in precise reverse
    /// order of [`add_block`](Self::add_block).
    ///
    /// # Panics
    ///
    /// If the block was not the most recent contributor to its groups;
    /// disconnection must happen in LIFO order.
    pub fn remove_block(&mut self, chain: &Chain, block: BlockId) {
        let index = chain.block(block);

        // roll back accumulator updates
        for (key, change) in &index.accumulator_changes {
            let group = self
                .coin_groups
                .get_mut(key)
                .expect("disconnected blocks only reference live groups");
            assert!(
                group.coins >= change.count,
                "group must contain the coins being disconnected"
            );
            group.coins -= change.count;

            if group.coins == 0 {
                // all the coins of this group have been erased, remove the
                // group altogether and free its id
                self.coin_groups.remove(key);
                let latest = self
                    .latest_coin_ids
                    .get_mut(&key.0)
                    .expect("denominations with groups have a latest id");
                *latest -= 1;
                if *latest == 0 {
                    self.latest_coin_ids.remove(&key.0);
                }
            } else {
                // roll back the group endpoint to the previous contributing
                // block
                let group_first = group.first_block;
                let mut last = group.last_block;
                loop {
                    assert_ne!(
                        last, group_first,
                        "non-empty groups have an earlier contributing block"
                    );
                    last = chain
                        .block(last)
                        .prev
                        .expect("blocks above the group start have predecessors");
                    if chain.block(last).accumulator_changes.contains_key(key) {
                        break;
                    }
                }
                group.last_block = last;
            }
        }

        // roll back mints
        for (key, coins) in &index.minted_pub_coins {
            for coin in coins {
                let records = self
                    .minted_pub_coins
                    .get_mut(coin)
                    .expect("disconnected mints have records");
                let position = records
                    .iter()
                    .position(|info| info.denomination == key.0 && info.id == key.1)
                    .expect("disconnected mints have a matching record");
                records.remove(position);
                if records.is_empty() {
                    self.minted_pub_coins.remove(coin);
                }
            }
        }

        // roll back spends
        for serial in &index.spent_serials {
            self.used_coin_serials.remove(serial);
        }
    }

    /// The accumulator state a spend of `(denomination, id)` should verify
    /// against, at or below `max_height`: the latest recorded value, the
    /// hash of the block that recorded it, and the total coins covered.
    ///
    /// When the requested modulus differs from the group's native modulus,
    /// the alternative accumulator values are materialized first and read
    /// instead.
    pub fn get_accumulator_value_for_spend(
        &self,
        chain: &mut Chain,
        max_height: Height,
        denomination: Denomination,
        id: u32,
        use_modulus_v2: bool,
        params: &Parameters,
    ) -> Option<(BigNum, block::Hash, u32)> {
        let key = (denomination, id);
        let native_v2 = params.is_zerocoin_v2(denomination, id);
        let alternative = native_v2 != use_modulus_v2;
        if alternative {
            self.calculate_alternative_accumulators(chain, denomination, id, params);
        }

        let group = *self.coin_groups.get(&key)?;

        let mut value_and_hash = None;
        let mut coins = 0;
        let mut block = group.last_block;
        loop {
            let index = chain.block(block);
            let changes = if alternative {
                &index.alternative_accumulator_changes
            } else {
                &index.accumulator_changes
            };
            if let Some(change) = changes.get(&key) {
                if index.height <= max_height {
                    if coins == 0 {
                        // latest block satisfying the height bound: remember
                        // its accumulator value and hash
                        value_and_hash = Some((change.value.clone(), index.hash));
                    }
                    coins += change.count;
                }
            }

            if block == group.first_block {
                break;
            }
            block = index.prev.expect("group blocks have predecessors");
        }

        value_and_hash.map(|(value, hash)| (value, hash, coins))
    }

    /// Build the membership witness for spending `pub_coin` from
    /// `(denomination, id)`, covering mints up to `max_height`.
    ///
    /// The witness accumulator is seeded with the accumulator value of the
    /// most recent block before the coin's mint block, then every other
    /// coin in the group is added.
    ///
    /// # Panics
    ///
    /// If the group does not exist or does not contain `pub_coin`.
    pub fn get_witness_for_spend(
        &self,
        chain: &mut Chain,
        max_height: Height,
        denomination: Denomination,
        id: u32,
        pub_coin: &BigNum,
        use_modulus_v2: bool,
        params: &Parameters,
    ) -> AccumulatorWitness {
        let key = (denomination, id);
        let set = if use_modulus_v2 {
            ParamSet::V2
        } else {
            ParamSet::V1
        };
        let native_v2 = params.is_zerocoin_v2(denomination, id);
        let alternative = native_v2 != use_modulus_v2;
        if alternative {
            self.calculate_alternative_accumulators(chain, denomination, id, params);
        }

        let group = self
            .get_coin_group_info(denomination, id)
            .expect("witnesses are only requested for existing groups");
        let (mint_height, coin_id) = self
            .minted_coin_height_and_id(pub_coin, denomination)
            .expect("witnesses are only requested for minted coins");
        assert_eq!(coin_id, id, "coin must belong to the requested group");

        let mint_block = chain
            .at_height(mint_height)
            .expect("minted coins reference chain blocks");

        // Find the accumulator value preceding the mint
        let mut accumulator = Accumulator::empty(set, denomination);
        if mint_block != group.first_block {
            let mut block = mint_block;
            loop {
                block = chain
                    .block(block)
                    .prev
                    .expect("blocks above the group start have predecessors");
                let index = chain.block(block);
                let changes = if alternative {
                    &index.alternative_accumulator_changes
                } else {
                    &index.accumulator_changes
                };
                if let Some(change) = changes.get(&key) {
                    accumulator = Accumulator::from_value(set, denomination, change.value.clone());
                    break;
                }
            }
        }

        // Now add to the accumulator every coin minted since that moment,
        // except pub_coin itself
        let mut block = group.last_block;
        loop {
            let index = chain.block(block);
            if index.height <= max_height {
                if let Some(coins) = index.minted_pub_coins.get(&key) {
                    for coin in coins {
                        if block != mint_block || coin != pub_coin {
                            accumulator += &PublicCoin::new(coin.clone(), denomination);
                        }
                    }
                }
            }
            if block == mint_block {
                break;
            }
            block = index.prev.expect("group blocks have predecessors");
        }

        AccumulatorWitness::new(accumulator, PublicCoin::new(pub_coin.clone(), denomination))
    }

    /// Lazily recompute one group's accumulator lineage under the opposite
    /// parameter set, caching the per-block values in
    /// `alternative_accumulator_changes`.
    ///
    /// Does nothing when the group is unknown.
    pub fn calculate_alternative_accumulators(
        &self,
        chain: &mut Chain,
        denomination: Denomination,
        id: u32,
        params: &Parameters,
    ) {
        let key = (denomination, id);
        let alt_set = if params.is_zerocoin_v2(denomination, id) {
            ParamSet::V1
        } else {
            ParamSet::V2
        };

        let group = match self.coin_groups.get(&key) {
            Some(group) => *group,
            None => return,
        };

        let mut accumulator = Accumulator::empty(alt_set, denomination);
        let mut block = group.first_block;
        loop {
            let next_height = chain.block(block).height + 1;
            let index = chain.block_mut(block);
            if index.accumulator_changes.contains_key(&key) {
                if let Some(change) = index.alternative_accumulator_changes.get(&key) {
                    // already calculated, pick up the cached value
                    accumulator =
                        Accumulator::from_value(alt_set, denomination, change.value.clone());
                } else {
                    // re-create the accumulator change with the alternative
                    // parameter set
                    let minted = index
                        .minted_pub_coins
                        .get(&key)
                        .cloned()
                        .expect("blocks with accumulator changes carry mints");
                    for coin in &minted {
                        accumulator += &PublicCoin::new(coin.clone(), denomination);
                    }
                    index.alternative_accumulator_changes.insert(
                        key,
                        AccumulatorChange {
                            value: accumulator.value().clone(),
                            count: minted.len() as u32,
                        },
                    );
                }
            }

            if block == group.last_block {
                break;
            }
            block = chain
                .at_height(next_height)
                .expect("groups end at or before the tip");
        }
    }

    /// Replay every natively-v2 group's accumulator lineage and repair the
    /// recorded values when the first block's value does not match.
    ///
    /// Returns the set of mutated blocks so the caller can re-persist
    /// them. Used to fix historic index corruption after an upgrade.
    #[instrument(skip(self, chain, params))]
    pub fn recalculate_accumulators(
        &self,
        chain: &mut Chain,
        params: &Parameters,
    ) -> BTreeSet<BlockId> {
        let mut changed = BTreeSet::new();

        for (key, group) in &self.coin_groups {
            let (denomination, id) = *key;
            // only modulus v2 groups were affected
            if !params.is_zerocoin_v2(denomination, id) {
                continue;
            }

            let mut accumulator = Accumulator::empty(ParamSet::V2, denomination);
            let mut block = group.first_block;
            loop {
                let next_height = chain.block(block).height + 1;
                let index = chain.block_mut(block);
                if index.accumulator_changes.contains_key(key) {
                    let minted = index.minted_pub_coins.get(key).cloned().unwrap_or_default();
                    for coin in &minted {
                        accumulator += &PublicCoin::new(coin.clone(), denomination);
                    }

                    // the first block decides whether the rest of the group
                    // needs rewriting
                    if block == group.first_block {
                        let stored = &index.accumulator_changes[key];
                        if stored.value == *accumulator.value() {
                            break;
                        }
                        warn!(?denomination, id, "accumulator recalculation required");
                    }

                    index.accumulator_changes.insert(
                        *key,
                        AccumulatorChange {
                            value: accumulator.value().clone(),
                            count: minted.len() as u32,
                        },
                    );
                    changed.insert(block);
                }

                if block == group.last_block {
                    break;
                }
                block = chain
                    .at_height(next_height)
                    .expect("groups end at or before the tip");
            }
        }

        changed
    }

    /// Reserve a serial for a mempool transaction.
    ///
    /// Fails when the serial was already spent on-chain or is reserved by
    /// another mempool transaction.
    pub fn add_spend_to_mempool(&mut self, serial: &BigNum, tx_hash: transaction::Hash) -> bool {
        if !self.can_add_spend_to_mempool(serial) {
            return false;
        }
        self.mempool_coin_serials.insert(serial.clone(), tx_hash);
        true
    }

    /// Would [`add_spend_to_mempool`](Self::add_spend_to_mempool) succeed?
    pub fn can_add_spend_to_mempool(&self, serial: &BigNum) -> bool {
        !self.is_used(serial) && !self.mempool_coin_serials.contains_key(serial)
    }

    /// Release a mempool serial reservation.
    pub fn remove_spend_from_mempool(&mut self, serial: &BigNum) {
        self.mempool_coin_serials.remove(serial);
    }

    /// The hash of the mempool transaction holding `serial`, if any.
    pub fn mempool_conflicting_tx(&self, serial: &BigNum) -> Option<transaction::Hash> {
        self.mempool_coin_serials.get(serial).copied()
    }

    /// Wipe all state.
    pub fn reset(&mut self) {
        self.coin_groups.clear();
        self.used_coin_serials.clear();
        self.minted_pub_coins.clear();
        self.latest_coin_ids.clear();
        self.mempool_coin_serials.clear();
    }

    /// Rebuild the state by replaying the whole chain, then repair any
    /// corrupted v2 accumulator values.
    ///
    /// Returns the blocks mutated by the repair pass.
    #[instrument(skip(self, chain, params))]
    pub fn rebuild_from_chain(
        &mut self,
        chain: &mut Chain,
        params: &Parameters,
    ) -> BTreeSet<BlockId> {
        self.reset();
        for block in chain.ids() {
            self.add_block(chain, block, params);
        }
        let changed = self.recalculate_accumulators(chain, params);
        for denomination in Denomination::ALL {
            debug!(
                ?denomination,
                latest_id = self.latest_coin_id(denomination),
                "rebuilt zerocoin state"
            );
        }
        changed
    }

    /// Audit every group's recorded accumulator lineage against its mint
    /// lists. Returns false on the first inconsistency.
    pub fn verify_integrity(&self, chain: &Chain, params: &Parameters) -> bool {
        for (key, group) in &self.coin_groups {
            let (denomination, id) = *key;
            let set = if params.is_zerocoin_v2(denomination, id) {
                ParamSet::V2
            } else {
                ParamSet::V1
            };

            let mut accumulator = Accumulator::empty(set, denomination);
            let mut block = group.first_block;
            loop {
                let index = chain.block(block);
                if let Some(change) = index.accumulator_changes.get(key) {
                    let minted = match index.minted_pub_coins.get(key) {
                        Some(minted) => minted,
                        None => {
                            warn!(?denomination, id, height = ?index.height, "no minted coins");
                            return false;
                        }
                    };
                    for coin in minted {
                        accumulator += &PublicCoin::new(coin.clone(), denomination);
                    }
                    if *accumulator.value() != change.value {
                        warn!(?denomination, id, height = ?index.height, "accumulator value mismatch");
                        return false;
                    }
                    if change.count as usize != minted.len() {
                        warn!(?denomination, id, height = ?index.height, "minted coin count mismatch");
                        return false;
                    }
                }

                if block == group.last_block {
                    break;
                }
                block = chain
                    .at_height(index.height + 1)
                    .expect("groups end at or before the tip");
            }
        }

        true
    }
}
