//! Applying and reverting a block's zerocoin effects.

use tracing::{debug, instrument, warn};

use bzx_chain::block::ZerocoinTxInfo;
use bzx_chain::parameters::Parameters;
use bzx_chain::zerocoin::{Accumulator, ParamSet, PublicCoin};

use crate::chain::{AccumulatorChange, BlockId, Chain};
use crate::check::{check_spend_serial, CheckHeight};
use crate::error::ValidateContextError;
use crate::zerocoin::ZerocoinState;

/// Connect a block's zerocoin effects to the chain state.
///
/// When the block carries a completed [`ZerocoinTxInfo`], its spends are
/// re-checked for duplicate serials and its mints are folded into the
/// accumulator lineages, mutating the block's index maps in place. With
/// `just_check` set, only the serial checks run and nothing is mutated.
///
/// When no info is present (replaying a persisted index), the block's own
/// maps are projected into the state instead.
#[instrument(skip(state, chain, info, params), fields(height = ?chain.block(block).height))]
pub fn connect_block_zc(
    state: &mut ZerocoinState,
    chain: &mut Chain,
    block: BlockId,
    info: Option<&ZerocoinTxInfo>,
    just_check: bool,
    params: &Parameters,
) -> Result<(), ValidateContextError> {
    let height = chain.block(block).height;

    let info = match info {
        Some(info) => info,
        None => {
            if !just_check {
                state.add_block(chain, block, params);
            }
            return Ok(());
        }
    };

    if info.has_spend_v1 {
        // don't allow v1 spends after the grace period
        let cutoff = params.spend_v15_start_block + params.spend_v15_graceful_period;
        if height >= cutoff {
            warn!(?height, ?cutoff, "spend v1 is no longer allowed");
            return Err(ValidateContextError::SpendV1GracePeriodExpired { height });
        }
    }

    if !just_check {
        chain.block_mut(block).spent_serials.clear();
    }

    if height > params.check_bug_fixed_at_block {
        for (serial, denomination) in &info.spent_serials {
            check_spend_serial(
                state,
                Some(info),
                *denomination,
                serial,
                CheckHeight::Block(height),
                true,
                params,
            )?;

            if !just_check {
                chain.block_mut(block).spent_serials.insert(serial.clone());
                state.add_spend(serial.clone());
            }
        }
    }

    if just_check {
        return Ok(());
    }

    // Update minted values and accumulators
    for (denomination, pub_coin) in &info.mints {
        let (mint_id, previous_acc) =
            state.add_mint(chain, block, *denomination, pub_coin, params);

        let set = if params.is_zerocoin_v2(*denomination, mint_id) {
            ParamSet::V2
        } else {
            ParamSet::V1
        };

        let mut accumulator = match previous_acc {
            Some(value) => Accumulator::from_value(set, *denomination, value),
            None => Accumulator::empty(set, *denomination),
        };
        accumulator += &PublicCoin::new(pub_coin.clone(), *denomination);

        debug!(denomination = ?denomination, id = mint_id, "mint added");

        let key = (*denomination, mint_id);
        let index = chain.block_mut(block);
        index
            .minted_pub_coins
            .entry(key)
            .or_default()
            .push(pub_coin.clone());

        index
            .accumulator_changes
            .entry(key)
            .and_modify(|change| {
                change.value = accumulator.value().clone();
                change.count += 1;
            })
            .or_insert_with(|| AccumulatorChange {
                value: accumulator.value().clone(),
                count: 1,
            });

        // invalidate any alternative accumulator value for this group
        index.alternative_accumulator_changes.remove(&key);
    }

    Ok(())
}

/// Revert a block's zerocoin effects from the chain state.
///
/// Blocks must be disconnected in LIFO order.
#[instrument(skip(state, chain), fields(height = ?chain.block(block).height))]
pub fn disconnect_block_zc(state: &mut ZerocoinState, chain: &Chain, block: BlockId) {
    state.remove_block(chain, block);
}
