//! Proof-of-work target computation and checks.
//!
//! Three retargeting regimes, selected by the previous block's height:
//! Dark Gravity Wave v3 above the DGW fork, a Bitcoin-style three-block
//! retarget between the two fork heights, and the fixed proof-of-work
//! limit for the genesis era.

use tracing::trace;

use bzx_chain::block;
use bzx_chain::parameters::Parameters;
use bzx_chain::work::difficulty::{CompactDifficulty, ExpandedDifficulty, U256};
use bzx_state::{BlockId, Chain};

use crate::error::BlockError;

/// The number of past blocks Dark Gravity Wave averages over.
const DGW_PAST_BLOCKS: u64 = 24;

/// Compute the required difficulty threshold for the block following
/// `prev`.
pub fn next_required_difficulty(
    chain: &Chain,
    prev: BlockId,
    params: &Parameters,
) -> CompactDifficulty {
    let prev_height = chain.block(prev).height;

    if prev_height > params.hf_fork_dgw {
        dark_gravity_wave3(chain, prev, params)
    } else if prev_height > params.hf_fork_end {
        retarget_legacy(chain, prev, params)
    } else {
        params.pow_limit.to_compact()
    }
}

/// Dark Gravity Wave v3: walk back up to 24 ancestors, averaging their
/// decoded targets and summing their time deltas, then scale the average
/// by the clamped actual timespan.
///
/// With fewer than 24 ancestors available, the walk uses what exists. The
/// walk stops before the genesis block, so this is only well-defined when
/// `prev` is above genesis; the fork heights guarantee that.
fn dark_gravity_wave3(chain: &Chain, prev: BlockId, params: &Parameters) -> CompactDifficulty {
    let pow_limit: U256 = params.pow_limit.into();

    let mut count: u64 = 0;
    let mut average = U256::zero();
    let mut actual_timespan: i64 = 0;
    let mut last_block_time: i64 = 0;

    let mut reading = Some(prev);
    for _ in 0..DGW_PAST_BLOCKS {
        let id = match reading {
            Some(id) if chain.block(id).height.0 > 0 => id,
            _ => break,
        };
        let index = chain.block(id);
        count += 1;

        // Running average of the decoded targets. The weighting matches the
        // original algorithm: avg_i = (avg_{i-1} * i + target_i) / (i + 1).
        let target: U256 = index
            .difficulty_threshold
            .to_expanded()
            .expect("chain difficulty thresholds are valid")
            .into();
        average = if count == 1 {
            target
        } else {
            average
                .checked_mul(U256::from(count))
                .and_then(|sum| sum.checked_add(target))
                .map(|sum| sum / U256::from(count + 1))
                .unwrap_or(pow_limit)
        };

        // From the second visited block on, accumulate the time delta to the
        // previously visited (younger) block.
        let block_time = index.time.timestamp();
        if last_block_time > 0 {
            actual_timespan += last_block_time - block_time;
        }
        last_block_time = block_time;

        reading = index.prev;
    }

    debug_assert!(count > 0, "retargeting requires a non-genesis ancestor");

    let target_timespan = count as i64 * params.pow_target_spacing;

    // Clamp the adjustment to [target / 1.5, target * 1.5], computed in
    // integer arithmetic.
    let min_timespan = target_timespan * 2 / 3;
    let max_timespan = target_timespan * 3 / 2;
    let actual_timespan = actual_timespan.clamp(min_timespan, max_timespan);

    trace!(
        count,
        actual_timespan,
        target_timespan,
        "dark gravity wave inputs"
    );

    // new_target = average * actual / target, saturating at the limit.
    let mut new_target = average
        .checked_mul(U256::from(actual_timespan as u64))
        .map(|scaled| scaled / U256::from(target_timespan as u64))
        .unwrap_or(pow_limit);
    if new_target > pow_limit {
        new_target = pow_limit;
    }

    ExpandedDifficulty::from(new_target.max(U256::one())).to_compact()
}

/// The legacy Bitcoin-style retarget over the last three blocks: the
/// actual timespan back to the second ancestor, clamped to
/// [timespan / 1.25, timespan * 1.25], scales the previous target.
fn retarget_legacy(chain: &Chain, prev: BlockId, params: &Parameters) -> CompactDifficulty {
    let prev_index = chain.block(prev);

    // go back two ancestors
    let first_height = prev_index
        .height
        .0
        .checked_sub(2)
        .expect("legacy retargeting starts above height 2");
    let first = chain
        .at_height(block::Height(first_height))
        .expect("ancestors of chain blocks exist");
    let first_block_time = chain.block(first).time.timestamp();

    let target_timespan = params.pow_target_timespan;
    let min_timespan = target_timespan * 4 / 5;
    let max_timespan = target_timespan * 5 / 4;
    let actual_timespan =
        (prev_index.time.timestamp() - first_block_time).clamp(min_timespan, max_timespan);

    let pow_limit: U256 = params.pow_limit.into();
    let previous_target: U256 = prev_index
        .difficulty_threshold
        .to_expanded()
        .expect("chain difficulty thresholds are valid")
        .into();

    let mut new_target = previous_target
        .checked_mul(U256::from(actual_timespan as u64))
        .map(|scaled| scaled / U256::from(target_timespan as u64))
        .unwrap_or(pow_limit);
    if new_target > pow_limit {
        new_target = pow_limit;
    }

    ExpandedDifficulty::from(new_target.max(U256::one())).to_compact()
}

/// Check that `hash` satisfies the claimed difficulty threshold.
///
/// Rejects thresholds that are negative, zero, overflowing, or easier
/// than the proof-of-work limit, then requires `hash <= threshold`.
pub fn check_proof_of_work(
    hash: &block::Hash,
    difficulty_threshold: CompactDifficulty,
    params: &Parameters,
) -> Result<(), BlockError> {
    let target = difficulty_threshold
        .to_expanded()
        .ok_or(BlockError::InvalidDifficulty)?;

    if target > params.pow_limit {
        return Err(BlockError::TargetDifficultyLimit);
    }

    if *hash > target {
        return Err(BlockError::DifficultyFilter);
    }

    Ok(())
}
