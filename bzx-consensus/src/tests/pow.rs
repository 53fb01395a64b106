//! Retargeting and proof-of-work tests.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use bzx_chain::block;
use bzx_chain::parameters::Parameters;
use bzx_chain::work::difficulty::{CompactDifficulty, ExpandedDifficulty, U256};
use bzx_state::Chain;

use crate::error::BlockError;
use crate::pow::{check_proof_of_work, next_required_difficulty};

use super::{block_hash, init};

/// Build a chain of `intervals.len() + 1` blocks: genesis at a fixed base
/// time, then one block per interval, all carrying `bits`.
fn chain_with_intervals(bits: u32, intervals: &[i64]) -> Chain {
    let mut chain = Chain::new();
    let base = 1_485_785_935i64;
    let mut time = base;
    chain.push(
        block_hash(0),
        Utc.timestamp_opt(time, 0).single().unwrap(),
        CompactDifficulty(bits),
    );
    for (i, interval) in intervals.iter().enumerate() {
        time += interval;
        chain.push(
            block_hash(i + 1),
            Utc.timestamp_opt(time, 0).single().unwrap(),
            CompactDifficulty(bits),
        );
    }
    chain
}

fn expanded(bits: u32) -> U256 {
    CompactDifficulty(bits)
        .to_expanded()
        .expect("test bits are valid")
        .into()
}

fn encode(value: U256) -> CompactDifficulty {
    ExpandedDifficulty::from(value).to_compact()
}

#[test]
fn genesis_era_uses_the_pow_limit() {
    init();
    let params = Parameters::regtest();
    // ten 150-second blocks: heights 1..=10 are all at or below the fork
    let chain = chain_with_intervals(0x1e0f_ffff, &[150; 10]);

    for prev in 1..=10 {
        assert_eq!(
            next_required_difficulty(&chain, prev, &params),
            params.pow_limit.to_compact(),
        );
    }
}

#[test]
fn legacy_regime_retargets_from_three_blocks() {
    init();
    let params = Parameters::regtest();
    let bits = 0x1e0f_ffff;

    // perfectly spaced blocks: the two-block actual timespan doubles the
    // 150-second target and clamps at target * 5/4
    let chain = chain_with_intervals(bits, &[150; 15]);
    let expected = encode(expanded(bits) * 187u64 / 150u64);
    assert_eq!(next_required_difficulty(&chain, 15, &params), expected);

    // blocks mined instantly clamp the other way, at target * 4/5
    let chain = chain_with_intervals(bits, &[0; 15]);
    let expected = encode(expanded(bits) * 120u64 / 150u64);
    assert_eq!(next_required_difficulty(&chain, 15, &params), expected);
}

#[test]
fn dgw_returns_same_bits_when_actual_matches_target() {
    init();
    let params = Parameters::regtest();
    let bits = 0x1e0f_ffff;

    // 60 blocks; the 23 intervals covered by the averaging walk sum to
    // exactly 24 * 150 = 3600 seconds, so no adjustment happens
    let mut intervals = vec![150i64; 36];
    intervals.extend([157i64; 12]);
    intervals.extend([156i64; 11]);
    assert_eq!(intervals[36..].iter().sum::<i64>(), 3600);

    let chain = chain_with_intervals(bits, &intervals);
    let prev = chain.tip().expect("chain is non-empty");
    assert_eq!(
        next_required_difficulty(&chain, prev, &params),
        CompactDifficulty(bits)
    );
}

#[test]
fn dgw_clamps_fast_and_slow_chains() {
    init();
    let params = Parameters::regtest();
    let bits = 0x1d0f_ffff;
    let target = expanded(bits);

    // instant blocks: actual clamps up to 3600 * 2/3 = 2400
    let chain = chain_with_intervals(bits, &[0; 40]);
    let prev = chain.tip().unwrap();
    let expected = encode(target * 2400u64 / 3600u64);
    assert_eq!(next_required_difficulty(&chain, prev, &params), expected);

    // hour-long gaps: actual clamps down to 3600 * 3/2 = 5400
    let chain = chain_with_intervals(bits, &[3600; 40]);
    let prev = chain.tip().unwrap();
    let expected = encode(target * 5400u64 / 3600u64);
    assert_eq!(next_required_difficulty(&chain, prev, &params), expected);
}

#[test]
fn dgw_saturates_at_the_pow_limit() {
    init();
    let params = Parameters::regtest();
    // the easiest encodable chain difficulty scales past the limit when
    // blocks arrive slowly, and must saturate instead
    let bits = 0x1f0f_ffff;
    let chain = chain_with_intervals(bits, &[3600; 40]);
    let prev = chain.tip().unwrap();
    assert_eq!(
        next_required_difficulty(&chain, prev, &params),
        params.pow_limit.to_compact()
    );
}

#[test]
fn dgw_uses_available_ancestors_below_24() {
    init();
    let params = Parameters::regtest();
    let bits = 0x1e0f_ffff;

    // prev at height 22: the walk covers heights 22..=1, so 22 blocks and
    // 21 intervals against a 22 * 150 target timespan
    let chain = chain_with_intervals(bits, &[150; 22]);
    let prev = chain.tip().unwrap();
    let expected = encode(expanded(bits) * (21u64 * 150) / (22u64 * 150));
    assert_eq!(next_required_difficulty(&chain, prev, &params), expected);
}

#[test]
fn proof_of_work_gate_at_the_target_boundary() {
    init();
    let params = Parameters::mainnet();
    let bits = CompactDifficulty(0x1f0f_ffff);
    let target: U256 = bits.to_expanded().unwrap().into();

    // a hash exactly at the target passes
    let mut exact = [0u8; 32];
    let mut target_bytes = [0u8; 32];
    target.to_big_endian(&mut target_bytes);
    target_bytes.reverse();
    exact.copy_from_slice(&target_bytes);
    assert_eq!(check_proof_of_work(&block::Hash(exact), bits, &params), Ok(()));

    // one bit above the target fails
    let mut above = [0u8; 32];
    above[30] = 0x10;
    assert_eq!(
        check_proof_of_work(&block::Hash(above), bits, &params),
        Err(BlockError::DifficultyFilter)
    );

    // the zero hash always passes a valid target
    assert_eq!(
        check_proof_of_work(&block::Hash([0; 32]), bits, &params),
        Ok(())
    );
}

#[test]
fn proof_of_work_rejects_bad_thresholds() {
    init();
    let params = Parameters::mainnet();
    let hash = block::Hash([0; 32]);

    // negative
    assert_eq!(
        check_proof_of_work(&hash, CompactDifficulty(0x1f80_0000), &params),
        Err(BlockError::InvalidDifficulty)
    );
    // zero
    assert_eq!(
        check_proof_of_work(&hash, CompactDifficulty(0x1f00_0000), &params),
        Err(BlockError::InvalidDifficulty)
    );
    // overflow
    assert_eq!(
        check_proof_of_work(&hash, CompactDifficulty(0x2300_0001), &params),
        Err(BlockError::InvalidDifficulty)
    );
    // easier than the proof-of-work limit
    assert_eq!(
        check_proof_of_work(&hash, CompactDifficulty(0x207f_ffff), &params),
        Err(BlockError::TargetDifficultyLimit)
    );
}

proptest! {
    #![proptest_config(ProptestConfig {
        max_global_rejects: 1_000_000,
        ..ProptestConfig::default()
    })]

    /// Re-encoding a decoded threshold never changes the outcome of the
    /// proof-of-work check.
    #[test]
    fn prop_check_pow_is_stable_under_reencoding(bits in any::<u32>(), hash in any::<[u8; 32]>()) {
        init();
        let params = Parameters::mainnet();
        let compact = CompactDifficulty(bits);
        prop_assume!(compact.to_expanded().is_some());

        let reencoded = compact
            .to_expanded()
            .expect("just checked")
            .to_compact();

        let hash = block::Hash(hash);
        prop_assert_eq!(
            check_proof_of_work(&hash, compact, &params),
            check_proof_of_work(&hash, reencoded, &params)
        );
    }
}
