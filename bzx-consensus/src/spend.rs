//! Validation of zerocoin spend inputs.
//!
//! A spend reveals a serial number and proves, in zero knowledge, that it
//! corresponds to some coin minted into a specific accumulator group. The
//! validator walks the group's recorded accumulator history looking for a
//! state the proof verifies against, with a brute-force fallback for
//! legacy version 1 spends.

use tracing::{debug, info};

use bzx_chain::block::ZerocoinTxInfo;
use bzx_chain::parameters::Parameters;
use bzx_chain::transaction::{self, Transaction};
use bzx_chain::zerocoin::{
    Accumulator, BigNum, CoinSpend, Denomination, ParamSet, PublicCoin, SpendMetadata,
    SPEND_VERSION_V1, SPEND_VERSION_V1_5, SPEND_VERSION_V2,
};
use bzx_state::{check_spend_serial, CheckHeight, Chain, ZerocoinState};

use crate::error::TransactionError;

/// Extract the serial number revealed by a spend transaction.
///
/// Returns the zero sentinel when the transaction is not a single-input
/// spend or its proof fails to deserialize.
pub fn spend_serial_number(tx: &Transaction) -> BigNum {
    if !tx.is_zerocoin_spend() || tx.inputs.len() != 1 {
        return BigNum::default();
    }

    let script = tx.inputs[0].unlock_script.as_raw_bytes();
    if script.len() < 4 {
        return BigNum::default();
    }
    match CoinSpend::parse(&script[4..]) {
        Ok(spend) => spend.serial().clone(),
        Err(_) => BigNum::default(),
    }
}

/// Check every spend-shaped input of `tx` claiming `target_denomination`.
///
/// `height` is the block height the transaction is validated for, or
/// [`CheckHeight::Mempool`] for mempool admission. `verify_db` and
/// `check_wallet` suppress the side effects on `info` for the rescan
/// paths. On success the spend is recorded into `info` (when present and
/// incomplete).
#[allow(clippy::too_many_arguments)]
pub fn check_spend_transaction(
    tx: &Transaction,
    target_denomination: Denomination,
    tx_hash: &transaction::Hash,
    verify_db: bool,
    height: CheckHeight,
    check_wallet: bool,
    chain: &mut Chain,
    state: &ZerocoinState,
    mut info: Option<&mut ZerocoinTxInfo>,
    params: &Parameters,
) -> Result<(), TransactionError> {
    debug!(?target_denomination, ?height, "checking spend transaction");

    for txin in &tx.inputs {
        if !txin.unlock_script.is_zerocoin_spend() {
            continue;
        }

        if tx.inputs.len() > 1 {
            return Err(TransactionError::MultipleSpendInputs);
        }

        // The sequence field carries the group id, offset by the modulus v2
        // base for spends proven under the second parameter set.
        let raw_id = txin.sequence;
        if raw_id < 1 || raw_id >= i32::MAX as u32 {
            return Err(TransactionError::SpendGroupId);
        }
        let declared_v2 = raw_id >= params.modulus_v2_base_id;
        let pubcoin_id = if declared_v2 {
            raw_id - params.modulus_v2_base_id
        } else {
            raw_id
        };
        let declared_set = if declared_v2 { ParamSet::V2 } else { ParamSet::V1 };

        let script = txin.unlock_script.as_raw_bytes();
        if script.len() < 4 {
            return Err(TransactionError::MalformedSpendScript);
        }
        let mut spend = CoinSpend::parse(&script[4..])
            .map_err(|_| TransactionError::MalformedSpendScript)?;

        let mut spend_version = spend.version();
        if ![SPEND_VERSION_V1, SPEND_VERSION_V1_5, SPEND_VERSION_V2].contains(&spend_version) {
            return Err(TransactionError::WrongSpendVersion);
        }

        let native_v2 = params.is_zerocoin_v2(target_denomination, pubcoin_id);
        if native_v2 {
            // past the threshold id, all spends must be strictly version 2
            if spend_version != SPEND_VERSION_V2 {
                return Err(TransactionError::SpendVersionMustBeV2);
            }
        } else if spend_version == SPEND_VERSION_V2 {
            // old version 2 spends on v1 groups are probably incorrect,
            // force them back to version 1
            spend_version = SPEND_VERSION_V1;
            spend.set_version(SPEND_VERSION_V1);
        }

        if native_v2 != declared_v2 {
            state.calculate_alternative_accumulators(chain, target_denomination, pubcoin_id, params);
        }

        // versions above 1 commit to the transaction with the zerocoin parts
        // blanked out
        let tx_hash_for_metadata = if spend_version > SPEND_VERSION_V1 {
            tx.hash_without_zerocoin_spends()
        } else {
            transaction::Hash([0; 32])
        };

        debug!(
            version = spend_version,
            metadata_hash = ?tx_hash_for_metadata,
            serial = ?spend.serial(),
            "deserialized spend"
        );

        let tip_height = chain
            .tip_height()
            .expect("spends are validated against a non-empty chain");

        if spend_version == SPEND_VERSION_V1 && height == CheckHeight::Mempool {
            let cutoff =
                params.spend_v15_start_block + params.spend_v15_graceful_mempool_period;
            if tip_height >= cutoff {
                info!(?cutoff, "rejecting version 1 spend from the mempool");
                return Err(TransactionError::SpendV1MempoolExpired);
            }
        }

        // test if the declared modulus version is allowed at this point
        if declared_v2 {
            let too_early = match height {
                CheckHeight::Mempool => tip_height < params.modulus_v2_start_block,
                CheckHeight::Block(h) => h < params.modulus_v2_start_block,
            };
            if too_early {
                return Err(TransactionError::ModulusV2NotActive);
            }
        } else {
            let too_late = match height {
                CheckHeight::Mempool => tip_height >= params.modulus_v1_mempool_stop_block,
                CheckHeight::Block(h) => h >= params.modulus_v1_stop_block,
            };
            if too_late {
                return Err(TransactionError::ModulusV1Expired);
            }
        }

        let metadata = SpendMetadata {
            accumulator_id: txin.sequence,
            tx_hash: tx_hash_for_metadata,
        };

        let group = state
            .get_coin_group_info(target_denomination, pubcoin_id)
            .ok_or(TransactionError::NoMintedCoins)?;

        let key = (target_denomination, pubcoin_id);
        let use_alternative = native_v2 != declared_v2;
        let mut pass_verify = false;
        let mut index_id = group.last_block;

        // Version 1.5/2 spends can carry the hash of the last mint block seen
        // at spend time; verification then happens at exactly that block.
        let spend_has_block_hash =
            spend_version > SPEND_VERSION_V1 && !spend.accumulator_block_hash().is_null();
        if spend_has_block_hash {
            let target_hash = *spend.accumulator_block_hash();
            while index_id != group.first_block && chain.block(index_id).hash != target_hash {
                index_id = chain
                    .block(index_id)
                    .prev
                    .expect("group blocks have predecessors");
            }
        }

        // Enumerate the accumulator changes recorded on the chain, starting
        // with the latest block; in most cases the latest value verifies.
        loop {
            let index = chain.block(index_id);
            let changes = if use_alternative {
                &index.alternative_accumulator_changes
            } else {
                &index.accumulator_changes
            };
            if let Some(change) = changes.get(&key) {
                let accumulator = Accumulator::from_value(
                    declared_set,
                    target_denomination,
                    change.value.clone(),
                );
                pass_verify = spend.verify(&accumulator, &metadata);
            }

            // with a block hash hint there is no need to look further
            if index_id == group.first_block || spend_has_block_hash {
                break;
            }
            if pass_verify {
                break;
            }
            index_id = chain
                .block(index_id)
                .prev
                .expect("group blocks have predecessors");
        }

        // Rare case: the accumulator value the spender used contains some but
        // not all coins from one block, so enumerate the group's coins
        // manually. No optimization is needed here because it's a rarity.
        // This can't happen for version 1.5/2 spends.
        if !pass_verify && spend_version == SPEND_VERSION_V1 {
            // build the group's coins sorted by mint order
            let mut pub_coins: Vec<BigNum> = chain
                .block(group.last_block)
                .minted_pub_coins
                .get(&key)
                .cloned()
                .unwrap_or_default();
            if group.last_block != group.first_block {
                let mut id = group.last_block;
                loop {
                    id = chain
                        .block(id)
                        .prev
                        .expect("group blocks have predecessors");
                    if let Some(coins) = chain.block(id).minted_pub_coins.get(&key) {
                        pub_coins.splice(0..0, coins.iter().cloned());
                    }
                    if id == group.first_block {
                        break;
                    }
                }
            }

            let mut accumulator = Accumulator::empty(declared_set, target_denomination);
            for coin in &pub_coins {
                accumulator += &PublicCoin::new(coin.clone(), target_denomination);
                if spend.verify(&accumulator, &metadata) {
                    pass_verify = true;
                    break;
                }
            }

            if !pass_verify {
                // one more time, in reverse direction; only needed for
                // compatibility with early client versions
                let mut accumulator = Accumulator::empty(declared_set, target_denomination);
                for coin in pub_coins.iter().rev() {
                    accumulator += &PublicCoin::new(coin.clone(), target_denomination);
                    if spend.verify(&accumulator, &metadata) {
                        pass_verify = true;
                        break;
                    }
                }
            }
        }

        if !pass_verify {
            info!(?height, "spend verification failed");
            return Err(TransactionError::SpendProofInvalid);
        }

        let serial = spend.serial().clone();
        // do not check for duplicates if we've seen an exact copy of this tx
        // in this block before
        let seen_in_block = info
            .as_deref()
            .map(|info| info.zc_transactions.contains(tx_hash))
            .unwrap_or(false);
        if !seen_in_block {
            check_spend_serial(
                state,
                info.as_deref(),
                spend.denomination(),
                &serial,
                height,
                false,
                params,
            )?;
        }

        if !verify_db && !check_wallet {
            if let Some(info) = info.as_deref_mut() {
                if !info.is_complete() {
                    // add the spend information to the block's info
                    info.spent_serials.insert(serial, spend.denomination());
                    info.zc_transactions.insert(*tx_hash);
                    if spend.version() == SPEND_VERSION_V1 {
                        info.has_spend_v1 = true;
                    }
                }
            }
        }
    }

    Ok(())
}

