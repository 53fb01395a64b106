//! Validation of zerocoin mint outputs.

use tracing::{debug, info};

use bzx_chain::block::ZerocoinTxInfo;
use bzx_chain::transaction;
use bzx_chain::transparent::Output;
use bzx_chain::zerocoin::{BigNum, Denomination, ParamSet, PublicCoin};
use bzx_state::ZerocoinState;

use crate::error::TransactionError;

/// Check a mint-shaped output: extract the public coin, detect duplicate
/// mints, require a legal denomination, and validate the coin itself.
///
/// A duplicate mint of an already-seen public coin is logged but not
/// rejected, for historical compatibility. When `info` is present and not
/// yet complete, an accepted mint is appended to it.
pub fn check_mint_transaction(
    output: &Output,
    tx_hash: &transaction::Hash,
    state: &ZerocoinState,
    info: Option<&mut ZerocoinTxInfo>,
    _params: &bzx_chain::parameters::Parameters,
) -> Result<(), TransactionError> {
    debug!(?tx_hash, value = output.value.satoshis(), "checking mint output");

    let script = output.lock_script.as_raw_bytes();
    if script.len() < 6 {
        return Err(TransactionError::MalformedMintScript);
    }
    let pub_coin = BigNum::from_bytes_le(&script[6..]);

    let mut has_coin = state.has_coin(&pub_coin);
    if !has_coin {
        if let Some(info) = info.as_ref() {
            if !info.is_complete() {
                has_coin = info.mints.iter().any(|(_, coin)| coin == &pub_coin);
            }
        }
    }
    if has_coin {
        // historical behavior: log the double mint but accept it
        info!(?tx_hash, "double mint");
    }

    let denomination = Denomination::from_amount(output.value)
        .ok_or(TransactionError::MintDenomination)?;

    let coin = PublicCoin::new(pub_coin.clone(), denomination);
    if !coin.validate(ParamSet::V2) {
        return Err(TransactionError::PubCoinInvalid);
    }

    if let Some(info) = info {
        if !info.is_complete() {
            info.mints.push((denomination, pub_coin));
            info.zc_transactions.insert(*tx_hash);
        }
    }

    Ok(())
}
