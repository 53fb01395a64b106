//! The per-transaction zerocoin dispatcher.

use bzx_chain::block::ZerocoinTxInfo;
use bzx_chain::parameters::Parameters;
use bzx_chain::transaction::{self, Transaction};
use bzx_chain::zerocoin::Denomination;
use bzx_state::{CheckHeight, Chain, ZerocoinState};

use crate::error::TransactionError;
use crate::mint::check_mint_transaction;
use crate::spend::check_spend_transaction;

/// Run the zerocoin validators over one transaction: the mint validator
/// on every mint-shaped output, and the spend validator once per output
/// denomination when the transaction is spend-shaped.
///
/// Spend-shaped transactions must pay out exact denominations; any other
/// output value rejects the transaction.
#[allow(clippy::too_many_arguments)]
pub fn check_zerocoin_transaction(
    tx: &Transaction,
    tx_hash: &transaction::Hash,
    verify_db: bool,
    height: CheckHeight,
    check_wallet: bool,
    chain: &mut Chain,
    state: &ZerocoinState,
    mut info: Option<&mut ZerocoinTxInfo>,
    params: &Parameters,
) -> Result<(), TransactionError> {
    // check mint-shaped outputs
    for output in &tx.outputs {
        if !output.lock_script.is_empty() && output.lock_script.is_zerocoin_mint() {
            check_mint_transaction(output, tx_hash, state, info.as_deref_mut(), params)?;
        }
    }

    // check spend-shaped transactions, one pass per output
    if tx.is_zerocoin_spend() && !verify_db {
        for output in &tx.outputs {
            let denomination = Denomination::from_amount(output.value)
                .ok_or(TransactionError::SpendOutputDenomination)?;
            check_spend_transaction(
                tx,
                denomination,
                tx_hash,
                verify_db,
                height,
                check_wallet,
                chain,
                state,
                info.as_deref_mut(),
                params,
            )?;
        }
    }

    Ok(())
}
