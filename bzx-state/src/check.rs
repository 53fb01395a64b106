//! Checks for spend serial uniqueness.

use tracing::info;

use bzx_chain::block::{Height, ZerocoinTxInfo};
use bzx_chain::parameters::Parameters;
use bzx_chain::zerocoin::{BigNum, Denomination};

use crate::error::ValidateContextError;
use crate::zerocoin::ZerocoinState;

/// The chain position a transaction is being checked at: a concrete block
/// height, or mempool admission.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CheckHeight {
    /// The transaction is being accepted into the memory pool.
    Mempool,
    /// The transaction is part of a block at this height.
    Block(Height),
}

/// Reject double-spends of a serial:
/// - against an earlier spend in the same block (via `info`), and
/// - against the serials already consumed on the connected chain.
///
/// Serials are only tracked above the bug-fix height. A reused serial is
/// only rejected when the transaction is entering the mempool or being
/// connected to the tip, and only at or above the v1.5 activation height;
/// below it the reuse is logged for historical compatibility.
pub fn check_spend_serial(
    state: &ZerocoinState,
    info: Option<&ZerocoinTxInfo>,
    denomination: Denomination,
    serial: &BigNum,
    height: CheckHeight,
    connect_tip: bool,
    params: &Parameters,
) -> Result<(), ValidateContextError> {
    let above_bug_fix = match height {
        CheckHeight::Mempool => true,
        CheckHeight::Block(height) => height > params.check_bug_fixed_at_block,
    };
    if !above_bug_fix {
        return Ok(());
    }

    // check for an earlier spend of the same serial in this block
    if let Some(info) = info {
        if !info.is_complete() && info.spent_serials.contains_key(serial) {
            return Err(ValidateContextError::DuplicateSerialInBlock);
        }
    }

    // check for used serials in the chain state
    if state.is_used(serial) {
        // proceed ONLY if we're accepting the tx into the memory pool or
        // connecting a block to the existing chain
        if matches!(height, CheckHeight::Mempool) || connect_tip {
            let lenient = match height {
                CheckHeight::Block(height) => height < params.spend_v15_start_block,
                CheckHeight::Mempool => false,
            };
            if lenient {
                info!(?height, ?denomination, ?serial, "reused serial before v1.5 activation");
            } else {
                return Err(ValidateContextError::DuplicateSerial);
            }
        }
    }

    Ok(())
}
