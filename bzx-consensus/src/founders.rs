//! The founders reward and bznode payment checker.

use bzx_chain::block::Height;
use bzx_chain::parameters::Parameters;
use bzx_chain::transaction::Transaction;

use crate::error::BlockError;

/// Check a coinbase transaction's fixed reward distribution.
///
/// Above the fee-check fork, the coinbase must pay each founder output
/// exactly once, and at most two outputs may equal the current bznode
/// payment value.
pub fn check_founders_outputs(
    tx: &Transaction,
    height: Height,
    params: &Parameters,
) -> Result<(), BlockError> {
    if height <= params.hf_fee_check {
        return Ok(());
    }

    let bznode_payment = params.bznode_payment(height);
    let mut found = [false; 2];
    // no more than 2 outputs for payment
    let mut total_payment_outputs = 0;

    for output in &tx.outputs {
        let mut matched_founder = false;
        for (i, founder) in params.founders.iter().enumerate() {
            if output.lock_script == founder.lock_script && output.value == founder.amount {
                found[i] = true;
                matched_founder = true;
                break;
            }
        }
        if matched_founder {
            continue;
        }

        if output.value == bznode_payment {
            total_payment_outputs += 1;
        }
    }

    if !(found[0] && found[1]) {
        return Err(BlockError::FoundersRewardMissing);
    }

    if total_payment_outputs > 2 {
        return Err(BlockError::InvalidBznodePayment);
    }

    Ok(())
}
