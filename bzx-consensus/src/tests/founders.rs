//! Founders reward and bznode payment tests.

use bzx_chain::amount::Amount;
use bzx_chain::block::Height;
use bzx_chain::parameters::Parameters;
use bzx_chain::transaction::Transaction;
use bzx_chain::transparent::{Input, OutPoint, Output, Script};

use crate::error::{reject, BlockError};
use crate::founders::check_founders_outputs;

use super::init;

fn coinbase(outputs: Vec<Output>) -> Transaction {
    Transaction {
        version: 1,
        inputs: vec![Input {
            outpoint: OutPoint::NULL,
            unlock_script: Script::new(&[0x00]),
            sequence: u32::MAX,
        }],
        outputs,
        lock_time: 0,
    }
}

fn founder_outputs(params: &Parameters) -> Vec<Output> {
    params
        .founders
        .iter()
        .map(|founder| Output {
            value: founder.amount,
            lock_script: founder.lock_script.clone(),
        })
        .collect()
}

fn payment_output(params: &Parameters, height: Height) -> Output {
    Output {
        value: params.bznode_payment(height),
        lock_script: Script::new(&[0x76, 0xa9]),
    }
}

#[test]
fn founders_outputs_accepted() -> Result<(), color_eyre::Report> {
    init();
    let params = Parameters::mainnet();
    let height = params.hf_fee_check + 1;

    let mut outputs = founder_outputs(&params);
    outputs.push(payment_output(&params, height));
    let tx = coinbase(outputs);

    check_founders_outputs(&tx, height, &params)?;
    Ok(())
}

#[test]
fn missing_founder_output_is_rejected() {
    init();
    let params = Parameters::mainnet();
    let height = params.hf_fee_check + 1;

    for missing in 0..2 {
        let outputs: Vec<_> = founder_outputs(&params)
            .into_iter()
            .enumerate()
            .filter(|(i, _)| *i != missing)
            .map(|(_, output)| output)
            .collect();
        let tx = coinbase(outputs);

        let err = check_founders_outputs(&tx, height, &params)
            .expect_err("both founder outputs are required");
        assert_eq!(err, BlockError::FoundersRewardMissing);
        assert_eq!(err.reject_code(), reject::REJECT_FOUNDER_REWARD_MISSING);
        assert_eq!(err.dos_score(), 100);
    }
}

#[test]
fn wrong_founder_amount_is_rejected() {
    init();
    let params = Parameters::mainnet();
    let height = params.hf_fee_check + 1;

    // the right script with the wrong value does not count
    let mut outputs = founder_outputs(&params);
    outputs[1].value = Amount::try_from(140_000_000).unwrap();
    let tx = coinbase(outputs);

    assert_eq!(
        check_founders_outputs(&tx, height, &params),
        Err(BlockError::FoundersRewardMissing)
    );
}

#[test]
fn excess_bznode_payments_are_rejected() {
    init();
    let params = Parameters::mainnet();
    let height = params.hf_fee_check + 1;

    // two payment-valued outputs are tolerated
    let mut outputs = founder_outputs(&params);
    outputs.push(payment_output(&params, height));
    outputs.push(payment_output(&params, height));
    let tx = coinbase(outputs.clone());
    assert_eq!(check_founders_outputs(&tx, height, &params), Ok(()));

    // a third one is not
    outputs.push(payment_output(&params, height));
    let tx = coinbase(outputs);
    let err = check_founders_outputs(&tx, height, &params)
        .expect_err("at most two payment outputs are allowed");
    assert_eq!(err, BlockError::InvalidBznodePayment);
    assert_eq!(err.reject_code(), reject::REJECT_INVALID_BZNODE_PAYMENT);
}

#[test]
fn inactive_below_the_fee_check_fork() {
    init();
    let params = Parameters::mainnet();

    // no founder outputs at all, but the rule is not active yet
    let tx = coinbase(vec![payment_output(&params, params.hf_fee_check)]);
    assert_eq!(
        check_founders_outputs(&tx, params.hf_fee_check, &params),
        Ok(())
    );
}
