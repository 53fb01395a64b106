//! Genesis block construction.

use chrono::{TimeZone, Utc};

use crate::amount::Amount;
use crate::parameters::Parameters;
use crate::transaction::Transaction;
use crate::transparent::{Input, OutPoint, Output, Script};

use super::{merkle, Block, Hash, Header};

fn push_data(script: &mut Vec<u8>, data: &[u8]) {
    // all genesis pushes are short enough for the one-byte length form
    debug_assert!(data.len() < 0x4c);
    script.push(data.len() as u8);
    script.extend_from_slice(data);
}

/// Push a positive integer with the minimal script-number encoding:
/// little-endian, with a zero pad byte when the top bit would read as a sign.
fn push_script_num(script: &mut Vec<u8>, value: i64) {
    assert!(value >= 0);
    let mut bytes = Vec::new();
    let mut v = value as u64;
    while v > 0 {
        bytes.push((v & 0xff) as u8);
        v >>= 8;
    }
    if let Some(&last) = bytes.last() {
        if last & 0x80 != 0 {
            bytes.push(0);
        }
    }
    push_data(script, &bytes);
}

/// Build the genesis block for the given chain parameters.
///
/// The coinbase input script commits to the launch constants: the genesis
/// difficulty bits, a literal `4`, the launch message, and the extra nonce.
/// The resulting hash and merkle root are fixed network constants.
pub fn genesis_block(params: &Parameters) -> Block {
    let genesis = &params.genesis;

    let mut script_sig = Vec::new();
    push_script_num(&mut script_sig, genesis.difficulty_threshold.0 as i64);
    push_data(&mut script_sig, &[0x04]);
    push_data(&mut script_sig, genesis.coinbase_message.as_bytes());
    push_data(&mut script_sig, &genesis.extra_nonce);

    let coinbase = Transaction {
        version: 1,
        inputs: vec![Input {
            outpoint: OutPoint::NULL,
            unlock_script: Script(script_sig),
            sequence: u32::MAX,
        }],
        outputs: vec![Output {
            value: Amount::ZERO,
            lock_script: Script(Vec::new()),
        }],
        lock_time: 0,
    };

    let transactions = vec![coinbase];
    let header = Header {
        version: genesis.version,
        previous_block_hash: Hash::NULL,
        merkle_root: merkle::Root::from_transactions(&transactions),
        time: Utc
            .timestamp_opt(genesis.time as i64, 0)
            .single()
            .expect("genesis time is a valid timestamp"),
        difficulty_threshold: genesis.difficulty_threshold,
        nonce: genesis.nonce,
    };

    Block {
        header,
        transactions,
    }
}
