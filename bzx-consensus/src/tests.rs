//! Shared fixtures for the consensus validator tests.

mod founders;
mod pow;

use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;

use bzx_chain::block::{self, Height, ZerocoinTxInfo};
use bzx_chain::parameters::Parameters;
use bzx_chain::serialization::BzxSerialize;
use bzx_chain::transaction::Transaction;
use bzx_chain::transparent::{Input, OutPoint, Output, Script};
use bzx_chain::work::difficulty::CompactDifficulty;
use bzx_chain::zerocoin::{
    AccumulatorWitness, BigNum, CoinSpend, Denomination, PublicCoin, SpendMetadata,
};
use bzx_state::{connect_block_zc, BlockId, Chain, CheckHeight, ZerocoinState};

use crate::error::TransactionError;
use crate::transaction::check_zerocoin_transaction;

pub(crate) fn init() {
    static INIT: Lazy<()> = Lazy::new(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
    Lazy::force(&INIT);
}

pub(crate) fn block_time(height: usize) -> DateTime<Utc> {
    Utc.timestamp_opt(1_485_785_935 + 150 * height as i64, 0)
        .single()
        .expect("test times are valid")
}

pub(crate) fn block_hash(height: usize) -> block::Hash {
    let mut bytes = [0u8; 32];
    bytes[..8].copy_from_slice(&(height as u64).to_le_bytes());
    bytes[31] = 0x01;
    block::Hash(bytes)
}

pub(crate) fn coin_value(seed: u64) -> BigNum {
    BigNum::from_bytes_le(&seed.to_le_bytes().repeat(4))
}

pub(crate) fn serial_value(seed: u64) -> BigNum {
    BigNum::from_bytes_le(&seed.to_le_bytes().repeat(3))
}

/// A regtest chain, its zerocoin state, and helpers to drive the full
/// validate-then-connect pipeline the way block acceptance does.
pub(crate) struct Fixture {
    pub params: Parameters,
    pub chain: Chain,
    pub state: ZerocoinState,
}

impl Fixture {
    /// A regtest chain holding only the genesis placeholder.
    pub fn regtest() -> Fixture {
        let mut fixture = Fixture {
            params: Parameters::regtest(),
            chain: Chain::new(),
            state: ZerocoinState::new(),
        };
        fixture.connect_info_block(ZerocoinTxInfo::default());
        fixture
    }

    /// Grow the chain with empty blocks until it holds `len` blocks.
    pub fn extend_to(&mut self, len: usize) {
        while self.chain.len() < len {
            self.connect_info_block(ZerocoinTxInfo::default());
        }
    }

    /// Push a block and connect the given info to it.
    pub fn connect_info_block(&mut self, mut info: ZerocoinTxInfo) -> BlockId {
        info.complete();
        let id = self.chain.push(
            block_hash(self.chain.len()),
            block_time(self.chain.len()),
            CompactDifficulty(0x1f0f_ffff),
        );
        connect_block_zc(
            &mut self.state,
            &mut self.chain,
            id,
            Some(&info),
            false,
            &self.params,
        )
        .expect("test blocks connect");
        id
    }

    /// The height the next block would have.
    pub fn next_height(&self) -> Height {
        Height(self.chain.len() as u32)
    }

    /// Validate `tx` for the next block, collecting its effects into `info`.
    pub fn validate_for_next_block(
        &mut self,
        tx: &Transaction,
        info: &mut ZerocoinTxInfo,
    ) -> Result<(), TransactionError> {
        let height = CheckHeight::Block(self.next_height());
        self.validate_at(tx, height, info)
    }

    /// Validate `tx` at an explicit check height.
    pub fn validate_at(
        &mut self,
        tx: &Transaction,
        height: CheckHeight,
        info: &mut ZerocoinTxInfo,
    ) -> Result<(), TransactionError> {
        check_zerocoin_transaction(
            tx,
            &tx.hash(),
            false,
            height,
            false,
            &mut self.chain,
            &self.state,
            Some(info),
            &self.params,
        )
    }

    /// Validate a block's worth of transactions and connect them.
    pub fn accept_block(&mut self, txs: &[Transaction]) -> BlockId {
        let mut info = ZerocoinTxInfo::default();
        for tx in txs {
            self.validate_for_next_block(tx, &mut info)
                .expect("accepted blocks carry valid transactions");
        }
        self.connect_info_block(info)
    }

    /// Mint `count` coins of `denomination` in single-mint blocks, using
    /// seeds `start..start + count`.
    pub fn mint_coins(&mut self, denomination: Denomination, start: u64, count: u64) {
        for seed in start..start + count {
            let tx = mint_tx(denomination, coin_value(seed));
            self.accept_block(&[tx]);
        }
    }

    /// Build a spend transaction of `coin` from group `(denomination, id)`,
    /// witnessed against the current chain.
    #[allow(clippy::too_many_arguments)]
    pub fn spend_tx(
        &mut self,
        denomination: Denomination,
        id: u32,
        coin: BigNum,
        serial: BigNum,
        version: u8,
        declared_v2: bool,
        accumulator_block_hash: block::Hash,
    ) -> Transaction {
        let tip = self.chain.tip_height().expect("fixture chains are non-empty");
        let witness = self.state.get_witness_for_spend(
            &mut self.chain,
            tip,
            denomination,
            id,
            &coin,
            declared_v2,
            &self.params,
        );
        self.spend_tx_with_witness(
            denomination,
            id,
            coin,
            serial,
            version,
            declared_v2,
            accumulator_block_hash,
            witness,
        )
    }

    /// Build a spend transaction from an explicitly constructed witness.
    #[allow(clippy::too_many_arguments)]
    pub fn spend_tx_with_witness(
        &mut self,
        denomination: Denomination,
        id: u32,
        coin: BigNum,
        serial: BigNum,
        version: u8,
        declared_v2: bool,
        accumulator_block_hash: block::Hash,
        witness: AccumulatorWitness,
    ) -> Transaction {
        let raw_id = if declared_v2 {
            id + self.params.modulus_v2_base_id
        } else {
            id
        };

        let outputs = vec![Output {
            value: denomination.amount(),
            lock_script: Script::new(&[0x51]),
        }];

        // the metadata commits to the transaction with the spend input
        // blanked, so build that skeleton first
        let skeleton = Transaction {
            version: 1,
            inputs: vec![Input {
                outpoint: OutPoint::NULL,
                unlock_script: Script::new(&[]),
                sequence: raw_id,
            }],
            outputs: outputs.clone(),
            lock_time: 0,
        };
        let metadata = SpendMetadata {
            accumulator_id: raw_id,
            tx_hash: skeleton.hash(),
        };

        let spend = CoinSpend::create(
            version,
            serial,
            &PublicCoin::new(coin, denomination),
            &witness,
            accumulator_block_hash,
            &metadata,
        );

        Transaction {
            version: 1,
            inputs: vec![Input {
                outpoint: OutPoint::NULL,
                unlock_script: Script::zerocoin_spend(&spend.bzx_serialize_to_vec()),
                sequence: raw_id,
            }],
            outputs,
            lock_time: 0,
        }
    }
}

/// A single-output mint transaction.
pub(crate) fn mint_tx(denomination: Denomination, coin: BigNum) -> Transaction {
    Transaction {
        version: 1,
        inputs: vec![Input {
            outpoint: OutPoint::NULL,
            unlock_script: Script::new(&[0x00]),
            sequence: u32::MAX,
        }],
        outputs: vec![Output {
            value: denomination.amount(),
            lock_script: Script::zerocoin_mint(&coin),
        }],
        lock_time: 0,
    }
}
