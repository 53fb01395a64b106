//! Chain parameters consumed by consensus validation.
//!
//! All the height thresholds, zerocoin migration constants, and reward
//! schedules that the validators read live here, per network. The values
//! in [`Parameters::mainnet`] are the deployed main-net profile;
//! [`Parameters::regtest`] compresses the schedule so integration tests
//! can cross every threshold with short chains.

use crate::amount::Amount;
use crate::block::{self, Height};
use crate::transparent::Script;
use crate::work::difficulty::{CompactDifficulty, ExpandedDifficulty, U256};
use crate::zerocoin::Denomination;

/// An enum describing the possible network choices.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Network {
    /// The production mainnet.
    Mainnet,
    /// The testnet.
    Testnet,
    /// The regression-test network.
    Regtest,
}

/// A fixed per-block founders reward output.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FounderReward {
    /// The exact output script the reward must pay to.
    pub lock_script: Script,
    /// The exact output value.
    pub amount: Amount,
}

/// The constants baked into the genesis block.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GenesisParameters {
    /// The genesis header version.
    pub version: i32,
    /// The genesis timestamp, in seconds since the Unix epoch.
    pub time: u32,
    /// The genesis difficulty bits.
    pub difficulty_threshold: CompactDifficulty,
    /// The genesis nonce.
    pub nonce: u32,
    /// The launch message committed into the coinbase script.
    pub coinbase_message: &'static str,
    /// The extra nonce committed into the coinbase script.
    pub extra_nonce: [u8; 4],
}

/// The consensus parameters for one network.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameters {
    /// Which network these parameters describe.
    pub network: Network,

    /// The easiest valid proof-of-work target.
    pub pow_limit: ExpandedDifficulty,
    /// The intended spacing between blocks, in seconds.
    pub pow_target_spacing: i64,
    /// The retarget window for the legacy algorithm, in seconds.
    pub pow_target_timespan: i64,

    /// The last block of the genesis-era fixed-difficulty regime.
    pub hf_fork_end: Height,
    /// The last block retargeted with the legacy algorithm; Dark Gravity
    /// Wave takes over above this height.
    pub hf_fork_dgw: Height,
    /// Founders reward enforcement starts above this height.
    pub hf_fee_check: Height,

    /// Spent serials are only tracked above this height, where the
    /// original duplicate-serial bug was fixed.
    pub check_bug_fixed_at_block: Height,
    /// The height where version 1.5 spends activate.
    pub spend_v15_start_block: Height,
    /// Blocks after activation during which version 1 spends may still be
    /// connected.
    pub spend_v15_graceful_period: u32,
    /// Blocks after activation during which version 1 spends may still
    /// enter the mempool.
    pub spend_v15_graceful_mempool_period: u32,

    /// The height where modulus v2 spends activate.
    pub modulus_v2_start_block: Height,
    /// The tip height where modulus v1 spends stop entering the mempool.
    pub modulus_v1_mempool_stop_block: Height,
    /// The height where modulus v1 spends stop connecting.
    pub modulus_v1_stop_block: Height,
    /// Spend inputs declare modulus v2 by offsetting their group id with
    /// this base.
    pub modulus_v2_base_id: u32,

    /// Mints per accumulator group under modulus v1.
    pub coins_per_group_v1: u32,
    /// Mints per accumulator group under modulus v2.
    pub coins_per_group_v2: u32,
    /// Per-denomination group ids where the native modulus switches to v2,
    /// indexed in [`Denomination::ALL`] order.
    v2_switch_ids: [u32; 5],

    /// The two fixed founders reward outputs.
    pub founders: [FounderReward; 2],
    /// The fixed bznode payment value.
    bznode_payment: Amount,

    /// The genesis launch constants.
    pub genesis: GenesisParameters,
    /// The expected genesis block hash.
    pub genesis_hash: block::Hash,
}

impl Parameters {
    /// The main network parameters.
    pub fn mainnet() -> Parameters {
        Parameters {
            network: Network::Mainnet,
            pow_limit: ((U256::one() << 244) - 1).into(),
            pow_target_spacing: 150,
            pow_target_timespan: 150,
            hf_fork_end: Height(100),
            hf_fork_dgw: Height(1_500),
            hf_fee_check: Height(1_600),
            check_bug_fixed_at_block: Height(22_000),
            spend_v15_start_block: Height(30_000),
            spend_v15_graceful_period: 10_000,
            spend_v15_graceful_mempool_period: 5_000,
            modulus_v2_start_block: Height(45_000),
            modulus_v1_mempool_stop_block: Height(44_500),
            modulus_v1_stop_block: Height(45_500),
            modulus_v2_base_id: 1_000,
            coins_per_group_v1: 10,
            coins_per_group_v2: 15,
            v2_switch_ids: [2, 2, 2, 3, 3],
            founders: [
                FounderReward {
                    lock_script: Script::new(
                        &hex::decode("76a914d3e505575aaa0174c1801fcb78f47bb312be24d788ac")
                            .expect("founder script constant is valid hex"),
                    ),
                    amount: Amount::try_from(750_000_000).expect("7.5 BZX is in range"),
                },
                FounderReward {
                    lock_script: Script::new(
                        &hex::decode("76a9148b6f6866e5081ea5ba5b5793dd2c24f7e254a05a88ac")
                            .expect("founder script constant is valid hex"),
                    ),
                    amount: Amount::try_from(150_000_000).expect("1.5 BZX is in range"),
                },
            ],
            bznode_payment: Amount::from_coins(6),
            genesis: GenesisParameters {
                version: 2,
                time: 1_485_785_935,
                difficulty_threshold: CompactDifficulty(0x1f0f_ffff),
                nonce: 2_610,
                coinbase_message: "Lets Swap Hexx",
                extra_nonce: [0x82, 0x3f, 0x00, 0x00],
            },
            genesis_hash: "322bad477efb4b33fa4b1f0b2861eaf543c61068da9898a95062fdb02ada486f"
                .parse()
                .expect("genesis hash constant is valid"),
        }
    }

    /// The test network parameters.
    ///
    /// The testnet follows the mainnet schedule; only the network tag
    /// differs.
    pub fn testnet() -> Parameters {
        Parameters {
            network: Network::Testnet,
            ..Parameters::mainnet()
        }
    }

    /// The regression-test network parameters, with every threshold pulled
    /// close to genesis.
    pub fn regtest() -> Parameters {
        Parameters {
            network: Network::Regtest,
            hf_fork_end: Height(10),
            hf_fork_dgw: Height(20),
            hf_fee_check: Height(300),
            check_bug_fixed_at_block: Height(0),
            spend_v15_start_block: Height(100),
            spend_v15_graceful_period: 100,
            spend_v15_graceful_mempool_period: 50,
            modulus_v2_start_block: Height(10),
            modulus_v1_mempool_stop_block: Height(350),
            modulus_v1_stop_block: Height(400),
            v2_switch_ids: [2, 2, 2, 2, 2],
            ..Parameters::mainnet()
        }
    }

    /// The group id where `denomination`'s native modulus switches to v2.
    pub fn v2_switch_id(&self, denomination: Denomination) -> u32 {
        let index = Denomination::ALL
            .iter()
            .position(|d| *d == denomination)
            .expect("all denominations have a switch id");
        self.v2_switch_ids[index]
    }

    /// Is the native modulus of `(denomination, id)` v2?
    ///
    /// The mapping is deterministic: every group at or above the
    /// per-denomination switch id is natively v2.
    pub fn is_zerocoin_v2(&self, denomination: Denomination, id: u32) -> bool {
        id >= self.v2_switch_id(denomination)
    }

    /// The mint capacity of group `(denomination, id)`.
    pub fn coins_per_group(&self, denomination: Denomination, id: u32) -> u32 {
        if self.is_zerocoin_v2(denomination, id) {
            self.coins_per_group_v2
        } else {
            self.coins_per_group_v1
        }
    }

    /// The bznode payment value at `height`.
    pub fn bznode_payment(&self, _height: Height) -> Amount {
        self.bznode_payment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainnet_pow_limit_matches_genesis_bits() {
        let params = Parameters::mainnet();
        assert_eq!(
            params.pow_limit.to_compact(),
            params.genesis.difficulty_threshold
        );
    }

    #[test]
    fn modulus_switch_is_monotonic() {
        let params = Parameters::mainnet();
        for denomination in Denomination::ALL {
            let switch = params.v2_switch_id(denomination);
            assert!(!params.is_zerocoin_v2(denomination, switch - 1));
            assert!(params.is_zerocoin_v2(denomination, switch));
            assert_eq!(
                params.coins_per_group(denomination, switch),
                params.coins_per_group_v2
            );
            assert_eq!(
                params.coins_per_group(denomination, 1),
                params.coins_per_group_v1
            );
        }
    }
}
