//! Zerocoin primitives: big numbers, parameter sets, public coins,
//! accumulators, witnesses, and coin spends.
//!
//! The consensus core treats these values as opaque: it reads a spend's
//! serial, version, denomination, and accumulator block hash, and calls
//! [`CoinSpend::verify`] against candidate accumulator states. The
//! algebra lives entirely inside this module.

use crate::amount::{Amount, COIN};

mod accumulator;
mod bignum;
mod coin;
mod params;
mod spend;

pub use accumulator::{Accumulator, AccumulatorWitness};
pub use bignum::BigNum;
pub use coin::PublicCoin;
pub use params::{params, ParamSet, ZerocoinParams};
pub use spend::{
    CoinSpend, SpendMetadata, SPEND_VERSION_V1, SPEND_VERSION_V1_5, SPEND_VERSION_V2,
};

/// The fixed zerocoin denominations, in whole coins.
///
/// Every mint and spend moves exactly one of these values; arbitrary
/// amounts are not representable in the anonymous pool.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Denomination {
    /// 1 BZX
    One,
    /// 10 BZX
    Ten,
    /// 25 BZX
    TwentyFive,
    /// 50 BZX
    Fifty,
    /// 100 BZX
    OneHundred,
}

impl Denomination {
    /// All denominations, in ascending value order.
    pub const ALL: [Denomination; 5] = [
        Denomination::One,
        Denomination::Ten,
        Denomination::TwentyFive,
        Denomination::Fifty,
        Denomination::OneHundred,
    ];

    /// The value of this denomination in whole coins.
    pub fn units(self) -> i64 {
        match self {
            Denomination::One => 1,
            Denomination::Ten => 10,
            Denomination::TwentyFive => 25,
            Denomination::Fifty => 50,
            Denomination::OneHundred => 100,
        }
    }

    /// The value of this denomination in satoshis.
    pub fn amount(self) -> Amount {
        Amount::from_coins(self.units())
    }

    /// Parse a denomination from its value in whole coins.
    pub fn from_units(units: i64) -> Option<Denomination> {
        match units {
            1 => Some(Denomination::One),
            10 => Some(Denomination::Ten),
            25 => Some(Denomination::TwentyFive),
            50 => Some(Denomination::Fifty),
            100 => Some(Denomination::OneHundred),
            _ => None,
        }
    }

    /// Parse a denomination from an output amount.
    ///
    /// The amount must be an exact denomination multiple of [`COIN`].
    pub fn from_amount(amount: Amount) -> Option<Denomination> {
        let satoshis = amount.satoshis();
        if satoshis % COIN != 0 {
            return None;
        }
        Denomination::from_units(satoshis / COIN)
    }
}
