//! Accumulators and membership witnesses.

use std::ops::AddAssign;

use super::{params, BigNum, Denomination, ParamSet, PublicCoin};

/// A one-way accumulator over the public coins of a single
/// (denomination, group) lineage.
///
/// Adding a coin is order-insensitive: any permutation of the same coin
/// set produces the same accumulator value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Accumulator {
    set: ParamSet,
    denomination: Denomination,
    value: BigNum,
}

impl Accumulator {
    /// An accumulator over no coins, at the parameter set's base value.
    pub fn empty(set: ParamSet, denomination: Denomination) -> Self {
        Accumulator {
            set,
            denomination,
            value: params(set).accumulator_base.clone(),
        }
    }

    /// Rebuild an accumulator from a previously recorded value.
    pub fn from_value(set: ParamSet, denomination: Denomination, value: BigNum) -> Self {
        Accumulator {
            set,
            denomination,
            value,
        }
    }

    /// The current accumulator value.
    pub fn value(&self) -> &BigNum {
        &self.value
    }

    /// The denomination this accumulator covers.
    pub fn denomination(&self) -> Denomination {
        self.denomination
    }

    /// The parameter set this accumulator lives under.
    pub fn param_set(&self) -> ParamSet {
        self.set
    }

    /// Add a public coin to the accumulated set.
    pub fn accumulate(&mut self, coin: &PublicCoin) {
        self.value = self
            .value
            .modpow(coin.value(), &params(self.set).modulus);
    }
}

impl AddAssign<&PublicCoin> for Accumulator {
    fn add_assign(&mut self, coin: &PublicCoin) {
        self.accumulate(coin);
    }
}

/// A witness that a particular coin is a member of an accumulator: the
/// accumulator over every *other* coin in the set, plus the coin itself.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccumulatorWitness {
    accumulator: Accumulator,
    coin: PublicCoin,
}

impl AccumulatorWitness {
    /// Construct a witness from the all-but-one accumulator and the coin.
    pub fn new(accumulator: Accumulator, coin: PublicCoin) -> Self {
        AccumulatorWitness { accumulator, coin }
    }

    /// The witness accumulator value.
    pub fn value(&self) -> &BigNum {
        self.accumulator.value()
    }

    /// The coin this witness vouches for.
    pub fn coin(&self) -> &PublicCoin {
        &self.coin
    }

    /// Check this witness against a full accumulator state: adding the
    /// witnessed coin to the witness accumulator must reproduce it.
    pub fn verify(&self, against: &Accumulator) -> bool {
        let modulus = &params(against.param_set()).modulus;
        self.accumulator
            .value()
            .modpow(self.coin.value(), modulus)
            == *against.value()
    }
}
