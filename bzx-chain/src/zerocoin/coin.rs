//! Public coin commitments.

use super::{params, BigNum, Denomination, ParamSet};

/// A minted coin's public commitment, as it appears in a mint output script.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct PublicCoin {
    value: BigNum,
    denomination: Denomination,
}

impl PublicCoin {
    /// Construct a public coin from its commitment value and denomination.
    pub fn new(value: BigNum, denomination: Denomination) -> Self {
        PublicCoin {
            value,
            denomination,
        }
    }

    /// The commitment value.
    pub fn value(&self) -> &BigNum {
        &self.value
    }

    /// The coin's denomination.
    pub fn denomination(&self) -> Denomination {
        self.denomination
    }

    /// Check that the commitment value lies in the valid range for the
    /// given parameter set.
    pub fn validate(&self, set: ParamSet) -> bool {
        !self.value.is_zero()
            && self.value > BigNum::from(1)
            && self.value < params(set).modulus
    }
}
