//! BitcoinZero amounts, denominated in satoshis.

use std::io;

use crate::serialization::BzxSerialize;

use byteorder::{LittleEndian, WriteBytesExt};
use thiserror::Error;

/// The number of satoshis in one BZX.
pub const COIN: i64 = 100_000_000;

/// The maximum amount of money that can ever exist, in satoshis.
pub const MAX_MONEY: i64 = 21_000_000 * COIN;

/// A non-negative amount of satoshis, bounded by [`MAX_MONEY`].
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
pub struct Amount(i64);

impl Amount {
    /// An amount of zero satoshis.
    pub const ZERO: Amount = Amount(0);

    /// Returns an amount of `coins` whole BZX.
    ///
    /// Used for fixed consensus constants; callers must not pass values
    /// outside the money range.
    pub const fn from_coins(coins: i64) -> Amount {
        Amount(coins * COIN)
    }

    /// Return the inner satoshi value.
    pub fn satoshis(self) -> i64 {
        self.0
    }
}

/// Errors that can occur when constructing an [`Amount`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The amount is outside of the valid range `0..=MAX_MONEY`.
    #[error("amount {0} is outside the valid range")]
    OutOfRange(i64),
}

impl TryFrom<i64> for Amount {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (0..=MAX_MONEY).contains(&value) {
            Ok(Amount(value))
        } else {
            Err(Error::OutOfRange(value))
        }
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> i64 {
        amount.0
    }
}

impl BzxSerialize for Amount {
    fn bzx_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_i64::<LittleEndian>(self.0)
    }
}
