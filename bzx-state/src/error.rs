//! Errors from contextual state validation.

use bzx_chain::block::Height;

use thiserror::Error;

/// A contextual consensus violation found while checking a transaction or
/// block against the chain state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidateContextError {
    /// Two spends in the same block revealed the same serial.
    #[error("two or more spends with the same serial in one block")]
    DuplicateSerialInBlock,

    /// The serial was already consumed by a spend on the connected chain.
    #[error("the coin spend serial has already been used")]
    DuplicateSerial,

    /// A version 1 spend appeared after the v1.5 grace period expired.
    #[error("spend version 1 transactions are not allowed at height {height:?}")]
    SpendV1GracePeriodExpired {
        /// The height of the offending block.
        height: Height,
    },
}
