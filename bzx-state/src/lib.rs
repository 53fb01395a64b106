//! BitcoinZero chain state.
//!
//! This crate owns the in-memory side of consensus state: the block index
//! arena ([`Chain`]), the zerocoin state engine ([`ZerocoinState`]), the
//! contextual duplicate-serial checks, and the hooks that project a
//! connected or disconnected block's zerocoin effects into the state.
//!
//! Everything here is single-threaded by contract: callers hold the chain
//! lock, and no method suspends or blocks on I/O.

mod chain;
mod check;
mod connect;
mod error;
mod serde_helpers;
mod zerocoin;


pub use chain::{AccumulatorChange, BlockId, BlockIndex, Chain, GroupKey};
pub use check::{check_spend_serial, CheckHeight};
pub use connect::{connect_block_zc, disconnect_block_zc};
pub use error::ValidateContextError;
pub use zerocoin::{CoinGroupInfo, MintedCoinInfo, ZerocoinState};
