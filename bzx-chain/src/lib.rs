//! Core BitcoinZero data structures.
//!
//! This crate provides definitions of the core datastructures for
//! BitcoinZero consensus: blocks, transactions, amounts, proof-of-work
//! difficulty arithmetic, chain parameters, and the zerocoin primitive
//! layer (public coins, accumulators, witnesses, and coin spends).

#[macro_use]
extern crate serde;

pub mod amount;
pub mod block;
pub mod parameters;
pub mod serialization;
pub mod sha256d_writer;
pub mod transaction;
pub mod transparent;
pub mod work;
pub mod zerocoin;
