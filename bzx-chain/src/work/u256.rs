//! A 256-bit unsigned integer for difficulty target arithmetic.
// The construct_uint macro expands to code clippy dislikes, so silence it
// for the whole module.
#![allow(clippy::all)]
#![allow(clippy::range_plus_one)]
#![allow(clippy::fallible_impl_from)]
#![allow(missing_docs)]

use uint::construct_uint;

construct_uint! {
    pub struct U256(4);
}
