//! The two zerocoin trusted parameter sets.
//!
//! The chain launched on the v1 modulus and migrated to the v2 modulus at
//! fixed heights; accumulator groups are natively bound to one set, and
//! spends declare which set they were proven under.

use lazy_static::lazy_static;

use super::BigNum;

/// The v1 trusted setup modulus, as a big-endian hex string.
const MODULUS_V1_HEX: &str = "c6a02b657c46f12dd01b1e39f58e573b39f5c28d50a4508762cc1339f89b0d132844096e6f8b7127cfa2dea64f05ebc4332b0b7d3b6096e4b346594a500c740c7ed767ad76437918e15ebbc7b436a96d51141ea6389e73239f8f36c2a9b4669ca7a437f5b53785842b080d8cf7eedf5d436cce59670926e6ce45f0b9841d2178f4f8e2b579cff266e865f414579e1789c3b97b7fe79c48a56caab588f0a4a79dc43219ff1abce9dddf08f4c50246c517368d5fd98799f6aaa806b68b5a118c5d1f56abe65024dddd8f915ed6109a9d4544cfe9b4beb26ad072bb719684f304d8c9fbb1eda640ce062fda9cbb7b8423cb28464ff7acf5395568789c9d8675cf3d";

/// The v2 trusted setup modulus, as a big-endian hex string.
const MODULUS_V2_HEX: &str = "d6eecfad0577bf42dfac192f5f7dadcfdc69105bba146679ab24c7ff3d763314e0b2cfa4fec5d2e9c85cbfce67019983b60a28ca1e7152b42d0fae1a2cae4090a69a5de18cf1e8da4aefc922279e11019772b5027a17a53adcec1271428ca4aefb8ca749b9e4f1ee81068bfd451e6abe3de0ae0e5a59575c29eca48e3cfda3f77b0b9f4945462edbb856b80c525bf0670c5161493052ff8c858743dd9d36db63d7bae78128d8b2281bc5245ca81420c0f2f8743a32839625924ea8c5023150960a1b2645a29caa883cf95c7014b32e227b1de38c9283df0d779f30830ef860c0ddffd564365fca10c07cff543f5fadf49205e4e96fff8e3821008636683dafd5";

/// Selects one of the two trusted parameter sets.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ParamSet {
    /// The launch parameter set.
    V1,
    /// The migration parameter set.
    V2,
}

impl ParamSet {
    /// The opposite parameter set, used when materializing alternative
    /// accumulator values for a group.
    pub fn other(self) -> ParamSet {
        match self {
            ParamSet::V1 => ParamSet::V2,
            ParamSet::V2 => ParamSet::V1,
        }
    }
}

/// One zerocoin trusted parameter set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZerocoinParams {
    /// The accumulator modulus.
    pub modulus: BigNum,
    /// The initial accumulator value before any coin is added.
    pub accumulator_base: BigNum,
}

lazy_static! {
    static ref PARAMS_V1: ZerocoinParams = ZerocoinParams {
        modulus: BigNum::from_hex(MODULUS_V1_HEX).expect("v1 modulus constant is valid hex"),
        accumulator_base: BigNum::from(961),
    };
    static ref PARAMS_V2: ZerocoinParams = ZerocoinParams {
        modulus: BigNum::from_hex(MODULUS_V2_HEX).expect("v2 modulus constant is valid hex"),
        accumulator_base: BigNum::from(961),
    };
}

/// Returns the parameter set handle for `set`.
pub fn params(set: ParamSet) -> &'static ZerocoinParams {
    match set {
        ParamSet::V1 => &PARAMS_V1,
        ParamSet::V2 => &PARAMS_V2,
    }
}
