use std::ops::{Add, Sub};

/// The height of a block is the length of the chain back to the genesis block.
///
/// # Invariants
///
/// Users should not construct block heights greater than `Height::MAX`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Height(pub u32);

impl Height {
    /// The minimum Height.
    ///
    /// Due to the underlying type, it is impossible to construct block heights
    /// less than `Height::MIN`.
    pub const MIN: Height = Height(0);

    /// The maximum Height.
    ///
    /// Users should not construct block heights greater than `Height::MAX`.
    pub const MAX: Height = Height(499_999_999);
}

impl Add<u32> for Height {
    type Output = Height;

    fn add(self, rhs: u32) -> Height {
        Height(self.0 + rhs)
    }
}

impl Sub<u32> for Height {
    type Output = Height;

    fn sub(self, rhs: u32) -> Height {
        Height(self.0 - rhs)
    }
}
