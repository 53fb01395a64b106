//! Errors that can occur when checking consensus rules.
//!
//! Each error variant corresponds to a consensus rule, so enumerating
//! all possible verification failures enumerates the consensus rules we
//! implement, and ensures that we don't reject blocks or transactions
//! for a non-enumerated reason.
//!
//! Every error maps to a stable numeric reject code (sent on the wire to
//! peers) and a DoS score: 100 for consensus violations, 0 where the
//! original chain tolerated the condition without penalizing the peer.

use thiserror::Error;

use bzx_state::ValidateContextError;

/// The stable wire values of the reject codes.
pub mod reject {
    /// The transaction or block is structurally malformed.
    pub const REJECT_MALFORMED: u8 = 0x01;
    /// Generic consensus violation.
    pub const REJECT_INVALID: u8 = 0x10;
    /// No coins were minted for the referenced denomination and group.
    pub const NO_MINT_ZEROCOIN: u8 = 0x51;
    /// The spend input's sequence field carries a bad group id or version.
    pub const NSEQUENCE_INCORRECT: u8 = 0x52;
    /// The mint output's public coin failed validation.
    pub const PUBCOIN_NOT_VALIDATE: u8 = 0x53;
    /// A founders reward output is missing.
    pub const REJECT_FOUNDER_REWARD_MISSING: u8 = 0x54;
    /// Too many outputs match the bznode payment value.
    pub const REJECT_INVALID_BZNODE_PAYMENT: u8 = 0x55;
}

/// Transaction-level consensus violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    /// Spend transactions carry exactly one input.
    #[error("zerocoin spend transactions can't have more than one input")]
    MultipleSpendInputs,

    /// The spend input's sequence field is not a usable group id.
    #[error("zerocoin spend nSequence is incorrect")]
    SpendGroupId,

    /// The spend script is too short or its proof fails to deserialize.
    #[error("invalid zerocoin spend script")]
    MalformedSpendScript,

    /// The spend proof's version is not 1, 1.5, or 2.
    #[error("incorrect zerocoin spend version")]
    WrongSpendVersion,

    /// Groups past the v2 threshold only accept version 2 proofs.
    #[error("zerocoin spend should be version 2 for this group")]
    SpendVersionMustBeV2,

    /// Version 1 spends can no longer enter the mempool.
    #[error("cannot allow version 1 spends into the mempool at this height")]
    SpendV1MempoolExpired,

    /// Modulus v2 proofs are not active yet.
    #[error("cannot use modulus v2 at this point")]
    ModulusV2NotActive,

    /// Modulus v1 proofs are no longer accepted.
    #[error("cannot use modulus v1 at this point")]
    ModulusV1Expired,

    /// The referenced accumulator group does not exist.
    #[error("no coins were minted with such parameters")]
    NoMintedCoins,

    /// The spend proof failed against every candidate accumulator state.
    #[error("zerocoin spend verification failed")]
    SpendProofInvalid,

    /// The mint output script is too short to carry a public coin.
    #[error("mint output script is malformed")]
    MalformedMintScript,

    /// The mint output value is not a legal denomination.
    #[error("public coin denomination is invalid")]
    MintDenomination,

    /// The minted public coin failed validation.
    #[error("public coin validation failed")]
    PubCoinInvalid,

    /// A spend transaction output value is not a legal denomination.
    #[error("invalid spend transaction output value")]
    SpendOutputDenomination,

    /// A contextual check against the chain state failed.
    #[error(transparent)]
    Context(#[from] ValidateContextError),
}

impl TransactionError {
    /// The stable reject code reported for this error.
    pub fn reject_code(&self) -> u8 {
        use TransactionError::*;
        match self {
            MultipleSpendInputs | MalformedSpendScript => reject::REJECT_MALFORMED,
            SpendGroupId | WrongSpendVersion | SpendVersionMustBeV2 | ModulusV2NotActive
            | ModulusV1Expired => reject::NSEQUENCE_INCORRECT,
            NoMintedCoins => reject::NO_MINT_ZEROCOIN,
            MalformedMintScript | MintDenomination | PubCoinInvalid => {
                reject::PUBCOIN_NOT_VALIDATE
            }
            SpendV1MempoolExpired | SpendProofInvalid | SpendOutputDenomination | Context(_) => {
                reject::REJECT_INVALID
            }
        }
    }

    /// The DoS score charged to the submitting peer.
    pub fn dos_score(&self) -> u32 {
        use TransactionError::*;
        match self {
            // the original chain dropped these without penalizing the peer
            SpendV1MempoolExpired | SpendProofInvalid => 0,
            Context(ValidateContextError::SpendV1GracePeriodExpired { .. }) => 0,
            _ => 100,
        }
    }
}

/// Block-level consensus violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockError {
    /// A required founders reward output is missing.
    #[error("founders reward missing")]
    FoundersRewardMissing,

    /// More than two outputs match the bznode payment value.
    #[error("invalid bznode payment")]
    InvalidBznodePayment,

    /// The header's difficulty threshold is negative, zero, or overflows.
    #[error("invalid difficulty threshold in block header")]
    InvalidDifficulty,

    /// The header's difficulty threshold is easier than the limit.
    #[error("block difficulty threshold is easier than the proof-of-work limit")]
    TargetDifficultyLimit,

    /// The block hash does not meet its difficulty threshold.
    #[error("block hash is easier than its difficulty threshold")]
    DifficultyFilter,

    /// A transaction in the block failed validation.
    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

impl BlockError {
    /// The stable reject code reported for this error.
    pub fn reject_code(&self) -> u8 {
        use BlockError::*;
        match self {
            FoundersRewardMissing => reject::REJECT_FOUNDER_REWARD_MISSING,
            InvalidBznodePayment => reject::REJECT_INVALID_BZNODE_PAYMENT,
            InvalidDifficulty | TargetDifficultyLimit | DifficultyFilter => reject::REJECT_INVALID,
            Transaction(e) => e.reject_code(),
        }
    }

    /// The DoS score charged to the submitting peer.
    pub fn dos_score(&self) -> u32 {
        match self {
            BlockError::Transaction(e) => e.dos_score(),
            _ => 100,
        }
    }
}
