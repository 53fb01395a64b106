//! Coin spends: the zero-knowledge membership proofs consumed by spend
//! transactions.

use std::io;

use byteorder::{ReadBytesExt, WriteBytesExt};
use sha2::{Digest, Sha256};

use crate::block;
use crate::serialization::{BzxDeserialize, BzxSerialize, ReadBzxExt, SerializationError};
use crate::transaction;

use super::{params, Accumulator, AccumulatorWitness, BigNum, Denomination, PublicCoin};

/// The original spend proof version.
pub const SPEND_VERSION_V1: u8 = 1;

/// The transitional proof version that added transaction binding and the
/// accumulator block hash hint.
pub const SPEND_VERSION_V1_5: u8 = 15;

/// The proof version required for modulus v2 groups.
pub const SPEND_VERSION_V2: u8 = 2;

/// The transaction context a v1.5/v2 spend proof commits to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SpendMetadata {
    /// The raw accumulator group id from the spend input's sequence field.
    pub accumulator_id: u32,
    /// The hash of the spending transaction with all spend scripts blanked.
    pub tx_hash: transaction::Hash,
}

impl SpendMetadata {
    /// The digest bound into v1.5/v2 spend proofs.
    pub fn digest(&self) -> [u8; 32] {
        let mut data = Vec::with_capacity(36);
        data.extend_from_slice(&self.accumulator_id.to_le_bytes());
        data.extend_from_slice(&self.tx_hash.0);
        let first = Sha256::digest(&data);
        let second = Sha256::digest(first);
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&second);
        digest
    }
}

/// A deserialized spend proof.
///
/// Consensus code reads the version, denomination, serial, and accumulator
/// block hash, and calls [`verify`](Self::verify); the proof material itself
/// is opaque.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CoinSpend {
    version: u8,
    denomination: Denomination,
    serial: BigNum,
    accumulator_block_hash: block::Hash,
    proof_coin: BigNum,
    proof_witness: BigNum,
    metadata_digest: [u8; 32],
}

impl CoinSpend {
    /// Create a spend proof for `coin` from its membership `witness`.
    ///
    /// `accumulator_block_hash` may be [`block::Hash::NULL`]; v1.5/v2 spends
    /// use it to point verifiers at the exact accumulator state.
    pub fn create(
        version: u8,
        serial: BigNum,
        coin: &PublicCoin,
        witness: &AccumulatorWitness,
        accumulator_block_hash: block::Hash,
        metadata: &SpendMetadata,
    ) -> CoinSpend {
        CoinSpend {
            version,
            denomination: coin.denomination(),
            serial,
            accumulator_block_hash,
            proof_coin: coin.value().clone(),
            proof_witness: witness.value().clone(),
            metadata_digest: metadata.digest(),
        }
    }

    /// Parse a spend proof from its serialized bytes.
    pub fn parse(bytes: &[u8]) -> Result<CoinSpend, SerializationError> {
        CoinSpend::bzx_deserialize(bytes)
    }

    /// The proof version.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Override the proof version.
    ///
    /// Validation coerces version 2 proofs back to version 1 for groups
    /// that predate the v2 threshold.
    pub fn set_version(&mut self, version: u8) {
        self.version = version;
    }

    /// The denomination this spend claims.
    pub fn denomination(&self) -> Denomination {
        self.denomination
    }

    /// The serial number revealed by this spend.
    pub fn serial(&self) -> &BigNum {
        &self.serial
    }

    /// The accumulator block hash hint, or the null hash.
    pub fn accumulator_block_hash(&self) -> &block::Hash {
        &self.accumulator_block_hash
    }

    /// Verify this proof against a candidate accumulator state.
    ///
    /// Version 1 proofs do not commit to the transaction context; later
    /// versions require the metadata digest to match.
    pub fn verify(&self, accumulator: &Accumulator, metadata: &SpendMetadata) -> bool {
        if self.denomination != accumulator.denomination() {
            return false;
        }
        if self.version != SPEND_VERSION_V1 && self.metadata_digest != metadata.digest() {
            return false;
        }
        let modulus = &params(accumulator.param_set()).modulus;
        self.proof_witness.modpow(&self.proof_coin, modulus) == *accumulator.value()
    }
}

impl BzxSerialize for CoinSpend {
    fn bzx_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_u8(self.version)?;
        writer.write_u8(self.denomination.units() as u8)?;
        self.serial.bzx_serialize(&mut writer)?;
        self.proof_coin.bzx_serialize(&mut writer)?;
        self.proof_witness.bzx_serialize(&mut writer)?;
        writer.write_all(&self.accumulator_block_hash.0)?;
        writer.write_all(&self.metadata_digest)
    }
}

impl BzxDeserialize for CoinSpend {
    fn bzx_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let version = reader.read_u8()?;
        let denomination = Denomination::from_units(reader.read_u8()? as i64)
            .ok_or(SerializationError::Parse("invalid spend denomination"))?;
        let serial = BigNum::bzx_deserialize(&mut reader)?;
        let proof_coin = BigNum::bzx_deserialize(&mut reader)?;
        let proof_witness = BigNum::bzx_deserialize(&mut reader)?;
        let accumulator_block_hash = block::Hash(reader.read_32_bytes()?);
        let metadata_digest = reader.read_32_bytes()?;
        Ok(CoinSpend {
            version,
            denomination,
            serial,
            accumulator_block_hash,
            proof_coin,
            proof_witness,
            metadata_digest,
        })
    }
}
