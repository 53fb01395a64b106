use std::io;

use byteorder::{LittleEndian, WriteBytesExt};
use chrono::{DateTime, Utc};

use crate::serialization::BzxSerialize;
use crate::work::difficulty::CompactDifficulty;

use super::{merkle, Hash};

/// A block header, containing metadata about a block.
///
/// How are blocks chained together? They are chained together via the
/// backwards reference (`previous_block_hash`) present in the block
/// header. Each block points backwards to its parent, all the way
/// back to the genesis block (the first block in the blockchain).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// The block's version field.
    pub version: i32,

    /// The hash of the previous block, used to create the chain of blocks back
    /// to the genesis block.
    pub previous_block_hash: Hash,

    /// The root of the transaction merkle tree, binding the block header to
    /// the transactions in the block.
    pub merkle_root: merkle::Root,

    /// The block timestamp. Serialized as seconds since the Unix epoch.
    pub time: DateTime<Utc>,

    /// The difficulty threshold of this block's hash, in compact form.
    pub difficulty_threshold: CompactDifficulty,

    /// The nonce used in the version messages, `Nonce(u64)`, is distinct from
    /// this nonce, which is iterated by miners to find a hash under the
    /// difficulty threshold.
    pub nonce: u32,
}

impl BzxSerialize for Header {
    fn bzx_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_i32::<LittleEndian>(self.version)?;
        self.previous_block_hash.bzx_serialize(&mut writer)?;
        writer.write_all(&self.merkle_root.0)?;
        writer.write_u32::<LittleEndian>(
            u32::try_from(self.time.timestamp()).expect("block times fit in u32"),
        )?;
        writer.write_u32::<LittleEndian>(self.difficulty_threshold.0)?;
        writer.write_u32::<LittleEndian>(self.nonce)?;
        Ok(())
    }
}
