//! Consensus-critical serialization.
//!
//! This module contains the `BzxSerialize` and `BzxDeserialize` traits,
//! analogs of the Serde `Serialize` and `Deserialize` traits but intended
//! for the consensus-critical BitcoinZero wire formats, and `WriteBzxExt`
//! and `ReadBzxExt`, extension traits for `io::Read` and `io::Write` with
//! utility functions for the Bitcoin variable-integer format.

use std::io;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use thiserror::Error;

/// A serialization error.
#[derive(Error, Debug)]
pub enum SerializationError {
    /// An io error that prevented deserialization
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// The data to be deserialized was malformed.
    #[error("parse error: {0}")]
    Parse(&'static str),
}

/// Consensus-critical serialization.
pub trait BzxSerialize: Sized {
    /// Write `self` to the given `writer` using the canonical format.
    ///
    /// This function has a `bzx_` prefix to alert the reader that the
    /// serialization in use is consensus-critical serialization, rather
    /// than some other kind of serialization.
    fn bzx_serialize<W: io::Write>(&self, writer: W) -> Result<(), io::Error>;

    /// Helper function to construct a vec to serialize the current struct into.
    fn bzx_serialize_to_vec(&self) -> Vec<u8> {
        let mut data = Vec::new();
        self.bzx_serialize(&mut data)
            .expect("writes to Vec<u8> are infallible");
        data
    }
}

/// Consensus-critical deserialization.
pub trait BzxDeserialize: Sized {
    /// Try to read `self` from the given `reader`.
    fn bzx_deserialize<R: io::Read>(reader: R) -> Result<Self, SerializationError>;
}

/// Extends [`io::Write`] with methods for writing BitcoinZero/Bitcoin types.
pub trait WriteBzxExt: io::Write {
    /// Writes an `u64` using the Bitcoin `CompactSize` encoding.
    fn write_compactsize(&mut self, n: u64) -> io::Result<()> {
        match n {
            0x0000_0000..=0x0000_00fc => self.write_u8(n as u8),
            0x0000_00fd..=0x0000_ffff => {
                self.write_u8(0xfd)?;
                self.write_u16::<LittleEndian>(n as u16)
            }
            0x0001_0000..=0xffff_ffff => {
                self.write_u8(0xfe)?;
                self.write_u32::<LittleEndian>(n as u32)
            }
            _ => {
                self.write_u8(0xff)?;
                self.write_u64::<LittleEndian>(n)
            }
        }
    }
}

impl<W: io::Write> WriteBzxExt for W {}

/// Extends [`io::Read`] with methods for reading BitcoinZero/Bitcoin types.
pub trait ReadBzxExt: io::Read {
    /// Reads an `u64` using the Bitcoin `CompactSize` encoding.
    ///
    /// Rejects non-canonical encodings, which could otherwise be used to
    /// make two distinct byte strings deserialize to the same value.
    fn read_compactsize(&mut self) -> Result<u64, SerializationError> {
        let flag_byte = self.read_u8()?;
        match flag_byte {
            n @ 0x00..=0xfc => Ok(n as u64),
            0xfd => match self.read_u16::<LittleEndian>()? {
                n @ 0x0000_00fd..=0x0000_ffff => Ok(n as u64),
                _ => Err(SerializationError::Parse("non-canonical compactsize")),
            },
            0xfe => match self.read_u32::<LittleEndian>()? {
                n @ 0x0001_0000..=0xffff_ffff => Ok(n as u64),
                _ => Err(SerializationError::Parse("non-canonical compactsize")),
            },
            0xff => match self.read_u64::<LittleEndian>()? {
                n @ 0x1_0000_0000..=0xffff_ffff_ffff_ffff => Ok(n),
                _ => Err(SerializationError::Parse("non-canonical compactsize")),
            },
        }
    }

    /// Convenience method to read a `[u8; 32]`.
    fn read_32_bytes(&mut self) -> io::Result<[u8; 32]> {
        let mut bytes = [0; 32];
        self.read_exact(&mut bytes)?;
        Ok(bytes)
    }
}

impl<R: io::Read> ReadBzxExt for R {}
