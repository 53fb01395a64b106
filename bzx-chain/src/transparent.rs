//! Transparent transaction components: scripts, inputs, and outputs.

use std::{fmt, io};

use byteorder::{LittleEndian, WriteBytesExt};

use crate::amount::Amount;
use crate::serialization::{BzxSerialize, WriteBzxExt};
use crate::transaction;
use crate::zerocoin::BigNum;

/// The script opcode that marks an output as a zerocoin mint.
pub const OP_ZEROCOIN_MINT: u8 = 0xc1;

/// The script opcode that marks an input as a zerocoin spend.
pub const OP_ZEROCOIN_SPEND: u8 = 0xc2;

const OP_PUSHDATA2: u8 = 0x4d;
const OP_PUSHDATA4: u8 = 0x4e;

/// An encoding of a Bitcoin script.
#[derive(Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Default)]
pub struct Script(pub Vec<u8>);

impl Script {
    /// Create a new Bitcoin script from its raw bytes.
    pub fn new(bytes: &[u8]) -> Self {
        Script(bytes.to_vec())
    }

    /// Return the raw bytes of the script.
    pub fn as_raw_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns true if the script has no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if this script is a zerocoin mint output script.
    ///
    /// Mint scripts carry the serialized public coin starting at byte 6,
    /// after the marker opcode and the four-byte push length.
    pub fn is_zerocoin_mint(&self) -> bool {
        self.0.first() == Some(&OP_ZEROCOIN_MINT)
    }

    /// Returns true if this script is a zerocoin spend input script.
    ///
    /// Spend scripts carry the serialized coin spend starting at byte 4,
    /// after the marker opcode and the two-byte push length.
    pub fn is_zerocoin_spend(&self) -> bool {
        self.0.first() == Some(&OP_ZEROCOIN_SPEND)
    }

    /// Build a zerocoin mint output script committing `pub_coin`.
    pub fn zerocoin_mint(pub_coin: &BigNum) -> Script {
        let payload = pub_coin.to_bytes_le();
        let mut bytes = Vec::with_capacity(6 + payload.len());
        bytes.push(OP_ZEROCOIN_MINT);
        bytes.push(OP_PUSHDATA4);
        bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&payload);
        Script(bytes)
    }

    /// Build a zerocoin spend input script wrapping a serialized coin spend.
    pub fn zerocoin_spend(spend_bytes: &[u8]) -> Script {
        let mut bytes = Vec::with_capacity(4 + spend_bytes.len());
        bytes.push(OP_ZEROCOIN_SPEND);
        bytes.push(OP_PUSHDATA2);
        bytes.extend_from_slice(&(spend_bytes.len() as u16).to_le_bytes());
        bytes.extend_from_slice(spend_bytes);
        Script(bytes)
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Script")
            .field(&hex::encode(&self.0))
            .finish()
    }
}

impl BzxSerialize for Script {
    fn bzx_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_compactsize(self.0.len() as u64)?;
        writer.write_all(&self.0)
    }
}

/// A reference to an output of an earlier transaction.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    /// The hash of the transaction containing the output to spend.
    pub hash: transaction::Hash,
    /// The index of the output to spend in its transaction.
    pub index: u32,
}

impl OutPoint {
    /// The null outpoint, used by coinbase inputs and zerocoin spends.
    pub const NULL: OutPoint = OutPoint {
        hash: transaction::Hash([0; 32]),
        index: u32::MAX,
    };

    /// Returns true if this is the null outpoint.
    pub fn is_null(&self) -> bool {
        *self == OutPoint::NULL
    }
}

impl BzxSerialize for OutPoint {
    fn bzx_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_all(&self.hash.0)?;
        writer.write_u32::<LittleEndian>(self.index)
    }
}

/// A transparent transaction input.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Input {
    /// The previous output being spent. Null for coinbase inputs and
    /// zerocoin spends.
    pub outpoint: OutPoint,
    /// The script that authorizes spending the previous output. For a
    /// zerocoin spend it wraps the serialized spend proof instead.
    pub unlock_script: Script,
    /// The sequence number. Zerocoin spends reuse this field to carry the
    /// accumulator group id.
    pub sequence: u32,
}

impl BzxSerialize for Input {
    fn bzx_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.outpoint.bzx_serialize(&mut writer)?;
        self.unlock_script.bzx_serialize(&mut writer)?;
        writer.write_u32::<LittleEndian>(self.sequence)
    }
}

/// A transparent transaction output.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Output {
    /// The value of the output, in satoshis.
    pub value: Amount,
    /// The script controlling who can spend this output. For a zerocoin
    /// mint it wraps the serialized public coin instead.
    pub lock_script: Script,
}

impl BzxSerialize for Output {
    fn bzx_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.value.bzx_serialize(&mut writer)?;
        self.lock_script.bzx_serialize(&mut writer)
    }
}
