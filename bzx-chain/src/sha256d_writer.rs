//! A Writer for SHA-256d (two rounds of SHA-256) hashing.

use std::io::prelude::*;

use sha2::{Digest, Sha256};

/// A type that lets you write out SHA256d (double-SHA256, as in two rounds).
#[derive(Default)]
pub struct Sha256dWriter {
    hash: Sha256,
}

impl Sha256dWriter {
    /// Consume the Writer and produce the hash result.
    pub fn finish(self) -> [u8; 32] {
        let result1 = self.hash.finalize();
        let result2 = Sha256::digest(result1);
        let mut buffer = [0u8; 32];
        buffer.copy_from_slice(&result2[0..32]);
        buffer
    }
}

impl Write for Sha256dWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.hash.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
