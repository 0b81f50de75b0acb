//! Outgoing backpack bytes, queued until flushed.
//!
//! Every nibble transfer is two GPIO bytes; a single character costs four.
//! Queueing them lets a whole screen render go out as a handful of I2C
//! writes instead of hundreds.

use embedded_hal_async::i2c::I2c;
use heapless::Vec;

use crate::commands::FLUSH_CHUNK_SIZE;

/// Capacity of the write buffer in bytes.
///
/// A full 20×4 render (4 × (1 + 20) bytes, 4 GPIO bytes each) fits.
pub const WRITE_BUFFER_CAPACITY: usize = 384;

/// Append-only queue of backpack GPIO bytes.
#[derive(Debug, Default)]
pub struct WriteBuffer {
    bytes: Vec<u8, WRITE_BUFFER_CAPACITY>,
}

impl WriteBuffer {
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Queue `bytes` if they all fit. Returns `false` (queueing nothing)
    /// when the buffer lacks room.
    pub fn push(&mut self, bytes: &[u8]) -> bool {
        self.bytes.extend_from_slice(bytes).is_ok()
    }

    /// `true` if `n` more bytes fit.
    pub fn has_room(&self, n: usize) -> bool {
        self.bytes.len() + n <= WRITE_BUFFER_CAPACITY
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Send every queued byte to `address` in [`FLUSH_CHUNK_SIZE`] writes.
    ///
    /// The buffer is empty afterwards whether or not the transport
    /// succeeded. Chunks after a failed one are not sent and nothing is
    /// retried.
    pub async fn drain<I2C: I2c>(&mut self, i2c: &mut I2C, address: u8) -> Result<(), I2C::Error> {
        let result = Self::send_chunks(i2c, address, &self.bytes).await;
        self.bytes.clear();
        result
    }

    async fn send_chunks<I2C: I2c>(i2c: &mut I2C, address: u8, bytes: &[u8]) -> Result<(), I2C::Error> {
        for chunk in bytes.chunks(FLUSH_CHUNK_SIZE) {
            i2c.write(address, chunk).await?;
        }
        Ok(())
    }
}
