//! PCF8574 backpack bus cycles.
//!
//! Encodes controller bytes into 4-bit transfers on the backpack's single
//! GPIO byte and queues them in the [`WriteBuffer`].
//!
//! This module is crate-private; consumers go through [`Lcd2004`].
//!
//! [`Lcd2004`]: crate::Lcd2004

use embedded_hal_async::i2c::I2c;

use crate::address::{self, ScanResult};
use crate::buffer::WriteBuffer;
use crate::commands::{MASK_BACKLIGHT, MASK_E, MASK_RS};
use crate::error::LcdError;

/// Register select: which controller register a byte goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Register {
    /// Instruction register (RS = 0).
    Command,
    /// Data register, DDRAM or CGRAM depending on the last address set (RS = 1).
    Data,
}

impl Register {
    fn bit(self) -> u8 {
        match self {
            Register::Command => 0,
            Register::Data => MASK_RS,
        }
    }
}

/// Owns the I2C peripheral, the backlight latch and the write buffer.
pub(crate) struct Backpack<I2C> {
    i2c: I2C,
    address: Option<u8>,
    backlight: bool,
    buffer: WriteBuffer,
}

impl<I2C> Backpack<I2C>
where
    I2C: I2c,
{
    pub fn new(i2c: I2C, backlight: bool) -> Self {
        Self {
            i2c,
            address: None,
            backlight,
            buffer: WriteBuffer::new(),
        }
    }

    pub fn address(&self) -> Option<u8> {
        self.address
    }

    pub fn set_address(&mut self, address: u8) {
        self.address = Some(address);
    }

    /// Forget the address and anything queued, as before `init()`.
    pub fn reset(&mut self) {
        self.address = None;
        self.buffer.clear();
    }

    pub fn backlight(&self) -> bool {
        self.backlight
    }

    pub fn set_backlight(&mut self, on: bool) {
        self.backlight = on;
    }

    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn i2c_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    fn backlight_bit(&self) -> u8 {
        if self.backlight {
            MASK_BACKLIGHT
        } else {
            0
        }
    }

    /// Queue one 4-bit transfer carrying the upper nibble of `byte`.
    ///
    /// Two GPIO bytes: data lines + RS + backlight with E high, then the
    /// same with E low. The controller latches on the falling edge.
    pub async fn queue_nibble(
        &mut self,
        byte: u8,
        register: Register,
    ) -> Result<(), LcdError<I2C::Error>> {
        if self.address.is_none() {
            return Err(LcdError::NotInitialized);
        }

        let data = (byte & 0xF0) | self.backlight_bit() | register.bit();
        if !self.buffer.has_room(2) {
            self.flush().await?;
        }
        let queued = self.buffer.push(&[data | MASK_E, data]);
        debug_assert!(queued, "room was made above");
        Ok(())
    }

    /// Queue a full byte as two nibble transfers, high nibble first.
    pub async fn queue_byte(
        &mut self,
        byte: u8,
        register: Register,
    ) -> Result<(), LcdError<I2C::Error>> {
        self.queue_nibble(byte, register).await?;
        self.queue_nibble(byte << 4, register).await
    }

    /// Send the backlight state as one standalone GPIO byte.
    ///
    /// E stays low, so the controller sees no strobe. Anything already
    /// queued goes out first to keep bus order.
    pub async fn apply_backlight(&mut self) -> Result<(), LcdError<I2C::Error>> {
        let address = self.address.ok_or(LcdError::NotInitialized)?;
        self.flush().await?;
        let byte = self.backlight_bit();
        self.i2c.write(address, &[byte]).await?;
        Ok(())
    }

    /// Drain the write buffer to the backpack.
    ///
    /// The buffer is cleared even when the transport fails.
    pub async fn flush(&mut self) -> Result<(), LcdError<I2C::Error>> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let Some(address) = self.address else {
            self.buffer.clear();
            return Err(LcdError::NotInitialized);
        };

        match self.buffer.drain(&mut self.i2c, address).await {
            Ok(()) => Ok(()),
            Err(e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("LCD flush to {=u8:#x} failed; buffered bytes dropped", address);
                Err(LcdError::I2c(e))
            }
        }
    }

    pub async fn scan(&mut self) -> ScanResult {
        address::scan(&mut self.i2c).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::WRITE_BUFFER_CAPACITY;
    use crate::mock::{backlight_byte, data, encode, flush_of, I2cMock, I2cTransaction, ADDR};
    use embassy_futures::block_on;
    use embedded_hal_async::i2c::ErrorKind;
    use std::vec::Vec;

    fn backpack(backlight: bool, expected: &[I2cTransaction]) -> Backpack<I2cMock> {
        let mut bp = Backpack::new(I2cMock::new(expected), backlight);
        bp.set_address(ADDR);
        bp
    }

    #[test]
    fn nibble_is_strobed_high_then_low() {
        let mut bp = backpack(true, &[I2cTransaction::write(ADDR, std::vec![0x3C, 0x38])]);
        block_on(bp.queue_nibble(0x30, Register::Command)).unwrap();
        block_on(bp.flush()).unwrap();
        bp.release().done();
    }

    #[test]
    fn byte_splits_high_nibble_first_with_rs() {
        // 'A' = 0x41: nibble 0x4 then 0x1, RS set, backlight off.
        let mut bp = backpack(
            false,
            &[I2cTransaction::write(ADDR, std::vec![0x45, 0x41, 0x15, 0x11])],
        );
        block_on(bp.queue_byte(b'A', Register::Data)).unwrap();
        block_on(bp.flush()).unwrap();
        bp.release().done();
    }

    #[test]
    fn queueing_before_address_is_known_fails() {
        let mut bp = Backpack::new(I2cMock::new(&[]), true);
        assert!(matches!(
            block_on(bp.queue_byte(0x01, Register::Command)),
            Err(LcdError::NotInitialized)
        ));
        assert_eq!(bp.pending(), 0);
        bp.release().done();
    }

    #[test]
    fn backlight_byte_never_strobes() {
        for on in [true, false] {
            let mut bp = backpack(on, &[backlight_byte(on)]);
            block_on(bp.apply_backlight()).unwrap();
            bp.release().done();
        }
    }

    #[test]
    fn backlight_goes_out_after_pending_cycles() {
        let mut expected = flush_of(&[data(b'x')], true);
        expected.push(backlight_byte(true));
        let mut bp = backpack(true, &expected);
        block_on(bp.queue_byte(b'x', Register::Data)).unwrap();
        block_on(bp.apply_backlight()).unwrap();
        bp.release().done();
    }

    #[test]
    fn full_buffer_flushes_early_and_keeps_order() {
        let cycles = WRITE_BUFFER_CAPACITY / 4 + 10;
        let transfers: Vec<_> = (0..cycles).map(|i| data(i as u8)).collect();
        // The early flush ends on a chunk boundary, so the whole run reads
        // as one continuous stream of 8-byte writes.
        let mut bp = backpack(true, &flush_of(&transfers, true));
        for i in 0..cycles {
            block_on(bp.queue_byte(i as u8, Register::Data)).unwrap();
        }
        assert_eq!(bp.pending(), 10 * 4);
        block_on(bp.flush()).unwrap();
        bp.release().done();
    }

    #[test]
    fn failed_flush_drops_pending_bytes() {
        let expected =
            [I2cTransaction::write(ADDR, encode(&[data(b'x')], true)).with_error(ErrorKind::Bus)];
        let mut bp = backpack(true, &expected);
        block_on(bp.queue_byte(b'x', Register::Data)).unwrap();
        assert!(matches!(block_on(bp.flush()), Err(LcdError::I2c(ErrorKind::Bus))));
        assert_eq!(bp.pending(), 0);
        bp.release().done();
    }

    #[test]
    fn reset_forgets_address_and_queue() {
        let mut bp = backpack(true, &[]);
        block_on(bp.queue_byte(b'x', Register::Data)).unwrap();
        bp.reset();
        assert_eq!(bp.address(), None);
        assert_eq!(bp.pending(), 0);
        bp.release().done();
    }
}
