//! Expected-traffic builders for tests against `embedded-hal-mock`.
//!
//! Tests describe controller transfers as `(rs, byte)` pairs and turn them
//! into the exact I2C writes the backpack should see.

use std::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::{ErrorKind, NoAcknowledgeSource};
pub use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

use crate::commands::*;
use crate::driver::char_code;

/// Backpack address used throughout the tests.
pub const ADDR: u8 = 0x27;

/// One controller transfer: register select and byte.
pub type Transfer = (bool, u8);

pub fn cmd(byte: u8) -> Transfer {
    (false, byte)
}

pub fn data(byte: u8) -> Transfer {
    (true, byte)
}

/// Data transfers for `text`, one per character.
pub fn text(text: &str) -> Vec<Transfer> {
    text.chars().map(|ch| data(char_code(ch))).collect()
}

fn backlight_bit(backlight: bool) -> u8 {
    if backlight {
        MASK_BACKLIGHT
    } else {
        0
    }
}

/// GPIO bytes for `transfers`: two strobed nibbles each, high first.
pub fn encode(transfers: &[Transfer], backlight: bool) -> Vec<u8> {
    let mut bytes = Vec::new();
    for &(rs, byte) in transfers {
        let rs = if rs { MASK_RS } else { 0 };
        for nibble in [byte & 0xF0, byte << 4] {
            let gpio = nibble | backlight_bit(backlight) | rs;
            bytes.push(gpio | MASK_E);
            bytes.push(gpio);
        }
    }
    bytes
}

/// The writes one flush of `transfers` produces.
pub fn flush_of(transfers: &[Transfer], backlight: bool) -> Vec<I2cTransaction> {
    encode(transfers, backlight)
        .chunks(FLUSH_CHUNK_SIZE)
        .map(|chunk| I2cTransaction::write(ADDR, chunk.to_vec()))
        .collect()
}

/// A lone upper-nibble command transfer, as sent during wake-up.
pub fn nibble(value: u8, backlight: bool) -> I2cTransaction {
    let gpio = value | backlight_bit(backlight);
    I2cTransaction::write(ADDR, std::vec![gpio | MASK_E, gpio])
}

/// The standalone, unstrobed backlight byte.
pub fn backlight_byte(backlight: bool) -> I2cTransaction {
    I2cTransaction::write(ADDR, std::vec![backlight_bit(backlight)])
}

/// Full `init()` traffic at [`ADDR`], ending with `control` as the
/// display-control command.
pub fn init_sequence(backlight: bool, control: u8) -> Vec<I2cTransaction> {
    let mut expected = std::vec![
        nibble(WAKE_NIBBLE, backlight),
        nibble(WAKE_NIBBLE, backlight),
        nibble(WAKE_NIBBLE, backlight),
        nibble(FOUR_BIT_NIBBLE, backlight),
    ];
    // Clear forces a flush of everything queued before it.
    expected.extend(flush_of(
        &[
            cmd(CMD_FUNCTION_SET | FUNCTION_2LINE),
            cmd(CMD_DISPLAY_CONTROL),
            cmd(CMD_CLEAR),
        ],
        backlight,
    ));
    expected.extend(flush_of(
        &[cmd(CMD_ENTRY_MODE | ENTRY_INCREMENT), cmd(control)],
        backlight,
    ));
    expected.push(backlight_byte(backlight));
    expected
}

pub fn nack() -> ErrorKind {
    ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
}

/// One zero-length write per non-reserved address; only `present` ACK.
pub fn scan_sequence(present: &[u8]) -> Vec<I2cTransaction> {
    (0x08..=0x77u8)
        .map(|address| {
            let write = I2cTransaction::write(address, Vec::new());
            if present.contains(&address) {
                write
            } else {
                write.with_error(nack())
            }
        })
        .collect()
}

/// Delay provider that returns immediately and records each request in
/// nanoseconds. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct RecordingDelay(Rc<RefCell<Vec<u64>>>);

impl RecordingDelay {
    pub fn delays(&self) -> Vec<u64> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl DelayNs for RecordingDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.0.borrow_mut().push(ns as u64);
    }

    async fn delay_us(&mut self, us: u32) {
        self.0.borrow_mut().push(us as u64 * 1_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.0.borrow_mut().push(ms as u64 * 1_000_000);
    }
}
