//! Async driver for HD44780 character LCDs (20×4 by default) behind a
//! PCF8574 I2C backpack.
//!
//! This crate provides [`Lcd2004`], which turns cursor, text, glyph and
//! latch operations into buffered 4-bit bus cycles, and [`TextConsole`],
//! an auto-scrolling log on top of it. With the `task` feature,
//! [`console_task`] feeds a console from an Embassy channel.
//!
//! # Quick Start
//!
//! ```ignore
//! use lcd2004_rs::{ConsoleConfig, Lcd2004, LcdConfig, TextConsole};
//!
//! let mut lcd = Lcd2004::new(i2c, delay, LcdConfig::default());
//! lcd.init().await?;
//!
//! let mut console = TextConsole::new(&mut lcd, ConsoleConfig::default()).await?;
//! console.log("Booting...").await?;
//! console.log("I2C: OK\nSensors: OK").await?;
//! ```
//!
//! # Crate Features
//!
//! - **`defmt`** - structured logging via [`defmt`].
//! - **`task`** - [`console_task`] and [`EmbassyLcd`] (pulls in
//!   `embassy-sync` and `embassy-time`).

#![no_std]

#[cfg(test)]
extern crate std;

mod address;
mod buffer;
mod bus;
pub mod commands;
pub mod config;
pub mod console;
#[cfg(feature = "task")]
pub mod console_task;
pub mod driver;
pub mod error;
pub mod geometry;

#[cfg(test)]
mod mock;

// ── Re-exports for convenience ───────────────────────────────────────────

pub use address::ScanResult;
pub use config::{ConsoleConfig, LcdConfig, Orientation, HISTORY_CAPACITY};
pub use console::{ConsoleLine, TextConsole};
#[cfg(feature = "task")]
pub use console_task::{console_task, LogMessage};
#[cfg(feature = "task")]
pub use driver::EmbassyLcd;
pub use driver::{char_code, Batch, Lcd2004};
pub use error::{ConfigError, LcdError};
pub use geometry::Geometry;
