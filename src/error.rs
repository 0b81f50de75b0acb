//! Error types for the LCD driver and console.

use core::fmt;

/// Configuration rejected at construction time.
///
/// Raised synchronously by the constructors; never produced by bus traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Row/column counts outside what the controller can address.
    InvalidGeometry,
    /// Console history limit is zero or above the buffer capacity.
    InvalidHistory,
    /// Orientation string was neither `"bottom"` nor `"top"`.
    UnknownOrientation,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::InvalidGeometry => {
                write!(f, "Invalid geometry (1-4 rows, 1-40 columns, max 20 columns for 3-4 rows)")
            }
            ConfigError::InvalidHistory => write!(f, "Invalid console history length"),
            ConfigError::UnknownOrientation => {
                write!(f, "Unknown orientation (must be \"bottom\" or \"top\")")
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ConfigError::InvalidGeometry => defmt::write!(f, "Invalid geometry"),
            ConfigError::InvalidHistory => defmt::write!(f, "Invalid history length"),
            ConfigError::UnknownOrientation => defmt::write!(f, "Unknown orientation"),
        }
    }
}

/// Errors that can occur while driving the display.
///
/// Bus-level failures are never retried: after a failed write the
/// controller state is unknown, so the error goes straight to the caller.
#[derive(Debug)]
pub enum LcdError<E> {
    /// Underlying I2C bus error.
    I2c(E),

    /// Auto-detection scanned the bus and found no devices.
    DeviceNotFound,

    /// An operation needing the bus was attempted before
    /// [`Lcd2004::init()`](crate::Lcd2004::init) succeeded.
    NotInitialized,

    /// Invalid configuration.
    Config(ConfigError),
}

// Allow ergonomic `?` propagation from raw I2C errors.
impl<E> From<E> for LcdError<E> {
    fn from(error: E) -> Self {
        LcdError::I2c(error)
    }
}

impl<E: fmt::Debug> fmt::Display for LcdError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LcdError::I2c(e) => write!(f, "I2C error: {:?}", e),
            LcdError::DeviceNotFound => write!(f, "No I2C device found for the LCD backpack"),
            LcdError::NotInitialized => write!(f, "Display not initialised"),
            LcdError::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for LcdError<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            LcdError::I2c(e) => defmt::write!(f, "I2C error: {}", e),
            LcdError::DeviceNotFound => defmt::write!(f, "Device not found"),
            LcdError::NotInitialized => defmt::write!(f, "Not initialized"),
            LcdError::Config(e) => defmt::write!(f, "Config error: {}", e),
        }
    }
}
