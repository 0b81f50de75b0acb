//! Construction-time configuration for the driver and the console.

use core::str::FromStr;

use crate::error::ConfigError;
use crate::geometry::Geometry;

/// Configuration for [`Lcd2004`](crate::Lcd2004).
///
/// [`LcdConfig::default()`] targets a 20×4 module at an auto-detected
/// address with the backlight on and auto-flush enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LcdConfig {
    /// 7-bit backpack address. `None` scans the bus during `init()`.
    pub address: Option<u8>,
    /// Grid size and DDRAM row map.
    pub geometry: Geometry,
    /// Initial backlight state. Default: on.
    pub backlight: bool,
    /// Flush after every public operation. Default: on.
    pub auto_flush: bool,
    /// Initial display-on latch. Default: on.
    pub display_on: bool,
    /// Initial underline-cursor latch. Default: off.
    pub cursor_visible: bool,
    /// Initial blinking-block latch. Default: off.
    pub blink: bool,
}

impl Default for LcdConfig {
    fn default() -> Self {
        Self {
            address: None,
            geometry: Geometry::LCD2004,
            backlight: true,
            auto_flush: true,
            display_on: true,
            cursor_visible: false,
            blink: false,
        }
    }
}

/// Where new console lines appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Newest line on the bottom row; older lines scroll up.
    #[default]
    NewestAtBottom,
    /// Newest line on the top row; older lines scroll down.
    NewestAtTop,
}

impl Orientation {
    /// Map the "recent first" flag: `true` puts the newest line on top.
    pub const fn from_recent_first(recent_first: bool) -> Self {
        if recent_first {
            Orientation::NewestAtTop
        } else {
            Orientation::NewestAtBottom
        }
    }

    pub const fn is_recent_first(self) -> bool {
        matches!(self, Orientation::NewestAtTop)
    }
}

impl FromStr for Orientation {
    type Err = ConfigError;

    /// Accepts `"bottom"` and `"top"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bottom" => Ok(Orientation::NewestAtBottom),
            "top" => Ok(Orientation::NewestAtTop),
            _ => Err(ConfigError::UnknownOrientation),
        }
    }
}

impl From<bool> for Orientation {
    fn from(recent_first: bool) -> Self {
        Self::from_recent_first(recent_first)
    }
}

/// Upper bound for [`ConsoleConfig::max_history`].
pub const HISTORY_CAPACITY: usize = 64;

/// Configuration for [`TextConsole`](crate::TextConsole).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Scroll direction. Default: newest at bottom.
    pub orientation: Orientation,
    /// Wrap long lines onto following rows instead of truncating.
    /// Default: on.
    pub wrap: bool,
    /// Lines kept in the history buffer, `1..=HISTORY_CAPACITY`.
    /// Default: 4 (no history beyond a 20×4 screen).
    pub max_history: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::NewestAtBottom,
            wrap: true,
            max_history: 4,
        }
    }
}

impl ConsoleConfig {
    /// Reject settings the console cannot honour.
    ///
    /// # Errors
    /// [`ConfigError::InvalidHistory`] if `max_history` is zero or above
    /// [`HISTORY_CAPACITY`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_history == 0 || self.max_history > HISTORY_CAPACITY {
            return Err(ConfigError::InvalidHistory);
        }
        Ok(())
    }
}
