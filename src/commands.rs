//! HD44780 instruction set and PCF8574 backpack pin masks.
//!
//! The controller takes 8-bit instructions; each instruction is a base
//! opcode with option flags OR'd into its low bits:
//! `CMD_DISPLAY_CONTROL | DISPLAY_ON | CURSOR_ON`.
//!
//! The backpack exposes one GPIO byte. The upper nibble carries the four
//! controller data lines (D4–D7), the lower nibble carries the control
//! lines listed under *Backpack pin masks*.

// ---------------------------------------------------------------------------
// Instructions
// ---------------------------------------------------------------------------

/// Clear DDRAM and return the address counter to 0. Needs the long settle.
pub const CMD_CLEAR: u8 = 0x01;

/// Return the address counter to 0 and undo any display shift. Needs the
/// long settle.
pub const CMD_HOME: u8 = 0x02;

/// Cursor movement direction and display shift after each data write.
pub const CMD_ENTRY_MODE: u8 = 0x04;

/// Display / cursor / blink on-off control.
pub const CMD_DISPLAY_CONTROL: u8 = 0x08;

/// Move the cursor or shift the whole display by one cell.
pub const CMD_SHIFT: u8 = 0x10;

/// Interface width, line count and font.
pub const CMD_FUNCTION_SET: u8 = 0x20;

/// Set the CGRAM address (custom glyph rows). Address in the low 6 bits.
pub const CMD_SET_CGRAM: u8 = 0x40;

/// Set the DDRAM address (cursor position). Address in the low 7 bits.
pub const CMD_SET_DDRAM: u8 = 0x80;

// ---------------------------------------------------------------------------
// Instruction flags
// ---------------------------------------------------------------------------

/// Entry mode: address counter increments after each write.
pub const ENTRY_INCREMENT: u8 = 0x02;

/// Entry mode: shift the display along with the cursor (not used).
pub const ENTRY_SHIFT: u8 = 0x01;

/// Display control: DDRAM contents visible.
pub const DISPLAY_ON: u8 = 0x04;

/// Display control: underline cursor visible.
pub const CURSOR_ON: u8 = 0x02;

/// Display control: blinking block at the cursor cell.
pub const BLINK_ON: u8 = 0x01;

/// Shift: move the display window rather than the cursor.
pub const SHIFT_DISPLAY: u8 = 0x08;

/// Shift: direction right (left when clear).
pub const SHIFT_RIGHT: u8 = 0x04;

/// Function set: two-line DDRAM addressing. 4-bit bus and 5×8 font are the
/// cleared bits.
pub const FUNCTION_2LINE: u8 = 0x08;

// ---------------------------------------------------------------------------
// Backpack pin masks
// ---------------------------------------------------------------------------

/// Register select: 0 = instruction, 1 = data.
pub const MASK_RS: u8 = 0x01;

/// Read/write line. Tied low on the wiring this driver supports.
pub const MASK_RW: u8 = 0x02;

/// Enable strobe. The controller latches the data lines on the falling edge.
pub const MASK_E: u8 = 0x04;

/// Backlight LED transistor.
pub const MASK_BACKLIGHT: u8 = 0x08;

// ---------------------------------------------------------------------------
// Initialisation nibbles
// ---------------------------------------------------------------------------

/// Upper nibble sent three times to force the controller into a known
/// 8-bit state.
pub const WAKE_NIBBLE: u8 = 0x30;

/// Upper nibble that switches the interface to 4-bit mode.
pub const FOUR_BIT_NIBBLE: u8 = 0x20;

// ---------------------------------------------------------------------------
// Timing (busy flag is unreadable, so every wait is a fixed delay)
// ---------------------------------------------------------------------------

/// Power-on settle before the first wake nibble (datasheet: > 40 ms).
pub const POWER_ON_DELAY_MS: u32 = 60;

/// Wait after the first wake nibble (datasheet: > 4.1 ms).
pub const WAKE_FIRST_DELAY_US: u32 = 6_000;

/// Wait after the second and third wake nibbles (datasheet: > 100 µs).
pub const WAKE_NEXT_DELAY_US: u32 = 150;

/// Settle after clear / home (datasheet: 1.52 ms).
pub const LONG_COMMAND_DELAY_US: u32 = 2_000;

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Bytes per I2C write when draining the write buffer.
pub const FLUSH_CHUNK_SIZE: usize = 8;

/// Backpack addresses preferred during auto-detection, in priority order.
pub const PREFERRED_ADDRESSES: [u8; 2] = [0x27, 0x3F];

/// Number of programmable glyph slots in CGRAM.
pub const GLYPH_SLOTS: u8 = 8;

/// Pixel rows per 5×8 glyph.
pub const GLYPH_ROWS: usize = 8;

/// Bits used per glyph row.
pub const GLYPH_ROW_MASK: u8 = 0x1F;
