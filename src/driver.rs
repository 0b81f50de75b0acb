//! HD44780 display controller over a PCF8574 backpack.
//!
//! [`Lcd2004`] tracks the controller latches the hardware cannot report
//! back (RW is tied low, so neither the busy flag nor any register can be
//! read) and turns every operation into queued 4-bit bus cycles.

use core::ops::{Deref, DerefMut};

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use crate::address::{self, ScanResult};
use crate::bus::{Backpack, Register};
use crate::commands::*;
use crate::config::LcdConfig;
use crate::error::LcdError;
use crate::geometry::Geometry;

/// Controller character code for `ch`: the code point masked to 8 bits.
///
/// Codes 0–7 select the custom glyph slots, 8–127 the ROM set (ASCII for
/// printable characters), 128–255 the ROM's vendor-specific upper half.
pub fn char_code(ch: char) -> u8 {
    (ch as u32 & 0xFF) as u8
}

/// Async driver for an HD44780 character LCD behind a PCF8574 I2C backpack.
///
/// # Lifecycle
///
/// 1. [`Lcd2004::new()`]: constructs the driver without any I2C traffic.
/// 2. [`Lcd2004::init()`]: resolves the address and runs the power-on
///    sequence.
/// 3. Cursor, text, glyph and latch operations.
///
/// # Flushing
///
/// Operations queue bus cycles in an internal write buffer. With
/// auto-flush on (the default) every public operation drains it before
/// returning. With auto-flush off, call [`flush()`](Self::flush) or use
/// [`batch()`](Self::batch) to send several operations as one burst.
///
/// # Example
///
/// ```ignore
/// use lcd2004_rs::{Lcd2004, LcdConfig};
///
/// let mut lcd = Lcd2004::new(i2c, delay, LcdConfig::default());
/// lcd.init().await?;
/// lcd.set_cursor(0, 1).await?;
/// lcd.write("Hello, World!").await?;
/// ```
pub struct Lcd2004<I2C, D> {
    bus: Backpack<I2C>,
    delay: D,
    requested_address: Option<u8>,
    geometry: Geometry,
    display_on: bool,
    cursor_visible: bool,
    blink: bool,
    auto_flush: bool,
    initialized: bool,
}

impl<I2C, D> Lcd2004<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Construct an uninitialised driver.
    ///
    /// No I2C traffic is generated. You **must** call [`init()`](Self::init)
    /// before any display operation.
    ///
    /// # Arguments
    /// * `i2c`: I2C peripheral (takes ownership for exclusive access).
    /// * `delay`: delay provider for the controller's fixed settle times.
    /// * `config`: address, geometry and initial latch states.
    pub fn new(i2c: I2C, delay: D, config: LcdConfig) -> Self {
        Self {
            bus: Backpack::new(i2c, config.backlight),
            delay,
            requested_address: config.address,
            geometry: config.geometry,
            display_on: config.display_on,
            cursor_visible: config.cursor_visible,
            blink: config.blink,
            auto_flush: config.auto_flush,
            initialized: false,
        }
    }

    /// Resolve the backpack address and run the HD44780 4-bit power-on
    /// sequence.
    ///
    /// The controller powers up in an unknown interface state, so it is
    /// forced into 8-bit mode with three wake nibbles before switching to
    /// 4-bit. It is then configured for two-line addressing, blanked,
    /// cleared, set to left-to-right entry, and given the configured
    /// display and backlight state.
    ///
    /// # Errors
    /// * [`LcdError::DeviceNotFound`] if auto-detection finds nothing; no
    ///   bus cycle is attempted in that case.
    /// * [`LcdError::I2c`] on a bus failure. The driver is then left
    ///   uninitialised and every operation returns
    ///   [`LcdError::NotInitialized`] until `init()` succeeds.
    pub async fn init(&mut self) -> Result<(), LcdError<I2C::Error>> {
        self.initialized = false;
        self.bus.reset();
        let address = address::detect(self.bus.i2c_mut(), self.requested_address).await?;
        self.bus.set_address(address);

        #[cfg(feature = "defmt")]
        defmt::info!("LCD backpack at {=u8:#x}", address);

        // A half-run sequence leaves the controller in an unknown mode;
        // nothing may reach it until init() is run again.
        if let Err(e) = self.power_on().await {
            self.bus.reset();
            return Err(e);
        }

        self.initialized = true;

        #[cfg(feature = "defmt")]
        defmt::info!("LCD initialised ({}x{})", self.geometry.cols(), self.geometry.rows());

        Ok(())
    }

    async fn power_on(&mut self) -> Result<(), LcdError<I2C::Error>> {
        self.delay.delay_ms(POWER_ON_DELAY_MS).await;

        self.wake(WAKE_FIRST_DELAY_US).await?;
        self.wake(WAKE_NEXT_DELAY_US).await?;
        self.wake(WAKE_NEXT_DELAY_US).await?;

        self.bus.queue_nibble(FOUR_BIT_NIBBLE, Register::Command).await?;
        self.bus.flush().await?;

        self.command(CMD_FUNCTION_SET | FUNCTION_2LINE).await?;
        self.command(CMD_DISPLAY_CONTROL).await?;
        self.command(CMD_CLEAR).await?;
        self.command(CMD_ENTRY_MODE | ENTRY_INCREMENT).await?;
        let ctrl = self.display_control();
        self.command(ctrl).await?;
        self.bus.apply_backlight().await
    }

    /// One 8-bit-mode wake pulse, sent immediately, then its settle time.
    async fn wake(&mut self, settle_us: u32) -> Result<(), LcdError<I2C::Error>> {
        self.bus.queue_nibble(WAKE_NIBBLE, Register::Command).await?;
        self.bus.flush().await?;
        self.delay.delay_us(settle_us).await;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Controller operations
    // -----------------------------------------------------------------------

    /// Clear the display and return the cursor to (0, 0).
    ///
    /// Flushes immediately and waits ~2 ms for the controller to finish.
    pub async fn clear(&mut self) -> Result<(), LcdError<I2C::Error>> {
        self.command(CMD_CLEAR).await?;
        self.finish().await
    }

    /// Return the cursor to (0, 0) and undo any display shift, keeping the
    /// contents. Same ~2 ms settle as [`clear()`](Self::clear).
    pub async fn home(&mut self) -> Result<(), LcdError<I2C::Error>> {
        self.command(CMD_HOME).await?;
        self.finish().await
    }

    /// Move the cursor to `(col, row)`.
    ///
    /// Out-of-range coordinates, negative included, are clipped onto the
    /// grid rather than rejected.
    pub async fn set_cursor(&mut self, col: i32, row: i32) -> Result<(), LcdError<I2C::Error>> {
        self.queue_set_cursor(col, row).await?;
        self.finish().await
    }

    /// Write text at the cursor.
    ///
    /// Each character is sent as [`char_code()`]. No wrapping is done:
    /// writing past the end of a row continues into whatever DDRAM cell
    /// follows, which on a 20×4 module is the row two below.
    pub async fn write(&mut self, text: &str) -> Result<(), LcdError<I2C::Error>> {
        self.queue_text(text).await?;
        self.finish().await
    }

    /// Write raw character codes at the cursor.
    pub async fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), LcdError<I2C::Error>> {
        self.queue_codes(bytes).await?;
        self.finish().await
    }

    /// Move to `(col, row)` and write `text`; with `fill`, pad the rest of
    /// the row with spaces so older content there is overwritten.
    pub async fn write_at(
        &mut self,
        col: i32,
        row: i32,
        text: &str,
        fill: bool,
    ) -> Result<(), LcdError<I2C::Error>> {
        let (col, _) = self.geometry.clamp(col, row);
        self.queue_set_cursor(col as i32, row).await?;
        let written = self.queue_text(text).await?;
        if fill {
            let remaining = self.geometry.cols().saturating_sub(col as usize + written);
            for _ in 0..remaining {
                self.data(b' ').await?;
            }
        }
        self.finish().await
    }

    /// Shift the whole visible window one column left.
    ///
    /// DDRAM contents and the address counter are unchanged; the revealed
    /// column shows whatever DDRAM holds there.
    pub async fn scroll_left(&mut self) -> Result<(), LcdError<I2C::Error>> {
        self.command(CMD_SHIFT | SHIFT_DISPLAY).await?;
        self.finish().await
    }

    /// Shift the whole visible window one column right.
    pub async fn scroll_right(&mut self) -> Result<(), LcdError<I2C::Error>> {
        self.command(CMD_SHIFT | SHIFT_DISPLAY | SHIFT_RIGHT).await?;
        self.finish().await
    }

    /// Define custom glyph `index` from up to eight 5-bit pixel rows.
    ///
    /// `index` wraps into 0–7, missing rows are blank, and only the low
    /// five bits of each row are used. Write the glyph with character
    /// code `index`.
    ///
    /// This leaves the address counter in CGRAM: call
    /// [`set_cursor()`](Self::set_cursor) before writing more text.
    pub async fn create_char(&mut self, index: u8, bitmap: &[u8]) -> Result<(), LcdError<I2C::Error>> {
        let slot = index % GLYPH_SLOTS;
        self.command(CMD_SET_CGRAM | (slot << 3)).await?;
        for row in 0..GLYPH_ROWS {
            let bits = bitmap.get(row).copied().unwrap_or(0);
            self.data(bits & GLYPH_ROW_MASK).await?;
        }
        self.finish().await
    }

    // -----------------------------------------------------------------------
    // Latches
    // -----------------------------------------------------------------------

    /// Turn the backlight LED on or off.
    ///
    /// Sent as a lone GPIO byte with E low, so no command reaches the
    /// controller. The new state rides along on every later bus cycle.
    pub async fn set_backlight(&mut self, on: bool) -> Result<(), LcdError<I2C::Error>> {
        self.ensure_initialized()?;
        self.bus.set_backlight(on);
        self.bus.apply_backlight().await
    }

    /// Show or hide DDRAM contents. Hidden contents are kept.
    pub async fn set_display(&mut self, on: bool) -> Result<(), LcdError<I2C::Error>> {
        self.ensure_initialized()?;
        self.display_on = on;
        self.apply_display_control().await
    }

    /// Show or hide the underline cursor.
    pub async fn set_cursor_visible(&mut self, on: bool) -> Result<(), LcdError<I2C::Error>> {
        self.ensure_initialized()?;
        self.cursor_visible = on;
        self.apply_display_control().await
    }

    /// Blink a block over the cursor cell. Independent of the underline.
    pub async fn set_blink(&mut self, on: bool) -> Result<(), LcdError<I2C::Error>> {
        self.ensure_initialized()?;
        self.blink = on;
        self.apply_display_control().await
    }

    /// Latches only change once the controller can be told about them.
    fn ensure_initialized(&self) -> Result<(), LcdError<I2C::Error>> {
        if self.initialized {
            Ok(())
        } else {
            Err(LcdError::NotInitialized)
        }
    }

    async fn apply_display_control(&mut self) -> Result<(), LcdError<I2C::Error>> {
        let ctrl = self.display_control();
        self.command(ctrl).await?;
        self.finish().await
    }

    fn display_control(&self) -> u8 {
        let mut ctrl = CMD_DISPLAY_CONTROL;
        if self.display_on {
            ctrl |= DISPLAY_ON;
        }
        if self.cursor_visible {
            ctrl |= CURSOR_ON;
        }
        if self.blink {
            ctrl |= BLINK_ON;
        }
        ctrl
    }

    // -----------------------------------------------------------------------
    // Buffering
    // -----------------------------------------------------------------------

    /// Send every queued bus cycle.
    ///
    /// # Errors
    /// [`LcdError::I2c`] if the transport fails. The queue is emptied
    /// anyway and nothing is retried; the latches tracked here may no
    /// longer match the device until the next successful command.
    pub async fn flush(&mut self) -> Result<(), LcdError<I2C::Error>> {
        self.bus.flush().await
    }

    /// Suspend auto-flush until the returned guard is committed or dropped.
    ///
    /// ```ignore
    /// let mut batch = lcd.batch();
    /// batch.set_cursor(0, 0).await?;
    /// batch.write("one burst").await?;
    /// batch.commit().await?;
    /// ```
    pub fn batch(&mut self) -> Batch<'_, I2C, D> {
        Batch::new(self)
    }

    /// Flush if auto-flush is on.
    async fn finish(&mut self) -> Result<(), LcdError<I2C::Error>> {
        if self.auto_flush {
            self.bus.flush().await
        } else {
            Ok(())
        }
    }

    // -----------------------------------------------------------------------
    // Queueing primitives
    // -----------------------------------------------------------------------

    /// Queue an instruction. Clear and home flush and wait out their settle
    /// time, since the busy flag cannot be polled.
    async fn command(&mut self, cmd: u8) -> Result<(), LcdError<I2C::Error>> {
        self.bus.queue_byte(cmd, Register::Command).await?;
        if cmd == CMD_CLEAR || cmd == CMD_HOME {
            self.bus.flush().await?;
            self.delay.delay_us(LONG_COMMAND_DELAY_US).await;
        }
        Ok(())
    }

    async fn data(&mut self, byte: u8) -> Result<(), LcdError<I2C::Error>> {
        self.bus.queue_byte(byte, Register::Data).await
    }

    pub(crate) async fn queue_set_cursor(&mut self, col: i32, row: i32) -> Result<(), LcdError<I2C::Error>> {
        let address = self.geometry.ddram_address(col, row);
        self.command(CMD_SET_DDRAM | address).await
    }

    /// Queue `text`, returning the number of characters sent.
    pub(crate) async fn queue_text(&mut self, text: &str) -> Result<usize, LcdError<I2C::Error>> {
        let mut count = 0;
        for ch in text.chars() {
            self.data(char_code(ch)).await?;
            count += 1;
        }
        Ok(count)
    }

    pub(crate) async fn queue_codes(&mut self, codes: &[u8]) -> Result<(), LcdError<I2C::Error>> {
        for &code in codes {
            self.data(code).await?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Bus helpers
    // -----------------------------------------------------------------------

    /// Probe the bus for devices. See [`address::scan`].
    pub async fn scan(&mut self) -> ScanResult {
        self.bus.scan().await
    }

    /// Give back the I2C peripheral and delay provider.
    pub fn release(self) -> (I2C, D) {
        (self.bus.release(), self.delay)
    }
}

impl<I2C, D> Lcd2004<I2C, D> {
    /// Check whether [`init()`](Self::init) completed. No I2C traffic.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn display_on(&self) -> bool {
        self.display_on
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    pub fn blink(&self) -> bool {
        self.blink
    }

    pub fn auto_flush(&self) -> bool {
        self.auto_flush
    }

    /// Switch auto-flush. Bytes already queued stay queued.
    pub fn set_auto_flush(&mut self, on: bool) {
        self.auto_flush = on;
    }
}

impl<I2C: I2c, D> Lcd2004<I2C, D> {
    /// Resolved backpack address; `None` before `init()`.
    pub fn address(&self) -> Option<u8> {
        self.bus.address()
    }

    pub fn backlight(&self) -> bool {
        self.bus.backlight()
    }

    /// Bytes queued and not yet flushed.
    pub fn pending(&self) -> usize {
        self.bus.pending()
    }
}

#[cfg(feature = "task")]
/// [`Lcd2004`] timed by the Embassy time driver.
pub type EmbassyLcd<I2C> = Lcd2004<I2C, embassy_time::Delay>;

#[cfg(feature = "task")]
impl<I2C: I2c> Lcd2004<I2C, embassy_time::Delay> {
    /// Construct with [`embassy_time::Delay`] as the delay provider.
    pub fn new_embassy(i2c: I2C, config: LcdConfig) -> Self {
        Self::new(i2c, embassy_time::Delay, config)
    }
}

// ---------------------------------------------------------------------------
// Batch guard
// ---------------------------------------------------------------------------

/// Scoped batch of operations sent as one flush.
///
/// Auto-flush is suspended while the guard lives. [`commit()`](Self::commit)
/// flushes and restores the previous mode. Dropping without committing
/// (e.g. on an early `?` return) restores the mode too; whatever is still
/// queued then goes out with the next flushing operation.
pub struct Batch<'a, I2C, D> {
    lcd: &'a mut Lcd2004<I2C, D>,
    restore: bool,
}

impl<'a, I2C, D> Batch<'a, I2C, D> {
    fn new(lcd: &'a mut Lcd2004<I2C, D>) -> Self {
        let restore = lcd.auto_flush;
        lcd.auto_flush = false;
        Self { lcd, restore }
    }
}

impl<I2C: I2c, D: DelayNs> Batch<'_, I2C, D> {
    /// Flush everything queued in the batch.
    pub async fn commit(self) -> Result<(), LcdError<I2C::Error>> {
        self.lcd.flush().await
    }
}

impl<I2C, D> Deref for Batch<'_, I2C, D> {
    type Target = Lcd2004<I2C, D>;

    fn deref(&self) -> &Self::Target {
        self.lcd
    }
}

impl<I2C, D> DerefMut for Batch<'_, I2C, D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.lcd
    }
}

impl<I2C, D> Drop for Batch<'_, I2C, D> {
    fn drop(&mut self) {
        self.lcd.auto_flush = self.restore;
    }
}
