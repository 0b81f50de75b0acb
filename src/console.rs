//! Scrolling text console on top of [`Lcd2004`].
//!
//! [`TextConsole`] keeps a bounded history of display lines and redraws
//! the newest ones after every [`log()`](TextConsole::log), giving the
//! look of an endless log on a fixed grid.

use core::mem;

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use heapless::{Deque, Vec};

use crate::config::{ConsoleConfig, Orientation, HISTORY_CAPACITY};
use crate::driver::{char_code, Lcd2004};
use crate::error::LcdError;
use crate::geometry::MAX_COLS;

/// One display row of text as controller character codes, at most
/// `cols` long.
pub type ConsoleLine = Vec<u8, MAX_COLS>;

/// Auto-scrolling log console rendered through a borrowed [`Lcd2004`].
///
/// Auto-flush on the driver is switched off while the console exists so
/// each redraw goes out as one flush; the previous mode comes back on drop.
///
/// # Example
///
/// ```ignore
/// use lcd2004_rs::{ConsoleConfig, TextConsole};
///
/// let mut console = TextConsole::new(&mut lcd, ConsoleConfig::default()).await?;
/// console.log("Booting...").await?;
/// console.log("Sensor: OK\nLink: OK").await?;
/// ```
pub struct TextConsole<'a, I2C, D> {
    lcd: &'a mut Lcd2004<I2C, D>,
    lines: Deque<ConsoleLine, HISTORY_CAPACITY>,
    config: ConsoleConfig,
    restore_auto_flush: bool,
}

impl<'a, I2C, D> TextConsole<'a, I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Validate `config`, take over `lcd` and clear the screen.
    ///
    /// `lcd` must already be initialised.
    ///
    /// # Errors
    /// * [`LcdError::Config`] for an invalid history length; the display
    ///   is left untouched.
    /// * [`LcdError::I2c`] if the initial clear fails.
    pub async fn new(
        lcd: &'a mut Lcd2004<I2C, D>,
        config: ConsoleConfig,
    ) -> Result<Self, LcdError<I2C::Error>> {
        config.validate().map_err(LcdError::Config)?;

        let restore_auto_flush = lcd.auto_flush();
        lcd.set_auto_flush(false);

        let mut console = Self {
            lcd,
            lines: Deque::new(),
            config,
            restore_auto_flush,
        };
        console.clear().await?;
        Ok(console)
    }

    /// Append `text` and redraw.
    ///
    /// Each `\n`-separated line becomes one history entry, or several of
    /// `cols` characters when wrapping is on (an empty line still counts
    /// as one). Without wrapping, lines are cut at `cols`. The oldest
    /// entries are dropped beyond the history limit.
    pub async fn log(&mut self, text: &str) -> Result<(), LcdError<I2C::Error>> {
        self.append(text.chars());
        self.render().await
    }

    /// Append raw bytes as text and redraw.
    ///
    /// Bytes are decoded as UTF-8; if that fails, each byte is taken as the
    /// character with the same code (Latin-1). Decoding never fails.
    pub async fn log_bytes(&mut self, bytes: &[u8]) -> Result<(), LcdError<I2C::Error>> {
        match core::str::from_utf8(bytes) {
            Ok(text) => self.append(text.chars()),
            Err(_) => self.append(bytes.iter().map(|&b| char::from(b))),
        }
        self.render().await
    }

    /// Drop all history and blank every row.
    ///
    /// Clears the controller, then overwrites each row with spaces as well
    /// in case the clear was missed, and flushes once.
    pub async fn clear(&mut self) -> Result<(), LcdError<I2C::Error>> {
        self.lines.clear();
        let result = self.blank_rows().await;
        let flushed = self.lcd.flush().await;
        result.and(flushed)
    }

    async fn blank_rows(&mut self) -> Result<(), LcdError<I2C::Error>> {
        self.lcd.clear().await?;
        let geometry = self.lcd.geometry();
        for row in 0..geometry.rows() {
            self.lcd.queue_set_cursor(0, row as i32).await?;
            self.lcd.queue_codes(&SPACES[..geometry.cols()]).await?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Buffer
    // -----------------------------------------------------------------------

    fn append<C>(&mut self, chars: C)
    where
        C: Iterator<Item = char>,
    {
        let cols = self.lcd.geometry().cols();
        let mut line = ConsoleLine::new();

        for ch in chars {
            if ch == '\n' {
                self.push_line(mem::take(&mut line));
                continue;
            }
            if line.len() == cols {
                if !self.config.wrap {
                    continue;
                }
                self.push_line(mem::take(&mut line));
            }
            // Length checked above; cols <= MAX_COLS.
            let _ = line.push(char_code(ch));
        }
        self.push_line(line);

        while self.lines.len() > self.config.max_history {
            self.lines.pop_front();
        }
    }

    fn push_line(&mut self, line: ConsoleLine) {
        // A single log call may outgrow the deque before trimming; the
        // oldest entry would be trimmed anyway.
        if self.lines.is_full() {
            self.lines.pop_front();
        }
        let _ = self.lines.push_back(line);
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    /// Redraw every row, then flush once even if drawing failed part-way.
    async fn render(&mut self) -> Result<(), LcdError<I2C::Error>> {
        let result = self.draw().await;
        let flushed = self.lcd.flush().await;
        result.and(flushed)
    }

    async fn draw(&mut self) -> Result<(), LcdError<I2C::Error>> {
        let geometry = self.lcd.geometry();
        let cols = geometry.cols();

        for row in 0..geometry.rows() {
            let text = visible_line(&self.lines, self.config.orientation, geometry.rows(), row)
                .map_or(&[][..], |line| line.as_slice());
            let shown = text.len().min(cols);

            self.lcd.queue_set_cursor(0, row as i32).await?;
            self.lcd.queue_codes(&text[..shown]).await?;
            self.lcd.queue_codes(&SPACES[..cols - shown]).await?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Raw access to the driver, e.g. to toggle the backlight.
    ///
    /// Writing text directly will be overwritten by the next redraw.
    pub fn lcd_mut(&mut self) -> &mut Lcd2004<I2C, D> {
        self.lcd
    }
}

impl<I2C, D> TextConsole<'_, I2C, D> {
    /// Buffered lines, oldest first.
    pub fn lines(&self) -> impl Iterator<Item = &ConsoleLine> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn orientation(&self) -> Orientation {
        self.config.orientation
    }

    pub fn wrap(&self) -> bool {
        self.config.wrap
    }

    pub fn max_history(&self) -> usize {
        self.config.max_history
    }
}

impl<I2C, D> Drop for TextConsole<'_, I2C, D> {
    fn drop(&mut self) {
        self.lcd.set_auto_flush(self.restore_auto_flush);
    }
}

const SPACES: [u8; MAX_COLS] = [b' '; MAX_COLS];

/// Buffer entry shown on screen `row`, or `None` for a blank row.
///
/// Newest-at-bottom anchors the latest `rows` entries to the bottom with
/// blank rows above; newest-at-top lists them latest first with blank rows
/// below.
fn visible_line(
    lines: &Deque<ConsoleLine, HISTORY_CAPACITY>,
    orientation: Orientation,
    rows: usize,
    row: usize,
) -> Option<&ConsoleLine> {
    let len = lines.len();
    let shown = len.min(rows);

    let index = match orientation {
        Orientation::NewestAtBottom => {
            let blank = rows - shown;
            if row < blank {
                return None;
            }
            len - shown + (row - blank)
        }
        Orientation::NewestAtTop => {
            if row >= shown {
                return None;
            }
            len - 1 - row
        }
    };
    lines.iter().nth(index)
}
