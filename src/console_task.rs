//! Channel-fed console task.
//!
//! [`console_task`] owns the display and turns every [`LogMessage`]
//! received on an Embassy channel into a [`TextConsole::log()`] call, so
//! any task can print to the LCD without sharing the I2C bus.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Receiver;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use crate::config::ConsoleConfig;
use crate::console::TextConsole;
use crate::driver::Lcd2004;

/// Longest message accepted over the channel, in bytes.
pub const LOG_MESSAGE_CAPACITY: usize = 80;

/// One message for the console; may contain `\n`.
pub type LogMessage = heapless::String<LOG_MESSAGE_CAPACITY>;

/// Initialise the display and log every message received on `receiver`.
///
/// This is a regular `async fn`, not an Embassy `#[task]`. Wrap it in a
/// concrete task since Embassy tasks cannot be generic:
///
/// ```ignore
/// static LOG: Channel<CriticalSectionRawMutex, LogMessage, 8> = Channel::new();
///
/// #[embassy_executor::task]
/// async fn lcd_task(lcd: EmbassyLcd<I2c<'static, I2C0, Async>>) {
///     console_task(lcd, ConsoleConfig::default(), LOG.receiver()).await;
/// }
/// ```
///
/// # Errors
///
/// * Initialisation or console setup failure: logs the error and
///   **returns** (task exits).
/// * Render failure: logs the error and waits for the next message.
#[allow(clippy::needless_pass_by_value)]
pub async fn console_task<I2C, D, M, const N: usize>(
    mut lcd: Lcd2004<I2C, D>,
    config: ConsoleConfig,
    receiver: Receiver<'static, M, LogMessage, N>,
) where
    I2C: I2c,
    D: DelayNs,
    M: RawMutex,
{
    if let Err(_e) = lcd.init().await {
        #[cfg(feature = "defmt")]
        defmt::error!("LCD init failed: {}", defmt::Debug2Format(&_e));
        return;
    }

    let mut console = match TextConsole::new(&mut lcd, config).await {
        Ok(console) => console,
        Err(_e) => {
            #[cfg(feature = "defmt")]
            defmt::error!("LCD console setup failed: {}", defmt::Debug2Format(&_e));
            return;
        }
    };

    #[cfg(feature = "defmt")]
    defmt::info!("LCD console ready");

    loop {
        let message = receiver.receive().await;
        if let Err(_e) = console.log(&message).await {
            #[cfg(feature = "defmt")]
            defmt::warn!("LCD render failed: {}", defmt::Debug2Format(&_e));
        }
    }
}
