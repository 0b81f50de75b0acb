//! Scrolling console demo
//!
//! Standalone hardware demonstration of [`console_task`]: a producer task
//! sends a numbered status line over a channel once a second and the LCD
//! task scrolls them up the 20×4 display.
//!
//! # Wiring
//!
//! | Signal    | Pico 2 Pin | Notes                    |
//! |-----------|------------|--------------------------|
//! | I2C0 SDA  | GP20       | 4.7k pull-up to 3V3      |
//! | I2C0 SCL  | GP21       | 4.7k pull-up to 3V3      |
//! | LCD VCC   | VBUS (5V)  | backpack logic is 5V     |
//! | LCD GND   | GND        |                          |

#![no_std]
#![no_main]

use core::fmt::Write;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp as hal;
use embassy_rp::bind_interrupts;
use embassy_rp::block::ImageDef;
use embassy_rp::i2c::{self, Async, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Timer};
use {defmt_rtt as _, panic_probe as _};

use lcd2004_rs::{console_task, ConsoleConfig, EmbassyLcd, LcdConfig, LogMessage, Orientation};

/// Tell the Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = hal::block::ImageDef::secure_exe();

bind_interrupts!(struct Irqs {
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

static LOG: Channel<CriticalSectionRawMutex, LogMessage, 8> = Channel::new();

type LcdBus = I2c<'static, I2C0, Async>;

#[embassy_executor::task]
async fn lcd_task(lcd: EmbassyLcd<LcdBus>) {
    let config = ConsoleConfig {
        orientation: Orientation::NewestAtBottom,
        wrap: true,
        max_history: 8,
    };
    console_task(lcd, config, LOG.receiver()).await;
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("Console demo starting");

    let i2c = I2c::new_async(
        p.I2C0,
        p.PIN_21, // SCL
        p.PIN_20, // SDA
        Irqs,
        i2c::Config::default(),
    );

    // Address left to auto-detection.
    let lcd = EmbassyLcd::new_embassy(i2c, LcdConfig::default());
    spawner.spawn(unwrap!(lcd_task(lcd)));

    LOG.send(LogMessage::try_from("Console demo").unwrap_or_default()).await;

    let mut tick: u32 = 0;
    loop {
        Timer::after(Duration::from_secs(1)).await;
        tick = tick.wrapping_add(1);

        let mut line = LogMessage::new();
        // 80 bytes always fit this line.
        let _ = write!(line, "tick {}", tick);
        if tick % 5 == 0 {
            let _ = write!(line, "\nuptime {}s", tick);
        }
        LOG.send(line).await;
    }
}
