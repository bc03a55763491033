// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Serial logger implementation for the debug USART.
//!
//! This module implements the [`log`] crate's logging facade on top of USART1, so library code can
//! use `info!`, `warn!` and friends without knowing where the output goes.
//!
//! Initialize the logger once during startup:
//!
//! ```ignore
//! logger::init(usart, LevelFilter::Info).ok();
//! log::info!("shooter up");
//! ```
//!
//! Each record is written as one line:
//!
//! ```text
//! INFO shooter::control::shooter - shooter configured: kp=0.0005 ...
//! WARN shooter::motors::shooter_motor - motor 13: read_speed failed: NoResponse
//! ```

use core::cell::RefCell;
use core::fmt::Write;

use cortex_m::interrupt::{self, Mutex};
use log::{LevelFilter, Metadata, Record, SetLoggerError};
use stm32f7xx_hal::pac::USART1;

use super::Usart;

/// Logger writing to the debug USART. Records are dropped until [`init`] installs the port.
pub struct SerialLogger {
    usart: Mutex<RefCell<Option<Usart<USART1>>>>,
}

impl log::Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        interrupt::free(|cs| {
            if let Some(usart) = self.usart.borrow(cs).borrow_mut().as_mut() {
                let _ = write!(
                    usart,
                    "{} {} - {}\r\n",
                    record.level(),
                    record.target(),
                    record.args()
                );
            }
        });
    }

    fn flush(&self) {
        interrupt::free(|cs| {
            if let Some(usart) = self.usart.borrow(cs).borrow_mut().as_mut() {
                usart.flush();
            }
        });
    }
}

static LOGGER: SerialLogger = SerialLogger {
    usart: Mutex::new(RefCell::new(None)),
};

/// Install the serial logger on `usart`.
///
/// Returns an error if a logger has already been set.
pub fn init(usart: Usart<USART1>, level: LevelFilter) -> Result<(), SetLoggerError> {
    interrupt::free(|cs| {
        LOGGER.usart.borrow(cs).replace(Some(usart));
    });
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}
