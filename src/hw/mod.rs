// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! MCU-level peripherals for the shooter controller board.

pub mod can;
pub mod dashboard;
pub mod led;
pub mod logger;
pub mod pins;
pub mod usart;

pub use can::CanBus;
pub use led::Led;
pub use pins::BoardPins;
pub use usart::Usart;
