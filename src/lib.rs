// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Shooter Firmware
//!
//! This crate contains the velocity controller for a two-flywheel shooter, written in Rust,
//! targeting an STM32F777 MCU driving two brushless motor controllers over CAN.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`hw`] | MCU-level wrappers around USART, CAN and the serial logger (target only) |
//! | [`drivers`] | Device-level drivers (CAN motor controller) |
//! | [`motors`] | The `Actuator` seam and the flywheel motor built on it |
//! | [`control`]   | Control algorithms (PID, feed-forward, shooter controller) |
//! | [`telemetry`] | Named telemetry values and the serial sink |
//! | [`protocol`] | Driver station command frames |
//! | [`sim`] | Simulated flywheel for host runs and tests |
//! | [`config`] | Addresses, gains and loop timing |
//!
//! ## Getting Started
//!
//! Run the tests and the simulated shooter on the host:
//!
//! ```bash
//! cargo test
//! cargo run
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo run --release --target thumbv7em-none-eabihf
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod control;
pub mod drivers;
#[cfg(target_os = "none")]
pub mod hw;
pub mod motors;
pub mod protocol;
pub mod sim;
pub mod telemetry;
pub mod units;
