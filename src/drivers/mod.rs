// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Device-Specific Drivers
//!
//! This module contains device-specific drivers that sit above the raw `hw/` layer and below the
//! application logic.
//!
//! ## Existing drivers
//!
//! - [`can_motor`] – brushless flywheel motor controller on CAN (voltage mode, speed readback)

pub mod can_motor;

pub use can_motor::{CanMotor, FrameBus};
