// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Telemetry
//!
//! Named numeric values published for display on a dashboard. Nothing published here is read back
//! into control.
//!
//! ## Modules
//!
//! - [`serial`] - Line-oriented sink over any `core::fmt::Write`.

pub mod serial;

pub use serial::SerialTelemetry;

/// Last commanded shooter speed (rpm).
pub const SETPOINT_TOPIC: &str = "Shooter/Setpoint";
/// Measured top flywheel speed (rpm).
pub const TOP_TOPIC: &str = "Shooter/Top";
/// Measured bottom flywheel speed (rpm).
pub const BOTTOM_TOPIC: &str = "Shooter/Bottom";

/// Fire-and-forget destination for telemetry values.
pub trait TelemetrySink {
    fn publish(&mut self, name: &str, value: f32);
}

impl<T: TelemetrySink + ?Sized> TelemetrySink for &mut T {
    fn publish(&mut self, name: &str, value: f32) {
        (**self).publish(name, value)
    }
}
