// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Actuator Abstractions
//!
//! This module contains motor-level wrappers that sit above device-level drivers in `drivers`.
//!
//! ## Modules
//!
//! - [`shooter_motor`] - Flywheel motor built on `CanMotor`, implementing [`Actuator`].

pub mod shooter_motor;

pub use shooter_motor::ShooterMotor;

/// What a motor does when it is commanded 0 V.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum IdleMode {
    /// Output stage off, the rotor spins down freely.
    Coast,
    /// Output held at 0 V by the controller, the rotor is actively slowed.
    Brake,
}

/// A single voltage-commanded motor with velocity feedback.
///
/// Implementations never report errors to the caller. A faulted or disconnected motor keeps
/// accepting commands and returns its last known velocity, so higher layers see a degraded value
/// rather than a failure.
pub trait Actuator {
    /// Set the direction convention and idle behaviour. Called once at construction.
    fn configure(&mut self, inverted: bool, idle_mode: IdleMode);

    /// Command a voltage. The implementation saturates to what the hardware supports.
    fn set_voltage(&mut self, volts: f32);

    /// Measured angular velocity in rpm.
    fn velocity_rpm(&mut self) -> f32;
}

impl<A: Actuator + ?Sized> Actuator for &mut A {
    fn configure(&mut self, inverted: bool, idle_mode: IdleMode) {
        (**self).configure(inverted, idle_mode)
    }

    fn set_voltage(&mut self, volts: f32) {
        (**self).set_voltage(volts)
    }

    fn velocity_rpm(&mut self) -> f32 {
        (**self).velocity_rpm()
    }
}
