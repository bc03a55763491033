// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Control Algorithms
//!
//! This module provides the building blocks for closed-loop flywheel control.
//!
//! ## Modules
//!
//! - [`pid`] - General-purpose PID controller implementation.
//! - [`feedforward`] - Static/velocity/acceleration motor feed-forward model.
//! - [`shooter`] - Closed-loop velocity controller for the two-flywheel shooter.

pub mod feedforward;
pub mod pid;
pub mod shooter;

pub use feedforward::SimpleMotorFeedforward;
pub use pid::Pid;
pub use shooter::{ShooterController, ShooterMode};
