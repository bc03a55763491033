// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Angular velocity unit conversions.
//!
//! Speeds cross the public API in rpm; the control law runs in rad/s.

use core::f32::consts::PI;

/// Radians per second in one rpm.
pub const RAD_PER_S_PER_RPM: f32 = 2.0 * PI / 60.0;

/// Convert revolutions per minute to radians per second.
#[inline]
pub fn rpm_to_rad_per_s(rpm: f32) -> f32 {
    rpm * RAD_PER_S_PER_RPM
}

/// Convert radians per second to revolutions per minute.
#[inline]
pub fn rad_per_s_to_rpm(rad_per_s: f32) -> f32 {
    rad_per_s / RAD_PER_S_PER_RPM
}
