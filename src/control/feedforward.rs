// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Permanent-magnet DC motor feed-forward model.
//!
//! ```text
//! V = ks * sign(v) + kv * v + ka * a
//! ```
//!
//! `v` and `a` are in whatever units the gains were characterized in. The shooter characterizes
//! in rad/s and rad/s², so `kv` is V·s/rad.

/// Static, velocity and acceleration gains of a simple motor model.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SimpleMotorFeedforward {
    /// Static friction voltage (V)
    pub ks: f32,
    /// Velocity gain (V per unit velocity)
    pub kv: f32,
    /// Acceleration gain (V per unit acceleration)
    pub ka: f32,
}

impl SimpleMotorFeedforward {
    pub const fn new(ks: f32, kv: f32, ka: f32) -> Self {
        Self { ks, kv, ka }
    }

    /// Voltage needed to hold `velocity` with no acceleration.
    #[inline]
    pub fn calculate(&self, velocity: f32) -> f32 {
        self.calculate_with_accel(velocity, 0.0)
    }

    /// Voltage needed to reach `velocity` while accelerating at `accel`.
    pub fn calculate_with_accel(&self, velocity: f32, accel: f32) -> f32 {
        self.ks * sign(velocity) + self.kv * velocity + self.ka * accel
    }
}

/// `f32::signum` maps 0.0 to 1.0; the static term must vanish at rest.
#[inline]
fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}
