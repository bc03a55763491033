// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! PID corrector for closed-loop velocity control.
//!
//! Works in `no_std` and does not allocate memory. Each instance carries its own error history, so
//! every physically independent actuator needs its own `Pid`.

/// PID controller with tunable gains, integral anti-windup and optional output clamping.
#[derive(Clone, Debug)]
pub struct Pid {
    /// Proportional gain
    kp: f32,
    /// Integral gain
    ki: f32,
    /// Derivative gain
    kd: f32,

    /// Accumulated integral contribution (already scaled by `ki`)
    integral: f32,
    /// Error seen by the previous update (for derivative term)
    prev_error: f32,

    /// Output clamp
    out_min: f32,
    out_max: f32,

    /// Integral anti-windup clamp
    int_min: f32,
    int_max: f32,

    first_update: bool,
}

impl Pid {
    /// Create a new PID controller.
    ///
    /// `kp`, `ki`, `kd` are the gain constants. The output is unbounded and the integral
    /// contribution is clamped to ±1.0 until configured otherwise.
    pub fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self {
            kp,
            ki,
            kd,

            integral: 0.0,
            prev_error: 0.0,

            out_min: f32::NEG_INFINITY,
            out_max: f32::INFINITY,

            int_min: -1.0,
            int_max: 1.0,

            first_update: true,
        }
    }

    /// Set output limits.
    pub fn with_output_limits(mut self, min: f32, max: f32) -> Self {
        self.out_min = min;
        self.out_max = max;
        self
    }

    /// Set integral limits for anti-windup.
    pub fn with_integral_limits(mut self, min: f32, max: f32) -> Self {
        self.int_min = min;
        self.int_max = max;
        self
    }

    /// Current integral contribution to the output.
    #[inline]
    pub fn integral(&self) -> f32 {
        self.integral
    }

    /// Reset integrator + derivative history.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
        self.first_update = true;
    }

    /// Update the controller.
    ///
    /// `setpoint` - desired value
    /// `measurement` - current value
    /// `dt` - timestep in seconds (e.g. 0.02 for 50 Hz control loop)
    ///
    /// Returns the correction, clamped to [`out_min`, `out_max`].
    pub fn update(&mut self, setpoint: f32, measurement: f32, dt: f32) -> f32 {
        let error = setpoint - measurement;

        // ----- P term -----
        let p = self.kp * error;

        // ----- I term -----
        self.integral = (self.integral + self.ki * error * dt).clamp(self.int_min, self.int_max);
        let i = self.integral;

        // ----- D term (on error) -----
        let d = if self.first_update || dt <= 0.0 {
            0.0
        } else {
            self.kd * (error - self.prev_error) / dt
        };
        self.first_update = false;
        self.prev_error = error;

        (p + i + d).clamp(self.out_min, self.out_max)
    }
}
