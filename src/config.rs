// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Compile-time configuration for the shooter.
//!
//! Gains were characterized with both flywheels loaded; velocities are in rad/s.

use crate::control::SimpleMotorFeedforward;
use crate::motors::IdleMode;

/// CAN device address of the top flywheel motor controller.
pub const TOP_MOTOR_ADDR: u16 = 13;
/// CAN device address of the bottom flywheel motor controller.
pub const BOTTOM_MOTOR_ADDR: u16 = 14;

/// Control loop period (50 Hz).
pub const LOOP_PERIOD_MS: u32 = 20;

/// Highest voltage the motor controllers accept.
pub const MAX_MOTOR_VOLTAGE: f32 = 12.0;

/// `CAN_BTR` for 1 Mbit/s with APB1 at 54 MHz (PSC = 3, BS1 = 14 tq, BS2 = 3 tq, SJW = 1 tq).
pub const CAN_BTR_1MBPS: u32 = 0x002D_0002;

pub const DEBUG_BAUD: u32 = 115_200;
pub const DASHBOARD_BAUD: u32 = 115_200;

/// Speed window in which the shooter counts as ready to fire.
pub const AT_SPEED_TOLERANCE_RPM: f32 = 75.0;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PidGains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

/// Everything the shooter controller needs besides its motors and telemetry sink.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ShooterConfig {
    pub pid: PidGains,
    pub feedforward: SimpleMotorFeedforward,
    /// Both flywheels are mounted so that positive voltage spins them backwards.
    pub inverted: bool,
    pub idle_mode: IdleMode,
    /// Control period in seconds, used for the PID integral and derivative terms.
    pub period_s: f32,
}

pub const SHOOTER: ShooterConfig = ShooterConfig {
    pid: PidGains {
        kp: 0.0005,
        ki: 0.0,
        kd: 0.0,
    },
    feedforward: SimpleMotorFeedforward::new(0.12, 0.0172, 0.0),
    inverted: true,
    idle_mode: IdleMode::Coast,
    period_s: LOOP_PERIOD_MS as f32 / 1000.0,
};
