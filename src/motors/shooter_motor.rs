// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Flywheel motor built on top of `CanMotor`.
//!
//! This module adapts a CAN motor controller to the [`Actuator`] interface. The CAN bus is shared
//! with the other flywheel, so it is borrowed through a `RefCell` for the duration of each
//! exchange.
//!
//! Bus errors never reach the caller. They are counted in [`ShooterMotor::faults`] and the
//! velocity reading falls back to the last good value. A disconnected motor therefore reports a
//! stale speed (0 rpm if it never answered) rather than failing. Only the first fault of a run and
//! the recovery after it are logged.
//!
//! Idle behaviour maps onto the controller as follows: `Coast` turns the output stage off, `Brake`
//! sends a 0 mV voltage command, which the controller's voltage loop holds by braking.

use core::cell::RefCell;

use crate::config::MAX_MOTOR_VOLTAGE;
use crate::drivers::can_motor::{self, CanMotor, FrameBus};
use crate::motors::{Actuator, IdleMode};

/// Flywheel motor on a shared CAN bus.
pub struct ShooterMotor<'a, B: FrameBus, const DEV_ADDR: u16> {
    bus: &'a RefCell<B>,
    motor: CanMotor<DEV_ADDR>,
    inverted: bool,
    idle_mode: IdleMode,

    /// Last successfully read speed, already in the inverted frame (rpm)
    last_rpm: f32,
    faults: u32,
    /// Set from the first failed exchange until the next successful one
    faulted: bool,
}

impl<'a, B: FrameBus, const DEV_ADDR: u16> ShooterMotor<'a, B, DEV_ADDR> {
    /// Create a new `ShooterMotor` on `bus`. Not inverted, coasting, until configured.
    pub fn new(bus: &'a RefCell<B>) -> Self {
        Self {
            bus,
            motor: CanMotor::new(),
            inverted: false,
            idle_mode: IdleMode::Coast,
            last_rpm: 0.0,
            faults: 0,
            faulted: false,
        }
    }

    /// Number of bus errors absorbed so far.
    #[inline]
    pub fn faults(&self) -> u32 {
        self.faults
    }

    #[inline]
    pub fn inverted(&self) -> bool {
        self.inverted
    }

    /// Clear latched faults on the motor controller.
    pub fn clear_faults(&mut self) -> Result<(), can_motor::Error> {
        self.motor.clear_faults(&mut *self.bus.borrow_mut())
    }

    #[inline]
    fn direction(&self) -> f32 {
        if self.inverted {
            -1.0
        } else {
            1.0
        }
    }

    /// Whether the last exchange with the motor failed.
    #[inline]
    pub fn faulted(&self) -> bool {
        self.faulted
    }

    fn record(&mut self, op: &str, result: Result<(), can_motor::Error>) {
        match result {
            Ok(()) => {
                if self.faulted {
                    self.faulted = false;
                    log::info!("motor {}: recovered after {} faults", DEV_ADDR, self.faults);
                }
            }
            Err(e) => {
                self.faults = self.faults.wrapping_add(1);
                if !self.faulted {
                    self.faulted = true;
                    log::warn!("motor {}: {} failed: {:?}", DEV_ADDR, op, e);
                }
            }
        }
    }
}

impl<'a, B: FrameBus, const DEV_ADDR: u16> Actuator for ShooterMotor<'a, B, DEV_ADDR> {
    fn configure(&mut self, inverted: bool, idle_mode: IdleMode) {
        self.inverted = inverted;
        self.idle_mode = idle_mode;
        log::debug!(
            "motor {}: inverted={} idle={:?}",
            DEV_ADDR,
            inverted,
            idle_mode
        );

        let result = match idle_mode {
            IdleMode::Coast => self.motor.disable_output(&mut *self.bus.borrow_mut()),
            IdleMode::Brake => self.motor.set_voltage(&mut *self.bus.borrow_mut(), 0.0),
        };
        self.record("configure", result);
    }

    fn set_voltage(&mut self, volts: f32) {
        let volts = if volts.is_finite() {
            volts.clamp(-MAX_MOTOR_VOLTAGE, MAX_MOTOR_VOLTAGE)
        } else {
            0.0
        };

        let result = if volts == 0.0 && self.idle_mode == IdleMode::Coast {
            self.motor.disable_output(&mut *self.bus.borrow_mut())
        } else {
            let applied = volts * self.direction();
            self.motor.set_voltage(&mut *self.bus.borrow_mut(), applied)
        };

        self.record("set_voltage", result);
    }

    fn velocity_rpm(&mut self) -> f32 {
        let result = self.motor.read_speed_rpm(&mut *self.bus.borrow_mut());
        let result = match result {
            Ok(rpm) => {
                self.last_rpm = rpm * self.direction();
                Ok(())
            }
            Err(e) => Err(e),
        };
        self.record("read_speed", result);
        self.last_rpm
    }
}
