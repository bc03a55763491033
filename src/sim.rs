// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Simulated flywheel for running the shooter without hardware.
//!
//! The plant is the same first-order model the feed-forward assumes:
//!
//! ```text
//! dω/dt = (V − ks·sign(ω) − kv·ω) / ka
//! ```
//!
//! with ω in rad/s. Time only moves when [`SimFlywheel::advance`] is called.

use crate::config::MAX_MOTOR_VOLTAGE;
use crate::control::SimpleMotorFeedforward;
use crate::motors::{Actuator, IdleMode};
use crate::units::rad_per_s_to_rpm;

use micromath::F32Ext;

#[derive(Clone, Debug)]
pub struct SimFlywheel {
    model: SimpleMotorFeedforward,
    inverted: bool,

    /// Applied voltage in the motor's own frame (V)
    volts: f32,
    /// Rotor speed in the motor's own frame (rad/s)
    omega: f32,

    configure_calls: u32,
}

impl SimFlywheel {
    /// Create a flywheel at rest. `model.ka` must be positive.
    pub fn new(model: SimpleMotorFeedforward) -> Self {
        Self {
            model,
            inverted: false,
            volts: 0.0,
            omega: 0.0,
            configure_calls: 0,
        }
    }

    /// Integrate the plant forward by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let SimpleMotorFeedforward { ks, kv, ka } = self.model;

        // Static friction holds a stopped rotor
        if self.omega == 0.0 && self.volts.abs() <= ks {
            return;
        }

        let friction_dir = if self.omega != 0.0 {
            self.omega.signum()
        } else {
            self.volts.signum()
        };

        if ka <= 0.0 {
            self.omega = if kv > 0.0 {
                (self.volts - ks * friction_dir) / kv
            } else {
                0.0
            };
            return;
        }

        let accel = (self.volts - ks * friction_dir - kv * self.omega) / ka;
        let next = self.omega + accel * dt;

        // Friction alone cannot reverse the rotor
        if next * self.omega < 0.0 && self.volts.abs() <= ks {
            self.omega = 0.0;
        } else {
            self.omega = next;
        }
    }

    /// Voltage last applied to the motor, in the caller's frame.
    pub fn applied_volts(&self) -> f32 {
        self.volts * self.direction()
    }

    /// Number of `configure` calls received.
    pub fn configure_calls(&self) -> u32 {
        self.configure_calls
    }

    pub fn inverted(&self) -> bool {
        self.inverted
    }

    fn direction(&self) -> f32 {
        if self.inverted {
            -1.0
        } else {
            1.0
        }
    }
}

impl Actuator for SimFlywheel {
    /// Idle mode is not modelled; 0 V always lets the rotor coast against friction.
    fn configure(&mut self, inverted: bool, _idle_mode: IdleMode) {
        self.inverted = inverted;
        self.configure_calls += 1;
    }

    fn set_voltage(&mut self, volts: f32) {
        let volts = if volts.is_finite() {
            volts.clamp(-MAX_MOTOR_VOLTAGE, MAX_MOTOR_VOLTAGE)
        } else {
            0.0
        };
        self.volts = volts * self.direction();
    }

    fn velocity_rpm(&mut self) -> f32 {
        rad_per_s_to_rpm(self.omega) * self.direction()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AT_SPEED_TOLERANCE_RPM, SHOOTER};
    use crate::control::{ShooterController, ShooterMode};
    use crate::telemetry::{TelemetrySink, TOP_TOPIC};

    const DT: f32 = 0.02;

    fn plant() -> SimpleMotorFeedforward {
        SimpleMotorFeedforward {
            ka: 0.002,
            ..SHOOTER.feedforward
        }
    }

    #[derive(Default)]
    struct Recorder(Vec<(String, f32)>);

    impl TelemetrySink for Recorder {
        fn publish(&mut self, name: &str, value: f32) {
            self.0.push((name.to_string(), value));
        }
    }

    #[test]
    fn settles_at_feedforward_speed() {
        let model = plant();
        let mut wheel = SimFlywheel::new(model);
        wheel.set_voltage(6.0);
        for _ in 0..500 {
            wheel.advance(DT);
        }
        let expected = rad_per_s_to_rpm((6.0 - model.ks) / model.kv);
        assert!((wheel.velocity_rpm() - expected).abs() < 1.0);
    }

    #[test]
    fn static_friction_holds_rotor() {
        let mut wheel = SimFlywheel::new(plant());
        wheel.set_voltage(0.1);
        wheel.advance(DT);
        assert_eq!(wheel.velocity_rpm(), 0.0);
    }

    #[test]
    fn spins_down_to_rest() {
        let mut wheel = SimFlywheel::new(plant());
        wheel.set_voltage(3.0);
        for _ in 0..100 {
            wheel.advance(DT);
        }
        assert!(wheel.velocity_rpm() > 0.0);

        wheel.set_voltage(0.0);
        for _ in 0..1000 {
            wheel.advance(DT);
        }
        assert_eq!(wheel.velocity_rpm(), 0.0);
    }

    #[test]
    fn inversion_is_invisible_to_caller() {
        let mut wheel = SimFlywheel::new(plant());
        wheel.configure(true, IdleMode::Coast);
        wheel.set_voltage(4.0);
        assert_eq!(wheel.applied_volts(), 4.0);
        for _ in 0..50 {
            wheel.advance(DT);
        }
        assert!(wheel.velocity_rpm() > 0.0);
        assert!(wheel.omega < 0.0);
    }

    #[test]
    fn closed_loop_reaches_target() {
        let mut shooter = ShooterController::new(
            SimFlywheel::new(plant()),
            SimFlywheel::new(plant()),
            &SHOOTER,
            Recorder::default(),
        );
        assert_eq!(shooter.top_motor_mut().configure_calls(), 1);
        assert!(shooter.bottom_motor_mut().inverted());

        shooter.set_speed(3000.0);
        for _ in 0..250 {
            shooter.top_motor_mut().advance(DT);
            shooter.bottom_motor_mut().advance(DT);
            shooter.step();
            shooter.periodic();
        }

        assert_eq!(shooter.mode(), ShooterMode::ClosedLoop { target_rpm: 3000.0 });
        assert!(shooter.at_speed(AT_SPEED_TOLERANCE_RPM));

        let (name, last_top) = shooter
            .telemetry()
            .0
            .iter()
            .rev()
            .find(|(name, _)| name == TOP_TOPIC)
            .cloned()
            .expect("top speed published");
        assert_eq!(name, TOP_TOPIC);
        assert!((last_top - 3000.0).abs() < AT_SPEED_TOLERANCE_RPM);
    }

    #[test]
    fn stop_spins_down() {
        let mut shooter = ShooterController::new(
            SimFlywheel::new(plant()),
            SimFlywheel::new(plant()),
            &SHOOTER,
            Recorder::default(),
        );
        shooter.set_speed(2000.0);
        for _ in 0..100 {
            shooter.top_motor_mut().advance(DT);
            shooter.bottom_motor_mut().advance(DT);
            shooter.step();
        }
        shooter.stop();
        for _ in 0..1000 {
            shooter.top_motor_mut().advance(DT);
            shooter.bottom_motor_mut().advance(DT);
            shooter.step();
        }
        assert_eq!(shooter.top_motor_rpm(), 0.0);
        assert_eq!(shooter.bottom_motor_rpm(), 0.0);
    }
}
