// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Closed-loop velocity controller for the two-flywheel shooter.
//!
//! Each flywheel is driven by its own [`Actuator`] with its own [`Pid`] corrector. A closed-loop
//! step converts the target and the measured speed to rad/s and commands
//!
//! ```text
//! V = pid(measured, target) + feedforward(target)
//! ```
//!
//! No clamping happens here; the actuator saturates to what its hardware accepts.
//!
//! Typical usage pattern (one call per control period):
//!
//! ```ignore
//! shooter.set_speed(3000.0);
//!
//! loop {
//!     shooter.step();
//!     shooter.periodic();
//!     delay.delay_ms(20_u32);
//! }
//! ```

use crate::config::ShooterConfig;
use crate::control::{Pid, SimpleMotorFeedforward};
use crate::motors::Actuator;
use crate::telemetry::{TelemetrySink, BOTTOM_TOPIC, SETPOINT_TOPIC, TOP_TOPIC};
use crate::units::rpm_to_rad_per_s;

use micromath::F32Ext;

/// Operating mode of the shooter.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ShooterMode {
    /// Nothing commanded yet, or stopped.
    Idle,

    /// Regular closed-loop control toward a flywheel speed.
    ClosedLoop { target_rpm: f32 },

    /// Raw voltages, bypassing the control law.
    OpenLoop { top_volts: f32, bottom_volts: f32 },
}

/// Shooter state and configuration.
pub struct ShooterController<A: Actuator, T: TelemetrySink> {
    top: A,
    bottom: A,
    top_pid: Pid,
    bottom_pid: Pid,
    feedforward: SimpleMotorFeedforward,
    telemetry: T,
    mode: ShooterMode,

    /// Last speed passed to `set_speed` (rpm)
    setpoint_rpm: f32,

    /// Control period (s)
    period_s: f32,
}

impl<A: Actuator, T: TelemetrySink> ShooterController<A, T> {
    /// Create the shooter and configure both motors' direction and idle behaviour.
    pub fn new(mut top: A, mut bottom: A, config: &ShooterConfig, telemetry: T) -> Self {
        top.configure(config.inverted, config.idle_mode);
        bottom.configure(config.inverted, config.idle_mode);

        let pid = Pid::new(config.pid.kp, config.pid.ki, config.pid.kd);

        log::info!(
            "shooter configured: kp={} ki={} kd={} kv={} inverted={} idle={:?}",
            config.pid.kp,
            config.pid.ki,
            config.pid.kd,
            config.feedforward.kv,
            config.inverted,
            config.idle_mode
        );

        Self {
            top,
            bottom,
            top_pid: pid.clone(),
            bottom_pid: pid,
            feedforward: config.feedforward,
            telemetry,
            mode: ShooterMode::Idle,
            setpoint_rpm: 0.0,
            period_s: config.period_s,
        }
    }

    /// Set the target flywheel speed (rpm) and run one control step toward it.
    ///
    /// Coming from any other mode, both correctors start from a clean history.
    pub fn set_speed(&mut self, target_rpm: f32) {
        if !matches!(self.mode, ShooterMode::ClosedLoop { .. }) {
            self.top_pid.reset();
            self.bottom_pid.reset();
        }
        self.enter(ShooterMode::ClosedLoop { target_rpm });
        self.setpoint_rpm = target_rpm;
        self.telemetry.publish(SETPOINT_TOPIC, target_rpm);

        self.drive_closed_loop(target_rpm);
    }

    /// Send raw voltages to each motor, bypassing the control law.
    pub fn set_voltage(&mut self, top_volts: f32, bottom_volts: f32) {
        self.enter(ShooterMode::OpenLoop {
            top_volts,
            bottom_volts,
        });
        self.top.set_voltage(top_volts);
        self.bottom.set_voltage(bottom_volts);
    }

    /// Send the same raw voltage to both motors.
    #[inline]
    pub fn set_voltage_both(&mut self, volts: f32) {
        self.set_voltage(volts, volts);
    }

    /// Command 0 V and let both flywheels spin down.
    pub fn stop(&mut self) {
        self.enter(ShooterMode::Idle);
        self.top.set_voltage(0.0);
        self.bottom.set_voltage(0.0);
    }

    /// Run one control step for the current mode.
    pub fn step(&mut self) {
        match self.mode {
            ShooterMode::Idle => {}

            ShooterMode::ClosedLoop { target_rpm } => self.drive_closed_loop(target_rpm),

            ShooterMode::OpenLoop {
                top_volts,
                bottom_volts,
            } => {
                self.top.set_voltage(top_volts);
                self.bottom.set_voltage(bottom_volts);
            }
        }
    }

    /// Publish both measured flywheel speeds. Call once per scheduler tick.
    pub fn periodic(&mut self) {
        let bottom = self.bottom_motor_rpm();
        let top = self.top_motor_rpm();
        self.telemetry.publish(BOTTOM_TOPIC, bottom);
        self.telemetry.publish(TOP_TOPIC, top);
    }

    /// Measured speed of the top flywheel (rpm).
    #[inline]
    pub fn top_motor_rpm(&mut self) -> f32 {
        self.top.velocity_rpm()
    }

    /// Measured speed of the bottom flywheel (rpm).
    #[inline]
    pub fn bottom_motor_rpm(&mut self) -> f32 {
        self.bottom.velocity_rpm()
    }

    /// Returns true if closed-loop and both flywheels are within `tolerance_rpm` of the target.
    pub fn at_speed(&mut self, tolerance_rpm: f32) -> bool {
        match self.mode {
            ShooterMode::ClosedLoop { target_rpm } => {
                let top_err = (self.top_motor_rpm() - target_rpm).abs();
                let bottom_err = (self.bottom_motor_rpm() - target_rpm).abs();
                top_err <= tolerance_rpm && bottom_err <= tolerance_rpm
            }
            _ => false,
        }
    }

    #[inline]
    pub fn mode(&self) -> ShooterMode {
        self.mode
    }

    /// Last speed passed to [`set_speed`](Self::set_speed) (rpm).
    #[inline]
    pub fn setpoint_rpm(&self) -> f32 {
        self.setpoint_rpm
    }

    pub fn telemetry(&mut self) -> &mut T {
        &mut self.telemetry
    }

    /// Expose the underlying top motor.
    pub fn top_motor_mut(&mut self) -> &mut A {
        &mut self.top
    }

    /// Expose the underlying bottom motor.
    pub fn bottom_motor_mut(&mut self) -> &mut A {
        &mut self.bottom
    }

    fn enter(&mut self, mode: ShooterMode) {
        if core::mem::discriminant(&mode) != core::mem::discriminant(&self.mode) {
            log::debug!("shooter mode {:?} -> {:?}", self.mode, mode);
        }
        self.mode = mode;
    }

    fn drive_closed_loop(&mut self, target_rpm: f32) {
        let target = rpm_to_rad_per_s(target_rpm);
        let ff = self.feedforward.calculate(target);

        let top_measured = rpm_to_rad_per_s(self.top.velocity_rpm());
        let top_correction = self.top_pid.update(target, top_measured, self.period_s);
        self.top.set_voltage(top_correction + ff);

        let bottom_measured = rpm_to_rad_per_s(self.bottom.velocity_rpm());
        let bottom_correction = self.bottom_pid.update(target, bottom_measured, self.period_s);
        self.bottom.set_voltage(bottom_correction + ff);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PidGains, SHOOTER};
    use crate::motors::IdleMode;

    #[derive(Default)]
    struct MockMotor {
        rpm: f32,
        configured: Vec<(bool, IdleMode)>,
        commands: Vec<f32>,
    }

    impl MockMotor {
        fn at(rpm: f32) -> Self {
            Self {
                rpm,
                ..Self::default()
            }
        }

        fn last_command(&self) -> f32 {
            *self.commands.last().expect("no voltage commanded")
        }
    }

    impl Actuator for MockMotor {
        fn configure(&mut self, inverted: bool, idle_mode: IdleMode) {
            self.configured.push((inverted, idle_mode));
        }

        fn set_voltage(&mut self, volts: f32) {
            self.commands.push(volts);
        }

        fn velocity_rpm(&mut self) -> f32 {
            self.rpm
        }
    }

    #[derive(Default)]
    struct Recorder(Vec<(String, f32)>);

    impl TelemetrySink for Recorder {
        fn publish(&mut self, name: &str, value: f32) {
            self.0.push((name.to_string(), value));
        }
    }

    fn config(kp: f32, ki: f32, kd: f32, kv: f32) -> ShooterConfig {
        ShooterConfig {
            pid: PidGains { kp, ki, kd },
            feedforward: SimpleMotorFeedforward::new(0.0, kv, 0.0),
            ..SHOOTER
        }
    }

    fn shooter(
        top_rpm: f32,
        bottom_rpm: f32,
        cfg: &ShooterConfig,
    ) -> ShooterController<MockMotor, Recorder> {
        ShooterController::new(
            MockMotor::at(top_rpm),
            MockMotor::at(bottom_rpm),
            cfg,
            Recorder::default(),
        )
    }

    #[test]
    fn construction_configures_each_motor_once() {
        let mut s = shooter(0.0, 0.0, &SHOOTER);
        assert_eq!(s.top_motor_mut().configured, [(true, IdleMode::Coast)]);
        assert_eq!(s.bottom_motor_mut().configured, [(true, IdleMode::Coast)]);
        assert!(s.top_motor_mut().commands.is_empty());
        assert_eq!(s.mode(), ShooterMode::Idle);
    }

    #[test]
    fn on_target_commands_feedforward_only() {
        for kp in [0.0005, 0.5, 50.0] {
            let mut s = shooter(3000.0, 3000.0, &config(kp, 0.0, 0.0, 0.002));
            s.set_speed(3000.0);
            let expected = 0.002 * rpm_to_rad_per_s(3000.0);
            assert!((s.top_motor_mut().last_command() - expected).abs() < 1e-5);
            assert!((s.bottom_motor_mut().last_command() - expected).abs() < 1e-5);
            assert!((expected - 0.6283).abs() < 1e-3);
        }
    }

    #[test]
    fn below_target_adds_proportional_correction() {
        let mut s = shooter(2000.0, 3000.0, &config(0.01, 0.0, 0.0, 0.002));
        s.set_speed(3000.0);
        let ff = 0.002 * rpm_to_rad_per_s(3000.0);
        let p = 0.01 * rpm_to_rad_per_s(1000.0);
        assert!((s.top_motor_mut().last_command() - (ff + p)).abs() < 1e-4);
        assert!((s.bottom_motor_mut().last_command() - ff).abs() < 1e-5);
    }

    #[test]
    fn set_speed_does_not_read_back_target() {
        let mut s = shooter(1234.0, 987.0, &SHOOTER);
        s.set_speed(5000.0);
        assert_eq!(s.top_motor_rpm(), 1234.0);
        assert_eq!(s.bottom_motor_rpm(), 987.0);
        assert_eq!(s.setpoint_rpm(), 5000.0);
    }

    #[test]
    fn set_speed_publishes_setpoint() {
        let mut s = shooter(0.0, 0.0, &SHOOTER);
        s.set_speed(2500.0);
        assert_eq!(s.telemetry().0, [(SETPOINT_TOPIC.to_string(), 2500.0)]);
    }

    #[test]
    fn correctors_are_isolated_per_motor() {
        // Top is far below target, bottom is on target. With a shared integrator the bottom
        // command would pick up the top's accumulated error.
        let cfg = config(0.0, 0.05, 0.0, 0.0);
        let mut s = shooter(0.0, 1000.0, &cfg);
        for _ in 0..5 {
            s.set_speed(1000.0);
        }
        assert!(s.top_motor_mut().last_command() > 0.0);
        assert!(s.bottom_motor_mut().commands.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn bottom_output_matches_standalone_corrector() {
        let cfg = config(0.001, 0.02, 0.0005, 0.0);
        let mut s = shooter(500.0, 800.0, &cfg);
        let mut reference = Pid::new(0.001, 0.02, 0.0005);
        let target = rpm_to_rad_per_s(1000.0);
        let measured = rpm_to_rad_per_s(800.0);
        for _ in 0..3 {
            s.set_speed(1000.0);
            let expected = reference.update(target, measured, cfg.period_s);
            assert!((s.bottom_motor_mut().last_command() - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn single_voltage_matches_pair() {
        let mut a = shooter(0.0, 0.0, &SHOOTER);
        let mut b = shooter(0.0, 0.0, &SHOOTER);
        for v in [0.0, 3.3, -7.25, 12.0, 20.0] {
            a.set_voltage_both(v);
            b.set_voltage(v, v);
        }
        assert_eq!(a.top_motor_mut().commands, b.top_motor_mut().commands);
        assert_eq!(a.bottom_motor_mut().commands, b.bottom_motor_mut().commands);

        let top: Vec<u32> = a.top_motor_mut().commands.iter().map(|v| v.to_bits()).collect();
        let bottom: Vec<u32> = a.bottom_motor_mut().commands.iter().map(|v| v.to_bits()).collect();
        assert_eq!(top, bottom);
    }

    #[test]
    fn open_loop_is_not_clamped_or_modified() {
        let mut s = shooter(0.0, 0.0, &SHOOTER);
        s.set_voltage(4.0, -30.0);
        assert_eq!(s.top_motor_mut().last_command(), 4.0);
        assert_eq!(s.bottom_motor_mut().last_command(), -30.0);
        assert_eq!(
            s.mode(),
            ShooterMode::OpenLoop {
                top_volts: 4.0,
                bottom_volts: -30.0
            }
        );
    }

    #[test]
    fn entering_closed_loop_resets_correctors() {
        let cfg = config(0.0, 0.05, 0.0, 0.0);
        let mut s = shooter(0.0, 0.0, &cfg);
        s.set_speed(1000.0);
        let first = s.top_motor_mut().last_command();
        s.set_speed(1000.0);
        assert!(s.top_motor_mut().last_command() > first);

        s.set_voltage_both(1.0);
        s.set_speed(1000.0);
        assert!((s.top_motor_mut().last_command() - first).abs() < 1e-6);
    }

    #[test]
    fn retargeting_keeps_integrator() {
        let cfg = config(0.0, 0.05, 0.0, 0.0);
        let mut s = shooter(0.0, 0.0, &cfg);
        s.set_speed(1000.0);
        let first = s.top_motor_mut().last_command();
        s.set_speed(1000.0);
        s.set_speed(-1000.0);
        // Integrator unwinds from its accumulated value instead of restarting from zero.
        assert!((s.top_motor_mut().last_command() - first).abs() < 1e-6);
    }

    #[test]
    fn step_repeats_current_mode() {
        let mut s = shooter(0.0, 0.0, &config(0.0, 0.0, 0.0, 0.002));
        s.step();
        assert!(s.top_motor_mut().commands.is_empty());

        s.set_voltage(2.0, 3.0);
        s.step();
        assert_eq!(s.top_motor_mut().commands, [2.0, 2.0]);
        assert_eq!(s.bottom_motor_mut().commands, [3.0, 3.0]);

        s.set_speed(3000.0);
        s.step();
        let ff = 0.002 * rpm_to_rad_per_s(3000.0);
        assert_eq!(s.top_motor_mut().commands.len(), 4);
        assert!((s.top_motor_mut().last_command() - ff).abs() < 1e-5);
        // step() does not republish the setpoint
        assert_eq!(s.telemetry().0.len(), 1);
    }

    #[test]
    fn stop_commands_zero_and_idles() {
        let mut s = shooter(0.0, 0.0, &SHOOTER);
        s.set_speed(3000.0);
        s.stop();
        assert_eq!(s.top_motor_mut().last_command(), 0.0);
        assert_eq!(s.bottom_motor_mut().last_command(), 0.0);
        assert_eq!(s.mode(), ShooterMode::Idle);
        assert_eq!(s.setpoint_rpm(), 3000.0);
    }

    #[test]
    fn periodic_publishes_measured_speeds() {
        let mut s = shooter(1500.0, 1490.0, &SHOOTER);
        s.periodic();
        let published = &s.telemetry().0;
        assert!(published.contains(&(TOP_TOPIC.to_string(), 1500.0)));
        assert!(published.contains(&(BOTTOM_TOPIC.to_string(), 1490.0)));
        assert_eq!(published.len(), 2);
    }

    #[test]
    fn at_speed_only_in_closed_loop() {
        let mut s = shooter(2980.0, 3040.0, &SHOOTER);
        assert!(!s.at_speed(100.0));
        s.set_speed(3000.0);
        assert!(s.at_speed(50.0));
        assert!(!s.at_speed(30.0));
        s.set_voltage_both(6.0);
        assert!(!s.at_speed(1000.0));
    }
}
