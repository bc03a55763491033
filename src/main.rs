// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Shooter entry point.
//!
//! On the board this runs the 50 Hz control loop against the CAN flywheel motors. On a host it runs
//! the same controller against simulated flywheels and prints telemetry to stdout.

#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(target_os = "none")]
mod firmware {
    use core::cell::RefCell;

    use cortex_m::peripheral::DWT;
    use cortex_m_rt::entry;
    use log::LevelFilter;
    use panic_halt as _;

    use hal::{
        can::Can,
        pac,
        prelude::*,
        serial::{Config, Serial},
    };
    use stm32f7xx_hal as hal;

    use shooter::config::{
        AT_SPEED_TOLERANCE_RPM, BOTTOM_MOTOR_ADDR, CAN_BTR_1MBPS, DASHBOARD_BAUD, DEBUG_BAUD,
        LOOP_PERIOD_MS, SHOOTER, TOP_MOTOR_ADDR,
    };
    use shooter::control::ShooterController;
    use shooter::hw::{dashboard, logger, BoardPins, CanBus, Led, Usart};
    use shooter::motors::{Actuator, ShooterMotor};
    use shooter::protocol::Parser;
    use shooter::telemetry::serial::SerialTelemetry;

    #[entry]
    fn main() -> ! {
        // Peripherals
        let dp = pac::Peripherals::take().unwrap();
        let mut cp = cortex_m::Peripherals::take().unwrap();

        // Cycle counter, for CAN reply timeouts and loop timing
        cp.DCB.enable_trace();
        cp.DWT.enable_cycle_counter();

        // Clocks
        let rcc = dp.RCC.constrain();
        let clocks = rcc.cfgr.sysclk(216.MHz()).freeze();
        let mut apb1 = rcc.apb1;

        let pins = BoardPins::new(dp.GPIOA, dp.GPIOD);

        // LED
        let mut led_yellow = Led::active_low(pins.leds.yellow);
        let mut led_green = Led::active_low(pins.leds.green);

        // USART1 (DBG)
        let debug_cfg = Config {
            baud_rate: DEBUG_BAUD.bps(),
            ..Default::default()
        };
        let serial = Serial::new(
            dp.USART1,
            (pins.usart1.tx, pins.usart1.rx),
            &clocks,
            debug_cfg,
        );
        let _ = logger::init(Usart::new(serial), LevelFilter::Info);

        // USART2 (dashboard)
        let dashboard_cfg = Config {
            baud_rate: DASHBOARD_BAUD.bps(),
            ..Default::default()
        };
        let serial = Serial::new(
            dp.USART2,
            (pins.usart2.tx, pins.usart2.rx),
            &clocks,
            dashboard_cfg,
        );
        let telemetry = SerialTelemetry::new(dashboard::init(serial));

        // CAN1
        let can1 = Can::new(dp.CAN1, &mut apb1, (pins.can1.tx, pins.can1.rx));
        let mut can = CanBus::new(can1, CAN_BTR_1MBPS, false, false, clocks.sysclk().raw());
        can.accept_all();
        let bus = RefCell::new(can);

        // Flywheels
        let mut top = ShooterMotor::<_, TOP_MOTOR_ADDR>::new(&bus);
        let mut bottom = ShooterMotor::<_, BOTTOM_MOTOR_ADDR>::new(&bus);
        if let Err(e) = top.clear_faults() {
            log::warn!("top motor: clear_faults failed: {:?}", e);
        }
        if let Err(e) = bottom.clear_faults() {
            log::warn!("bottom motor: clear_faults failed: {:?}", e);
        }

        let mut shooter = ShooterController::new(
            &mut top as &mut dyn Actuator,
            &mut bottom as &mut dyn Actuator,
            &SHOOTER,
            telemetry,
        );

        let mut parser = Parser::new();
        let period_cycles = clocks.sysclk().raw() / 1000 * LOOP_PERIOD_MS;
        let mut next_tick = DWT::cycle_count();

        led_yellow.on();
        log::info!("shooter running at {} ms", LOOP_PERIOD_MS);

        loop {
            // Fixed rate: the period is measured from tick to tick, not from the end of the work
            next_tick = next_tick.wrapping_add(period_cycles);
            while (DWT::cycle_count().wrapping_sub(next_tick) as i32) < 0 {}

            // Only the newest command received since the last tick counts
            let latest = parser.latest(core::iter::from_fn(dashboard::read_byte));

            let lost = dashboard::take_lost();
            if lost > 0 {
                log::warn!("dashboard: {} bytes lost", lost);
            }

            match latest {
                Some(cmd) => {
                    log::info!("command {:?}", cmd);
                    cmd.apply(&mut shooter);
                }
                None => shooter.step(),
            }
            shooter.periodic();

            led_green.set(shooter.at_speed(AT_SPEED_TOLERANCE_RPM));
        }
    }
}

#[cfg(not(target_os = "none"))]
fn main() {
    use std::fmt;

    use shooter::config::{AT_SPEED_TOLERANCE_RPM, SHOOTER};
    use shooter::control::{ShooterController, SimpleMotorFeedforward};
    use shooter::protocol::{messages::MAX_FRAME, Command, Parser};
    use shooter::sim::SimFlywheel;
    use shooter::telemetry::serial::SerialTelemetry;

    struct Stdout;

    impl fmt::Write for Stdout {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            print!("{}", s);
            Ok(())
        }
    }

    // Driver station script: (tick, command)
    let script = [
        (0, Command::SetSpeed { rpm: 3000.0 }),
        (150, Command::SetSpeed { rpm: 4500.0 }),
        (300, Command::SetVoltage {
            top: 4.0,
            bottom: 4.0,
        }),
        (400, Command::Stop),
    ];

    let plant = SimpleMotorFeedforward {
        ka: 0.002,
        ..SHOOTER.feedforward
    };
    let mut shooter = ShooterController::new(
        SimFlywheel::new(plant),
        SimFlywheel::new(plant),
        &SHOOTER,
        SerialTelemetry::new(Stdout),
    );
    let mut parser = Parser::new();
    let mut ready = false;

    for tick in 0..500 {
        shooter.top_motor_mut().advance(SHOOTER.period_s);
        shooter.bottom_motor_mut().advance(SHOOTER.period_s);

        // Commands travel through the same framing as on the serial link
        let mut queued = Vec::new();
        for (_, cmd) in script.iter().filter(|(at, _)| *at == tick) {
            let mut frame = [0u8; MAX_FRAME];
            let n = cmd.encode(&mut frame);
            queued.extend_from_slice(&frame[..n]);
        }
        let latest = parser.latest(queued);

        match latest {
            Some(cmd) => {
                println!("# tick {}: {:?}", tick, cmd);
                cmd.apply(&mut shooter);
            }
            None => shooter.step(),
        }
        shooter.periodic();

        let now_ready = shooter.at_speed(AT_SPEED_TOLERANCE_RPM);
        if now_ready != ready {
            println!("# tick {}: at speed = {}", tick, now_ready);
            ready = now_ready;
        }
    }
}
