// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Controller Area Network (CAN) abstraction layer.
//!
//! - `CanBus` wraps a HAL `can::Can` instance in `bxcan::Can`.
//! - Implements [`FrameBus`] so motor drivers can use it without knowing the peripheral.
//! - Reply timeouts are measured with the DWT cycle counter, which must be enabled first
//!   (`DCB::enable_trace` and `DWT::enable_cycle_counter`).

use core::convert::Infallible;

use bxcan::{self, filter::Mask32, Fifo, Frame, OverrunError};
use cortex_m::peripheral::DWT;
use stm32f7xx_hal::can as hal_can;

use crate::drivers::FrameBus;

/// Wrapper around a bxcan CAN instance built from a HAL CAN peripheral.
pub struct CanBus<I>
where
    hal_can::Can<I>: bxcan::Instance,
{
    can: bxcan::Can<hal_can::Can<I>>,

    cycles_per_us: u32,
    /// Cycle count at which `micros` last advanced
    last_cycles: u32,
    micros: u32,
}

impl<I> CanBus<I>
where
    hal_can::Can<I>: bxcan::Instance,
{
    /// Create and enable a bxcan instance from a HAL CAN peripheral.
    ///
    /// * `hal_can` – the HAL CAN wrapper
    /// * `btr` – value for the CAN_BTR register (bit timing). Get this from the
    ///           reference manual or the bxcan timing tables.
    /// * `loopback` – enable internal loopback
    /// * `silent` – enable silent mode
    /// * `sysclk_hz` – core clock, used to turn DWT cycles into microseconds
    pub fn new(
        hal_can: hal_can::Can<I>,
        btr: u32,
        loopback: bool,
        silent: bool,
        sysclk_hz: u32,
    ) -> Self {
        let can = bxcan::Can::builder(hal_can)
            .set_bit_timing(btr)
            .set_loopback(loopback)
            .set_silent(silent)
            .enable();

        Self {
            can,
            cycles_per_us: (sysclk_hz / 1_000_000).max(1),
            last_cycles: DWT::cycle_count(),
            micros: 0,
        }
    }
}

/// Extra helpers for CAN instances that own filters (CAN1 on STM32F7).
impl<I> CanBus<I>
where
    hal_can::Can<I>: bxcan::Instance + bxcan::FilterOwner,
{
    /// Accept every frame into FIFO0 using filter bank 0.
    pub fn accept_all(&mut self) {
        self.can
            .modify_filters()
            .enable_bank(0, Fifo::Fifo0, Mask32::accept_all());
    }
}

impl<I> FrameBus for CanBus<I>
where
    hal_can::Can<I>: bxcan::Instance,
{
    fn transmit(&mut self, frame: &Frame) -> nb::Result<(), Infallible> {
        self.can.transmit(frame).map(|_status| ())
    }

    fn receive(&mut self) -> nb::Result<Frame, OverrunError> {
        self.can.receive()
    }

    fn micros(&mut self) -> u32 {
        // Whole microseconds only, the remainder carries over to the next call
        let elapsed_us = DWT::cycle_count().wrapping_sub(self.last_cycles) / self.cycles_per_us;
        self.last_cycles = self
            .last_cycles
            .wrapping_add(elapsed_us * self.cycles_per_us);
        self.micros = self.micros.wrapping_add(elapsed_us);
        self.micros
    }
}
