// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Dashboard link on USART2.
//!
//! Output goes through a blocking [`Usart`]. Input is taken byte by byte in the USART2 interrupt
//! and queued, so command frames survive the main loop being busy writing telemetry or talking
//! to the motors. The USART has no receive FIFO; polling it from the loop would overrun.

use core::cell::RefCell;
use core::sync::atomic::{AtomicU32, Ordering};

use cortex_m::interrupt::{self, Mutex};
use cortex_m::peripheral::NVIC;
use heapless::Deque;
use stm32f7xx_hal::{
    pac::{self, interrupt, USART2},
    prelude::*,
    serial::{Event, Pins, Rx, Serial},
};

use super::Usart;

/// Received bytes not yet taken by the main loop. Holds more than one loop period of input.
const RX_QUEUE_LEN: usize = 256;

static RX: Mutex<RefCell<Option<Rx<USART2>>>> = Mutex::new(RefCell::new(None));
static RX_QUEUE: Mutex<RefCell<Deque<u8, RX_QUEUE_LEN>>> =
    Mutex::new(RefCell::new(Deque::new()));

/// Bytes lost to a full queue or a receive error since the last [`take_lost`].
static LOST: AtomicU32 = AtomicU32::new(0);

/// Start interrupt-driven reception and return the output half.
pub fn init<PINS: Pins<USART2>>(mut serial: Serial<USART2, PINS>) -> Usart<USART2> {
    serial.listen(Event::Rxne);
    let (tx, rx) = serial.split();

    interrupt::free(|cs| {
        RX.borrow(cs).replace(Some(rx));
    });
    // SAFETY: the handler only touches state guarded by `interrupt::free`.
    unsafe { NVIC::unmask(pac::Interrupt::USART2) };

    Usart::from_tx(tx)
}

/// Next received byte, or `None` if the queue is empty.
pub fn read_byte() -> Option<u8> {
    interrupt::free(|cs| RX_QUEUE.borrow(cs).borrow_mut().pop_front())
}

/// Number of bytes lost since the last call.
pub fn take_lost() -> u32 {
    LOST.swap(0, Ordering::Relaxed)
}

#[interrupt]
fn USART2() {
    interrupt::free(|cs| {
        if let Some(rx) = RX.borrow(cs).borrow_mut().as_mut() {
            match rx.read() {
                Ok(b) => {
                    if RX_QUEUE.borrow(cs).borrow_mut().push_back(b).is_err() {
                        LOST.fetch_add(1, Ordering::Relaxed);
                    }
                }
                Err(nb::Error::WouldBlock) => {}
                // Overrun, framing or noise; the read cleared the flag
                Err(nb::Error::Other(_)) => {
                    LOST.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
    });
}
