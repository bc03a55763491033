// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! CAN control for the brushless flywheel motor controllers.
//!
//! This module wraps the controller's CAN protocol for a single motor. Every exchange is a standard
//! data frame whose first byte is the command code:
//!
//! | Code   | Command        | Payload                 | Reply                         |
//! | ------ | -------------- | ----------------------- | ----------------------------- |
//! | `0xAF` | clear faults   | none                    | yes                           |
//! | `0xCF` | disable output | none                    | no                            |
//! | `0xC3` | set voltage    | `i32` LE, millivolts    | no                            |
//! | `0xA2` | read speed     | none                    | `i32` LE in bytes 1..5, 0.01 rpm |

use bxcan::{Data, Frame, Id, OverrunError, StandardId};
use core::convert::Infallible;
use micromath::F32Ext;
use nb::block;

pub const CMD_READ_SPEED: u8 = 0xA2;
pub const CMD_CLEAR_FAULTS: u8 = 0xAF;
pub const CMD_SET_VOLTAGE: u8 = 0xC3;
pub const CMD_DISABLE_OUTPUT: u8 = 0xCF;

/// How long to wait for a reply before giving up (µs).
pub const REPLY_TIMEOUT_US: u32 = 1_000;

/// Most frames discarded from the receive FIFO before a request.
const RX_DRAIN_LIMIT: u32 = 8;

/// Frame-level access to a CAN bus.
///
/// Implemented by `hw::CanBus` on the board; tests substitute an in-memory bus.
pub trait FrameBus {
    /// Queue a frame for transmission.
    fn transmit(&mut self, frame: &Frame) -> nb::Result<(), Infallible>;

    /// Take the next received frame, if any.
    fn receive(&mut self) -> nb::Result<Frame, OverrunError>;

    /// Free-running microsecond counter. Only differences are meaningful; it may wrap.
    fn micros(&mut self) -> u32;
}

impl<B: FrameBus + ?Sized> FrameBus for &mut B {
    fn transmit(&mut self, frame: &Frame) -> nb::Result<(), Infallible> {
        (**self).transmit(frame)
    }

    fn receive(&mut self) -> nb::Result<Frame, OverrunError> {
        (**self).receive()
    }

    fn micros(&mut self) -> u32 {
        (**self).micros()
    }
}

/// Error type for `CanMotor` operations.
#[derive(Debug)]
pub enum Error {
    /// Payload too long for a single CAN data frame (max 8 bytes total).
    PayloadTooLong,
    /// Receive-side CAN error.
    Rx(OverrunError),
    /// Response frame contained no data bytes, or fewer than the command needs.
    NoData,
    /// Response had a different command code than expected.
    UnexpectedCommand(u8),
    /// No matching response within `REPLY_TIMEOUT_US`.
    NoResponse,
}

impl From<OverrunError> for Error {
    fn from(e: OverrunError) -> Self {
        Error::Rx(e)
    }
}

/// Reply frame payload, command byte included.
struct Reply {
    bytes: [u8; 8],
    len: usize,
}

impl Reply {
    fn cmd(&self) -> u8 {
        self.bytes[0]
    }

    /// Bytes after the command code.
    fn body(&self) -> &[u8] {
        &self.bytes[1..self.len]
    }
}

/// CAN motor handle, parameterized by logical device address.
///
/// `DEV_ADDR` is the protocol device address, in the range 1 to 254 inclusive.
///
/// The driver will:
///   - transmit commands with `StdID = 0x100 | DEV_ADDR`
///   - expect responses from `StdID = DEV_ADDR`
#[derive(Default)]
pub struct CanMotor<const DEV_ADDR: u16>;

impl<const DEV_ADDR: u16> CanMotor<DEV_ADDR> {
    /// Create a new handle for this motor address.
    ///
    /// This is a zero-sized type; all state lives on the motor controller itself.
    #[inline]
    pub fn new() -> Self {
        Self
    }

    /// Host -> motor StdID (11-bit) used for commands.
    #[inline]
    pub fn host_id() -> StandardId {
        StandardId::new((0x100 | DEV_ADDR) & 0x7FF).unwrap_or(StandardId::MAX)
    }

    /// Motor -> host StdID (11-bit) used for responses.
    #[inline]
    pub fn dev_id() -> StandardId {
        StandardId::new(DEV_ADDR & 0x7FF).unwrap_or(StandardId::MAX)
    }

    /// Send a command and optionally wait for its response.
    ///
    /// - `cmd` is the command code (e.g., 0xA2 for read speed).
    /// - `payload` is any extra bytes following the command code.
    /// - If `wait_reply` is true, frames already sitting in the receive FIFO are discarded first,
    ///   then this polls for a matching response frame (same device ID and command code), skipping
    ///   unrelated traffic, for at most `REPLY_TIMEOUT_US`.
    fn request_response<B: FrameBus>(
        &mut self,
        bus: &mut B,
        cmd: u8,
        payload: &[u8],
        wait_reply: bool,
    ) -> Result<Option<Reply>, Error> {
        // Total payload including command must be <= 8 bytes
        if payload.len() > 7 {
            return Err(Error::PayloadTooLong);
        }

        let mut buf = [0u8; 8];
        buf[0] = cmd;
        let dlc = 1 + payload.len();
        buf[1..dlc].copy_from_slice(payload);

        let data = Data::new(&buf[..dlc]).ok_or(Error::PayloadTooLong)?;
        let frame = Frame::new_data(Self::host_id(), data);

        // Late replies to earlier requests must not answer this one
        if wait_reply {
            for _ in 0..RX_DRAIN_LIMIT {
                if let Err(nb::Error::WouldBlock) = bus.receive() {
                    break;
                }
            }
        }

        if let Err(never) = block!(bus.transmit(&frame)) {
            match never {}
        }

        if !wait_reply {
            return Ok(None);
        }

        let start = bus.micros();
        loop {
            let frame = match bus.receive() {
                Ok(frame) => frame,
                Err(nb::Error::WouldBlock) => {
                    if bus.micros().wrapping_sub(start) >= REPLY_TIMEOUT_US {
                        return Err(Error::NoResponse);
                    }
                    continue;
                }
                Err(nb::Error::Other(e)) => return Err(e.into()),
            };

            let id = match frame.id() {
                Id::Standard(id) => id,
                Id::Extended(_) => continue,
            };
            if id != Self::dev_id() {
                continue; // some other device's response
            }

            let data = match frame.data() {
                Some(d) if !d.is_empty() => d,
                _ => return Err(Error::NoData),
            };
            if data[0] != cmd {
                continue;
            }

            let mut bytes = [0u8; 8];
            let len = data.len().min(8);
            bytes[..len].copy_from_slice(&data[..len]);
            return Ok(Some(Reply { bytes, len }));
        }
    }

    /// Clear any latched faults.
    pub fn clear_faults<B: FrameBus>(&mut self, bus: &mut B) -> Result<(), Error> {
        self.request_response(bus, CMD_CLEAR_FAULTS, &[], true)?;
        Ok(())
    }

    /// Turn off motor output. The rotor spins freely until the next voltage command.
    pub fn disable_output<B: FrameBus>(&mut self, bus: &mut B) -> Result<(), Error> {
        self.request_response(bus, CMD_DISABLE_OUTPUT, &[], false)?;
        Ok(())
    }

    /// Command the motor in open-loop voltage mode.
    ///
    /// - `volts` is signed (negative values indicate reverse direction).
    /// - Resolution is 1 mV; the controller saturates to its supply range.
    pub fn set_voltage<B: FrameBus>(&mut self, bus: &mut B, volts: f32) -> Result<(), Error> {
        let millivolts: i32 = (volts * 1000.0).round() as i32;
        self.request_response(bus, CMD_SET_VOLTAGE, &millivolts.to_le_bytes(), false)?;
        Ok(())
    }

    /// Read back the real-time motor speed in rpm.
    pub fn read_speed_rpm<B: FrameBus>(&mut self, bus: &mut B) -> Result<f32, Error> {
        let reply = self
            .request_response(bus, CMD_READ_SPEED, &[], true)?
            .ok_or(Error::NoData)?;

        if reply.cmd() != CMD_READ_SPEED {
            return Err(Error::UnexpectedCommand(reply.cmd()));
        }

        let body = reply.body();
        if body.len() < 4 {
            return Err(Error::NoData);
        }
        let raw = i32::from_le_bytes([body[0], body[1], body[2], body[3]]);
        Ok(raw as f32 / 100.0)
    }
}
