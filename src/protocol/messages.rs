// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Command message protocol used to drive the shooter from a driver station.
//!
//! ```text
//! START_BYTE | id | payload (little-endian f32s) | checksum
//! ```
//!
//! The checksum is the wrapping byte sum of `id` and the payload.

use crate::control::ShooterController;
use crate::motors::Actuator;
use crate::telemetry::TelemetrySink;

/// Sync byte for the protocol.
pub const START_BYTE: u8 = 0xA5;

// Message IDs
pub const MSG_SET_SPEED: u8 = 0x40;
pub const MSG_SET_VOLTAGE: u8 = 0x41;
pub const MSG_STOP: u8 = 0x42;

/// Largest payload of any message.
pub const MAX_PAYLOAD: usize = 8;
/// Largest encoded frame: start byte, id, payload, checksum.
pub const MAX_FRAME: usize = MAX_PAYLOAD + 3;

/// Payload length for a message ID, or `None` if the ID is unknown.
pub fn payload_len(id: u8) -> Option<usize> {
    match id {
        MSG_SET_SPEED => Some(4),
        MSG_SET_VOLTAGE => Some(8),
        MSG_STOP => Some(0),
        _ => None,
    }
}

/// Shooter commands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Closed-loop flywheel speed (rpm).
    SetSpeed { rpm: f32 },
    /// Open-loop voltages.
    SetVoltage { top: f32, bottom: f32 },
    /// Command 0 V and idle.
    Stop,
}

impl Command {
    pub fn id(&self) -> u8 {
        match self {
            Command::SetSpeed { .. } => MSG_SET_SPEED,
            Command::SetVoltage { .. } => MSG_SET_VOLTAGE,
            Command::Stop => MSG_STOP,
        }
    }

    /// Encode a complete frame into `out`. Returns the number of bytes written.
    pub fn encode(&self, out: &mut [u8; MAX_FRAME]) -> usize {
        let mut payload = [0u8; MAX_PAYLOAD];
        let len = match *self {
            Command::SetSpeed { rpm } => {
                payload[..4].copy_from_slice(&rpm.to_le_bytes());
                4
            }
            Command::SetVoltage { top, bottom } => {
                payload[..4].copy_from_slice(&top.to_le_bytes());
                payload[4..8].copy_from_slice(&bottom.to_le_bytes());
                8
            }
            Command::Stop => 0,
        };

        let id = self.id();
        out[0] = START_BYTE;
        out[1] = id;
        out[2..2 + len].copy_from_slice(&payload[..len]);
        out[2 + len] = payload[..len]
            .iter()
            .fold(id, |sum, &b| sum.wrapping_add(b));
        len + 3
    }

    /// Build a command from a message ID and its full payload.
    pub(crate) fn decode(id: u8, payload: &[u8]) -> Option<Self> {
        if payload_len(id)? != payload.len() {
            return None;
        }
        let f32_at = |i: usize| {
            f32::from_le_bytes([payload[i], payload[i + 1], payload[i + 2], payload[i + 3]])
        };

        match id {
            MSG_SET_SPEED => Some(Command::SetSpeed { rpm: f32_at(0) }),
            MSG_SET_VOLTAGE => Some(Command::SetVoltage {
                top: f32_at(0),
                bottom: f32_at(4),
            }),
            MSG_STOP => Some(Command::Stop),
            _ => None,
        }
    }

    /// Carry out the command on the shooter.
    pub fn apply<A: Actuator, T: TelemetrySink>(self, shooter: &mut ShooterController<A, T>) {
        match self {
            Command::SetSpeed { rpm } => shooter.set_speed(rpm),
            Command::SetVoltage { top, bottom } => shooter.set_voltage(top, bottom),
            Command::Stop => shooter.stop(),
        }
    }
}
