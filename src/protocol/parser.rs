// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Message parser for the shooter command protocol.
//!
//! Bytes are pushed one at a time as they arrive from the serial link. Frames with an unknown ID
//! or a bad checksum are dropped and the parser waits for the next start byte.

use crate::protocol::messages::*;

enum State {
    WaitStart,
    WaitId,
    Payload { id: u8, len: usize },
    WaitChecksum { id: u8 },
}

pub struct Parser {
    state: State,
    checksum: u8,
    payload: [u8; MAX_PAYLOAD],
    filled: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            state: State::WaitStart,
            checksum: 0,
            payload: [0; MAX_PAYLOAD],
            filled: 0,
        }
    }

    /// Process a single incoming byte. Returns `Some(Command)` if a complete packet is received.
    pub fn push(&mut self, byte: u8) -> Option<Command> {
        match self.state {
            State::WaitStart => {
                if byte == START_BYTE {
                    self.state = State::WaitId;
                    self.checksum = 0;
                    self.filled = 0;
                }
            }
            State::WaitId => {
                self.checksum = self.checksum.wrapping_add(byte);

                self.state = match payload_len(byte) {
                    Some(0) => State::WaitChecksum { id: byte },
                    Some(len) => State::Payload { id: byte, len },
                    // Unknown message ID, reset state
                    None => State::WaitStart,
                };
            }
            State::Payload { id, len } => {
                self.checksum = self.checksum.wrapping_add(byte);
                self.payload[self.filled] = byte;
                self.filled += 1;

                if self.filled == len {
                    self.state = State::WaitChecksum { id };
                }
            }
            State::WaitChecksum { id } => {
                let valid = byte == self.checksum;
                self.state = State::WaitStart; // Reset for next message

                if valid {
                    return Command::decode(id, &self.payload[..self.filled]);
                }
            }
        }
        None
    }

    /// Feed every byte from `bytes` and return the last complete command, if any.
    ///
    /// A frame cut off at the end is kept and finished by the next call.
    pub fn latest(&mut self, bytes: impl IntoIterator<Item = u8>) -> Option<Command> {
        bytes.into_iter().filter_map(|b| self.push(b)).last()
    }
}
