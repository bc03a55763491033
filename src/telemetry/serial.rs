// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Telemetry over a text link.
//!
//! Every value is written as one `name=value` line terminated by CRLF, with two decimals:
//!
//! ```text
//! Shooter/Setpoint=3000.00
//! Shooter/Top=2987.41
//! Shooter/Bottom=2991.07
//! ```

use core::fmt::Write;

use super::TelemetrySink;

/// Telemetry sink writing lines to any `core::fmt::Write` (a USART on the board, a `String` in
/// tests).
pub struct SerialTelemetry<W: Write> {
    out: W,
    dropped: u32,
}

impl<W: Write> SerialTelemetry<W> {
    pub fn new(out: W) -> Self {
        Self { out, dropped: 0 }
    }

    /// Number of values that could not be written.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Access the underlying writer.
    pub fn inner(&mut self) -> &mut W {
        &mut self.out
    }

    /// Consume the sink and return the underlying writer.
    pub fn free(self) -> W {
        self.out
    }
}

impl<W: Write> TelemetrySink for SerialTelemetry<W> {
    fn publish(&mut self, name: &str, value: f32) {
        if write!(self.out, "{}={:.2}\r\n", name, value).is_err() {
            self.dropped = self.dropped.wrapping_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt;

    #[test]
    fn writes_one_line_per_value() {
        let mut sink = SerialTelemetry::new(String::new());
        sink.publish("Shooter/Top", 2987.4125);
        sink.publish("Shooter/Bottom", -12.0);
        assert_eq!(
            sink.free(),
            "Shooter/Top=2987.41\r\nShooter/Bottom=-12.00\r\n"
        );
    }

    struct Broken;

    impl fmt::Write for Broken {
        fn write_str(&mut self, _s: &str) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[test]
    fn failed_writes_are_counted() {
        let mut sink = SerialTelemetry::new(Broken);
        sink.publish("Shooter/Top", 1.0);
        sink.publish("Shooter/Bottom", 2.0);
        assert_eq!(sink.dropped(), 2);
    }
}
