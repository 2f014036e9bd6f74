//! Fan-out writer used to record child output while forwarding it live

use std::io::{self, Write};

/// Writes every buffer to a capture sink and a live stream.
///
/// Each `write` delivers the whole buffer to both destinations before
/// returning, so both see the same bytes in the same order. The first error
/// encountered is returned.
pub struct Tee<A: Write, B: Write> {
    capture: A,
    live: B,
}

impl<A: Write, B: Write> Tee<A, B> {
    pub fn new(capture: A, live: B) -> Self {
        Self { capture, live }
    }

    pub fn into_inner(self) -> (A, B) {
        (self.capture, self.live)
    }
}

impl<A: Write, B: Write> Write for Tee<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.capture.write_all(buf)?;
        self.live.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.capture.flush()?;
        self.live.flush()
    }
}
