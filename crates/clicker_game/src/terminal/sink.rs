//! Byte sinks a surface writes into.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Destination for one connection's output.
///
/// Writes must not block on the network; remote sinks queue bytes for a
/// writer task.
pub trait Sink: Send {
    /// Queue bytes for the client.
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Push queued bytes out.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Close the underlying stream. Called once, after the final write.
    fn close(&mut self) {}

    /// Put the controlling terminal in raw mode, if there is one.
    fn acquire_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Undo [`Sink::acquire_raw_mode`].
    fn release_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryRecord {
    bytes: Vec<u8>,
    writes: usize,
    closed: bool,
    raw_mode: bool,
    fail_writes: bool,
}

/// Sink that records everything written. Clones share the record, so a test
/// can keep one handle and give the other to a surface.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    record: Arc<Mutex<MemoryRecord>>,
}

impl MemorySink {
    /// Empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self) -> MutexGuard<'_, MemoryRecord> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Remove and return everything written so far.
    pub fn take(&self) -> Vec<u8> {
        std::mem::take(&mut self.record().bytes)
    }

    /// [`MemorySink::take`] decoded as UTF-8, lossily.
    pub fn take_string(&self) -> String {
        String::from_utf8_lossy(&self.take()).into_owned()
    }

    /// Bytes currently buffered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.record().bytes.len()
    }

    /// True if nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of non-empty write calls.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.record().writes
    }

    /// Whether [`Sink::close`] was called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.record().closed
    }

    /// Whether raw mode is currently held.
    #[must_use]
    pub fn in_raw_mode(&self) -> bool {
        self.record().raw_mode
    }

    /// Make subsequent writes fail.
    pub fn fail_writes(&self, fail: bool) {
        self.record().fail_writes = fail;
    }
}

impl Sink for MemorySink {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut record = self.record();
        if record.fail_writes || record.closed {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"));
        }
        if !bytes.is_empty() {
            record.bytes.extend_from_slice(bytes);
            record.writes += 1;
        }
        Ok(())
    }

    fn close(&mut self) {
        self.record().closed = true;
    }

    fn acquire_raw_mode(&mut self) -> io::Result<()> {
        self.record().raw_mode = true;
        Ok(())
    }

    fn release_raw_mode(&mut self) -> io::Result<()> {
        self.record().raw_mode = false;
        Ok(())
    }
}

/// Sink over a local terminal writer such as stdout.
///
/// Raw mode is the process-wide terminal mode managed by crossterm.
pub struct TtySink<W: Write + Send> {
    out: W,
    raw: bool,
}

impl<W: Write + Send> TtySink<W> {
    /// Wrap a writer.
    pub fn new(out: W) -> Self {
        Self { out, raw: false }
    }
}

impl<W: Write + Send> Sink for TtySink<W> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    fn acquire_raw_mode(&mut self) -> io::Result<()> {
        if !self.raw {
            crossterm::terminal::enable_raw_mode()?;
            self.raw = true;
        }
        Ok(())
    }

    fn release_raw_mode(&mut self) -> io::Result<()> {
        if self.raw {
            crossterm::terminal::disable_raw_mode()?;
            self.raw = false;
        }
        Ok(())
    }
}

impl<W: Write + Send> Drop for TtySink<W> {
    fn drop(&mut self) {
        let _ = self.release_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_shares_record() {
        let recorder = MemorySink::new();
        let mut sink: Box<dyn Sink> = Box::new(recorder.clone());
        sink.write(b"abc").unwrap();
        sink.write(b"").unwrap();
        assert_eq!(recorder.writes(), 1);
        assert_eq!(recorder.take(), b"abc");
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_closed_sink_rejects_writes() {
        let recorder = MemorySink::new();
        let mut sink = recorder.clone();
        sink.close();
        assert!(recorder.is_closed());
        assert!(sink.write(b"x").is_err());
    }

    #[test]
    fn test_tty_sink_writes_through() {
        let mut sink = TtySink::new(Vec::new());
        sink.write(b"hello").unwrap();
        sink.flush().unwrap();
        assert_eq!(sink.out, b"hello");
    }
}
