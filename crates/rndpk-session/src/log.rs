//! Run log sinks
//!
//! A [`LogSink`] is a shared, closable writer handed to both the handler and
//! the randomizer of one run. Once closed, writes fail with
//! [`io::ErrorKind::BrokenPipe`]. [`LogBuffer`] captures output in memory up
//! to a fixed capacity.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

type Writer = Box<dyn Write + Send>;

/// Shared, closable log writer
#[derive(Clone)]
pub struct LogSink {
    inner: Arc<Mutex<Option<Writer>>>,
}

impl LogSink {
    /// Wrap a writer
    #[must_use]
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(Box::new(writer)))),
        }
    }

    /// Sink that drops everything
    #[must_use]
    pub fn discard() -> Self {
        Self::new(io::sink())
    }

    /// Flush and drop the writer; later writes fail
    ///
    /// Closing twice is a no-op.
    ///
    /// # Errors
    /// The final flush failed.
    pub fn close(&self) -> io::Result<()> {
        match self.inner.lock().take() {
            Some(mut writer) => writer.flush(),
            None => Ok(()),
        }
    }

    /// Check if closed
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.lock().is_none()
    }
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogSink").field("closed", &self.is_closed()).finish()
    }
}

impl Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.inner.lock().as_mut() {
            Some(writer) => writer.write(buf),
            None => Err(io::Error::new(io::ErrorKind::BrokenPipe, "log sink closed")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.inner.lock().as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

/// Closes a sink when dropped
#[derive(Debug)]
pub(crate) struct CloseOnDrop(pub(crate) LogSink);

impl Drop for CloseOnDrop {
    fn drop(&mut self) {
        if let Err(e) = self.0.close() {
            tracing::warn!("Failed to close run log: {}", e);
        }
    }
}

#[derive(Debug, Default)]
struct Bounded {
    bytes: Vec<u8>,
    capacity: usize,
    truncated: bool,
}

/// In-memory log capture with a byte limit
///
/// Output past the limit is dropped and the buffer is marked truncated;
/// writes never fail.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    inner: Arc<Mutex<Bounded>>,
}

impl LogBuffer {
    /// Create buffer holding at most `capacity` bytes
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Bounded {
                bytes: Vec::new(),
                capacity,
                truncated: false,
            })),
        }
    }

    /// Captured text (invalid UTF-8 replaced)
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.inner.lock().bytes).into_owned()
    }

    /// Check if output was dropped
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.inner.lock().truncated
    }

    /// Sink writing into this buffer
    #[must_use]
    pub fn sink(&self) -> LogSink {
        LogSink::new(self.clone())
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self.inner.lock();
        let room = inner.capacity.saturating_sub(inner.bytes.len());
        if buf.len() > room {
            inner.truncated = true;
        }
        let take = buf.len().min(room);
        inner.bytes.extend_from_slice(&buf[..take]);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_sink_rejects_writes() {
        let mut sink = LogSink::discard();
        sink.close().unwrap();

        assert!(sink.is_closed());
        let err = writeln!(sink, "late").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        sink.close().unwrap();
    }

    #[test]
    fn clones_share_state() {
        let buffer = LogBuffer::with_capacity(64);
        let mut a = buffer.sink();
        let b = a.clone();

        write!(a, "hello").unwrap();
        b.close().unwrap();

        assert!(a.is_closed());
        assert_eq!(buffer.contents(), "hello");
    }

    #[test]
    fn buffer_truncates_at_capacity() {
        let buffer = LogBuffer::with_capacity(4);
        let mut sink = buffer.sink();
        write!(sink, "abcdef").unwrap();

        assert_eq!(buffer.contents(), "abcd");
        assert!(buffer.is_truncated());
    }

    #[test]
    fn guard_closes_on_drop() {
        let sink = LogSink::discard();
        drop(CloseOnDrop(sink.clone()));
        assert!(sink.is_closed());
    }
}
