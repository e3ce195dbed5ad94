//! `io::Write` adapter that forwards bytes to the debug log.

use std::io;

/// Byte sink that turns writes into debug events.
///
/// When DEBUG (or TRACE) is enabled each write becomes one event,
/// `"{message}: {bytes}"`, and reports every byte consumed. Otherwise the
/// bytes are discarded and `Ok(0)` is returned, so callers using
/// `write_all` will see `WriteZero`; use plain `write` with this sink.
#[derive(Debug, Clone, Default)]
pub struct LogWriter {
    /// Label prefixed to every forwarded line.
    pub message: String,
}

impl LogWriter {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl io::Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!("{}: {}", self.message, String::from_utf8_lossy(buf));
            return Ok(buf.len());
        }
        Ok(0)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tracing::level_filters::LevelFilter;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn subscriber(level: LevelFilter, out: Captured) -> impl tracing::Subscriber + Send + Sync {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(move || out.clone())
            .finish()
    }

    #[test]
    fn test_forwards_at_debug() {
        let out = Captured::default();
        let mut writer = LogWriter::new("hyper");

        let written = tracing::subscriber::with_default(subscriber(LevelFilter::DEBUG, out.clone()), || {
            writer.write(b"connection reset").unwrap()
        });

        assert_eq!(written, 16);
        let logged = String::from_utf8(out.0.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("hyper: connection reset"), "logged: {logged}");
    }

    #[test]
    fn test_forwards_at_trace() {
        let out = Captured::default();
        let mut writer = LogWriter::new("hyper");

        let written = tracing::subscriber::with_default(subscriber(LevelFilter::TRACE, out.clone()), || {
            writer.write(b"abc").unwrap()
        });

        assert_eq!(written, 3);
    }

    #[test]
    fn test_discards_above_debug() {
        let out = Captured::default();
        let mut writer = LogWriter::new("hyper");

        let written = tracing::subscriber::with_default(subscriber(LevelFilter::INFO, out.clone()), || {
            writer.write(b"connection reset").unwrap()
        });

        assert_eq!(written, 0);
        assert!(out.0.lock().unwrap().is_empty());
        assert!(writer.flush().is_ok());
    }
}
