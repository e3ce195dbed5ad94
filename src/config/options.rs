//! Option values applied on top of the default [`ServerConfig`].
//!
//! Each option sets exactly one field. Options are applied left to right, so
//! when two options touch the same field the later one wins.

use std::time::Duration;

use crate::config::schema::ServerConfig;
use crate::lifecycle::ShutdownCallback;

/// A single configuration change.
#[derive(Debug, Clone)]
pub enum ServerOption {
    Host(String),
    Port(String),
    ReadTimeout(Duration),
    WriteTimeout(Duration),
    ShutdownTimeout(Duration),
    ShutdownCallbacks(Vec<ShutdownCallback>),
}

impl ServerOption {
    /// Write this option into `config`.
    pub fn apply(self, config: &mut ServerConfig) {
        match self {
            ServerOption::Host(host) => config.host = host,
            ServerOption::Port(port) => config.port = port,
            ServerOption::ReadTimeout(timeout) => config.read_timeout = timeout,
            ServerOption::WriteTimeout(timeout) => config.write_timeout = timeout,
            ServerOption::ShutdownTimeout(timeout) => config.shutdown_timeout = Some(timeout),
            ServerOption::ShutdownCallbacks(callbacks) => config.shutdown_callbacks = callbacks,
        }
    }
}

/// Bind host. Defaults to `0.0.0.0`.
pub fn with_host(host: impl Into<String>) -> ServerOption {
    ServerOption::Host(host.into())
}

/// Bind port. Defaults to `8080`.
pub fn with_port(port: impl Into<String>) -> ServerOption {
    ServerOption::Port(port.into())
}

/// Read timeout. Defaults to 30s.
pub fn with_read_timeout(timeout: Duration) -> ServerOption {
    ServerOption::ReadTimeout(timeout)
}

/// Write timeout. Defaults to 30s.
pub fn with_write_timeout(timeout: Duration) -> ServerOption {
    ServerOption::WriteTimeout(timeout)
}

/// Upper bound on graceful shutdown. Unbounded by default.
pub fn with_shutdown_timeout(timeout: Duration) -> ServerOption {
    ServerOption::ShutdownTimeout(timeout)
}

/// Cleanup callbacks run, in this order, before `start` returns.
///
/// Replaces any callbacks set by an earlier option. No defaults.
pub fn with_shutdown_callbacks<I>(callbacks: I) -> ServerOption
where
    I: IntoIterator<Item = ShutdownCallback>,
{
    ServerOption::ShutdownCallbacks(callbacks.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(name: &'static str) -> ShutdownCallback {
        ShutdownCallback::new(name, |_token| async { Ok(()) })
    }

    #[test]
    fn test_last_port_wins() {
        let config = ServerConfig::from_options([with_port("9090"), with_port("9091")]);
        assert_eq!(config.port, "9091");
    }

    #[test]
    fn test_options_only_touch_their_field() {
        let config = ServerConfig::from_options([
            with_read_timeout(Duration::from_secs(1)),
            with_write_timeout(Duration::from_secs(2)),
            with_shutdown_timeout(Duration::from_secs(3)),
        ]);
        assert_eq!(config.port, "8080");
        assert_eq!(config.read_timeout, Duration::from_secs(1));
        assert_eq!(config.write_timeout, Duration::from_secs(2));
        assert_eq!(config.shutdown_timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_callbacks_replaced_not_appended() {
        let config = ServerConfig::from_options([
            with_shutdown_callbacks([noop("a"), noop("b")]),
            with_shutdown_callbacks([noop("c")]),
        ]);
        let names: Vec<&str> = config.shutdown_callbacks.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["c"]);
    }
}
