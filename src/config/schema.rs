//! Configuration schema definitions.
//!
//! [`ServerConfig`] is what the coordinator runs with. [`ServerSettings`] is its
//! serializable subset, read from config files and turned into options.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::options::{self, ServerOption};
use crate::lifecycle::ShutdownCallback;

/// Port used when none is configured.
pub const DEFAULT_PORT: &str = "8080";

/// Host used when none is configured (all interfaces).
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bound on reading a request.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Default bound on producing a response.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Effective configuration for one `start` call.
#[derive(Clone)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,

    /// Bind port, kept as text so it can come straight from env or CLI.
    pub port: String,

    /// Maximum time to receive a request body.
    pub read_timeout: Duration,

    /// Maximum time for a handler to produce its response.
    pub write_timeout: Duration,

    /// Bound on draining in-flight requests. `None` waits indefinitely.
    pub shutdown_timeout: Option<Duration>,

    /// Cleanup steps run in order once the server stops.
    pub shutdown_callbacks: Vec<ShutdownCallback>,
}

impl ServerConfig {
    /// Apply `options` in order on top of the defaults.
    pub fn from_options<I>(options: I) -> Self
    where
        I: IntoIterator<Item = ServerOption>,
    {
        let mut config = Self::default();
        for option in options {
            option.apply(&mut config);
        }
        config
    }

    /// Address handed to the listener, e.g. `0.0.0.0:8080`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT.to_string(),
            read_timeout: DEFAULT_READ_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            shutdown_timeout: None,
            shutdown_callbacks: Vec::new(),
        }
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let callbacks: Vec<&str> = self.shutdown_callbacks.iter().map(|c| c.name()).collect();
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("read_timeout", &self.read_timeout)
            .field("write_timeout", &self.write_timeout)
            .field("shutdown_timeout", &self.shutdown_timeout)
            .field("shutdown_callbacks", &callbacks)
            .finish()
    }
}

/// File-backed server settings.
///
/// Every field is optional; an absent field leaves the default (or an earlier
/// option) untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind host (e.g. "127.0.0.1").
    pub host: Option<String>,

    /// Bind port (e.g. "8080").
    pub port: Option<String>,

    /// Read timeout in seconds.
    pub read_timeout_secs: Option<u64>,

    /// Write timeout in seconds.
    pub write_timeout_secs: Option<u64>,

    /// Graceful shutdown bound in seconds.
    pub shutdown_timeout_secs: Option<u64>,
}

impl ServerSettings {
    /// Convert the populated fields into options, in field order.
    pub fn into_options(self) -> Vec<ServerOption> {
        let mut opts = Vec::new();
        if let Some(host) = self.host {
            opts.push(options::with_host(host));
        }
        if let Some(port) = self.port {
            opts.push(options::with_port(port));
        }
        if let Some(secs) = self.read_timeout_secs {
            opts.push(options::with_read_timeout(Duration::from_secs(secs)));
        }
        if let Some(secs) = self.write_timeout_secs {
            opts.push(options::with_write_timeout(Duration::from_secs(secs)));
        }
        if let Some(secs) = self.shutdown_timeout_secs {
            opts.push(options::with_shutdown_timeout(Duration::from_secs(secs)));
        }
        opts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_options(Vec::new());
        assert_eq!(config.port, "8080");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.read_timeout, Duration::from_secs(30));
        assert_eq!(config.write_timeout, Duration::from_secs(30));
        assert_eq!(config.shutdown_timeout, None);
        assert!(config.shutdown_callbacks.is_empty());
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_settings_become_options() {
        let settings = ServerSettings {
            port: Some("9000".into()),
            write_timeout_secs: Some(5),
            ..Default::default()
        };

        let config = ServerConfig::from_options(settings.into_options());
        assert_eq!(config.port, "9000");
        assert_eq!(config.write_timeout, Duration::from_secs(5));
        // untouched fields keep their defaults
        assert_eq!(config.read_timeout, DEFAULT_READ_TIMEOUT);
        assert_eq!(config.host, DEFAULT_HOST);
    }
}
