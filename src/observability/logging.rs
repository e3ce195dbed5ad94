//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global tracing subscriber
//! - Honour `RUST_LOG`, falling back to a caller-supplied default directive

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default directive when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "service_bootstrap=info,tower_http=info";

/// Install the global subscriber.
///
/// Returns an error if a global subscriber is already set.
pub fn init_logging(default_directive: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(env_filter(default_directive))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}

fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_parses() {
        let filter: EnvFilter = DEFAULT_DIRECTIVE.into();
        assert!(filter.to_string().contains("service_bootstrap=info"));
    }
}
