//! Error types for the server lifecycle.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Boxed error returned by shutdown callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A single failure observed while running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not bind.
    #[error("failed to listen on {addr}: {source}")]
    Listen {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The serve task went away without reporting a result (panic or abort).
    #[error("http server task exited without reporting a result")]
    ServeTaskLost,

    /// In-flight requests were still running when the shutdown bound expired.
    #[error("graceful shutdown did not complete within {0:?}")]
    ShutdownTimeout(Duration),

    /// A cleanup callback failed.
    #[error("shutdown callback `{name}` failed: {source}")]
    Callback {
        name: String,
        #[source]
        source: BoxError,
    },
}

/// One or more [`ServerError`]s, in the order they happened.
///
/// Joining never discards an earlier error. The value is never empty.
#[derive(Debug)]
pub struct JoinedError {
    errors: Vec<ServerError>,
}

impl JoinedError {
    pub fn new(first: ServerError) -> Self {
        Self { errors: vec![first] }
    }

    pub fn push(&mut self, err: ServerError) {
        self.errors.push(err);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServerError> {
        self.errors.iter()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always false for a value returned by the coordinator.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<ServerError> {
        self.errors
    }
}

/// Join `err` into `acc`, creating the aggregate on first failure.
pub(crate) fn join(acc: &mut Option<JoinedError>, err: ServerError) {
    match acc {
        Some(joined) => joined.push(err),
        None => *acc = Some(JoinedError::new(err)),
    }
}

impl fmt::Display for JoinedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for JoinedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.errors.first().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl IntoIterator for JoinedError {
    type Item = ServerError;
    type IntoIter = std::vec::IntoIter<ServerError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_keeps_every_error() {
        let mut acc = None;
        join(&mut acc, ServerError::ShutdownTimeout(Duration::from_secs(1)));
        join(
            &mut acc,
            ServerError::Callback {
                name: "db".into(),
                source: "connection reset".into(),
            },
        );

        let joined = acc.unwrap();
        assert_eq!(joined.len(), 2);
        assert_eq!(
            joined.to_string(),
            "graceful shutdown did not complete within 1s\nshutdown callback `db` failed: connection reset"
        );
    }

    #[test]
    fn test_source_is_first_error() {
        let joined = JoinedError::new(ServerError::ServeTaskLost);
        let source = std::error::Error::source(&joined).unwrap();
        assert_eq!(source.to_string(), ServerError::ServeTaskLost.to_string());
    }
}
