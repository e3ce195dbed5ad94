//! Named cleanup callbacks run after the server stops.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};
use tokio_util::sync::CancellationToken;

use crate::lifecycle::error::{join, BoxError, JoinedError, ServerError};

type CallbackFn = dyn Fn(CancellationToken) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync;

/// A cleanup step, e.g. flushing a producer or closing a pool.
///
/// The callback receives the server's cancellation token. On an operator
/// shutdown the token is already cancelled; after a listener failure it may
/// still be live. The name only shows up in logs and errors.
#[derive(Clone)]
pub struct ShutdownCallback {
    name: String,
    func: Arc<CallbackFn>,
}

impl ShutdownCallback {
    pub fn new<F, Fut>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(move |token: CancellationToken| func(token).boxed()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn invoke(&self, token: CancellationToken) -> Result<(), BoxError> {
        (self.func)(token).await
    }
}

impl fmt::Debug for ShutdownCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShutdownCallback").field("name", &self.name).finish()
    }
}

/// Run every callback in order, joining failures into `errors`.
///
/// A failing callback is logged and the next one still runs.
pub(crate) async fn run_all(
    callbacks: &[ShutdownCallback],
    token: &CancellationToken,
    errors: &mut Option<JoinedError>,
) {
    for callback in callbacks {
        if let Err(source) = callback.invoke(token.clone()).await {
            tracing::warn!(
                callback = %callback.name(),
                error = %source,
                "error thrown from shutdown callback"
            );
            join(
                errors,
                ServerError::Callback {
                    name: callback.name().to_string(),
                    source,
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recording(name: &'static str, log: Arc<Mutex<Vec<&'static str>>>, fail: bool) -> ShutdownCallback {
        ShutdownCallback::new(name, move |_token| {
            let log = log.clone();
            async move {
                log.lock().unwrap().push(name);
                if fail {
                    Err(format!("{} failed", name).into())
                } else {
                    Ok(())
                }
            }
        })
    }

    #[tokio::test]
    async fn test_run_all_continues_after_failure() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let callbacks = vec![
            recording("a", log.clone(), true),
            recording("b", log.clone(), false),
            recording("c", log.clone(), true),
        ];

        let mut errors = None;
        run_all(&callbacks, &CancellationToken::new(), &mut errors).await;

        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
        let names: Vec<String> = errors
            .unwrap()
            .into_iter()
            .map(|e| match e {
                ServerError::Callback { name, .. } => name,
                other => panic!("unexpected error: {other}"),
            })
            .collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_callback_sees_token_state() {
        let token = CancellationToken::new();
        token.cancel();

        let callback = ShutdownCallback::new("check", |token: CancellationToken| async move {
            if token.is_cancelled() {
                Ok(())
            } else {
                Err("token should be cancelled".into())
            }
        });

        assert!(callback.invoke(token).await.is_ok());
    }
}
