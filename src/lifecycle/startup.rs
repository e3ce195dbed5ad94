//! Startup orchestration and shutdown sequencing.
//!
//! # Responsibilities
//! - Assemble the configuration from defaults and options
//! - Subscribe to the shutdown source for the duration of the call
//! - Start the listener and wait for it to fail or for a shutdown request
//! - Drain the listener, release the subscription, run cleanup callbacks
//!
//! # Design Decisions
//! - Listener failures surface through the returned error, never a panic
//! - Every failure is joined into one [`JoinedError`]; nothing short-circuits
//! - If the listener fails and a shutdown is requested at the same instant,
//!   exactly one of the two paths runs; which one is unspecified

use std::future::Future;

use axum::Router;
use tokio_util::sync::CancellationToken;

use crate::config::{ServerConfig, ServerOption};
use crate::http::server::{with_timeouts, ListenerHandle};
use crate::lifecycle::callbacks;
use crate::lifecycle::error::{join, JoinedError, ServerError};
use crate::lifecycle::signals::{self, SignalSubscription};

/// Serve `router` until the listener fails or the process is interrupted.
///
/// Cancelling `parent` has the same effect as an interrupt. See
/// [`start_with_signal`] for the full sequence.
///
/// On Unix, SIGINT is only captured while this call is waiting on it; once it
/// returns, an interrupt terminates the process as usual.
pub async fn start<I>(parent: CancellationToken, router: Router, options: I) -> Result<(), JoinedError>
where
    I: IntoIterator<Item = ServerOption>,
{
    start_with_signal(parent, router, signals::interrupt(), options).await
}

/// Serve `router` until the listener fails or `signal` completes.
///
/// This blocks until one of:
/// - the listener terminates on its own (e.g. the port is taken). Its error
///   is returned without issuing a shutdown.
/// - `signal` completes or `parent` is cancelled. The listener stops
///   accepting and in-flight requests are drained, bounded by the configured
///   shutdown timeout if any.
///
/// Either way the signal subscription is released and then every shutdown
/// callback runs, in order, before this returns. All errors are joined.
pub async fn start_with_signal<F, I>(
    parent: CancellationToken,
    router: Router,
    signal: F,
    options: I,
) -> Result<(), JoinedError>
where
    F: Future<Output = ()> + Send + 'static,
    I: IntoIterator<Item = ServerOption>,
{
    let config = ServerConfig::from_options(options);
    tracing::debug!(config = ?config, "Server configuration assembled");

    let token = parent.child_token();
    let mut subscription = SignalSubscription::spawn(signal, token.clone());

    let mut errors = run_until_stopped(&config, router, &token, &mut subscription).await;

    subscription.release().await;

    if !config.shutdown_callbacks.is_empty() {
        callbacks::run_all(&config.shutdown_callbacks, &token, &mut errors).await;
    }

    match errors {
        Some(errors) => Err(errors),
        None => Ok(()),
    }
}

async fn run_until_stopped(
    config: &ServerConfig,
    router: Router,
    token: &CancellationToken,
    subscription: &mut SignalSubscription,
) -> Option<JoinedError> {
    let mut errors = None;
    let addr = config.bind_address();

    tracing::info!("starting http server on port :{}", config.port);

    let router = with_timeouts(router, config.read_timeout, config.write_timeout);
    let mut listener = ListenerHandle::spawn(addr, router, config.read_timeout);

    tokio::select! {
        outcome = &mut listener.result => {
            let outcome = outcome.unwrap_or(Err(ServerError::ServeTaskLost));
            if let Err(err) = outcome {
                tracing::error!(error = %err, "HTTP server terminated");
                join(&mut errors, err);
            }
            return errors;
        }
        _ = token.cancelled() => {
            subscription.release().await;
        }
    }

    tracing::info!(
        timeout = ?config.shutdown_timeout,
        "Shutting down http server"
    );
    if let Err(err) = listener.shutdown(config.shutdown_timeout).await {
        join(&mut errors, err);
    }

    errors
}
