//! HTTP listener for the coordinator.
//!
//! # Responsibilities
//! - Wrap the caller's router with body-read and write timeouts
//! - Bind the listener and accept connections on its own task
//! - Bound the request line and headers with the read timeout
//! - Report the serve loop's terminal result on a single-slot channel
//! - Drain in-flight requests when asked to stop
//!
//! # Design Decisions
//! - HTTP/1.1 over plain TCP; connections are served with hyper directly so
//!   the header read can carry a deadline
//! - Connection tasks live in a `JoinSet` owned by the serve task, so aborting
//!   the serve task tears every connection down with it

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::Body,
    error_handling::HandleErrorLayer,
    http::{Request, StatusCode},
    BoxError, Router,
};
use hyper::server::conn::http1;
use hyper_util::{
    rt::{TokioIo, TokioTimer},
    server::graceful::GracefulShutdown,
    service::TowerToHyperService,
};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tower::{timeout::TimeoutLayer, ServiceBuilder};
use tower_http::timeout::{RequestBodyTimeoutLayer, TimeoutBody};

use crate::lifecycle::ServerError;

/// Pause after a failed `accept` before trying again.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Apply the body-read and write timeouts to `router`.
///
/// The read timeout bounds receiving the request body (the header read is
/// bounded by the connection, see [`ListenerHandle::spawn`]). The write
/// timeout bounds the handler producing its response; an overrun is answered
/// with `503 Service Unavailable`.
pub fn with_timeouts(router: Router, read_timeout: Duration, write_timeout: Duration) -> Router {
    router
        .layer(
            ServiceBuilder::new()
                .layer(RequestBodyTimeoutLayer::new(read_timeout))
                .map_request(|req: Request<TimeoutBody<Body>>| req.map(Body::new)),
        )
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(|_: BoxError| async {
                    StatusCode::SERVICE_UNAVAILABLE
                }))
                .layer(TimeoutLayer::new(write_timeout)),
        )
}

/// A running listener task.
pub struct ListenerHandle {
    /// Terminal result of the serve loop. Written exactly once.
    pub result: oneshot::Receiver<Result<(), ServerError>>,
    stop: CancellationToken,
    task: JoinHandle<()>,
}

impl ListenerHandle {
    /// Bind `addr` and serve `router` on a background task.
    ///
    /// A client has `read_timeout` to deliver its request line and headers;
    /// after that the connection is closed. Bind failures are reported
    /// through [`ListenerHandle::result`] like any other terminal error.
    pub fn spawn(addr: String, router: Router, read_timeout: Duration) -> Self {
        let (tx, result) = oneshot::channel();
        let stop = CancellationToken::new();
        let serve_stop = stop.clone();

        let task = tokio::spawn(async move {
            let outcome = serve(addr, router, read_timeout, serve_stop).await;
            let _ = tx.send(outcome);
        });

        Self { result, stop, task }
    }

    /// Stop accepting connections and wait for in-flight requests.
    ///
    /// With a `timeout`, the listener and its connections are torn down once
    /// it expires and [`ServerError::ShutdownTimeout`] is returned.
    pub async fn shutdown(mut self, timeout: Option<Duration>) -> Result<(), ServerError> {
        self.stop.cancel();

        let outcome = match timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut self.result).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    self.task.abort();
                    return Err(ServerError::ShutdownTimeout(limit));
                }
            },
            None => (&mut self.result).await,
        };

        outcome.unwrap_or(Err(ServerError::ServeTaskLost))
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(
    addr: String,
    router: Router,
    read_timeout: Duration,
    stop: CancellationToken,
) -> Result<(), ServerError> {
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Listen { addr: addr.clone(), source })?;

    if let Ok(local_addr) = listener.local_addr() {
        tracing::debug!(address = %local_addr, "Listener bound");
    }

    let mut http = http1::Builder::new();
    http.timer(TokioTimer::new()).header_read_timeout(read_timeout);

    let graceful = GracefulShutdown::new();
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer_addr)) => {
                    let conn = serve_connection(&http, &graceful, &router, stream, peer_addr);
                    connections.spawn(conn);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "Failed to accept connection");
                    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                }
            },
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
            _ = stop.cancelled() => break,
        }
    }

    drop(listener);
    tracing::debug!(connections = connections.len(), "Draining connections");
    graceful.shutdown().await;
    while connections.join_next().await.is_some() {}

    tracing::info!("HTTP server stopped");
    Ok(())
}

fn serve_connection(
    http: &http1::Builder,
    graceful: &GracefulShutdown,
    router: &Router,
    stream: TcpStream,
    peer_addr: SocketAddr,
) -> impl std::future::Future<Output = ()> + Send + 'static {
    let service = TowerToHyperService::new(router.clone());
    let conn = graceful.watch(http.serve_connection(TokioIo::new(stream), service));

    async move {
        if let Err(err) = conn.await {
            tracing::debug!(peer_addr = %peer_addr, error = %err, "Connection closed with error");
        }
    }
}
