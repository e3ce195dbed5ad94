//! Shared utilities for lifecycle integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{routing::get, Router};
use service_bootstrap::ShutdownCallback;
use tokio_util::sync::CancellationToken;

/// Ordered record of which callbacks ran.
pub type CallLog = Arc<Mutex<Vec<&'static str>>>;

/// A callback that records its name and optionally fails.
pub fn recording_callback(name: &'static str, log: CallLog, fail: bool) -> ShutdownCallback {
    ShutdownCallback::new(name, move |_token: CancellationToken| {
        let log = log.clone();
        async move {
            log.lock().unwrap().push(name);
            if fail {
                Err(format!("{} exploded", name).into())
            } else {
                Ok(())
            }
        }
    })
}

/// Router with a fast `/` and a `/slow` endpoint that takes `delay`.
pub fn test_router(delay: Duration) -> Router {
    Router::new()
        .route("/", get(|| async { "ok" }))
        .route(
            "/slow",
            get(move || async move {
                tokio::time::sleep(delay).await;
                "done"
            }),
        )
}

/// HTTP client that bypasses any proxy settings from the environment.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Poll `url` until the server answers or `deadline` passes.
pub async fn wait_until_serving(url: &str, deadline: Duration) {
    let client = client();
    let start = tokio::time::Instant::now();
    while start.elapsed() < deadline {
        if client.get(url).send().await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("server at {} never came up", url);
}

/// Increments a counter when dropped.
pub struct CountDrop(pub Arc<AtomicUsize>);

impl Drop for CountDrop {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// A signal that never fires and counts how often it is dropped.
pub fn counted_pending_signal(drops: Arc<AtomicUsize>) -> impl std::future::Future<Output = ()> + Send + 'static {
    let guard = CountDrop(drops);
    async move {
        let _guard = guard;
        std::future::pending::<()>().await
    }
}
