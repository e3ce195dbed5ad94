//! OS signal handling.
//!
//! # Responsibilities
//! - Turn SIGINT into a shutdown future while a `start` call is running
//! - Hold the subscription for exactly one `start` call
//! - Leave SIGINT with its default action (terminate) outside of those calls
//!
//! # Design Decisions
//! - On Unix a background thread receives SIGINT through `signal-hook` and
//!   relays it to live subscribers. With no subscriber the relay emulates the
//!   default handler, so Ctrl-C still kills the process after `start` returns.
//! - The subscription runs on its own task and is aborted on release; the
//!   subscriber count drops as soon as the signal future is dropped.
//! - On other platforms Tokio's Ctrl-C handler is used. It cannot be removed
//!   once installed, so Ctrl-C is ignored after the first `start` returns.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Fans one OS signal out to the futures currently waiting on it.
#[derive(Debug)]
pub struct SignalRelay {
    tx: broadcast::Sender<()>,
    waiting: AtomicUsize,
}

impl SignalRelay {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            waiting: AtomicUsize::new(0),
        }
    }

    /// Wake every waiter. Returns false if nobody was waiting.
    pub fn deliver(&self) -> bool {
        if self.waiting.load(Ordering::SeqCst) == 0 {
            return false;
        }
        let _ = self.tx.send(());
        true
    }

    /// Completes on the next [`SignalRelay::deliver`] after the first poll.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        let _waiting = WaitingGuard::enter(&self.waiting);
        let _ = rx.recv().await;
    }

    /// Number of futures currently inside [`SignalRelay::wait`].
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }
}

impl Default for SignalRelay {
    fn default() -> Self {
        Self::new()
    }
}

struct WaitingGuard<'a>(&'a AtomicUsize);

impl<'a> WaitingGuard<'a> {
    fn enter(count: &'a AtomicUsize) -> Self {
        count.fetch_add(1, Ordering::SeqCst);
        Self(count)
    }
}

impl Drop for WaitingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(unix)]
mod os {
    use std::sync::OnceLock;

    use signal_hook::{consts::SIGINT, iterator::Signals};

    use super::SignalRelay;

    static SIGINT_RELAY: OnceLock<Option<&'static SignalRelay>> = OnceLock::new();

    /// The process-wide SIGINT relay, installed on first use.
    pub(super) fn sigint_relay() -> Option<&'static SignalRelay> {
        *SIGINT_RELAY.get_or_init(|| match install() {
            Ok(relay) => Some(relay),
            Err(err) => {
                tracing::error!(error = %err, "Failed to install interrupt handler");
                None
            }
        })
    }

    fn install() -> std::io::Result<&'static SignalRelay> {
        let mut signals = Signals::new([SIGINT])?;
        let relay: &'static SignalRelay = Box::leak(Box::new(SignalRelay::new()));

        std::thread::Builder::new()
            .name("sigint-relay".into())
            .spawn(move || {
                for signal in signals.forever() {
                    if !relay.deliver() {
                        let _ = signal_hook::low_level::emulate_default_handler(signal);
                    }
                }
            })?;

        Ok(relay)
    }
}

/// Completes when the process receives an interrupt.
///
/// If the handler cannot be installed this logs and never completes, so the
/// server keeps running rather than shutting down spuriously.
#[cfg(unix)]
pub async fn interrupt() {
    match os::sigint_relay() {
        Some(relay) => {
            relay.wait().await;
            tracing::info!("Interrupt signal received");
        }
        None => std::future::pending::<()>().await,
    }
}

/// Completes when the process receives an interrupt.
#[cfg(not(unix))]
pub async fn interrupt() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Interrupt signal received"),
        Err(err) => {
            tracing::error!(error = %err, "Failed to install interrupt handler");
            std::future::pending::<()>().await
        }
    }
}

/// Live subscription that cancels a token when its signal fires.
pub struct SignalSubscription {
    task: Option<JoinHandle<()>>,
}

impl SignalSubscription {
    /// Spawn a task that waits on `signal` and then cancels `token`.
    pub fn spawn<F>(signal: F, token: CancellationToken) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let task = tokio::spawn(async move {
            signal.await;
            token.cancel();
        });
        Self { task: Some(task) }
    }

    /// Stop listening and wait until the signal future has been dropped.
    ///
    /// Idempotent: only the first call does anything.
    pub async fn release(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
    }

    pub fn is_released(&self) -> bool {
        self.task.is_none()
    }
}

impl Drop for SignalSubscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
