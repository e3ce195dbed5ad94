//! Manually triggered shutdown source.

use std::future::Future;

use tokio::sync::broadcast;

/// Handle that can request a server shutdown from anywhere in the process.
///
/// [`Shutdown::signal`] returns a future suitable for
/// [`start_with_signal`](crate::lifecycle::start_with_signal). Dropping the
/// last `Shutdown` also resolves outstanding signals.
#[derive(Clone)]
pub struct Shutdown {
    /// Broadcast channel sender.
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Create a new shutdown handle.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// A future that completes once [`Shutdown::trigger`] is called.
    ///
    /// Subscribes immediately, so a trigger issued after this call but before
    /// the future is first polled is not lost.
    pub fn signal(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.tx.subscribe();
        async move {
            let _ = rx.recv().await;
        }
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Number of signals still waiting.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
