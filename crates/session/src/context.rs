//! Per-call context and shutdown hooks
//!
//! One [`CallContext`] exists per call. Components register shutdown
//! callbacks (transcript flush, event drain) and the context guarantees they
//! run exactly once, whichever way the call ends: normal hangup, dial
//! failure, join timeout or external disconnect.

use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::sync::watch;

use debt_collector_telephony::RoomName;

type ShutdownCallback = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// Context for one call
pub struct CallContext {
    room: RoomName,
    shutdown_tx: watch::Sender<bool>,
    callbacks: Mutex<Vec<ShutdownCallback>>,
}

impl CallContext {
    pub fn new(room: RoomName) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            room,
            shutdown_tx,
            callbacks: Mutex::new(Vec::new()),
        }
    }

    /// The room this call lives in.
    pub fn room(&self) -> &RoomName {
        &self.room
    }

    /// Register a callback to run when the call context shuts down.
    ///
    /// Callbacks registered after shutdown are dropped; the call is already
    /// over by then.
    pub fn add_shutdown_callback<F>(&self, callback: F)
    where
        F: FnOnce() -> BoxFuture<'static, ()> + Send + 'static,
    {
        if self.is_shutdown() {
            tracing::warn!(room = %self.room, "shutdown callback registered after shutdown; dropping");
            return;
        }
        self.callbacks.lock().push(Box::new(callback));
    }

    /// A receiver that flips to `true` when the context shuts down.
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    pub fn is_shutdown(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Shut the call context down, running all registered callbacks.
    ///
    /// Idempotent: only the first invocation runs callbacks, later ones
    /// return immediately.
    pub async fn shutdown(&self) {
        let already_down = self.shutdown_tx.send_replace(true);
        if already_down {
            return;
        }

        tracing::info!(room = %self.room, "shutting down call context");
        let callbacks = std::mem::take(&mut *self.callbacks.lock());
        for callback in callbacks {
            callback().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_callback(counter: &Arc<AtomicUsize>) -> impl FnOnce() -> BoxFuture<'static, ()> {
        let counter = Arc::clone(counter);
        move || {
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
        }
    }

    #[tokio::test]
    async fn test_callbacks_run_once() {
        let ctx = CallContext::new(RoomName::from("room-1"));
        let counter = Arc::new(AtomicUsize::new(0));
        ctx.add_shutdown_callback(counting_callback(&counter));

        ctx.shutdown().await;
        ctx.shutdown().await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(ctx.is_shutdown());
    }

    #[tokio::test]
    async fn test_late_registration_is_dropped() {
        let ctx = CallContext::new(RoomName::from("room-1"));
        ctx.shutdown().await;

        let counter = Arc::new(AtomicUsize::new(0));
        ctx.add_shutdown_callback(counting_callback(&counter));
        ctx.shutdown().await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_shutdown_signal_observes_shutdown() {
        let ctx = Arc::new(CallContext::new(RoomName::from("room-1")));
        let mut signal = ctx.shutdown_signal();
        assert!(!*signal.borrow());

        let ctx2 = Arc::clone(&ctx);
        tokio::spawn(async move { ctx2.shutdown().await });

        signal.changed().await.unwrap();
        assert!(*signal.borrow());
    }
}
