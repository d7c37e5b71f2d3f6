// Path: crates/api/src/context.rs
//! Cancellation and deadline propagation for blocking ledger calls.
//!
//! Every operation that may wait on the network takes a [`CallContext`]. When
//! the caller's cancel signal fires or the deadline passes, the in-flight
//! request future is dropped and the operation fails with
//! [`ProverError::Canceled`], leaving no partial state behind.

use atlas_types::error::ProverError;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// The cancellation signal and optional deadline for one logical operation.
///
/// A context is cheap to clone; clones observe the same signal and deadline,
/// so a multi-step operation (value read, then proof read) is bounded as a
/// whole rather than per request.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancel: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context that is never canceled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Bounds the operation to `timeout` from now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// Attaches a cancellation signal; the operation aborts once it reads `true`.
    pub fn with_cancel(mut self, rx: watch::Receiver<bool>) -> Self {
        self.cancel = Some(rx);
        self
    }

    /// The absolute deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the signal has already fired or the deadline already passed.
    pub fn is_canceled(&self) -> bool {
        let signaled = self.cancel.as_ref().map(|rx| *rx.borrow()).unwrap_or(false);
        let expired = self.deadline.map(|d| Instant::now() >= d).unwrap_or(false);
        signaled || expired
    }

    /// Drives `fut` to completion unless the context is canceled first.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, ProverError>
    where
        F: Future<Output = Result<T, ProverError>>,
    {
        if self.is_canceled() {
            return Err(ProverError::Canceled);
        }
        let guarded = async {
            match self.cancel.clone() {
                Some(mut rx) => tokio::select! {
                    res = fut => res,
                    _ = wait_for_cancel(&mut rx) => Err(ProverError::Canceled),
                },
                None => fut.await,
            }
        };
        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, guarded)
                .await
                .unwrap_or_else(|_| Err(ProverError::Canceled)),
            None => guarded.await,
        }
    }
}

/// Resolves once the signal reads `true`; pends forever if the sender is gone.
async fn wait_for_cancel(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// The owning side of a cancellation signal.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Creates an un-fired handle.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// A context observing this handle.
    pub fn context(&self) -> CallContext {
        CallContext::background().with_cancel(self.tx.subscribe())
    }

    /// Fires the signal for every context derived from this handle.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}
