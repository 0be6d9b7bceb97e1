//! Cooperative cancellation signal threaded through every dispatch.

use std::sync::Arc;

use tokio::sync::watch;

/// A cloneable cancellation signal.
///
/// All clones observe the same state. Cancellation is one-way: once
/// [`cancel`](Self::cancel) is called the token stays cancelled. Handlers and
/// behaviors receive the token and may check it between units of work; the
/// mediator itself checks it before entering each link of a pipeline and
/// before fanning out a notification.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    state: Arc<watch::Sender<bool>>,
}

impl CancellationToken {
    /// Creates a token that has not been cancelled.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            state: Arc::new(tx),
        }
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.state.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.state.borrow()
    }

    /// Resolves once cancellation has been requested.
    pub async fn cancelled(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives as long as `self`, so `wait_for` cannot observe a closed channel.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
