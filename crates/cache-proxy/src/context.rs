//! # Call Context
//!
//! Cancellation and deadline carried as the first argument of every proxy
//! operation. The proxy adds no timeout of its own: a call runs until the
//! backend answers, the token is cancelled, or the deadline passes.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{ProxyError, Result};

/// Cancellation token plus optional deadline
#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl Context {
    /// Context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Context whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Context that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancel: CancellationToken::new(),
        }
    }

    /// Context driven by an existing token, e.g. a service shutdown token.
    pub fn with_token(cancel: CancellationToken) -> Self {
        Self {
            deadline: None,
            cancel,
        }
    }

    /// Derived context, cancelled whenever `self` is.
    ///
    /// The child keeps the parent's deadline unless `timeout` is sooner.
    #[must_use]
    pub fn child(&self, timeout: Option<Duration>) -> Self {
        let own = timeout.map(|t| Instant::now() + t);
        let deadline = match (self.deadline, own) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };

        Self {
            deadline,
            cancel: self.cancel.child_token(),
        }
    }

    /// Cancel this context and every child derived from it.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// True once this context or one of its parents was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Deadline, if any.
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Underlying token, e.g. to select on it alongside other work.
    pub const fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Drive `request` to completion unless this context ends first.
    ///
    /// An already-cancelled context or an elapsed deadline returns without
    /// polling `request`. Otherwise the request is dropped mid-flight when the
    /// token fires or the deadline passes.
    pub(crate) async fn run<T, F>(&self, request: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.is_cancelled() {
            return Err(ProxyError::Cancelled);
        }
        if self.deadline.is_some_and(|d| d <= Instant::now()) {
            return Err(ProxyError::DeadlineExceeded);
        }

        let bounded = async {
            match self.deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, request)
                    .await
                    .unwrap_or(Err(ProxyError::DeadlineExceeded)),
                None => request.await,
            }
        };

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(ProxyError::Cancelled),
            result = bounded => result,
        }
    }
}
