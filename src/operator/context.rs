//! Execution context carried by every operator call.

use crate::error::{DbError, DbResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation and deadline for one call.
///
/// Cloning shares the cancellation token: cancelling any clone cancels all of
/// them. Use [`child`](Self::child) for a context that can be cancelled on its
/// own.
#[derive(Debug, Clone, Default)]
pub struct ExecContext {
    cancel: CancellationToken,
    deadline: Option<(Instant, Duration)>,
}

impl ExecContext {
    /// No deadline, never cancelled unless [`cancel`](Self::cancel) is called.
    pub fn background() -> Self {
        Self::default()
    }

    /// Context that times out `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline: Some((Instant::now() + timeout, timeout)),
        }
    }

    /// Context cancelled through an existing token.
    pub fn with_token(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            deadline: None,
        }
    }

    /// Child context: cancelled with its parent, keeps the parent's deadline
    /// unless `timeout` is shorter.
    pub fn child(&self, timeout: Option<Duration>) -> Self {
        let deadline = match (self.deadline, timeout) {
            (Some((at, total)), Some(t)) if at <= Instant::now() + t => Some((at, total)),
            (_, Some(t)) => Some((Instant::now() + t, t)),
            (parent, None) => parent,
        };
        Self {
            cancel: self.cancel.child_token(),
            deadline,
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Time left before the deadline, if there is one.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|(at, _)| at.saturating_duration_since(Instant::now()))
    }

    /// Run `fut`, failing with `Cancelled` or `Timeout` if the context ends first.
    pub async fn run<T, F>(&self, operation: &str, fut: F) -> DbResult<T>
    where
        F: Future<Output = DbResult<T>>,
    {
        if self.cancel.is_cancelled() {
            return Err(DbError::cancelled(operation));
        }

        let bounded = async {
            match self.deadline {
                Some((at, total)) => tokio::time::timeout_at(at, fut)
                    .await
                    .map_err(|_| DbError::timeout(operation, total.as_secs()))?,
                None => fut.await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(DbError::cancelled(operation)),
            result = bounded => result,
        }
    }
}
