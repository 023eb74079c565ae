use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// Cancellation and deadline threaded through renderers, filters and
/// transformers.
///
/// Cloning shares the same token. Use [`Context::child`] for a scope that
/// can be cancelled without affecting the caller.
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    pub fn new() -> Self { Self::default() }

    pub fn with_token(token: CancellationToken) -> Self { Self { token, deadline: None } }

    pub fn with_timeout(self, timeout: Duration) -> Self { self.with_deadline(Instant::now() + timeout) }

    /// Set a deadline; an earlier existing deadline wins.
    pub fn with_deadline(mut self, at: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(cur) if cur <= at => cur,
            _ => at,
        });
        self
    }

    /// Derived context: cancelled with its parent, cancellable on its own.
    pub fn child(&self) -> Self { Self { token: self.token.child_token(), deadline: self.deadline } }

    pub fn token(&self) -> &CancellationToken { &self.token }
    pub fn deadline(&self) -> Option<Instant> { self.deadline }

    pub fn cancel(&self) { self.token.cancel() }

    pub fn is_cancelled(&self) -> bool { self.check().is_err() }

    /// `Err(Cancelled)` or `Err(DeadlineExceeded)` once the context ended.
    pub fn check(&self) -> Result<()> {
        if self.token.is_cancelled() {
            return Err(Error::Cancelled);
        }
        match self.deadline {
            Some(at) if Instant::now() >= at => Err(Error::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Resolves with the terminating error once the context ends.
    pub async fn done(&self) -> Error {
        match self.deadline {
            Some(at) => tokio::select! {
                _ = self.token.cancelled() => Error::Cancelled,
                _ = tokio::time::sleep_until(at) => Error::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                Error::Cancelled
            }
        }
    }
}
