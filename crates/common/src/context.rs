//! Per-request context carried from the HTTP layer down to stores and caches.
//!
//! A [`RequestContext`] bundles the correlation id used in logs, an optional
//! deadline and a cancellation token. Every network-bound call in the core is
//! driven through [`RequestContext::run`], so an expired or cancelled request
//! drops its in-flight query instead of finishing it.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("request cancelled")]
    Cancelled,
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    trace_id: String,
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl RequestContext {
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self { trace_id: trace_id.into(), deadline: None, cancel: CancellationToken::new() }
    }

    /// Context with a generated trace id and no deadline (startup tasks, tests).
    pub fn background() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Tightens the deadline; an earlier existing deadline is kept.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        });
        self
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, `None` when unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(Instant::now()))
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Token shared with every clone of this context.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Drive `fut` to completion unless the context is cancelled or its deadline passes first.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, ContextError>
    where
        F: Future<Output = T>,
    {
        if self.cancel.is_cancelled() {
            return Err(ContextError::Cancelled);
        }
        let bounded = async {
            match self.deadline {
                Some(at) => tokio::time::timeout_at(at, fut)
                    .await
                    .map_err(|_| ContextError::DeadlineExceeded),
                None => Ok(fut.await),
            }
        };
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ContextError::Cancelled),
            res = bounded => res,
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::background()
    }
}
