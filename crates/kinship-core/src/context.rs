//! Bounded execution context: a deadline plus a cancellation signal.
//!
//! Contexts are created by the caller and threaded through every store
//! operation and path search. Async work is raced against the context with
//! [`ExecutionContext::run`]; CPU-bound loops poll it through a [`Poller`].

use std::future::Future;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::error::ContextError;

#[derive(Debug, Clone)]
pub struct ExecutionContext {
    started: Instant,
    deadline: Option<Instant>,
    token: CancellationToken,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::background()
    }
}

impl ExecutionContext {
    /// A context with no deadline that is only done when canceled.
    pub fn background() -> Self {
        Self {
            started: Instant::now(),
            deadline: None,
            token: CancellationToken::new(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let started = Instant::now();
        Self {
            started,
            deadline: Some(started.checked_add(timeout).unwrap_or(started)),
            token: CancellationToken::new(),
        }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            started: Instant::now(),
            deadline: Some(deadline),
            token: CancellationToken::new(),
        }
    }

    /// Derive a context that is canceled with its parent and never outlives
    /// the parent's deadline.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let now = Instant::now();
        let own = now.checked_add(timeout).unwrap_or(now);
        let deadline = match self.deadline {
            Some(parent) => Some(parent.min(own)),
            None => Some(own),
        };
        Self {
            started: now,
            deadline,
            token: self.token.child_token(),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, `None` when unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_canceled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    /// Fail if the context was canceled or its deadline has passed.
    /// Cancellation wins over expiry.
    pub fn check(&self) -> Result<(), ContextError> {
        if self.token.is_cancelled() {
            return Err(ContextError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(self.deadline_error()),
            _ => Ok(()),
        }
    }

    /// Drive `fut` to completion unless the context ends first, in which case
    /// the future is dropped and the context error returned.
    pub async fn run<F, T, E>(&self, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<ContextError>,
    {
        self.check().map_err(E::from)?;

        let expiry = async {
            match self.deadline {
                Some(deadline) => {
                    tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await
                }
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(E::from(ContextError::Canceled)),
            _ = expiry => Err(E::from(self.deadline_error())),
            out = fut => out,
        }
    }

    /// A poller that checks this context every `interval` ticks.
    pub fn poller(&self, interval: usize) -> Poller<'_> {
        Poller {
            ctx: self,
            interval: interval.max(1),
            ticks: 0,
        }
    }

    fn deadline_error(&self) -> ContextError {
        ContextError::DeadlineExceeded {
            elapsed: self.started.elapsed(),
        }
    }
}

/// Amortized context checks for tight loops.
pub struct Poller<'a> {
    ctx: &'a ExecutionContext,
    interval: usize,
    ticks: usize,
}

impl Poller<'_> {
    pub fn tick(&mut self) -> Result<(), ContextError> {
        self.ticks += 1;
        if self.ticks % self.interval == 0 {
            self.ctx.check()
        } else {
            Ok(())
        }
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_never_expires() {
        let ctx = ExecutionContext::background();
        assert!(ctx.check().is_ok());
        assert!(ctx.remaining().is_none());
    }

    #[test]
    fn test_zero_timeout_is_expired() {
        let ctx = ExecutionContext::with_timeout(Duration::ZERO);
        assert!(matches!(
            ctx.check(),
            Err(ContextError::DeadlineExceeded { .. })
        ));
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn test_cancel_wins_over_deadline() {
        let ctx = ExecutionContext::with_timeout(Duration::ZERO);
        ctx.cancel();
        assert_eq!(ctx.check(), Err(ContextError::Canceled));
    }

    #[test]
    fn test_child_inherits_cancellation_and_deadline() {
        let parent = ExecutionContext::with_timeout(Duration::from_secs(1));
        let child = parent.child_with_timeout(Duration::from_secs(60));
        assert!(child.deadline() <= parent.deadline());

        parent.cancel();
        assert_eq!(child.check(), Err(ContextError::Canceled));
    }

    #[test]
    fn test_poller_checks_on_interval() {
        let ctx = ExecutionContext::background();
        let mut poller = ctx.poller(4);
        for _ in 0..3 {
            assert!(poller.tick().is_ok());
        }
        ctx.cancel();
        assert_eq!(poller.tick(), Err(ContextError::Canceled));
        assert_eq!(poller.ticks(), 4);
    }

    #[tokio::test]
    async fn test_run_completes_within_deadline() {
        let ctx = ExecutionContext::with_timeout(Duration::from_secs(5));
        let out: Result<u32, ContextError> = ctx.run(async { Ok(7) }).await;
        assert_eq!(out, Ok(7));
    }

    #[tokio::test]
    async fn test_run_abandons_slow_future() {
        let ctx = ExecutionContext::with_timeout(Duration::from_millis(20));
        let out: Result<(), ContextError> = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;
        assert!(matches!(out, Err(ContextError::DeadlineExceeded { .. })));
    }

    #[tokio::test]
    async fn test_run_observes_cancellation() {
        let ctx = ExecutionContext::background();
        let canceler = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceler.cancel();
        });
        let out: Result<(), ContextError> = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;
        assert_eq!(out, Err(ContextError::Canceled));
    }
}
