//! Per-call context: correlation ids plus cancellation and deadline
//!
//! The engine checks the context before every store call and stops with
//! `ApplyError::Cancelled` once it is cancelled or past its deadline.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use appconf_core_types::RequestContext;

use crate::errors::{ApplyError, Result};

/// Why a context stopped accepting work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    Cancelled,
    DeadlineExceeded,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Cancelled => f.write_str("context cancelled"),
            CancelReason::DeadlineExceeded => f.write_str("context deadline exceeded"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Context {
    request: RequestContext,
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

/// Cancels every clone of the context it was taken from
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl Context {
    /// A context that is never cancelled and has no deadline
    pub fn background() -> Self {
        Self::with_request(RequestContext::new())
    }

    pub fn with_request(request: RequestContext) -> Self {
        Self {
            request,
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn request(&self) -> &RequestContext {
        &self.request
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(self.cancelled.clone())
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// `Some` once the context is done
    pub fn err(&self) -> Option<CancelReason> {
        if self.cancelled.load(Ordering::SeqCst) {
            return Some(CancelReason::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(CancelReason::DeadlineExceeded),
            _ => None,
        }
    }

    /// Fail with `Cancelled` if the context is done before `op` runs
    ///
    /// # Errors
    ///
    /// Returns `ApplyError::Cancelled` naming `op`.
    pub fn check(&self, op: &str) -> Result<()> {
        match self.err() {
            Some(reason) => Err(ApplyError::Cancelled {
                op: op.to_string(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_is_live() {
        let ctx = Context::background();
        assert_eq!(ctx.err(), None);
        assert!(ctx.check("apply_workload").is_ok());
    }

    #[test]
    fn test_cancel_handle_reaches_clones() {
        let ctx = Context::background();
        let clone = ctx.clone();
        ctx.cancel_handle().cancel();
        assert_eq!(clone.err(), Some(CancelReason::Cancelled));
        assert_eq!(
            clone.check("get_scope").unwrap_err(),
            ApplyError::Cancelled {
                op: "get_scope".to_string(),
                reason: CancelReason::Cancelled,
            }
        );
    }

    #[test]
    fn test_expired_deadline() {
        let ctx = Context::background().with_deadline(Instant::now());
        assert_eq!(ctx.err(), Some(CancelReason::DeadlineExceeded));
    }

    #[test]
    fn test_earlier_deadline_wins() {
        let now = Instant::now();
        let ctx = Context::background()
            .with_deadline(now + Duration::from_secs(10))
            .with_deadline(now + Duration::from_secs(60));
        assert_eq!(ctx.deadline(), Some(now + Duration::from_secs(10)));
    }
}
