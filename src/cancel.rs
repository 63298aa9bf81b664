//! Cancellation signal shared by every stage of a scaffold run.

use crate::error::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    reason: Mutex<Option<String>>,
}

/// Cloneable handle used to stop a run.
///
/// Cancelling does not interrupt work that already started; workers check the
/// token before picking up their next item.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals cancellation. The first reason given is kept.
    pub fn cancel<S: Into<String>>(&self, reason: S) {
        if let Ok(mut current) = self.inner.reason.lock() {
            if current.is_none() {
                *current = Some(reason.into());
            }
        }
        self.inner.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Returns `Error::Cancelled` carrying the cancellation cause once the
    /// token has been cancelled.
    pub fn check(&self) -> Result<()> {
        if !self.is_cancelled() {
            return Ok(());
        }

        let reason = self
            .inner
            .reason
            .lock()
            .ok()
            .and_then(|reason| reason.clone())
            .unwrap_or_else(|| "cancelled".to_string());

        Err(Error::Cancelled { reason })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_token_is_not_cancelled() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        assert!(token.check().is_ok());
    }

    #[test]
    fn test_cancel_is_visible_through_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        clone.cancel("user interrupt");

        assert!(token.is_cancelled());
        match token.check() {
            Err(Error::Cancelled { reason }) => assert_eq!(reason, "user interrupt"),
            other => panic!("Expected Cancelled, got {other:?}"),
        }
    }

    #[test]
    fn test_first_reason_wins() {
        let token = CancellationToken::new();
        token.cancel("first");
        token.cancel("second");

        match token.check() {
            Err(Error::Cancelled { reason }) => assert_eq!(reason, "first"),
            other => panic!("Expected Cancelled, got {other:?}"),
        }
    }
}
