//! Cancellation-aware context handed to every plugin call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::core::scheduler::status::StatusError;

/// Cloned contexts share cancellation: cancelling one cancels all of them.
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancelled: Arc<AtomicBool>,
}

impl Context {
    pub fn background() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn err(&self) -> Result<(), StatusError> {
        if self.is_cancelled() {
            return Err(StatusError::Cancelled);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let ctx = Context::background();
        let child = ctx.clone();
        assert_eq!(child.err(), Ok(()));
        ctx.cancel();
        assert!(child.is_cancelled());
        assert_eq!(child.err(), Err(StatusError::Cancelled));
    }
}
