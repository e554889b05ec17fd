//! Fail-fast handling of involuntary leadership loss.
//!
//! A process that lost the lock may still believe it is the leader. Rather than
//! trying to roll its internal state back, it terminates and lets a fresh
//! process contend again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Capability to terminate the running process.
pub trait Terminator: Send + Sync {
    fn terminate(&self);
}

/// Exits the process with status 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExit;

impl Terminator for ProcessExit {
    fn terminate(&self) {
        std::process::exit(0);
    }
}

/// The `on_stopped_leading` callback of assembled configurations.
///
/// Invokes its [`Terminator`] at most once, however often the engine reports
/// the loss.
pub struct TerminateOnLoss {
    terminator: Arc<dyn Terminator>,
    fired: AtomicBool,
}

impl TerminateOnLoss {
    pub fn new(terminator: Arc<dyn Terminator>) -> Self {
        Self {
            terminator,
            fired: AtomicBool::new(false),
        }
    }

    pub fn on_stopped_leading(&self) {
        if self.fired.swap(true, Ordering::SeqCst) {
            return;
        }
        warn!("leader election lost");
        self.terminator.terminate();
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for TerminateOnLoss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminateOnLoss")
            .field("fired", &self.has_fired())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SpyTerminator;

    #[test]
    fn test_terminates_once() {
        let spy = Arc::new(SpyTerminator::new());
        let guard = TerminateOnLoss::new(spy.clone());
        assert!(!guard.has_fired());

        guard.on_stopped_leading();
        guard.on_stopped_leading();
        guard.on_stopped_leading();

        assert!(guard.has_fired());
        assert_eq!(spy.calls(), 1);
    }

    #[test]
    fn test_concurrent_reports_terminate_once() {
        let spy = Arc::new(SpyTerminator::new());
        let guard = Arc::new(TerminateOnLoss::new(spy.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let guard = guard.clone();
                std::thread::spawn(move || guard.on_stopped_leading())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(spy.calls(), 1);
    }
}
