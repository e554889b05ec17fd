use async_trait::async_trait;
use thiserror::Error;

use crate::record::LeaderElectionRecord;

/// A handle to a single named lock resource, as driven by an election engine.
///
/// The handle does not own the resource: the backend creates it lazily on the
/// first `create` and is responsible for compare-and-swap semantics, reporting
/// lost races as [`LockError::Conflict`].
#[async_trait]
pub trait ResourceLock: Send + Sync {
    /// Read the current record.
    ///
    /// Returns [`LockError::NotFound`] if nobody has created the lock yet.
    async fn get(&self) -> Result<LeaderElectionRecord, LockError>;

    /// Create the lock with an initial record.
    async fn create(&self, record: &LeaderElectionRecord) -> Result<(), LockError>;

    /// Replace the record. Fails with [`LockError::Conflict`] when another
    /// contender modified it in the meantime.
    async fn update(&self, record: &LeaderElectionRecord) -> Result<(), LockError>;

    /// Record a leadership transition in the event sink.
    ///
    /// Event recording is best effort and never fails the caller.
    async fn record_event(&self, message: &str);

    /// Identity this handle contends with.
    fn identity(&self) -> &str;

    /// Human readable lock target, used in logs.
    fn describe(&self) -> String;
}

/// Errors returned by lock operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LockError {
    #[error("Lock {0} not found")]
    NotFound(String),

    #[error("Lock {0} was modified by another contender")]
    Conflict(String),

    #[error("Lock backend answered with unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Failed to encode or decode leader election record: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Lock backend transport error: {0}")]
    Transport(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_lock_error_display() {
        let err = LockError::NotFound("team-a/controller-lock".to_string());
        assert_eq!(err.to_string(), "Lock team-a/controller-lock not found");

        let err = LockError::UnexpectedStatus {
            status: 503,
            body: "unavailable".to_string(),
        };
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_lock_error_source() {
        let err = LockError::Conflict("team-a/controller-lock".to_string());
        assert!(err.source().is_none());

        let json_err = serde_json::from_str::<LeaderElectionRecord>("{").unwrap_err();
        let err = LockError::from(json_err);
        assert!(err.source().is_some());
    }
}
