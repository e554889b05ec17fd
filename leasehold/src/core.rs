//! Lease timing, identity resolution and election configuration assembly, plus
//! re-exports of 3rd party types used in the public interface.

pub use bytes::Bytes;
pub use electorate::{LeaderCallbacks, LeaderElectionConfig, LeaderElectionRecord, ResourceLock, TimingProfile};
pub use http::{Method, Request, Response, StatusCode};
pub use tokio_util::sync::CancellationToken;
pub use uuid::Uuid;

/// An alias for `chrono::DateTime<chrono::Utc>`
pub type DateTime = chrono::DateTime<chrono::Utc>;

pub mod assembler;
pub mod defaults;
pub mod events;
pub mod identity;
pub mod lease_lock;
pub mod namespace;
pub mod terminate;
pub mod timing;
pub mod transport;
