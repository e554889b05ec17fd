//! Contract between lease-based leader election engines and the processes that
//! embed them.
//!
//! An election engine repeatedly tries to acquire and renew a single named lock
//! resource on a shared backend. This crate describes what the engine is given
//! to do so:
//!
//! - [`TimingProfile`] - lease duration, renew deadline and retry period, plus
//!   the reliability budget they imply,
//! - [`ResourceLock`] - a handle to the lock resource holding a
//!   [`LeaderElectionRecord`],
//! - [`LeaderCallbacks`] - what to run on leadership transitions,
//! - [`LeaderElectionConfig`] - all of the above, sealed,
//! - [`ElectionEngine`] - the engine's entry point.
//!
//! # Example
//!
//! ```rust
//! use electorate::TimingProfile;
//! use std::time::Duration;
//!
//! let profile = TimingProfile::new(
//!     Duration::from_secs(270),
//!     Duration::from_secs(240),
//!     Duration::from_secs(60),
//! );
//! assert_eq!(profile.worst_non_graceful_reacquisition(), Duration::from_secs(330));
//! ```

pub mod callbacks;
pub mod config;
pub mod elector;
pub mod lock;
pub mod record;
pub mod timing;

// Re-export main types
pub use callbacks::{LeaderCallbacks, NewLeader, StartedLeading, StoppedLeading};
pub use config::{LeaderElectionConfig, LeaderElectionParts};
pub use elector::ElectionEngine;
pub use lock::{LockError, ResourceLock};
pub use record::LeaderElectionRecord;
pub use timing::TimingProfile;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use electorate::prelude::*;
/// ```
pub mod prelude {
    pub use crate::callbacks::LeaderCallbacks;
    pub use crate::config::LeaderElectionConfig;
    pub use crate::elector::ElectionEngine;
    pub use crate::lock::{LockError, ResourceLock};
    pub use crate::record::LeaderElectionRecord;
    pub use crate::timing::TimingProfile;
}
