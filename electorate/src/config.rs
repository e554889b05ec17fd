use std::time::Duration;

use crate::callbacks::LeaderCallbacks;
use crate::lock::ResourceLock;
use crate::timing::TimingProfile;

/// A complete, immutable configuration for one run of an election engine.
///
/// Once built it cannot be modified; the engine takes ownership of it with
/// [`LeaderElectionConfig::into_parts`].
///
/// Configurations always release the lock when the engine is cancelled
/// gracefully, so a healthy replacement can take over after one retry period
/// instead of waiting for the lease to expire.
#[derive(Debug)]
pub struct LeaderElectionConfig<L> {
    lock: L,
    timing: TimingProfile,
    release_on_cancel: bool,
    callbacks: LeaderCallbacks,
}

/// The owned pieces of a [`LeaderElectionConfig`].
#[derive(Debug)]
pub struct LeaderElectionParts<L> {
    pub lock: L,
    pub timing: TimingProfile,
    pub release_on_cancel: bool,
    pub callbacks: LeaderCallbacks,
}

impl<L> LeaderElectionConfig<L>
where
    L: ResourceLock,
{
    pub fn new(lock: L, timing: TimingProfile, callbacks: LeaderCallbacks) -> Self {
        Self {
            lock,
            timing,
            release_on_cancel: true,
            callbacks,
        }
    }

    pub fn lock(&self) -> &L {
        &self.lock
    }

    pub fn timing(&self) -> TimingProfile {
        self.timing
    }

    pub fn lease_duration(&self) -> Duration {
        self.timing.lease_duration
    }

    pub fn renew_deadline(&self) -> Duration {
        self.timing.renew_deadline
    }

    pub fn retry_period(&self) -> Duration {
        self.timing.retry_period
    }

    pub fn release_on_cancel(&self) -> bool {
        self.release_on_cancel
    }

    pub fn callbacks(&self) -> &LeaderCallbacks {
        &self.callbacks
    }

    /// Consume the configuration, handing its pieces to the engine.
    pub fn into_parts(self) -> LeaderElectionParts<L> {
        LeaderElectionParts {
            lock: self.lock,
            timing: self.timing,
            release_on_cancel: self.release_on_cancel,
            callbacks: self.callbacks,
        }
    }
}
