use std::time::Duration;

/// Fully resolved lease timing handed to an election engine.
///
/// An engine holding the lock tries to renew it every `retry_period` and gives
/// up leadership once `renew_deadline` has elapsed without a successful renewal.
/// Contenders treat the lock as abandoned only after `lease_duration` has passed
/// since the last renewal they observed.
///
/// The budget helpers below describe what a profile tolerates. They saturate
/// at zero instead of panicking, so they are safe to call on profiles whose
/// durations are out of order.
///
/// # Example
/// ```rust
/// use electorate::TimingProfile;
/// use std::time::Duration;
///
/// let profile = TimingProfile::new(
///     Duration::from_secs(137),
///     Duration::from_secs(107),
///     Duration::from_secs(26),
/// );
/// assert_eq!(profile.clock_skew_tolerance(), Duration::from_secs(30));
/// assert_eq!(profile.downtime_tolerance(), Duration::from_secs(78));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimingProfile {
    /// How long contenders wait before forcibly taking over an unrenewed lock.
    pub lease_duration: Duration,
    /// How long the current holder keeps retrying renewal before stepping down.
    pub renew_deadline: Duration,
    /// Interval between acquire and renew attempts.
    pub retry_period: Duration,
}

impl TimingProfile {
    pub const fn new(lease_duration: Duration, renew_deadline: Duration, retry_period: Duration) -> Self {
        Self {
            lease_duration,
            renew_deadline,
            retry_period,
        }
    }

    /// Disagreement between contenders' clocks absorbed without a double leader:
    /// `lease_duration - renew_deadline`.
    pub fn clock_skew_tolerance(&self) -> Duration {
        self.lease_duration.saturating_sub(self.renew_deadline)
    }

    /// Number of renewal attempts that fit into the renew deadline.
    pub fn renew_attempts(&self) -> u32 {
        if self.retry_period.is_zero() {
            return 0;
        }
        let attempts = self.renew_deadline.as_nanos() / self.retry_period.as_nanos();
        u32::try_from(attempts).unwrap_or(u32::MAX)
    }

    /// How long the backend may be unreachable before the holder steps down.
    ///
    /// The last renewal attempt happens at `renew_attempts * retry_period`; the
    /// first one that can fail is one retry period in.
    pub fn downtime_tolerance(&self) -> Duration {
        self.retry_period
            .saturating_mul(self.renew_attempts())
            .saturating_sub(self.retry_period)
    }

    /// Worst-case time for a contender to take over after the holder died
    /// without releasing the lock.
    pub fn worst_non_graceful_reacquisition(&self) -> Duration {
        self.lease_duration.saturating_add(self.retry_period)
    }

    /// Worst-case time for a contender to take over after the holder released
    /// the lock on shutdown.
    pub fn worst_graceful_reacquisition(&self) -> Duration {
        self.retry_period
    }

    /// Lease duration in whole seconds, as written into a lock record.
    ///
    /// Rounds up and never returns zero: a lease written as `0` would expire
    /// the moment it was acquired.
    pub fn lease_duration_seconds(&self) -> u64 {
        let secs = self.lease_duration.as_secs();
        let secs = if self.lease_duration.subsec_nanos() > 0 {
            secs.saturating_add(1)
        } else {
            secs
        };
        secs.max(1)
    }

    /// Returns `true` when `lease_duration > renew_deadline >= retry_period > 0`.
    pub fn is_consistent(&self) -> bool {
        !self.retry_period.is_zero()
            && self.renew_deadline >= self.retry_period
            && self.lease_duration > self.renew_deadline
    }
}
