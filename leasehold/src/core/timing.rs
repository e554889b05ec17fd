//! Lease timing presets and additive defaulting.
//!
//! Both presets are derived from the same reliability budget rather than picked
//! by hand:
//!
//! 1. clock skew tolerance is `lease_duration - renew_deadline == 30s`,
//! 2. backend downtime tolerance is
//!    `floor(renew_deadline / retry_period) * retry_period - retry_period`,
//! 3. worst non-graceful reacquisition is `lease_duration + retry_period`,
//! 4. worst graceful reacquisition is `retry_period`.
//!
//! | Preset | lease | renew | retry | downtime | non-graceful |
//! |---|---|---|---|---|---|
//! | [`Preset::Standard`] | 137s | 107s | 26s | 78s | 163s |
//! | [`Preset::ResourceConstrained`] | 270s | 240s | 60s | 180s | 330s |
//!
//! # Example
//!
//! ```rust
//! use leasehold::core::timing::{Preset, TimingSpec};
//! use std::time::Duration;
//!
//! let spec = TimingSpec::new("team-a", "controller-lock")
//!     .with_retry_period(Duration::from_secs(10));
//! let profile = spec.resolve_timing(Preset::Standard);
//!
//! assert_eq!(profile.lease_duration, Duration::from_secs(137));
//! assert_eq!(profile.retry_period, Duration::from_secs(10));
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::TimingProfile;

/// Named timing presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Preset {
    /// Tolerates 78s of backend downtime, recovers within 163s.
    #[default]
    Standard,
    /// For single-node deployments where the backend shares the node with the
    /// contenders: fewer backend calls and 180s of downtime tolerance, at the
    /// cost of slower failover.
    ResourceConstrained,
}

impl Preset {
    pub const fn profile(self) -> TimingProfile {
        match self {
            // 107/26 = 4 renewals; if the backend goes away just before the first
            // renewal at t=26 we keep retrying until t=104
            Preset::Standard => TimingProfile::new(
                Duration::from_secs(137),
                Duration::from_secs(107),
                Duration::from_secs(26),
            ),
            // 240/60 = 4 renewals, same skew tolerance
            Preset::ResourceConstrained => TimingProfile::new(
                Duration::from_secs(270),
                Duration::from_secs(240),
                Duration::from_secs(60),
            ),
        }
    }

    /// Fill the unset durations of `spec` from this preset.
    ///
    /// Explicit values are kept even if the result is inconsistent.
    pub fn resolve(self, spec: &TimingSpec) -> TimingProfile {
        let defaults = self.profile();
        TimingProfile::new(
            spec.lease_duration().unwrap_or(defaults.lease_duration),
            spec.renew_deadline().unwrap_or(defaults.renew_deadline),
            spec.retry_period().unwrap_or(defaults.retry_period),
        )
    }
}

/// User supplied, possibly partial, election settings.
///
/// A missing or zero duration means "unset". Durations are read from
/// configuration as (possibly fractional) seconds:
///
/// ```rust
/// use leasehold::core::timing::TimingSpec;
/// use std::time::Duration;
///
/// let spec: TimingSpec = serde_json::from_str(
///     r#"{"namespace": "team-a", "name": "controller-lock", "retryPeriod": 2.5}"#,
/// ).unwrap();
/// assert_eq!(spec.retry_period(), Some(Duration::from_millis(2500)));
/// assert_eq!(spec.lease_duration(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimingSpec {
    pub(crate) namespace: String,
    pub(crate) name: String,
    #[serde(with = "duration_secs", skip_serializing_if = "Option::is_none")]
    pub(crate) lease_duration: Option<Duration>,
    #[serde(with = "duration_secs", skip_serializing_if = "Option::is_none")]
    pub(crate) renew_deadline: Option<Duration>,
    #[serde(with = "duration_secs", skip_serializing_if = "Option::is_none")]
    pub(crate) retry_period: Option<Duration>,
}

impl TimingSpec {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_lease_duration(mut self, duration: Duration) -> Self {
        self.lease_duration = Some(duration);
        self
    }

    pub fn with_renew_deadline(mut self, duration: Duration) -> Self {
        self.renew_deadline = Some(duration);
        self
    }

    pub fn with_retry_period(mut self, duration: Duration) -> Self {
        self.retry_period = Some(duration);
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The explicitly set lease duration, if any.
    pub fn lease_duration(&self) -> Option<Duration> {
        explicit(self.lease_duration)
    }

    /// The explicitly set renew deadline, if any.
    pub fn renew_deadline(&self) -> Option<Duration> {
        explicit(self.renew_deadline)
    }

    /// The explicitly set retry period, if any.
    pub fn retry_period(&self) -> Option<Duration> {
        explicit(self.retry_period)
    }

    /// Resolve the timing profile, filling unset durations from `preset`.
    pub fn resolve_timing(&self, preset: Preset) -> TimingProfile {
        preset.resolve(self)
    }

    /// Copy of this spec with all three durations replaced by `preset`,
    /// regardless of what the caller set.
    ///
    /// Use this only when the deployment mandates the preset, e.g. a
    /// single-node cluster forcing [`Preset::ResourceConstrained`].
    pub fn enforce_preset(&self, preset: Preset) -> Self {
        self.clone().with_profile(preset.profile())
    }

    pub(crate) fn with_profile(mut self, profile: TimingProfile) -> Self {
        self.lease_duration = Some(profile.lease_duration);
        self.renew_deadline = Some(profile.renew_deadline);
        self.retry_period = Some(profile.retry_period);
        self
    }
}

fn explicit(duration: Option<Duration>) -> Option<Duration> {
    duration.filter(|d| !d.is_zero())
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(duration) => serializer.serialize_some(&duration.as_secs_f64()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<f64>::deserialize(deserializer)?
            .map(|secs| Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_standard_preset_budget() {
        let profile = Preset::Standard.profile();

        assert_eq!(profile.lease_duration, secs(137));
        assert_eq!(profile.renew_deadline, secs(107));
        assert_eq!(profile.retry_period, secs(26));
        assert_eq!(profile.clock_skew_tolerance(), secs(30));
        assert_eq!(profile.downtime_tolerance(), secs(78));
        assert_eq!(profile.worst_non_graceful_reacquisition(), secs(163));
        assert_eq!(profile.worst_graceful_reacquisition(), secs(26));
        assert!(profile.is_consistent());
    }

    #[test]
    fn test_resource_constrained_preset_budget() {
        let profile = Preset::ResourceConstrained.profile();

        assert_eq!(profile.lease_duration, secs(270));
        assert_eq!(profile.renew_deadline, secs(240));
        assert_eq!(profile.retry_period, secs(60));
        assert_eq!(profile.clock_skew_tolerance(), secs(30));
        assert_eq!(profile.downtime_tolerance(), secs(180));
        assert_eq!(profile.worst_non_graceful_reacquisition(), secs(330));
        assert_eq!(profile.worst_graceful_reacquisition(), secs(60));
    }

    #[test]
    fn test_default_preset_is_standard() {
        assert_eq!(Preset::default(), Preset::Standard);
    }

    #[test]
    fn test_unset_spec_resolves_to_preset() {
        let spec = TimingSpec::new("team-a", "controller-lock");
        assert_eq!(spec.resolve_timing(Preset::Standard), Preset::Standard.profile());
        assert_eq!(
            spec.resolve_timing(Preset::ResourceConstrained),
            Preset::ResourceConstrained.profile()
        );
    }

    #[test]
    fn test_zero_durations_count_as_unset() {
        let spec = TimingSpec::new("team-a", "controller-lock")
            .with_lease_duration(Duration::ZERO)
            .with_renew_deadline(Duration::ZERO)
            .with_retry_period(Duration::ZERO);

        assert_eq!(spec.lease_duration(), None);
        assert_eq!(spec.resolve_timing(Preset::Standard), Preset::Standard.profile());
    }

    #[test]
    fn test_explicit_values_are_preserved() {
        let spec = TimingSpec::new("team-a", "controller-lock")
            .with_lease_duration(Duration::from_millis(15_250))
            .with_retry_period(secs(2));
        let profile = spec.resolve_timing(Preset::ResourceConstrained);

        assert_eq!(profile.lease_duration, Duration::from_millis(15_250));
        assert_eq!(profile.renew_deadline, secs(240));
        assert_eq!(profile.retry_period, secs(2));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let specs = [
            TimingSpec::default(),
            TimingSpec::new("ns", "lock").with_renew_deadline(secs(50)),
            TimingSpec::new("ns", "lock")
                .with_lease_duration(secs(1))
                .with_renew_deadline(secs(2))
                .with_retry_period(secs(3)),
        ];

        for spec in specs {
            let once = spec.resolve_timing(Preset::Standard);
            let resolved_spec = spec.clone().with_profile(once);
            let twice = resolved_spec.resolve_timing(Preset::Standard);

            assert_eq!(once, twice);
            assert_eq!(once, spec.resolve_timing(Preset::Standard));
        }
    }

    #[test]
    fn test_partial_override_is_not_corrected() {
        // retry period longer than the default renew deadline stays as given
        let spec = TimingSpec::new("team-a", "controller-lock").with_retry_period(secs(300));
        let profile = spec.resolve_timing(Preset::Standard);

        assert_eq!(profile.retry_period, secs(300));
        assert_eq!(profile.renew_deadline, secs(107));
        assert!(!profile.is_consistent());
    }

    #[test]
    fn test_enforce_preset_overrides_explicit_values() {
        let spec = TimingSpec::new("team-a", "controller-lock")
            .with_lease_duration(secs(15))
            .with_renew_deadline(secs(10))
            .with_retry_period(secs(2));
        let enforced = spec.enforce_preset(Preset::ResourceConstrained);

        assert_eq!(
            enforced.resolve_timing(Preset::Standard),
            Preset::ResourceConstrained.profile()
        );
        assert_eq!(enforced.namespace(), "team-a");
        assert_eq!(enforced.name(), "controller-lock");
        // the input is untouched
        assert_eq!(spec.lease_duration(), Some(secs(15)));
    }

    #[test]
    fn test_spec_deserializes_seconds() {
        let spec: TimingSpec = serde_json::from_str(
            r#"{"namespace": "team-a", "name": "controller-lock", "leaseDuration": 60, "renewDeadline": 0}"#,
        )
        .unwrap();

        assert_eq!(spec.namespace(), "team-a");
        assert_eq!(spec.lease_duration(), Some(secs(60)));
        assert_eq!(spec.renew_deadline(), None);
        assert_eq!(spec.retry_period(), None);
    }

    #[test]
    fn test_spec_rejects_negative_durations() {
        let result = serde_json::from_str::<TimingSpec>(r#"{"leaseDuration": -1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_spec_serializes_only_set_durations() {
        let spec = TimingSpec::new("team-a", "controller-lock").with_retry_period(secs(26));
        let value = serde_json::to_value(&spec).unwrap();

        assert_eq!(value["retryPeriod"], 26.0);
        assert!(value.get("leaseDuration").is_none());
    }
}
