use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The state stored in a lock resource, as read and written by an election engine.
///
/// Serialized as camelCase JSON. How the fields change on acquire, renew and
/// release is up to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderElectionRecord {
    /// Identity of the current holder. Empty when the lock was released.
    pub holder_identity: String,
    /// See [`TimingProfile::lease_duration_seconds`](crate::TimingProfile::lease_duration_seconds).
    pub lease_duration_seconds: u64,
    pub acquire_time: DateTime<Utc>,
    pub renew_time: DateTime<Utc>,
    /// Number of times leadership changed hands.
    pub leader_transitions: u32,
}
