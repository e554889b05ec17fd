use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::config::LeaderElectionConfig;
use crate::lock::{LockError, ResourceLock};

/// An engine running the acquire/renew/release loop for one configuration.
///
/// Implementations are expected to:
/// - call `on_new_leader` whenever they observe a different holder,
/// - call `on_started_leading` after acquiring the lock, with a token that is
///   cancelled when leadership ends,
/// - call `on_stopped_leading` once renewal failed for longer than the renew
///   deadline, or after a graceful cancel,
/// - release the lock on graceful cancel when `release_on_cancel` is set.
#[async_trait]
pub trait ElectionEngine: Send + Sync {
    /// Run until `shutdown` is cancelled or leadership is lost.
    async fn run<L>(
        &self,
        config: LeaderElectionConfig<L>,
        shutdown: CancellationToken,
    ) -> Result<(), LockError>
    where
        L: ResourceLock + 'static;
}
