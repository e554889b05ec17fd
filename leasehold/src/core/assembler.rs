use electorate::{LeaderCallbacks, LeaderElectionConfig, NewLeader, StartedLeading};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::core::events::EventRecorder;
use crate::core::identity::{HostnameSource, IdentityResolver};
use crate::core::lease_lock::LeaseLock;
use crate::core::terminate::{ProcessExit, TerminateOnLoss, Terminator};
use crate::core::timing::{Preset, TimingSpec};
use crate::core::transport::{ConnectionFactory, DebugFlags, DebuggingTransport};

/// Component name used in events when none is configured.
pub const DEFAULT_COMPONENT: &str = "leasehold";

/// Transport carrying lock traffic: traced request by request.
pub type LockTransport<T> = DebuggingTransport<T>;

/// Transport carrying event writes: not traced.
pub type EventTransport<T> = T;

/// The lock handle produced for a connection factory `F`.
pub type AssembledLock<F> = LeaseLock<
    LockTransport<<F as ConnectionFactory>::Transport>,
    EventTransport<<F as ConnectionFactory>::Transport>,
>;

/// The configuration produced for a connection factory `F`.
pub type AssembledConfig<F> = LeaderElectionConfig<AssembledLock<F>>;

/// Errors preventing a configuration from being assembled.
///
/// Neither is retried; the caller must not start the election engine.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AssemblyError {
    /// Namespace or name missing. Reported before the backend is contacted.
    #[error("Invalid leader election config: {0}")]
    InvalidConfig(&'static str),

    /// A connection to the lock backend could not be constructed.
    #[error("Lock backend unavailable: {0:#}")]
    BackendUnavailable(#[source] anyhow::Error),
}

/// Check that `spec` names a lock. There is no default for which lock to
/// contend for, only for how to contend.
pub fn validate(spec: &TimingSpec) -> Result<(), AssemblyError> {
    if spec.namespace().is_empty() {
        return Err(AssemblyError::InvalidConfig("namespace required"));
    }
    if spec.name().is_empty() {
        return Err(AssemblyError::InvalidConfig("name required"));
    }
    Ok(())
}

/// Assembles a [`LeaderElectionConfig`] ready to hand to an election engine.
///
/// The assembled configuration:
/// - holds a [`LeaseLock`] on `namespace/name` whose lock traffic goes through a
///   [`DebuggingTransport`] and whose events go through a separate, quiet
///   connection from the same factory,
/// - releases the lock on graceful cancel,
/// - terminates the process the first time leadership is lost.
///
/// # Example
///
/// ```rust
/// use leasehold::core::assembler::ElectionConfigBuilder;
/// use leasehold::core::timing::{Preset, TimingSpec};
/// use leasehold::testing::{SpyTerminator, StubBackend};
/// use std::sync::Arc;
///
/// let spec = TimingSpec::new("team-a", "controller-lock");
/// let config = ElectionConfigBuilder::new(spec, StubBackend::new())
///     .with_identity("controller-0")
///     .with_component("my-operator")
///     .with_terminator(Arc::new(SpyTerminator::new()))
///     .on_started_leading(|_token| println!("leading"))
///     .build()
///     .unwrap();
///
/// assert!(config.release_on_cancel());
/// assert_eq!(config.timing(), Preset::Standard.profile());
/// ```
pub struct ElectionConfigBuilder<F> {
    spec: TimingSpec,
    factory: F,
    identity: String,
    component: String,
    preset: Preset,
    identity_resolver: IdentityResolver,
    terminator: Arc<dyn Terminator>,
    debug_flags: DebugFlags,
    on_started_leading: Option<StartedLeading>,
    on_new_leader: Option<NewLeader>,
}

impl<F> ElectionConfigBuilder<F>
where
    F: ConnectionFactory,
{
    pub fn new(spec: TimingSpec, factory: F) -> Self {
        Self {
            spec,
            factory,
            identity: String::new(),
            component: DEFAULT_COMPONENT.to_string(),
            preset: Preset::default(),
            identity_resolver: IdentityResolver::default(),
            terminator: Arc::new(ProcessExit),
            debug_flags: DebugFlags::default(),
            on_started_leading: None,
            on_new_leader: None,
        }
    }

    /// Contend with this identity instead of a generated one. Empty means generate.
    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = identity.into();
        self
    }

    /// Component name recorded as the source of events.
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = component.into();
        self
    }

    /// Preset filling durations the `TimingSpec` leaves unset (default: [`Preset::Standard`]).
    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.preset = preset;
        self
    }

    pub fn with_hostname_source(mut self, source: impl HostnameSource + 'static) -> Self {
        self.identity_resolver = IdentityResolver::with_hostname_source(source);
        self
    }

    /// Replace process exit on leadership loss, e.g. with a spy in tests.
    pub fn with_terminator(mut self, terminator: Arc<dyn Terminator>) -> Self {
        self.terminator = terminator;
        self
    }

    /// What the lock transport logs (default: everything).
    pub fn with_debug_flags(mut self, flags: DebugFlags) -> Self {
        self.debug_flags = flags;
        self
    }

    pub fn on_started_leading<C>(mut self, f: C) -> Self
    where
        C: Fn(CancellationToken) + Send + Sync + 'static,
    {
        self.on_started_leading = Some(Box::new(f));
        self
    }

    pub fn on_new_leader<C>(mut self, f: C) -> Self
    where
        C: Fn(&str) + Send + Sync + 'static,
    {
        self.on_new_leader = Some(Box::new(f));
        self
    }

    /// Validate the settings and assemble the configuration.
    ///
    /// Nothing is constructed when validation fails.
    #[instrument(
        skip(self),
        fields(namespace = %self.spec.namespace(), name = %self.spec.name(), component = %self.component),
        err
    )]
    pub fn build(self) -> Result<AssembledConfig<F>, AssemblyError> {
        validate(&self.spec)?;

        let timing = self.spec.resolve_timing(self.preset);
        if !timing.is_consistent() {
            warn!(
                lease_duration = ?timing.lease_duration,
                renew_deadline = ?timing.renew_deadline,
                retry_period = ?timing.retry_period,
                "Lease timing is inconsistent, using it as configured"
            );
        }

        let events = self
            .factory
            .connect()
            .map_err(AssemblyError::BackendUnavailable)?;
        let client = self
            .factory
            .connect()
            .map_err(AssemblyError::BackendUnavailable)?;

        let identity = self.identity_resolver.resolve(&self.identity);
        let namespace = self.spec.namespace();
        let name = self.spec.name();

        let recorder = EventRecorder::new(self.component, namespace, name, events);
        let lock = LeaseLock::new(
            namespace,
            name,
            identity.as_str(),
            DebuggingTransport::new(client, self.debug_flags),
            recorder,
        );

        let guard = TerminateOnLoss::new(self.terminator);
        let mut callbacks = LeaderCallbacks::new(move || guard.on_stopped_leading());
        if let Some(f) = self.on_started_leading {
            callbacks = callbacks.with_on_started_leading(f);
        }
        if let Some(f) = self.on_new_leader {
            callbacks = callbacks.with_on_new_leader(f);
        }

        info!(
            %identity,
            lease_duration = ?timing.lease_duration,
            renew_deadline = ?timing.renew_deadline,
            retry_period = ?timing.retry_period,
            "Assembled leader election config"
        );

        Ok(LeaderElectionConfig::new(lock, timing, callbacks))
    }
}

impl<F> std::fmt::Debug for ElectionConfigBuilder<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElectionConfigBuilder")
            .field("spec", &self.spec)
            .field("identity", &self.identity)
            .field("component", &self.component)
            .field("preset", &self.preset)
            .field("debug_flags", &self.debug_flags)
            .finish_non_exhaustive()
    }
}
