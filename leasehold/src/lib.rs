#![doc = include_str!("../README.md")]

pub mod core;

/// Stand-ins for the lock backend, hostname lookup and process termination.
///
/// These let tests assemble and drive a configuration without a backend and
/// without exiting the test process.
#[doc(hidden)]
pub mod testing;

/// Re-exports to simplify importing this crate types.
pub mod prelude {
    pub use super::core::{
        assembler::{AssemblyError, ElectionConfigBuilder},
        defaults::ElectionDefaults,
        identity::{resolve_identity, HostnameSource, IdentityResolver},
        lease_lock::LeaseLock,
        namespace::{AmbientNamespaceProvider, ServiceAccountNamespace},
        terminate::{ProcessExit, Terminator},
        timing::{Preset, TimingSpec},
        transport::{backend_request, ConnectionFactory, Transport, TransportError},
        Bytes, CancellationToken, LeaderElectionConfig, Request, ResourceLock, Response, StatusCode, TimingProfile,
    };
}
