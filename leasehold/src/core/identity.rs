//! Election identity resolution.
//!
//! Every contender for a lock needs an identity no other contender shares, or
//! the backend can no longer tell who holds the lock. Processes on the same
//! host (co-located containers, for example) can share a hostname, so the
//! hostname alone is never enough: a time-ordered, random UUID is always
//! appended.

use std::io;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Source of the local hostname.
pub trait HostnameSource: Send + Sync {
    fn hostname(&self) -> io::Result<String>;
}

/// Reads the hostname from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHostname;

impl HostnameSource for SystemHostname {
    fn hostname(&self) -> io::Result<String> {
        whoami::fallible::hostname()
    }
}

/// Produces election identities.
#[derive(Clone)]
pub struct IdentityResolver {
    hostname: Arc<dyn HostnameSource>,
}

impl IdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hostname_source(source: impl HostnameSource + 'static) -> Self {
        Self {
            hostname: Arc::new(source),
        }
    }

    /// Returns `explicit` unchanged if it is non-empty.
    ///
    /// Otherwise returns `<hostname>_<uuid>`, or just `<uuid>` if the hostname
    /// can't be read. A fresh UUID is generated on every call.
    pub fn resolve(&self, explicit: &str) -> String {
        if !explicit.is_empty() {
            return explicit.to_string();
        }

        let suffix = Uuid::now_v7();
        match self.hostname.hostname() {
            Ok(hostname) if !hostname.is_empty() => format!("{hostname}_{suffix}"),
            Ok(_) => {
                warn!(identity = %suffix, "Hostname is empty, using a bare unique identity");
                suffix.to_string()
            }
            Err(e) => {
                warn!(identity = %suffix, error = %e, "Failed to read hostname, using a bare unique identity");
                suffix.to_string()
            }
        }
    }
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::with_hostname_source(SystemHostname)
    }
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver").finish_non_exhaustive()
    }
}

/// Resolve an identity using the system hostname.
pub fn resolve_identity(explicit: &str) -> String {
    IdentityResolver::new().resolve(explicit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FixedHostname;

    #[test]
    fn test_explicit_identity_is_verbatim() {
        let resolver = IdentityResolver::with_hostname_source(FixedHostname::named("node-1"));
        assert_eq!(resolver.resolve("my-controller-0"), "my-controller-0");
    }

    #[test]
    fn test_hostname_prefixed_identity() {
        let resolver = IdentityResolver::with_hostname_source(FixedHostname::named("node-1"));
        let identity = resolver.resolve("");

        let suffix = identity.strip_prefix("node-1_").expect("hostname prefix");
        assert!(Uuid::parse_str(suffix).is_ok());
    }

    #[test]
    fn test_same_hostname_never_collides() {
        let resolver = IdentityResolver::with_hostname_source(FixedHostname::named("shared-host"));

        let identities: std::collections::HashSet<String> =
            (0..1000).map(|_| resolver.resolve("")).collect();
        assert_eq!(identities.len(), 1000);
    }

    #[test]
    fn test_hostname_failure_falls_back_to_uuid() {
        let err = FixedHostname::failing().hostname().unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::Other);

        let resolver = IdentityResolver::with_hostname_source(FixedHostname::failing());
        let first = resolver.resolve("");
        let second = resolver.resolve("");

        assert!(Uuid::parse_str(&first).is_ok());
        assert_ne!(first, second);
    }

    #[test]
    fn test_empty_hostname_falls_back_to_uuid() {
        let resolver = IdentityResolver::with_hostname_source(FixedHostname::named(""));
        let identity = resolver.resolve("");

        assert!(Uuid::parse_str(&identity).is_ok());
    }

    #[test]
    fn test_system_resolution_is_unique() {
        assert_ne!(resolve_identity(""), resolve_identity(""));
        assert_eq!(resolve_identity("fixed"), "fixed");
    }
}
