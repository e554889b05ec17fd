//! Namespace fallback from the platform environment.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where the platform mounts the namespace of the running workload.
pub const SERVICE_ACCOUNT_NAMESPACE_PATH: &str =
    "/var/run/secrets/kubernetes.io/serviceaccount/namespace";

/// Source of a namespace provided by the environment the process runs in.
///
/// Consulted only when neither the `TimingSpec` nor the embedding application named a
/// namespace. Closures returning `Option<String>` implement this trait.
pub trait AmbientNamespaceProvider: Send + Sync {
    /// Returns the ambient namespace, or `None` if it is unavailable or blank.
    fn lookup(&self) -> Option<String>;
}

impl<F> AmbientNamespaceProvider for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn lookup(&self) -> Option<String> {
        self()
    }
}

/// Reads the namespace from the service account mount.
#[derive(Debug, Clone)]
pub struct ServiceAccountNamespace {
    path: PathBuf,
}

impl ServiceAccountNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the namespace from a custom file instead of the well-known path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for ServiceAccountNamespace {
    fn default() -> Self {
        Self::with_path(SERVICE_ACCOUNT_NAMESPACE_PATH)
    }
}

impl AmbientNamespaceProvider for ServiceAccountNamespace {
    fn lookup(&self) -> Option<String> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "No ambient namespace available");
                return None;
            }
        };

        let namespace = data.trim();
        if namespace.is_empty() {
            debug!(path = %self.path.display(), "Ambient namespace file is blank");
            return None;
        }
        Some(namespace.to_string())
    }
}

/// A provider that never finds a namespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAmbientNamespace;

impl AmbientNamespaceProvider for NoAmbientNamespace {
    fn lookup(&self) -> Option<String> {
        None
    }
}

/// Pick the effective namespace: the explicit one, else `default`, else the
/// ambient one. Returns `None` when all of them are empty.
pub fn resolve_namespace(
    explicit: &str,
    default: Option<&str>,
    ambient: &dyn AmbientNamespaceProvider,
) -> Option<String> {
    if !explicit.is_empty() {
        return Some(explicit.to_string());
    }
    if let Some(default) = default.filter(|ns| !ns.is_empty()) {
        return Some(default.to_string());
    }
    ambient.lookup()
}
