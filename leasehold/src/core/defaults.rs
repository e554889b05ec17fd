use crate::core::namespace::{resolve_namespace, AmbientNamespaceProvider};
use crate::core::timing::{Preset, TimingSpec};

/// Defaults an embedding application applies to user supplied election settings.
///
/// Defaulting happens outside the user's configuration so that it can evolve
/// while still telling apart values the user chose from values that were
/// filled in. It only ever fills gaps: anything the user set is kept.
///
/// # Example
///
/// ```rust
/// use leasehold::core::defaults::ElectionDefaults;
/// use leasehold::core::namespace::NoAmbientNamespace;
/// use leasehold::core::timing::{Preset, TimingSpec};
///
/// let defaults = ElectionDefaults::new()
///     .with_namespace("team-a")
///     .with_name("controller-lock");
/// let spec = defaults.apply(&TimingSpec::default(), &NoAmbientNamespace);
///
/// assert_eq!(spec.namespace(), "team-a");
/// assert_eq!(spec.resolve_timing(Preset::ResourceConstrained), Preset::Standard.profile());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ElectionDefaults {
    preset: Preset,
    namespace: Option<String>,
    name: Option<String>,
}

impl ElectionDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset used for unset durations (default: [`Preset::Standard`]).
    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.preset = preset;
        self
    }

    /// Namespace used when the `TimingSpec` has none. Takes precedence over the
    /// ambient namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Lock name used when the `TimingSpec` has none.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn preset(&self) -> Preset {
        self.preset
    }

    /// Returns a defaulted copy of `spec`; `spec` itself is not modified.
    ///
    /// All three durations are set on the result. The namespace stays empty
    /// if neither the `TimingSpec`, these defaults nor `ambient` provide one.
    pub fn apply(&self, spec: &TimingSpec, ambient: &dyn AmbientNamespaceProvider) -> TimingSpec {
        let profile = self.preset.resolve(spec);
        let mut ret = spec.clone().with_profile(profile);

        if let Some(namespace) = resolve_namespace(&spec.namespace, self.namespace.as_deref(), ambient) {
            ret.namespace = namespace;
        }
        if ret.name.is_empty() {
            if let Some(name) = &self.name {
                ret.name = name.clone();
            }
        }
        ret
    }
}
