//! Provider kinds controlling instance caching behavior.

/// How a registered constructor is provided.
///
/// - **Singleton**: the constructor runs once; every resolution of any key in
///   its base chain returns the same instance.
/// - **Factory**: the constructor runs on every resolution.
///
/// # Examples
///
/// ```rust
/// use managed_di::{Constructor, Nominal, ProviderKind, Registry};
///
/// struct Database;
/// struct RequestModel;
///
/// let mut registry = Registry::new();
/// registry.register_constructor(
///     Constructor::record(Nominal::of::<Database>()).build(|_| Ok(Database)),
///     ProviderKind::Singleton,
/// ).unwrap();
/// registry.register_constructor(
///     Constructor::record(Nominal::of::<RequestModel>()).build(|_| Ok(RequestModel)),
///     ProviderKind::Factory,
/// ).unwrap();
///
/// let db1 = registry.get_dependency(Nominal::of::<Database>()).unwrap();
/// let db2 = registry.get_dependency(Nominal::of::<Database>()).unwrap();
/// assert!(db1.ptr_eq(&db2));
///
/// let m1 = registry.get_dependency(Nominal::of::<RequestModel>()).unwrap();
/// let m2 = registry.get_dependency(Nominal::of::<RequestModel>()).unwrap();
/// assert!(!m1.ptr_eq(&m2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum ProviderKind {
    /// Single instance per registry, built on first resolution
    #[default]
    Singleton,
    /// New instance per resolution, never cached
    Factory,
}

impl ProviderKind {
    /// Lower-case name, as used in configuration and diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Singleton => "singleton",
            ProviderKind::Factory => "factory",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
