//! Registration descriptors for introspection and diagnostics.

use crate::lifetime::ProviderKind;
use crate::registration::{Constructor, CtorContext};
use crate::typing::TypeDescriptor;

/// Snapshot of one registered constructor.
///
/// # Examples
///
/// ```rust
/// use managed_di::{Constructor, Nominal, ProviderKind, Registry, TypeDescriptor};
///
/// struct Repository;
/// struct UserRepository;
///
/// let repo = Nominal::of::<Repository>();
/// let user = Nominal::class::<UserRepository>().extends(repo.clone()).build();
///
/// let mut registry = Registry::new();
/// registry.register_constructor(
///     Constructor::record(user.clone()).build(|_| Ok(UserRepository)),
///     ProviderKind::Factory,
/// )?;
///
/// let descriptors = registry.descriptors();
/// let d = descriptors.iter().find(|d| d.constructor == "UserRepository").unwrap();
/// assert_eq!(d.kind, ProviderKind::Factory);
/// assert!(d.answers_to(&TypeDescriptor::Plain(repo)));
/// assert!(!d.provider_built);
///
/// registry.get::<UserRepository>()?;
/// assert!(registry.descriptors().iter().any(|d| d.constructor == "UserRepository" && d.provider_built));
/// # Ok::<(), managed_di::DiError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationDescriptor {
    /// Constructor name
    pub constructor: String,
    /// Type the constructor produces
    pub declared_type: TypeDescriptor,
    pub kind: ProviderKind,
    /// Every key the constructor is filed under, declared type first
    pub keys: Vec<TypeDescriptor>,
    /// Whether the provider has been built (always true for values)
    pub provider_built: bool,
}

impl RegistrationDescriptor {
    pub(crate) fn new(ctor: &Constructor, ctx: &CtorContext) -> Self {
        Self {
            constructor: ctor.name().to_string(),
            declared_type: ctx.keys.first().cloned().unwrap_or_else(TypeDescriptor::object),
            kind: ctx.option.kind,
            keys: ctx.keys.clone(),
            provider_built: ctx.provider.get().is_some(),
        }
    }

    /// True when a lookup of `key` can reach this constructor.
    pub fn answers_to(&self, key: &TypeDescriptor) -> bool {
        self.keys.contains(key)
    }

    /// Short type name of the declared type.
    pub fn type_name(&self) -> String {
        self.declared_type.to_string()
    }
}
