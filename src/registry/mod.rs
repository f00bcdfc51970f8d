//! The dependency registry.
//!
//! This module contains the [`Registry`] type: registration of constructors
//! and values, and the public lookup operations. The resolution algorithm
//! itself lives in `resolve`.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::annotations::DependencyOption;
use crate::config::RegistryConfig;
use crate::descriptors::RegistrationDescriptor;
use crate::error::{DiError, DiResult};
use crate::internal::ResolutionStack;
use crate::key::Nominal;
use crate::provider::{ListProvider, ObjectProvider};
use crate::registration::{Constructor, CtorContext};
use crate::typing::{compute_base_chain, normalize, unpack_if_union, TypeDescriptor, TypeExpr};
use crate::value::Value;

pub mod module_system;
mod resolve;

pub use module_system::*;

/// Maps type descriptors to the constructors that can satisfy them.
///
/// A constructor is filed under every nominal and specialization key of its
/// declared type's base chain, but owns exactly one context and therefore
/// one provider, built on first resolution and kept for the registry's
/// lifetime.
///
/// The registry is single-threaded: it is neither `Send` nor `Sync`.
///
/// # Examples
///
/// ```
/// use managed_di::{Constructor, Nominal, ProviderKind, Registry, TypeExpr};
///
/// struct Controller;
/// struct UserController;
/// struct OrgController;
///
/// let controller = Nominal::of::<Controller>();
/// let user = Nominal::class::<UserController>().extends(controller.clone()).build();
/// let org = Nominal::class::<OrgController>().extends(controller.clone()).build();
///
/// let mut registry = Registry::new();
/// registry
///     .register_constructor(Constructor::record(user).build(|_| Ok(UserController)), ProviderKind::Singleton)?
///     .register_constructor(Constructor::record(org).build(|_| Ok(OrgController)), ProviderKind::Singleton)?;
///
/// // two candidates: singular lookup is ambiguous, plural lookup returns both
/// assert!(registry.get_dependency(controller.clone()).is_err());
/// assert_eq!(registry.get_dependencies(controller.clone())?.len(), 2);
///
/// // `list[Controller]` injects every controller
/// let all = registry.get_dependency(TypeExpr::list_of(controller))?;
/// assert_eq!(all.as_list()?.len(), 2);
/// # Ok::<(), managed_di::DiError>(())
/// ```
pub struct Registry {
    config: RegistryConfig,
    // Kept apart so that one constructor filed under many keys shares one
    // provider, and because providers cannot be built before their own
    // dependencies are registered.
    proto_to_ctor_set: HashMap<TypeDescriptor, IndexSet<Constructor>>,
    ctor_to_ctx: IndexMap<Constructor, CtorContext>,
    resolving: ResolutionStack,
}

impl Registry {
    /// Creates a registry with default configuration.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        let mut registry = Self {
            config,
            proto_to_ctor_set: HashMap::new(),
            ctor_to_ctx: IndexMap::new(),
            resolving: ResolutionStack::default(),
        };
        // `None` resolves to the null value
        let none = Nominal::none();
        let keys = vec![TypeDescriptor::Plain(none.clone()), TypeDescriptor::object()];
        let provider = Rc::new(ObjectProvider::new(Value::null()));
        registry.insert_unchecked(
            Constructor::object(none, Value::null()),
            CtorContext::with_provider(DependencyOption::singleton(), keys, provider),
        );
        registry
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Number of registered constructors and values.
    pub fn len(&self) -> usize {
        self.ctor_to_ctx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ctor_to_ctx.is_empty()
    }

    // ----- Registration -----

    /// Files `ctor` under every key of its declared type's base chain.
    ///
    /// The declared type of a record or class is the class itself; for a
    /// function it is the return annotation, which must be present, must not
    /// be `None` or a union, and must be a concrete type.
    pub fn register_constructor(
        &mut self,
        ctor: Constructor,
        option: impl Into<DependencyOption>,
    ) -> DiResult<&mut Self> {
        let option = option.into();
        let declared = ctor.declared_type()?;
        let chain = compute_base_chain(&declared)?;
        debug!(ctor = %ctor, kind = %option.kind, declared = %declared, "registering constructor");
        self.file(ctor, chain, |keys| CtorContext::new(option, keys))?;
        Ok(self)
    }

    /// Registers an already-built instance under the base chain of `T`.
    pub fn register_value<T: Any + Send + Sync>(&mut self, value: T) -> DiResult<&mut Self> {
        self.register_value_as(Nominal::of::<T>(), Value::new(value))
    }

    /// Registers an instance under the base chain of a declared nominal type.
    pub fn register_value_as(&mut self, ty: Nominal, value: Value) -> DiResult<&mut Self> {
        let chain = compute_base_chain(&TypeDescriptor::Plain(ty.clone()))?;
        let provider = Rc::new(ObjectProvider::new(value.clone()));
        debug!(ty = %ty, "registering value");
        self.file(Constructor::object(ty, value), chain, |keys| {
            CtorContext::with_provider(DependencyOption::singleton(), keys, provider)
        })?;
        Ok(self)
    }

    fn file(
        &mut self,
        ctor: Constructor,
        chain: Vec<TypeDescriptor>,
        make_ctx: impl FnOnce(Vec<TypeDescriptor>) -> CtorContext,
    ) -> DiResult<()> {
        let keys: Vec<TypeDescriptor> = chain.into_iter().filter(TypeDescriptor::is_filing_key).collect();

        // Every key is checked before any is filed, so a rejected
        // registration leaves the registry untouched.
        let taken = keys
            .iter()
            .any(|k| self.proto_to_ctor_set.get(k).is_some_and(|set| set.contains(&ctor)));
        if taken {
            return Err(DiError::ConstructorExists(ctor.to_string()));
        }
        self.insert_unchecked(ctor, make_ctx(keys));
        Ok(())
    }

    fn insert_unchecked(&mut self, ctor: Constructor, ctx: CtorContext) {
        for key in &ctx.keys {
            self.proto_to_ctor_set.entry(key.clone()).or_default().insert(ctor.clone());
        }
        self.ctor_to_ctx.insert(ctor, ctx);
    }

    // ----- Lookup -----

    /// Resolves exactly one dependency of the requested type.
    ///
    /// Union alternatives are tried in order (`None` last); the first one
    /// that resolves wins. A nullable request that matches nothing yields
    /// the null value.
    pub fn get_dependency(&self, ty: impl Into<TypeExpr>) -> DiResult<Value> {
        let descriptor = normalize(&ty.into())?;

        let mut found = None;
        for alternative in unpack_if_union(&descriptor) {
            if let Some(provider) = self.resolve_one(&alternative)? {
                found = Some(provider);
                break;
            }
        }

        let provider = match found {
            Some(provider) => provider,
            None if matches!(descriptor, TypeDescriptor::Union { nullable: true, .. }) => {
                return Ok(Value::null())
            }
            None => return Err(DiError::DependencyNotFound(descriptor.to_string())),
        };

        debug!(ty = %descriptor, provider = ?provider, "found provider");
        let value = provider.produce()?;
        debug!(ty = %descriptor, value = ?value, "resolved dependency");
        Ok(value)
    }

    /// Resolves every dependency of the requested type, in registration order.
    ///
    /// The result is assembled fresh on every call.
    pub fn get_dependencies(&self, ty: impl Into<TypeExpr>) -> DiResult<Vec<Value>> {
        let descriptor = normalize(&ty.into())?;

        let mut found = None;
        for alternative in unpack_if_union(&descriptor) {
            if let Some(providers) = self.resolve_all(&alternative)? {
                found = Some(providers);
                break;
            }
        }

        let providers = found
            .filter(|providers| !providers.is_empty())
            .ok_or_else(|| DiError::DependencyNotFound(descriptor.to_string()))?;

        let provider = ListProvider::new(providers);
        debug!(ty = %descriptor, provider = ?provider, "built a transient list provider");
        provider.produce_vec()
    }

    /// Resolves the plain nominal `T` and downcasts the instance.
    pub fn get<T: Any + Send + Sync>(&self) -> DiResult<Arc<T>> {
        self.get_dependency(Nominal::of::<T>())?.downcast::<T>()
    }

    /// True when at least one constructor is filed under the requested key.
    pub fn contains(&self, ty: impl Into<TypeExpr>) -> bool {
        match normalize(&ty.into()) {
            Ok(descriptor) => unpack_if_union(&descriptor)
                .iter()
                .any(|alt| self.proto_to_ctor_set.contains_key(strip_annotations(alt))),
            Err(_) => false,
        }
    }

    // ----- Introspection -----

    /// One descriptor per registered constructor, in registration order.
    pub fn descriptors(&self) -> Vec<RegistrationDescriptor> {
        self.ctor_to_ctx
            .iter()
            .map(|(ctor, ctx)| RegistrationDescriptor::new(ctor, ctx))
            .collect()
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut keys: Vec<_> = self.proto_to_ctor_set.iter().collect();
        keys.sort_by_key(|(k, _)| k.to_string());

        let mut s = String::new();
        s.push_str("=== Registry Debug ===\n");
        s.push_str("Keys:\n");
        for (key, ctors) in keys {
            let names: Vec<_> = ctors.iter().map(|c| c.name().to_string()).collect();
            s.push_str(&format!("  {}: [{}]\n", key, names.join(", ")));
        }
        s.push_str("Constructors:\n");
        for d in self.descriptors() {
            s.push_str(&format!(
                "  {} ({}, built: {})\n",
                d.constructor, d.kind, d.provider_built
            ));
        }
        s
    }
}

fn strip_annotations(descriptor: &TypeDescriptor) -> &TypeDescriptor {
    match descriptor {
        TypeDescriptor::Annotated { inner, .. } => strip_annotations(inner),
        other => other,
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("keys", &self.proto_to_ctor_set.len())
            .field("constructors", &self.ctor_to_ctx.len())
            .finish()
    }
}
