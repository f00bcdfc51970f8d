//! # managed-di
//!
//! A type-keyed dependency registry with lazily built provider graphs.
//!
//! Constructors declare the type they produce and the types they need.
//! Registering a constructor files it under every type in the declared type's
//! base chain, so a dependency can be requested by any supertype or generic
//! specialization it answers to. Providers are built on first resolution and
//! kept, so singletons stay singletons for the registry's lifetime.
//!
//! ## Quick Start
//!
//! ```rust
//! use managed_di::{Constructor, Nominal, Parameter, ProviderKind, Registry};
//! use std::sync::Arc;
//!
//! struct Database {
//!     url: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let mut registry = Registry::new();
//! registry.register_value(Database { url: "postgres://localhost".to_string() })?;
//! registry.register_constructor(
//!     Constructor::class(Nominal::of::<UserService>())
//!         .param(Parameter::positional("db", Nominal::of::<Database>()))
//!         .build(|args| Ok(UserService { db: args.get("db")? })),
//!     ProviderKind::Singleton,
//! )?;
//!
//! let service = registry.get::<UserService>()?;
//! assert_eq!(service.db.url, "postgres://localhost");
//! # Ok::<(), managed_di::DiError>(())
//! ```
//!
//! ## Provider Kinds
//!
//! - **Singleton**: constructed on first use, the same instance afterwards
//! - **Factory**: a fresh instance on every resolution
//!
//! ## Supertypes and Collections
//!
//! ```rust
//! use managed_di::{Constructor, Nominal, ProviderKind, Registry, TypeExpr};
//!
//! struct Plugin;
//! struct Audit;
//! struct Metrics;
//!
//! let plugin = Nominal::of::<Plugin>();
//! let audit = Nominal::class::<Audit>().extends(plugin.clone()).build();
//! let metrics = Nominal::class::<Metrics>().extends(plugin.clone()).build();
//!
//! let mut registry = Registry::new();
//! registry
//!     .register_constructor(Constructor::record(audit).build(|_| Ok(Audit)), ProviderKind::Singleton)?
//!     .register_constructor(Constructor::record(metrics).build(|_| Ok(Metrics)), ProviderKind::Singleton)?;
//!
//! let plugins = registry.get_dependency(TypeExpr::list_of(plugin))?;
//! assert_eq!(plugins.as_list()?.len(), 2);
//! # Ok::<(), managed_di::DiError>(())
//! ```
//!
//! ## Optional Dependencies
//!
//! ```rust
//! use managed_di::{Nominal, Registry, TypeExpr};
//!
//! struct Cache;
//!
//! let registry = Registry::new();
//! let cache = registry.get_dependency(TypeExpr::optional(Nominal::of::<Cache>()))?;
//! assert!(cache.is_null());
//! # Ok::<(), managed_di::DiError>(())
//! ```
//!
//! ## Scanning
//!
//! Constructors marked in an [`Annotations`] table are registered by walking
//! a [`Module`] tree with [`Registry::scan`].
//!
//! ## Features
//!
//! - `config`: serde support for [`RegistryConfig`] and JSON loading
//! - `diagnostics`: `Registry::to_debug_string`, a dump of the key table

pub mod annotations;
pub mod config;
pub mod descriptors;
pub mod error;
pub mod key;
pub mod lifetime;
pub mod provider;
pub mod registration;
pub mod registry;
pub mod typing;
pub mod value;

mod internal;

pub use annotations::{Annotations, DependencyOption};
pub use config::RegistryConfig;
pub use descriptors::RegistrationDescriptor;
pub use error::{DiError, DiResult};
pub use key::{Nominal, NominalBuilder, NominalKind};
pub use lifetime::ProviderKind;
pub use provider::{
    Arguments, FactoryProvider, ListProvider, ObjectProvider, Provider, ProviderRef, SingletonProvider,
};
pub use registration::{Constructor, Field, Parameter, ParameterKind, RecordBuilder, SignatureBuilder};
pub use registry::{DependencyModule, Module, Registry, RegistryExt};
pub use typing::{compute_base_chain, normalize, unpack_if_union, TypeDescriptor, TypeExpr};
pub use value::{AnyArc, Value};
