//! Modular registration: dependency modules and annotation scanning.
//!
//! Two ways of filling a registry without listing every constructor at the
//! call site:
//!
//! - a [`DependencyModule`] registers a related group of constructors itself;
//! - [`Registry::scan`] walks a tree of [`Module`]s and registers every member
//!   marked in an [`Annotations`] table.

use std::collections::HashSet;

use indexmap::IndexSet;
use tracing::debug;

use super::Registry;
use crate::annotations::{Annotations, DependencyOption};
use crate::error::DiResult;
use crate::registration::Constructor;

/// A group of registrations applied together.
///
/// # Example
///
/// ```rust
/// use managed_di::{Constructor, DependencyModule, DiResult, Nominal, ProviderKind, Registry};
///
/// struct Database;
/// struct UserRepo;
///
/// struct StorageModule;
///
/// impl DependencyModule for StorageModule {
///     fn register_dependencies(self, registry: &mut Registry) -> DiResult<()> {
///         registry.register_value(Database)?;
///         registry.register_constructor(
///             Constructor::record(Nominal::of::<UserRepo>())
///                 .field("db", Nominal::of::<Database>())
///                 .build(|_| Ok(UserRepo)),
///             ProviderKind::Factory,
///         )?;
///         Ok(())
///     }
/// }
///
/// # fn main() -> DiResult<()> {
/// let mut registry = Registry::new();
/// registry.add_module(StorageModule)?;
/// assert!(registry.get::<UserRepo>().is_ok());
/// # Ok(())
/// # }
/// ```
pub trait DependencyModule {
    /// Register this module's dependencies with the registry.
    fn register_dependencies(self, registry: &mut Registry) -> DiResult<()>;
}

impl Registry {
    /// Applies a module in place.
    pub fn add_module<M: DependencyModule>(&mut self, module: M) -> DiResult<&mut Self> {
        module.register_dependencies(self)?;
        Ok(self)
    }

    /// Registers every annotated member of `modules` and their submodules.
    ///
    /// Each module is visited once (by qualified name), members whose name
    /// starts with `_` are skipped, and a constructor exported under several
    /// names or modules is registered once, in encounter order.
    pub fn scan<'a, I>(&mut self, annotations: &Annotations, modules: I) -> DiResult<&mut Self>
    where
        I: IntoIterator<Item = &'a Module>,
    {
        for (ctor, option) in gather_definitions(annotations, modules) {
            self.register_constructor(ctor, option)?;
        }
        Ok(self)
    }
}

/// Extension trait for consuming, chainable module registration.
pub trait RegistryExt {
    /// Applies a module and hands the registry back.
    ///
    /// ```rust
    /// use managed_di::{DependencyModule, DiResult, Registry, RegistryExt};
    ///
    /// struct Settings(u16);
    ///
    /// struct SettingsModule;
    /// impl DependencyModule for SettingsModule {
    ///     fn register_dependencies(self, r: &mut Registry) -> DiResult<()> {
    ///         r.register_value(Settings(8080))?;
    ///         Ok(())
    ///     }
    /// }
    ///
    /// # fn main() -> DiResult<()> {
    /// let registry = Registry::new().with_module(SettingsModule)?;
    /// assert_eq!(registry.get::<Settings>()?.0, 8080);
    /// # Ok(())
    /// # }
    /// ```
    fn with_module<M: DependencyModule>(self, module: M) -> DiResult<Self>
    where
        Self: Sized;
}

impl RegistryExt for Registry {
    fn with_module<M: DependencyModule>(mut self, module: M) -> DiResult<Self> {
        module.register_dependencies(&mut self)?;
        Ok(self)
    }
}

/// A named namespace of exported constructors, possibly nested.
#[derive(Debug, Clone, Default)]
pub struct Module {
    name: String,
    members: Vec<(String, Constructor)>,
    submodules: Vec<Module>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), members: Vec::new(), submodules: Vec::new() }
    }

    /// Exports `ctor` under `name`.
    pub fn member(mut self, name: impl Into<String>, ctor: &Constructor) -> Self {
        self.members.push((name.into(), ctor.clone()));
        self
    }

    pub fn submodule(mut self, module: Module) -> Self {
        self.submodules.push(module);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[(String, Constructor)] {
        &self.members
    }

    pub fn submodules(&self) -> &[Module] {
        &self.submodules
    }

    // Depth-first, the module itself before its submodules.
    fn walk<'a>(&'a self, prefix: Option<&str>, out: &mut Vec<(String, &'a Module)>) {
        let qualified = match prefix {
            Some(prefix) => format!("{}.{}", prefix, self.name),
            None => self.name.clone(),
        };
        out.push((qualified.clone(), self));
        for sub in &self.submodules {
            sub.walk(Some(&qualified), out);
        }
    }
}

fn gather_definitions<'a, I>(annotations: &Annotations, modules: I) -> Vec<(Constructor, DependencyOption)>
where
    I: IntoIterator<Item = &'a Module>,
{
    let mut scanned: HashSet<String> = HashSet::new();
    let mut seen: IndexSet<Constructor> = IndexSet::new();
    let mut definitions = Vec::new();

    for root in modules {
        let mut visiting = Vec::new();
        root.walk(None, &mut visiting);

        for (qualified, module) in visiting {
            if !scanned.insert(qualified.clone()) {
                continue;
            }
            debug!(module = %qualified, "scanning module");
            for (name, ctor) in &module.members {
                if name.starts_with('_') {
                    continue;
                }
                let Some(option) = annotations.option_of(ctor) else {
                    continue;
                };
                if seen.insert(ctor.clone()) {
                    definitions.push((ctor.clone(), option));
                }
            }
        }
    }

    definitions
}
