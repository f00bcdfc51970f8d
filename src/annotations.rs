//! Side-table of constructors marked for management.
//!
//! Marking a constructor never touches the constructor itself: the mark is
//! an entry in an [`Annotations`] table, keyed by constructor identity, that
//! the scanner consults.

use indexmap::IndexMap;

use crate::lifetime::ProviderKind;
use crate::registration::Constructor;

/// How a managed constructor should be provided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DependencyOption {
    pub kind: ProviderKind,
}

impl DependencyOption {
    pub fn new(kind: ProviderKind) -> Self {
        Self { kind }
    }

    pub fn singleton() -> Self {
        Self::new(ProviderKind::Singleton)
    }

    pub fn factory() -> Self {
        Self::new(ProviderKind::Factory)
    }
}

impl From<ProviderKind> for DependencyOption {
    fn from(kind: ProviderKind) -> Self {
        Self::new(kind)
    }
}

/// Constructor identity → declared provider kind.
///
/// # Examples
///
/// ```rust
/// use managed_di::{Annotations, Constructor, DependencyOption, Nominal, ProviderKind};
///
/// struct Service;
///
/// let ctor = Constructor::record(Nominal::of::<Service>()).build(|_| Ok(Service));
/// let mut annotations = Annotations::new();
/// annotations.managed_as(&ctor, ProviderKind::Factory);
///
/// assert_eq!(annotations.option_of(&ctor), Some(DependencyOption::factory()));
/// ```
#[derive(Debug, Default)]
pub struct Annotations {
    options: IndexMap<Constructor, DependencyOption>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `ctor` as a singleton.
    pub fn managed(&mut self, ctor: &Constructor) -> &mut Self {
        self.managed_as(ctor, ProviderKind::Singleton)
    }

    /// Marks `ctor` with an explicit provider kind. A later mark replaces an earlier one.
    pub fn managed_as(&mut self, ctor: &Constructor, kind: ProviderKind) -> &mut Self {
        self.options.insert(ctor.clone(), DependencyOption::new(kind));
        self
    }

    pub fn option_of(&self, ctor: &Constructor) -> Option<DependencyOption> {
        self.options.get(ctor).copied()
    }

    pub fn is_managed(&self, ctor: &Constructor) -> bool {
        self.options.contains_key(ctor)
    }

    /// Marked constructors in marking order.
    pub fn iter(&self) -> impl Iterator<Item = (&Constructor, DependencyOption)> {
        self.options.iter().map(|(c, o)| (c, *o))
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}
