//! Providers: zero-argument value producers.
//!
//! ```text
//! Provider
//! |- FactoryProvider    new instance per call
//! |- SingletonProvider  factory memoized after the first call
//! |- ObjectProvider     pre-existing value
//! |- ListProvider       fresh list of element results per call
//! ```
//!
//! Providers live behind `Rc` and memoize through `unsync` cells: a provider
//! graph belongs to one thread, like the registry that builds it.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use once_cell::unsync::OnceCell;

use crate::error::DiResult;
use crate::lifetime::ProviderKind;
use crate::registration::Constructor;
use crate::value::Value;

pub mod context;
pub use context::Arguments;

/// Produces a value on demand, possibly memoizing it.
pub trait Provider: fmt::Debug {
    fn produce(&self) -> DiResult<Value>;
}

/// Shared handle to a provider in the graph.
pub type ProviderRef = Rc<dyn Provider>;

/// Calls its constructor with freshly produced arguments on every call.
///
/// # Examples
///
/// ```
/// use managed_di::{Constructor, FactoryProvider, Nominal, Provider};
///
/// struct Foo;
///
/// let provider = FactoryProvider::new(
///     Constructor::record(Nominal::of::<Foo>()).build(|_| Ok(Foo)),
/// );
/// let a = provider.produce().unwrap();
/// let b = provider.produce().unwrap();
/// assert!(a.is::<Foo>());
/// assert!(!a.ptr_eq(&b));
/// ```
pub struct FactoryProvider {
    ctor: Constructor,
    args: Vec<(&'static str, ProviderRef)>,
    kwargs: IndexMap<&'static str, ProviderRef>,
}

impl FactoryProvider {
    pub fn new(ctor: Constructor) -> Self {
        Self::with_args(ctor, Vec::new(), IndexMap::new())
    }

    pub fn with_args(
        ctor: Constructor,
        args: Vec<(&'static str, ProviderRef)>,
        kwargs: IndexMap<&'static str, ProviderRef>,
    ) -> Self {
        Self { ctor, args, kwargs }
    }
}

impl Provider for FactoryProvider {
    fn produce(&self) -> DiResult<Value> {
        // positional arguments are all evaluated before any keyword argument
        let args = self
            .args
            .iter()
            .map(|(name, p)| p.produce().map(|v| (*name, v)))
            .collect::<DiResult<Vec<_>>>()?;
        let kwargs = self
            .kwargs
            .iter()
            .map(|(name, p)| p.produce().map(|v| (*name, v)))
            .collect::<DiResult<IndexMap<_, _>>>()?;

        self.ctor.construct(&Arguments::new(self.ctor.name(), args, kwargs))
    }
}

impl fmt::Debug for FactoryProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FactoryProvider({}, args={}, kwargs={})", self.ctor, self.args.len(), self.kwargs.len())
    }
}

/// Runs its factory once and returns that instance forever after.
///
/// A failed first call is not memoized; the next call retries.
pub struct SingletonProvider {
    factory: FactoryProvider,
    instance: OnceCell<Value>,
}

impl SingletonProvider {
    pub fn new(factory: FactoryProvider) -> Self {
        Self { factory, instance: OnceCell::new() }
    }

    pub fn is_initialized(&self) -> bool {
        self.instance.get().is_some()
    }
}

impl Provider for SingletonProvider {
    fn produce(&self) -> DiResult<Value> {
        self.instance.get_or_try_init(|| self.factory.produce()).cloned()
    }
}

impl fmt::Debug for SingletonProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SingletonProvider(factory={:?}, instance={:?})", self.factory, self.instance.get())
    }
}

/// Wraps a pre-existing value; identity preserving.
#[derive(Debug)]
pub struct ObjectProvider {
    value: Value,
}

impl ObjectProvider {
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

impl Provider for ObjectProvider {
    fn produce(&self) -> DiResult<Value> {
        Ok(self.value.clone())
    }
}

/// Produces a new list of its elements' values on every call.
#[derive(Debug)]
pub struct ListProvider {
    elements: Vec<ProviderRef>,
}

impl ListProvider {
    pub fn new(elements: Vec<ProviderRef>) -> Self {
        Self { elements }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The produced list as an owned vector.
    pub fn produce_vec(&self) -> DiResult<Vec<Value>> {
        self.elements.iter().map(|e| e.produce()).collect()
    }
}

impl Provider for ListProvider {
    fn produce(&self) -> DiResult<Value> {
        Ok(Value::list(self.produce_vec()?))
    }
}

impl ProviderKind {
    /// Builds the provider this kind stands for around `ctor`.
    pub fn build(
        self,
        ctor: Constructor,
        args: Vec<(&'static str, ProviderRef)>,
        kwargs: IndexMap<&'static str, ProviderRef>,
    ) -> ProviderRef {
        let factory = FactoryProvider::with_args(ctor, args, kwargs);
        match self {
            ProviderKind::Singleton => Rc::new(SingletonProvider::new(factory)),
            ProviderKind::Factory => Rc::new(factory),
        }
    }
}
