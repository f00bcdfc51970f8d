//! Arguments handed to constructor bodies.
//!
//! A factory provider resolves every parameter of a constructor into a
//! [`Value`], then calls the constructor body with an [`Arguments`] bag
//! holding those values positionally and by keyword.

use std::any::Any;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{DiError, DiResult};
use crate::value::Value;

/// Concrete argument values for one constructor invocation.
///
/// # Examples
///
/// ```
/// use managed_di::{Constructor, Nominal, Parameter, ProviderKind, Registry};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserRepo { db: Arc<Database> }
///
/// let mut registry = Registry::new();
/// registry.register_value(Database { url: "postgres://localhost".to_string() }).unwrap();
/// registry.register_constructor(
///     Constructor::class(Nominal::of::<UserRepo>())
///         .param(Parameter::positional("db", Nominal::of::<Database>()))
///         .build(|args| Ok(UserRepo { db: args.get::<Database>("db")? })),
///     ProviderKind::Singleton,
/// ).unwrap();
///
/// let repo = registry.get::<UserRepo>().unwrap();
/// assert_eq!(repo.db.url, "postgres://localhost");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    ctor: String,
    positional: Vec<(&'static str, Value)>,
    keyword: IndexMap<&'static str, Value>,
}

impl Arguments {
    pub(crate) fn new(
        ctor: impl Into<String>,
        positional: Vec<(&'static str, Value)>,
        keyword: IndexMap<&'static str, Value>,
    ) -> Self {
        Self { ctor: ctor.into(), positional, keyword }
    }

    /// Number of positional arguments.
    pub fn positional_len(&self) -> usize {
        self.positional.len()
    }

    pub fn keyword_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.keyword.keys().copied()
    }

    /// Raw positional value by index.
    pub fn at(&self, index: usize) -> DiResult<&Value> {
        self.positional
            .get(index)
            .map(|(_, v)| v)
            .ok_or_else(|| self.missing(&format!("#{}", index)))
    }

    /// Raw value by parameter name, positional or keyword.
    pub fn value(&self, name: &str) -> DiResult<&Value> {
        self.keyword
            .get(name)
            .or_else(|| self.positional.iter().find(|(n, _)| *n == name).map(|(_, v)| v))
            .ok_or_else(|| self.missing(name))
    }

    /// Typed argument by parameter name.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> DiResult<Arc<T>> {
        self.value(name)?.downcast::<T>()
    }

    /// Typed argument that may be the null value (an optional parameter).
    pub fn get_optional<T: Any + Send + Sync>(&self, name: &str) -> DiResult<Option<Arc<T>>> {
        self.value(name)?.downcast_optional::<T>()
    }

    /// Typed positional argument.
    pub fn get_at<T: Any + Send + Sync>(&self, index: usize) -> DiResult<Arc<T>> {
        self.at(index)?.downcast::<T>()
    }

    /// List argument (a `list[T]`-style parameter), elements downcast to `T`.
    pub fn get_many<T: Any + Send + Sync>(&self, name: &str) -> DiResult<Vec<Arc<T>>> {
        self.value(name)?.many::<T>()
    }

    /// List argument with elements left dynamic.
    pub fn get_list(&self, name: &str) -> DiResult<Arc<Vec<Value>>> {
        self.value(name)?.as_list()
    }

    fn missing(&self, name: &str) -> DiError {
        DiError::MissingArgument { ctor: self.ctor.clone(), name: name.to_string() }
    }
}
