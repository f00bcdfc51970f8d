//! Dynamic instance handles produced by providers.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::{DiError, DiResult};

// Type-erased Arc for storage
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// A produced dependency: a shared instance, or the null value.
///
/// Identity is the identity of the underlying `Arc`; cloning a `Value` never
/// clones the instance.
///
/// # Examples
///
/// ```rust
/// use managed_di::Value;
///
/// let value = Value::new(42u32);
/// let same = value.clone();
/// assert!(value.ptr_eq(&same));
/// assert_eq!(*value.downcast::<u32>().unwrap(), 42);
/// assert!(value.downcast::<String>().is_err());
/// assert!(Value::null().is_null());
/// ```
#[derive(Clone)]
pub struct Value(Option<AnyArc>);

impl Value {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Value(Some(Arc::new(value)))
    }

    pub fn from_arc(arc: AnyArc) -> Self {
        Value(Some(arc))
    }

    pub fn null() -> Self {
        Value(None)
    }

    /// Wraps a freshly assembled list of values.
    pub fn list(items: Vec<Value>) -> Self {
        Value::new(items)
    }

    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    pub fn as_any(&self) -> Option<&AnyArc> {
        self.0.as_ref()
    }

    /// Typed shared handle; fails on null or on a different type.
    pub fn downcast<T: Any + Send + Sync>(&self) -> DiResult<Arc<T>> {
        let arc = self
            .0
            .clone()
            .ok_or(DiError::NullValue(std::any::type_name::<T>()))?;
        arc.downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Like [`downcast`](Self::downcast), mapping the null value to `None`.
    pub fn downcast_optional<T: Any + Send + Sync>(&self) -> DiResult<Option<Arc<T>>> {
        if self.is_null() {
            return Ok(None);
        }
        self.downcast::<T>().map(Some)
    }

    pub fn downcast_ref<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.0.as_ref().and_then(|arc| arc.downcast_ref::<T>())
    }

    pub fn is<T: Any + Send + Sync>(&self) -> bool {
        self.downcast_ref::<T>().is_some()
    }

    /// The list produced by a list provider.
    pub fn as_list(&self) -> DiResult<Arc<Vec<Value>>> {
        self.downcast::<Vec<Value>>()
    }

    /// Every element of a produced list, downcast to `T`.
    pub fn many<T: Any + Send + Sync>(&self) -> DiResult<Vec<Arc<T>>> {
        self.as_list()?.iter().map(Value::downcast::<T>).collect()
    }

    /// Same instance (or both null).
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(arc) => write!(f, "Value({:p})", Arc::as_ptr(arc)),
            None => f.write_str("Value(null)"),
        }
    }
}

impl<T: Any + Send + Sync> From<Arc<T>> for Value {
    fn from(arc: Arc<T>) -> Self {
        Value(Some(arc))
    }
}
