//! Error types for the dependency injection registry.

use thiserror::Error;

/// Dependency injection errors
///
/// Every failure raised by registration, resolution or construction is a
/// variant of this one enum. Type descriptors and constructors are carried
/// in their display form so errors stay cheap to clone.
///
/// # Examples
///
/// ```rust
/// use managed_di::{DiError, Nominal, Registry};
///
/// struct Unregistered;
///
/// let registry = Registry::new();
/// match registry.get_dependency(Nominal::of::<Unregistered>()) {
///     Err(DiError::DependencyNotFound(ty)) => assert_eq!(ty, "Unregistered"),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiError {
    // ----- Resolution -----
    /// No constructor matches the requested type
    #[error("Dependency not found for {0}")]
    DependencyNotFound(String),
    /// Several constructors match where exactly one is required
    #[error("No unique dependency for type {ty} ({count} candidates)")]
    NoUniqueDependency { ty: String, count: usize },
    /// Type expression outside the supported grammar
    #[error("Unrecognizable dependency type {0}")]
    UnrecognizableDependencyType(String),
    /// Mapping-like (or multi-argument) container requested
    #[error("Unsupported container type {0}")]
    UnsupportedContainerType(String),
    /// Special generic that is neither a collection nor a user class
    #[error("Unsupported generic type {0}")]
    UnsupportedGenericType(String),
    /// Circular dependency detected (includes path)
    #[error("Circular dependency: {}", .0.join(" -> "))]
    Circular(Vec<String>),
    /// Maximum provider construction depth exceeded
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),

    // ----- Registration -----
    #[error("Constructor `{0}` has already registered")]
    ConstructorExists(String),
    #[error("Parameter `{param}` of function `{ctor}` is not annotated")]
    ParameterNotAnnotated { ctor: String, param: String },
    #[error("VAR_POSITIONAL parameter `{param}` of function `{ctor}` is not supported")]
    VarPositionalParameterNotSupported { ctor: String, param: String },
    #[error("VAR_KEYWORD parameter `{param}` of function `{ctor}` is not supported")]
    VarKeywordParameterNotSupported { ctor: String, param: String },
    #[error("Return of function `{0}` is not annotated")]
    ReturnTypeNotAnnotated(String),
    #[error("Return of function `{0}` cannot be None")]
    ReturnTypeIsNone(String),
    #[error("Return of function `{0}` cannot be a union")]
    ReturnTypeIsUnion(String),
    #[error("Return of function `{0}` must be type")]
    ReturnTypeIsNonType(String),

    // ----- Construction -----
    /// Value downcast failed
    #[error("Type mismatch for: {0}")]
    TypeMismatch(&'static str),
    /// Constructor body asked for an argument that was not bound
    #[error("Argument `{name}` missing for constructor `{ctor}`")]
    MissingArgument { ctor: String, name: String },
    /// Null value where an instance of the type was expected
    #[error("Null value where {0} was expected")]
    NullValue(&'static str),

    // ----- Configuration -----
    #[error("Invalid registry configuration: {0}")]
    Config(String),
}

impl DiError {
    /// True for the plain "nothing matched" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DiError::DependencyNotFound(_))
    }

    /// True for errors raised while filing or inspecting a constructor's shape.
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            DiError::ConstructorExists(_)
                | DiError::ParameterNotAnnotated { .. }
                | DiError::VarPositionalParameterNotSupported { .. }
                | DiError::VarKeywordParameterNotSupported { .. }
                | DiError::ReturnTypeNotAnnotated(_)
                | DiError::ReturnTypeIsNone(_)
                | DiError::ReturnTypeIsUnion(_)
                | DiError::ReturnTypeIsNonType(_)
        )
    }
}

/// Result type for DI operations
///
/// A convenience alias for `Result<T, DiError>` used throughout the crate.
///
/// ```rust
/// use managed_di::{DiError, DiResult};
///
/// fn failing_operation() -> DiResult<()> {
///     Err(DiError::DependencyNotFound("Service".to_string()))
/// }
///
/// assert!(failing_operation().unwrap_err().is_not_found());
/// ```
pub type DiResult<T> = Result<T, DiError>;
