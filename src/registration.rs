//! Constructor definitions and per-constructor registration context.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use once_cell::unsync::OnceCell;

use crate::annotations::DependencyOption;
use crate::error::{DiError, DiResult};
use crate::key::{Nominal, NominalKind};
use crate::provider::{Arguments, ProviderRef};
use crate::typing::{normalize, TypeDescriptor, TypeExpr};
use crate::value::Value;

type ConstructFn = dyn Fn(&Arguments) -> DiResult<Value> + Send + Sync;

/// How a parameter is passed to its constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    PositionalOnly,
    PositionalOrKeyword,
    KeywordOnly,
    /// `*args`; never injectable
    VarPositional,
    /// `**kwargs`; never injectable
    VarKeyword,
}

/// One declared parameter of a class or function constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: &'static str,
    pub kind: ParameterKind,
    pub annotation: Option<TypeExpr>,
}

impl Parameter {
    pub fn new(name: &'static str, kind: ParameterKind, annotation: Option<TypeExpr>) -> Self {
        Self { name, kind, annotation }
    }

    /// Positional-or-keyword parameter, the common case.
    pub fn positional(name: &'static str, ty: impl Into<TypeExpr>) -> Self {
        Self::new(name, ParameterKind::PositionalOrKeyword, Some(ty.into()))
    }

    pub fn positional_only(name: &'static str, ty: impl Into<TypeExpr>) -> Self {
        Self::new(name, ParameterKind::PositionalOnly, Some(ty.into()))
    }

    pub fn keyword(name: &'static str, ty: impl Into<TypeExpr>) -> Self {
        Self::new(name, ParameterKind::KeywordOnly, Some(ty.into()))
    }

    pub fn unannotated(name: &'static str) -> Self {
        Self::new(name, ParameterKind::PositionalOrKeyword, None)
    }
}

/// One field of a record constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub ty: TypeExpr,
    pub has_default: bool,
    pub init: bool,
}

impl Field {
    /// Only fields that take part in construction and have no default are injected.
    pub fn is_injected(&self) -> bool {
        self.init && !self.has_default
    }
}

#[derive(Debug)]
pub(crate) enum Shape {
    /// Value-object style class: fields bound by keyword
    Record { ty: Nominal, fields: Vec<Field> },
    /// Class with an explicit parameter list
    Class { ty: Nominal, params: Vec<Parameter> },
    /// Factory function; declared type is its return annotation
    Function { returns: Option<TypeExpr>, params: Vec<Parameter> },
    /// Pre-built instance
    Object { ty: Nominal, value: Value },
}

struct ConstructorInner {
    name: String,
    shape: Shape,
    construct: Box<ConstructFn>,
}

/// A constructor: a class or function whose invocation produces a dependency.
///
/// Constructors are compared by identity. Cloning one yields the same
/// constructor, so it can be registered and annotated by handle.
///
/// # Examples
///
/// ```rust
/// use managed_di::{Constructor, Nominal, Parameter, TypeExpr};
///
/// struct Database;
/// struct Pool { size: usize }
///
/// let record = Constructor::record(Nominal::of::<Database>()).build(|_| Ok(Database));
///
/// let function = Constructor::function("make_pool")
///     .returns(Nominal::of::<Pool>())
///     .param(Parameter::positional("db", Nominal::of::<Database>()))
///     .build(|_| Ok(Pool { size: 4 }));
///
/// assert_eq!(function.name(), "make_pool");
/// assert_eq!(record, record.clone());
/// assert_ne!(record, function);
/// ```
#[derive(Clone)]
pub struct Constructor(Arc<ConstructorInner>);

impl Constructor {
    /// Value-object style class; list injectable fields with [`RecordBuilder::field`].
    pub fn record(ty: Nominal) -> RecordBuilder {
        RecordBuilder { name: ty.short_name().to_string(), ty, fields: Vec::new() }
    }

    /// Class with an explicit constructor parameter list.
    pub fn class(ty: Nominal) -> SignatureBuilder {
        SignatureBuilder {
            name: ty.short_name().to_string(),
            target: Target::Class(ty),
            params: Vec::new(),
        }
    }

    /// Factory function; its declared type comes from [`SignatureBuilder::returns`].
    pub fn function(name: impl Into<String>) -> SignatureBuilder {
        SignatureBuilder { name: name.into(), target: Target::Function(None), params: Vec::new() }
    }

    pub(crate) fn object(ty: Nominal, value: Value) -> Self {
        let produced = value.clone();
        Constructor(Arc::new(ConstructorInner {
            name: format!("<{} instance>", ty.short_name()),
            shape: Shape::Object { ty, value },
            construct: Box::new(move |_| Ok(produced.clone())),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub(crate) fn shape(&self) -> &Shape {
        &self.0.shape
    }

    /// Runs the constructor body.
    pub fn construct(&self, args: &Arguments) -> DiResult<Value> {
        (self.0.construct)(args)
    }

    /// The type this constructor produces: the class itself, or a function's
    /// return annotation.
    pub fn declared_type(&self) -> DiResult<TypeDescriptor> {
        match &self.0.shape {
            Shape::Record { ty, .. } | Shape::Class { ty, .. } | Shape::Object { ty, .. } => {
                Ok(TypeDescriptor::Plain(ty.clone()))
            }
            Shape::Function { returns, .. } => {
                let returns = returns
                    .as_ref()
                    .ok_or_else(|| DiError::ReturnTypeNotAnnotated(self.name().to_string()))?;
                let descriptor = normalize(returns)
                    .map_err(|_| DiError::ReturnTypeIsNonType(self.name().to_string()))?;
                match descriptor {
                    d if d.is_none() => Err(DiError::ReturnTypeIsNone(self.name().to_string())),
                    TypeDescriptor::Union { .. } => {
                        Err(DiError::ReturnTypeIsUnion(self.name().to_string()))
                    }
                    TypeDescriptor::Annotated { .. } => {
                        Err(DiError::ReturnTypeIsNonType(self.name().to_string()))
                    }
                    // Container and `type[...]` requests never reach a key lookup
                    TypeDescriptor::Generic { ref origin, .. }
                        if !matches!(origin.kind(), NominalKind::Class) =>
                    {
                        Err(DiError::ReturnTypeIsNonType(self.name().to_string()))
                    }
                    d => Ok(d),
                }
            }
        }
    }
}

impl PartialEq for Constructor {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Constructor {}

impl Hash for Constructor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("name", &self.0.name)
            .field("shape", &self.0.shape)
            .finish()
    }
}

impl fmt::Display for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

fn boxed<T, F>(f: F) -> Box<ConstructFn>
where
    T: Any + Send + Sync,
    F: Fn(&Arguments) -> DiResult<T> + Send + Sync + 'static,
{
    Box::new(move |args| f(args).map(Value::new))
}

/// Builder for record constructors.
pub struct RecordBuilder {
    name: String,
    ty: Nominal,
    fields: Vec<Field>,
}

impl RecordBuilder {
    /// Injected field.
    pub fn field(mut self, name: &'static str, ty: impl Into<TypeExpr>) -> Self {
        self.fields.push(Field { name, ty: ty.into(), has_default: false, init: true });
        self
    }

    /// Field with a default value; never injected.
    pub fn field_with_default(mut self, name: &'static str, ty: impl Into<TypeExpr>) -> Self {
        self.fields.push(Field { name, ty: ty.into(), has_default: true, init: true });
        self
    }

    /// Field excluded from construction; never injected.
    pub fn field_no_init(mut self, name: &'static str, ty: impl Into<TypeExpr>) -> Self {
        self.fields.push(Field { name, ty: ty.into(), has_default: false, init: false });
        self
    }

    pub fn build<T, F>(self, f: F) -> Constructor
    where
        T: Any + Send + Sync,
        F: Fn(&Arguments) -> DiResult<T> + Send + Sync + 'static,
    {
        Constructor(Arc::new(ConstructorInner {
            name: self.name,
            shape: Shape::Record { ty: self.ty, fields: self.fields },
            construct: boxed(f),
        }))
    }
}

enum Target {
    Class(Nominal),
    Function(Option<TypeExpr>),
}

/// Builder for class and function constructors.
pub struct SignatureBuilder {
    name: String,
    target: Target,
    params: Vec<Parameter>,
}

impl SignatureBuilder {
    pub fn param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }

    /// Return annotation of a function constructor. Ignored for classes.
    pub fn returns(mut self, ty: impl Into<TypeExpr>) -> Self {
        if let Target::Function(returns) = &mut self.target {
            *returns = Some(ty.into());
        }
        self
    }

    pub fn build<T, F>(self, f: F) -> Constructor
    where
        T: Any + Send + Sync,
        F: Fn(&Arguments) -> DiResult<T> + Send + Sync + 'static,
    {
        self.finish(boxed(f))
    }

    /// Like [`build`](Self::build) for bodies that already produce a [`Value`],
    /// e.g. functions returning a shared instance or the null value.
    pub fn build_value<F>(self, f: F) -> Constructor
    where
        F: Fn(&Arguments) -> DiResult<Value> + Send + Sync + 'static,
    {
        self.finish(Box::new(f))
    }

    fn finish(self, construct: Box<ConstructFn>) -> Constructor {
        let shape = match self.target {
            Target::Class(ty) => Shape::Class { ty, params: self.params },
            Target::Function(returns) => Shape::Function { returns, params: self.params },
        };
        Constructor(Arc::new(ConstructorInner { name: self.name, shape, construct }))
    }
}

/// Registry-side context of one constructor: its option and lazily built provider.
pub(crate) struct CtorContext {
    pub(crate) option: DependencyOption,
    pub(crate) keys: Vec<TypeDescriptor>,
    pub(crate) provider: OnceCell<ProviderRef>,
}

impl CtorContext {
    pub(crate) fn new(option: DependencyOption, keys: Vec<TypeDescriptor>) -> Self {
        Self { option, keys, provider: OnceCell::new() }
    }

    pub(crate) fn with_provider(
        option: DependencyOption,
        keys: Vec<TypeDescriptor>,
        provider: ProviderRef,
    ) -> Self {
        Self { option, keys, provider: OnceCell::with_value(provider) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Service;

    fn function_returning(returns: Option<TypeExpr>) -> Constructor {
        let builder = Constructor::function("make");
        let builder = match returns {
            Some(ty) => builder.returns(ty),
            None => builder,
        };
        builder.build(|_| Ok(Service))
    }

    #[test]
    fn function_return_checks() {
        let service = Nominal::of::<Service>();

        assert_eq!(
            function_returning(None).declared_type(),
            Err(DiError::ReturnTypeNotAnnotated("make".to_string()))
        );
        assert_eq!(
            function_returning(Some(TypeExpr::None)).declared_type(),
            Err(DiError::ReturnTypeIsNone("make".to_string()))
        );
        assert_eq!(
            function_returning(Some(TypeExpr::optional(service.clone()))).declared_type(),
            Err(DiError::ReturnTypeIsUnion("make".to_string()))
        );
        assert_eq!(
            function_returning(Some(TypeExpr::Forward("Service".into()))).declared_type(),
            Err(DiError::ReturnTypeIsNonType("make".to_string()))
        );
        assert_eq!(
            function_returning(Some(TypeExpr::annotated(service.clone(), ["x"]))).declared_type(),
            Err(DiError::ReturnTypeIsNonType("make".to_string()))
        );
        assert_eq!(
            function_returning(Some(service.clone().into())).declared_type(),
            Ok(TypeDescriptor::Plain(service))
        );
    }

    #[test]
    fn container_returns_are_rejected() {
        let service = Nominal::of::<Service>();

        for returns in [
            TypeExpr::list_of(service.clone()),
            Nominal::set().of_args([service.clone()]),
            Nominal::dict().of_args([Nominal::of::<String>(), service.clone()]),
            Nominal::type_of().of_args([service.clone()]),
        ] {
            assert_eq!(
                function_returning(Some(returns)).declared_type(),
                Err(DiError::ReturnTypeIsNonType("make".to_string()))
            );
        }

        // Bare containers and user generics are ordinary declared types
        let generic = Nominal::class::<Service>().param("T").build();
        let specialized = generic.of_args([Nominal::of::<u8>()]);
        assert!(function_returning(Some(specialized)).declared_type().is_ok());
        assert!(function_returning(Some(Nominal::list().into())).declared_type().is_ok());
    }

    #[test]
    fn injected_fields_skip_defaults_and_no_init() {
        let ctor = Constructor::record(Nominal::of::<Service>())
            .field("a", Nominal::of::<u8>())
            .field_with_default("b", Nominal::of::<u16>())
            .field_no_init("c", Nominal::of::<u32>())
            .build(|_| Ok(Service));
        match ctor.shape() {
            Shape::Record { fields, .. } => {
                let injected: Vec<_> = fields.iter().filter(|f| f.is_injected()).map(|f| f.name).collect();
                assert_eq!(injected, vec!["a"]);
            }
            _ => panic!("expected record"),
        }
    }
}
