//! Type expressions, their canonical descriptors and base chains.
//!
//! [`TypeExpr`] is what callers write: parameter annotations, requested
//! types, declared supertypes. [`normalize`] turns a request into a
//! [`TypeDescriptor`], the structural key the registry files constructors
//! under. [`compute_base_chain`] lists every key a type answers to.

use std::fmt;

use indexmap::IndexSet;

use crate::error::{DiError, DiResult};
use crate::key::Nominal;

/// A type expression as written by a caller.
///
/// # Examples
///
/// ```rust
/// use managed_di::{Nominal, TypeExpr};
///
/// struct Controller;
/// struct Config;
///
/// let controllers = TypeExpr::list_of(Nominal::of::<Controller>());
/// let maybe_config = TypeExpr::optional(Nominal::of::<Config>());
/// let tagged = TypeExpr::annotated(Nominal::of::<Config>(), ["primary"]);
///
/// assert_eq!(controllers.to_string(), "list[Controller]");
/// assert_eq!(maybe_config.to_string(), "Config | None");
/// assert_eq!(tagged.to_string(), "Annotated[Config, primary]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    Nominal(Nominal),
    Generic(Nominal, Vec<TypeExpr>),
    Annotated(Box<TypeExpr>, Vec<String>),
    Union(Vec<TypeExpr>),
    /// The absence-of-value type
    None,
    /// Unbound type parameter; only meaningful inside base declarations
    Param(&'static str),
    /// Unresolved forward reference
    Forward(String),
}

impl TypeExpr {
    pub fn generic<I, A>(origin: Nominal, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<TypeExpr>,
    {
        origin.of_args(args)
    }

    pub fn list_of(element: impl Into<TypeExpr>) -> Self {
        Nominal::list().of_args([element.into()])
    }

    pub fn annotated<I, S>(inner: impl Into<TypeExpr>, metadata: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TypeExpr::Annotated(Box::new(inner.into()), metadata.into_iter().map(Into::into).collect())
    }

    pub fn union<I, A>(alternatives: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<TypeExpr>,
    {
        TypeExpr::Union(alternatives.into_iter().map(Into::into).collect())
    }

    /// `T | None`
    pub fn optional(inner: impl Into<TypeExpr>) -> Self {
        TypeExpr::Union(vec![inner.into(), TypeExpr::None])
    }

    /// True when an unbound type parameter appears anywhere inside.
    pub fn has_params(&self) -> bool {
        match self {
            TypeExpr::Param(_) => true,
            TypeExpr::Generic(_, args) => args.iter().any(TypeExpr::has_params),
            TypeExpr::Annotated(inner, _) => inner.has_params(),
            TypeExpr::Union(alts) => alts.iter().any(TypeExpr::has_params),
            TypeExpr::Nominal(_) | TypeExpr::None | TypeExpr::Forward(_) => false,
        }
    }
}

impl From<Nominal> for TypeExpr {
    fn from(nominal: Nominal) -> Self {
        TypeExpr::Nominal(nominal)
    }
}

impl From<&Nominal> for TypeExpr {
    fn from(nominal: &Nominal) -> Self {
        TypeExpr::Nominal(nominal.clone())
    }
}

impl From<&TypeExpr> for TypeExpr {
    fn from(expr: &TypeExpr) -> Self {
        expr.clone()
    }
}

impl From<TypeDescriptor> for TypeExpr {
    fn from(descriptor: TypeDescriptor) -> Self {
        match descriptor {
            TypeDescriptor::Plain(n) if n.is_none() => TypeExpr::None,
            TypeDescriptor::Plain(n) => TypeExpr::Nominal(n),
            TypeDescriptor::Generic { origin, args } => {
                TypeExpr::Generic(origin, args.into_iter().map(Into::into).collect())
            }
            TypeDescriptor::Annotated { inner, metadata } => {
                TypeExpr::Annotated(Box::new((*inner).into()), metadata)
            }
            TypeDescriptor::Union { alternatives, nullable } => {
                let mut alts: Vec<TypeExpr> = alternatives.into_iter().map(Into::into).collect();
                if nullable {
                    alts.push(TypeExpr::None);
                }
                TypeExpr::Union(alts)
            }
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Nominal(n) => write!(f, "{}", n),
            TypeExpr::Generic(origin, args) => {
                write!(f, "{}[", origin)?;
                write_list(f, args, ", ")?;
                f.write_str("]")
            }
            TypeExpr::Annotated(inner, metadata) => {
                write!(f, "Annotated[{}", inner)?;
                for m in metadata {
                    write!(f, ", {}", m)?;
                }
                f.write_str("]")
            }
            TypeExpr::Union(alts) => write_list(f, alts, " | "),
            TypeExpr::None => f.write_str("None"),
            TypeExpr::Param(name) => f.write_str(name),
            TypeExpr::Forward(name) => write!(f, "'{}'", name),
        }
    }
}

/// Canonical representation of a type expression, used as a registry key.
///
/// Two descriptors are equal iff they denote the same type expression
/// structurally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    Plain(Nominal),
    Generic { origin: Nominal, args: Vec<TypeDescriptor> },
    Annotated { inner: Box<TypeDescriptor>, metadata: Vec<String> },
    Union { alternatives: Vec<TypeDescriptor>, nullable: bool },
}

impl TypeDescriptor {
    pub fn object() -> Self {
        TypeDescriptor::Plain(Nominal::object())
    }

    pub fn none() -> Self {
        TypeDescriptor::Plain(Nominal::none())
    }

    /// Nominal and generic-specialization descriptors are filing keys;
    /// annotated wrappers and unions are not.
    pub fn is_filing_key(&self) -> bool {
        matches!(self, TypeDescriptor::Plain(_) | TypeDescriptor::Generic { .. })
    }

    pub fn is_none(&self) -> bool {
        matches!(self, TypeDescriptor::Plain(n) if n.is_none())
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Plain(n) => write!(f, "{}", n),
            TypeDescriptor::Generic { origin, args } => {
                write!(f, "{}[", origin)?;
                write_list(f, args, ", ")?;
                f.write_str("]")
            }
            TypeDescriptor::Annotated { inner, metadata } => {
                write!(f, "Annotated[{}", inner)?;
                for m in metadata {
                    write!(f, ", {}", m)?;
                }
                f.write_str("]")
            }
            TypeDescriptor::Union { alternatives, nullable } => {
                write_list(f, alternatives, " | ")?;
                if *nullable {
                    f.write_str(" | None")?;
                }
                Ok(())
            }
        }
    }
}

/// Converts a type expression into its canonical descriptor.
///
/// Nested annotations merge their metadata, nested unions flatten, `None`
/// alternatives become the `nullable` marker and duplicate alternatives are
/// dropped. Unbound parameters, forward references and specializations with
/// a wrong argument count are rejected.
pub fn normalize(expr: &TypeExpr) -> DiResult<TypeDescriptor> {
    match expr {
        TypeExpr::Nominal(n) => Ok(TypeDescriptor::Plain(n.clone())),
        TypeExpr::None => Ok(TypeDescriptor::none()),
        TypeExpr::Generic(origin, args) => {
            let arity = origin.params().len();
            if args.is_empty() || (arity > 0 && arity != args.len()) {
                return Err(DiError::UnrecognizableDependencyType(expr.to_string()));
            }
            let args = args.iter().map(normalize).collect::<DiResult<Vec<_>>>()?;
            Ok(TypeDescriptor::Generic { origin: origin.clone(), args })
        }
        TypeExpr::Annotated(inner, metadata) => match normalize(inner)? {
            TypeDescriptor::Annotated { inner, metadata: inner_metadata } => {
                let mut merged = inner_metadata;
                merged.extend(metadata.iter().cloned());
                Ok(TypeDescriptor::Annotated { inner, metadata: merged })
            }
            inner => Ok(TypeDescriptor::Annotated { inner: Box::new(inner), metadata: metadata.clone() }),
        },
        TypeExpr::Union(alts) => {
            let mut alternatives = IndexSet::new();
            let mut nullable = false;
            for alt in alts {
                match normalize(alt)? {
                    TypeDescriptor::Union { alternatives: nested, nullable: nested_nullable } => {
                        nullable |= nested_nullable;
                        alternatives.extend(nested);
                    }
                    d if d.is_none() => nullable = true,
                    d => {
                        alternatives.insert(d);
                    }
                }
            }
            let mut alternatives: Vec<_> = alternatives.into_iter().collect();
            match (alternatives.len(), nullable) {
                (0, _) => Ok(TypeDescriptor::none()),
                (1, false) => Ok(alternatives.remove(0)),
                _ => Ok(TypeDescriptor::Union { alternatives, nullable }),
            }
        }
        TypeExpr::Param(_) | TypeExpr::Forward(_) => {
            Err(DiError::UnrecognizableDependencyType(expr.to_string()))
        }
    }
}

/// Union alternatives (with `None` last when nullable), else the descriptor itself.
pub fn unpack_if_union(descriptor: &TypeDescriptor) -> Vec<TypeDescriptor> {
    match descriptor {
        TypeDescriptor::Union { alternatives, nullable } => {
            let mut unpacked = alternatives.clone();
            if *nullable {
                unpacked.push(TypeDescriptor::none());
            }
            unpacked
        }
        other => vec![other.clone()],
    }
}

// What a declared supertype contributes to the traversal.
enum Lowered {
    Descriptor(TypeDescriptor),
    GenericRoot,
}

// Declared bases may mention the declaring class's own parameters; such a
// specialization is not a usable key, only its origin is.
fn lower_base(base: &TypeExpr) -> DiResult<Lowered> {
    let expr = match base {
        TypeExpr::Nominal(n) | TypeExpr::Generic(n, _) if n.is_generic_root() => {
            return Ok(Lowered::GenericRoot)
        }
        TypeExpr::Generic(origin, _) if base.has_params() => TypeExpr::Nominal(origin.clone()),
        TypeExpr::Annotated(inner, _) if base.has_params() => return lower_base(inner),
        TypeExpr::Union(_) | TypeExpr::None => {
            return Err(DiError::UnrecognizableDependencyType(base.to_string()))
        }
        other => other.clone(),
    };
    normalize(&expr).map(Lowered::Descriptor)
}

/// Ordered, duplicate-free ancestors of `descriptor`, itself first.
///
/// Annotated types continue with their inner type, specializations with
/// their origin and nominal types with their declared supertypes, depth-first
/// in declaration order. The chain ends with `object`, preceded by the
/// generic root when a user-generic class took part.
///
/// ```rust
/// use managed_di::{compute_base_chain, normalize, Nominal, TypeDescriptor};
///
/// struct Controller;
/// struct UserController;
///
/// let controller = Nominal::of::<Controller>();
/// let user = Nominal::class::<UserController>().extends(controller.clone()).build();
///
/// let chain = compute_base_chain(&normalize(&user.clone().into()).unwrap()).unwrap();
/// assert_eq!(
///     chain,
///     vec![
///         TypeDescriptor::Plain(user),
///         TypeDescriptor::Plain(controller),
///         TypeDescriptor::object(),
///     ]
/// );
/// ```
pub fn compute_base_chain(descriptor: &TypeDescriptor) -> DiResult<Vec<TypeDescriptor>> {
    let mut result: IndexSet<TypeDescriptor> = IndexSet::new();
    let mut generic_participated = false;
    let mut stack = vec![descriptor.clone()];

    while let Some(current) = stack.pop() {
        if result.contains(&current) {
            continue;
        }
        match &current {
            TypeDescriptor::Plain(n) if n.is_object() => continue,
            TypeDescriptor::Plain(n) if n.is_generic_root() => {
                generic_participated = true;
                continue;
            }
            TypeDescriptor::Annotated { inner, .. } => stack.push((**inner).clone()),
            TypeDescriptor::Generic { origin, .. } => stack.push(TypeDescriptor::Plain(origin.clone())),
            TypeDescriptor::Plain(n) => {
                if n.is_user_generic() {
                    generic_participated = true;
                }
                // reversed so the first declared base is visited first
                for base in n.bases().iter().rev() {
                    match lower_base(base)? {
                        Lowered::Descriptor(d) => stack.push(d),
                        Lowered::GenericRoot => generic_participated = true,
                    }
                }
            }
            TypeDescriptor::Union { .. } => {}
        }
        result.insert(current);
    }

    if generic_participated {
        result.insert(TypeDescriptor::Plain(Nominal::generic_root()));
    }
    result.insert(TypeDescriptor::object());

    Ok(result.into_iter().collect())
}
