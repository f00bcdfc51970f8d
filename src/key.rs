//! Nominal type declarations used as registry keys.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::typing::TypeExpr;

/// What a nominal type means to the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NominalKind {
    /// Ordinary class; specializations are plain lookup keys
    Class,
    /// Sequence-like container; `Seq<T>` requests every `T`
    Sequence,
    /// Mapping-like container; cannot be injected
    Mapping,
    /// Built-in generic that is neither a class nor a collection (`type[T]`)
    Special,
}

struct NominalDef {
    id: TypeId,
    name: &'static str,
    kind: NominalKind,
    params: Vec<&'static str>,
    bases: Vec<TypeExpr>,
}

/// A nominal type: the class object of the host type system.
///
/// A `Nominal` pairs a Rust `TypeId` with the declarations the resolver needs
/// and Rust cannot reflect on: declared supertypes, declared type parameters
/// and the container kind. Equality and hashing use the `TypeId` only, so a
/// bare `Nominal::of::<T>()` is the same key as a fully declared one.
///
/// # Examples
///
/// ```rust
/// use managed_di::{Nominal, TypeExpr};
///
/// struct Repo;
/// struct PgRepo;
/// struct Service;
///
/// let repo = Nominal::of::<Repo>();
/// let pg_repo = Nominal::class::<PgRepo>().extends(repo.clone()).build();
/// let service = Nominal::class::<Service>().param("R").build();
///
/// assert_eq!(pg_repo, Nominal::of::<PgRepo>());
/// assert_eq!(pg_repo.bases(), &[TypeExpr::from(repo)]);
/// assert!(service.is_user_generic());
/// ```
#[derive(Clone)]
pub struct Nominal(Arc<NominalDef>);

// Marker types backing the built-in nominals.
struct ObjectMarker;
struct GenericMarker;
struct NoneMarker;
struct ListMarker;
struct SetMarker;
struct FrozenSetMarker;
struct TupleMarker;
struct DictMarker;
struct TypeMarker;

impl Nominal {
    /// Plain class without declared supertypes or parameters.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::class::<T>().build()
    }

    /// Starts a full declaration for `T`.
    pub fn class<T: ?Sized + 'static>() -> NominalBuilder {
        NominalBuilder {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            kind: NominalKind::Class,
            params: Vec::new(),
            bases: Vec::new(),
        }
    }

    fn builtin<T: 'static>(name: &'static str, kind: NominalKind, params: &[&'static str]) -> Self {
        Nominal(Arc::new(NominalDef {
            id: TypeId::of::<T>(),
            name,
            kind,
            params: params.to_vec(),
            bases: Vec::new(),
        }))
    }

    /// The universal base type every chain terminates at.
    pub fn object() -> Self {
        Self::builtin::<ObjectMarker>("object", NominalKind::Class, &[])
    }

    /// The generic-root marker placed before `object` in generic chains.
    pub fn generic_root() -> Self {
        Self::builtin::<GenericMarker>("Generic", NominalKind::Class, &[])
    }

    /// The absence-of-value type.
    pub fn none() -> Self {
        Self::builtin::<NoneMarker>("None", NominalKind::Class, &[])
    }

    pub fn list() -> Self {
        Self::builtin::<ListMarker>("list", NominalKind::Sequence, &["T"])
    }

    pub fn set() -> Self {
        Self::builtin::<SetMarker>("set", NominalKind::Sequence, &["T"])
    }

    pub fn frozenset() -> Self {
        Self::builtin::<FrozenSetMarker>("frozenset", NominalKind::Sequence, &["T"])
    }

    /// Variadic tuple; accepts any argument count.
    pub fn tuple() -> Self {
        Self::builtin::<TupleMarker>("tuple", NominalKind::Sequence, &[])
    }

    pub fn dict() -> Self {
        Self::builtin::<DictMarker>("dict", NominalKind::Mapping, &["K", "V"])
    }

    /// `type[T]`, the class-of-T special form.
    pub fn type_of() -> Self {
        Self::builtin::<TypeMarker>("type", NominalKind::Special, &["T"])
    }

    pub fn id(&self) -> TypeId {
        self.0.id
    }

    /// Full Rust type name (or built-in name).
    pub fn type_name(&self) -> &'static str {
        self.0.name
    }

    /// Name without the module path, for display.
    pub fn short_name(&self) -> &'static str {
        let name = self.0.name;
        if name.contains('<') {
            return name;
        }
        name.rsplit("::").next().unwrap_or(name)
    }

    pub fn kind(&self) -> NominalKind {
        self.0.kind
    }

    pub fn params(&self) -> &[&'static str] {
        &self.0.params
    }

    /// Declared supertypes, in declaration order.
    pub fn bases(&self) -> &[TypeExpr] {
        &self.0.bases
    }

    /// A class that declares type parameters (and so extends the generic root).
    pub fn is_user_generic(&self) -> bool {
        self.0.kind == NominalKind::Class && !self.0.params.is_empty()
    }

    pub fn is_object(&self) -> bool {
        self.0.id == TypeId::of::<ObjectMarker>()
    }

    pub fn is_generic_root(&self) -> bool {
        self.0.id == TypeId::of::<GenericMarker>()
    }

    pub fn is_none(&self) -> bool {
        self.0.id == TypeId::of::<NoneMarker>()
    }

    /// Specializes this nominal with the given type arguments.
    pub fn of_args<I, A>(&self, args: I) -> TypeExpr
    where
        I: IntoIterator<Item = A>,
        A: Into<TypeExpr>,
    {
        TypeExpr::Generic(self.clone(), args.into_iter().map(Into::into).collect())
    }
}

impl PartialEq for Nominal {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Nominal {}

impl Hash for Nominal {
    #[inline(always)]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Debug for Nominal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nominal({})", self.short_name())
    }
}

impl fmt::Display for Nominal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Builder for a [`Nominal`] declaration.
pub struct NominalBuilder {
    id: TypeId,
    name: &'static str,
    kind: NominalKind,
    params: Vec<&'static str>,
    bases: Vec<TypeExpr>,
}

impl NominalBuilder {
    /// Adds a declared supertype. Order of calls is declaration order.
    pub fn extends(mut self, base: impl Into<TypeExpr>) -> Self {
        self.bases.push(base.into());
        self
    }

    /// Declares a type parameter.
    pub fn param(mut self, name: &'static str) -> Self {
        self.params.push(name);
        self
    }

    /// Overrides the display name.
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Marks the type as a sequence-like container.
    pub fn sequence(mut self) -> Self {
        self.kind = NominalKind::Sequence;
        self
    }

    /// Marks the type as a mapping-like container.
    pub fn mapping(mut self) -> Self {
        self.kind = NominalKind::Mapping;
        self
    }

    pub fn build(self) -> Nominal {
        Nominal(Arc::new(NominalDef {
            id: self.id,
            name: self.name,
            kind: self.kind,
            params: self.params,
            bases: self.bases,
        }))
    }
}
