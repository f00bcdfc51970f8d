//! Resolution: from a normalized type descriptor to providers.

use std::rc::Rc;

use indexmap::IndexMap;
use tracing::trace;

use super::Registry;
use crate::annotations::DependencyOption;
use crate::error::{DiError, DiResult};
use crate::key::NominalKind;
use crate::provider::{ListProvider, ObjectProvider, ProviderRef};
use crate::registration::{Constructor, CtorContext, ParameterKind, Shape};
use crate::typing::{normalize, TypeDescriptor, TypeExpr};
use crate::value::Value;

/// How many providers a lookup must yield.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Demand {
    /// Exactly one constructor must match
    One,
    /// Every matching constructor, in registration order
    All,
}

impl Registry {
    /// Singular resolution; `Ok(None)` when nothing is filed under `ty`.
    pub(crate) fn resolve_one(&self, ty: &TypeDescriptor) -> DiResult<Option<ProviderRef>> {
        Ok(self.providers_for(ty, Demand::One)?.and_then(|mut found| found.pop()))
    }

    /// Plural resolution; `Ok(None)` when nothing is filed under `ty`.
    pub(crate) fn resolve_all(&self, ty: &TypeDescriptor) -> DiResult<Option<Vec<ProviderRef>>> {
        self.providers_for(ty, Demand::All)
    }

    fn providers_for(&self, ty: &TypeDescriptor, demand: Demand) -> DiResult<Option<Vec<ProviderRef>>> {
        match ty {
            TypeDescriptor::Annotated { inner, .. } => self.providers_for(inner, demand),

            TypeDescriptor::Generic { origin, args } => match origin.kind() {
                NominalKind::Sequence => {
                    let [element] = args.as_slice() else {
                        return Err(DiError::UnsupportedContainerType(ty.to_string()));
                    };
                    Ok(self.resolve_all(element)?.map(|elements| {
                        let list: ProviderRef = Rc::new(ListProvider::new(elements));
                        vec![list]
                    }))
                }
                NominalKind::Mapping => Err(DiError::UnsupportedContainerType(ty.to_string())),
                NominalKind::Special => Err(DiError::UnsupportedGenericType(ty.to_string())),
                NominalKind::Class => self.lookup(ty, demand),
            },

            TypeDescriptor::Union { alternatives, nullable } => {
                for alternative in alternatives {
                    if let Some(found) = self.providers_for(alternative, demand)? {
                        return Ok(Some(found));
                    }
                }
                if *nullable {
                    let null: ProviderRef = Rc::new(ObjectProvider::new(Value::null()));
                    return Ok(Some(vec![null]));
                }
                Err(DiError::DependencyNotFound(ty.to_string()))
            }

            TypeDescriptor::Plain(_) => self.lookup(ty, demand),
        }
    }

    fn lookup(&self, key: &TypeDescriptor, demand: Demand) -> DiResult<Option<Vec<ProviderRef>>> {
        let Some(ctors) = self.proto_to_ctor_set.get(key) else {
            trace!(key = %key, "no constructor filed");
            return Ok(None);
        };

        if demand == Demand::One && ctors.len() != 1 {
            return Err(DiError::NoUniqueDependency { ty: key.to_string(), count: ctors.len() });
        }

        let mut providers = Vec::with_capacity(ctors.len());
        for ctor in ctors {
            let Some(ctx) = self.ctor_to_ctx.get(ctor) else {
                continue;
            };
            providers.push(self.provider_of(ctor, ctx)?);
        }
        Ok(Some(providers))
    }

    /// The constructor's provider, built on first request and kept in its context.
    fn provider_of(&self, ctor: &Constructor, ctx: &CtorContext) -> DiResult<ProviderRef> {
        if let Some(provider) = ctx.provider.get() {
            return Ok(provider.clone());
        }

        let _guard = self.resolving.enter(ctor, self.config.detect_cycles, self.config.max_depth)?;
        trace!(ctor = %ctor, depth = self.resolving.depth(), "building provider");

        let provider = self.make_provider(ctor, ctx.option)?;
        Ok(ctx.provider.get_or_init(|| provider).clone())
    }

    fn make_provider(&self, ctor: &Constructor, option: DependencyOption) -> DiResult<ProviderRef> {
        let mut args = Vec::new();
        let mut kwargs = IndexMap::new();

        match ctor.shape() {
            Shape::Record { fields, .. } => {
                for field in fields.iter().filter(|f| f.is_injected()) {
                    kwargs.insert(field.name, self.require(&field.ty)?);
                }
            }
            Shape::Class { params, .. } | Shape::Function { params, .. } => {
                for param in params {
                    let annotation = param.annotation.as_ref().ok_or_else(|| DiError::ParameterNotAnnotated {
                        ctor: ctor.name().to_string(),
                        param: param.name.to_string(),
                    })?;
                    match param.kind {
                        ParameterKind::VarPositional => {
                            return Err(DiError::VarPositionalParameterNotSupported {
                                ctor: ctor.name().to_string(),
                                param: param.name.to_string(),
                            })
                        }
                        ParameterKind::VarKeyword => {
                            return Err(DiError::VarKeywordParameterNotSupported {
                                ctor: ctor.name().to_string(),
                                param: param.name.to_string(),
                            })
                        }
                        ParameterKind::PositionalOnly | ParameterKind::PositionalOrKeyword => {
                            args.push((param.name, self.require(annotation)?));
                        }
                        ParameterKind::KeywordOnly => {
                            kwargs.insert(param.name, self.require(annotation)?);
                        }
                    }
                }
            }
            Shape::Object { value, .. } => return Ok(Rc::new(ObjectProvider::new(value.clone()))),
        }

        Ok(option.kind.build(ctor.clone(), args, kwargs))
    }

    // A single dependency of a constructor; unlike a top-level request, a
    // union here is resolved as one descriptor.
    fn require(&self, expr: &TypeExpr) -> DiResult<ProviderRef> {
        let descriptor = normalize(expr)?;
        self.resolve_one(&descriptor)?
            .ok_or_else(|| DiError::DependencyNotFound(descriptor.to_string()))
    }
}
