//! Member discovery and selection rules shared by the strategies

use crate::config::{ConstructorSelection, FactorySelection, PopulateConfig};
use effigy_types::{CollectionShape, Constructor, Field, Method, Returns, TypeDef, TypeDescriptor, TypeRegistry};

/// Constructor chosen by `selection`; ties go to the first declared
pub(crate) fn constructor(def: &TypeDef, selection: ConstructorSelection) -> Option<&Constructor> {
    let mut candidates = def.constructors.iter().filter(|c| c.accessible);
    match selection {
        ConstructorSelection::NoArgs => candidates.find(|c| c.arity() == 0),
        ConstructorSelection::Smallest => candidates.filter(|c| c.arity() > 0).min_by_key(|c| c.arity()),
        ConstructorSelection::Largest => first_max_by_key(candidates.filter(|c| c.arity() > 0), |c| c.arity()),
    }
}

/// Static self-returning operations that never take their own type
pub(crate) fn factories<'a>(registry: &'a TypeRegistry, def: &'a TypeDef) -> Vec<&'a Method> {
    registry
        .methods_of(def)
        .into_iter()
        .filter(|m| {
            m.accessible
                && m.is_static()
                && m.returns_owner(&def.name)
                && !m.params.iter().any(|p| p.ty.mentions(&def.name))
        })
        .collect()
}

/// Factory chosen by `selection`; ties go to the first declared
pub(crate) fn factory<'a>(
    registry: &'a TypeRegistry,
    def: &'a TypeDef,
    selection: FactorySelection,
) -> Option<&'a Method> {
    let candidates = factories(registry, def).into_iter();
    match selection {
        FactorySelection::Largest => first_max_by_key(candidates, |m| m.arity()),
        FactorySelection::Smallest => candidates.min_by_key(|m| m.arity()),
        FactorySelection::Simplest => candidates.min_by_key(|m| signature_complexity(m)),
    }
}

/// Structural complexity of a parameter list
pub(crate) fn signature_complexity(method: &Method) -> usize {
    method.params.iter().map(|p| complexity(&p.ty)).sum()
}

/// Structural complexity of one type: leaves are cheapest, nesting adds up
pub(crate) fn complexity(ty: &TypeDescriptor) -> usize {
    match ty {
        TypeDescriptor::Leaf(_) => 1,
        TypeDescriptor::Named(_) => 3,
        TypeDescriptor::Optional(inner) => 1 + complexity(inner),
        TypeDescriptor::Array(inner) => 2 + complexity(inner),
        TypeDescriptor::Collection(collection) => match &collection.shape {
            CollectionShape::Sequence(e) | CollectionShape::Set(e) => 2 + complexity(e),
            CollectionShape::Map(k, v) | CollectionShape::Pair(k, v) => 2 + complexity(k) + complexity(v),
        },
    }
}

/// Non-final, non-static, non-excluded fields, inherited first
///
/// An exclusion naming any type in the lineage applies.
pub(crate) fn assignable_fields<'a>(
    registry: &'a TypeRegistry,
    def: &'a TypeDef,
    config: &PopulateConfig,
) -> Vec<&'a Field> {
    let lineage = registry.lineage(def);
    registry
        .fields_of(def)
        .into_iter()
        .filter(|f| {
            f.is_assignable() && !lineage.iter().any(|ty| config.is_field_excluded(&ty.name, &f.name))
        })
        .collect()
}

/// Whether operation `name` is excluded on `def` or any of its ancestors
pub(crate) fn method_excluded(registry: &TypeRegistry, def: &TypeDef, config: &PopulateConfig, name: &str) -> bool {
    registry
        .lineage(def)
        .iter()
        .any(|ty| config.is_method_excluded(&ty.name, name))
}

/// Accessible single-argument void operations named like setters
pub(crate) fn setters<'a>(registry: &'a TypeRegistry, def: &'a TypeDef, config: &PopulateConfig) -> Vec<&'a Method> {
    registry
        .methods_of(def)
        .into_iter()
        .filter(|m| {
            m.accessible
                && !m.is_static()
                && m.arity() == 1
                && m.returns == Returns::Void
                && config.is_setter_name(&m.name)
                && !method_excluded(registry, def, config, &m.name)
        })
        .collect()
}

/// Mutator-shaped operations, collection-argument ones last
pub(crate) fn mutators<'a>(registry: &'a TypeRegistry, def: &'a TypeDef, config: &PopulateConfig) -> Vec<&'a Method> {
    let (collections, plain): (Vec<&Method>, Vec<&Method>) = registry
        .methods_of(def)
        .into_iter()
        .filter(|m| {
            m.accessible
                && !m.is_static()
                && m.arity() > 0
                && m.is_mutator_shaped()
                && !method_excluded(registry, def, config, &m.name)
        })
        .partition(|m| m.params.iter().any(|p| p.ty.is_collection_like()));
    plain.into_iter().chain(collections).collect()
}

fn first_max_by_key<T, I, F>(items: I, key: F) -> Option<T>
where
    I: Iterator<Item = T>,
    F: Fn(&T) -> usize,
    T: Copy,
{
    items.fold(None, |best, item| match best {
        Some(b) if key(&b) >= key(&item) => Some(b),
        _ => Some(item),
    })
}
