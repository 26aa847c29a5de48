//! Builder adapter
//!
//! Builder conventions vary between code generators, so locating the entry,
//! the terminal and the intermediate operations sits behind
//! [`BuilderAdapter`]. [`ConventionBuilderAdapter`] recognizes a static
//! `builder()` entry and a `build()` terminal.

use crate::config::PopulateConfig;
use crate::strategy::select;
use effigy_types::{Method, Returns, TypeDef, TypeRegistry};
use std::fmt;

/// Located builder for a target type
#[derive(Debug, Clone, Copy)]
pub struct BuilderPlan<'a> {
    /// Static operation on the target returning a builder
    pub entry: &'a Method,
    /// Builder type definition
    pub builder: &'a TypeDef,
    /// Operation on the builder returning the target
    pub terminal: &'a Method,
}

/// Builder discovery collaborator
pub trait BuilderAdapter: Send + Sync + fmt::Debug {
    /// Locate entry and terminal for `target`, if it has a builder
    fn locate<'a>(&self, registry: &'a TypeRegistry, target: &'a TypeDef) -> Option<BuilderPlan<'a>>;

    /// Intermediate operations to invoke on the builder, in order
    fn discover_operations<'a>(
        &self,
        registry: &'a TypeRegistry,
        plan: &BuilderPlan<'a>,
        config: &PopulateConfig,
    ) -> Vec<&'a Method>;
}

/// Adapter for `Type::builder()` ... `.build()` builders
#[derive(Debug, Clone)]
pub struct ConventionBuilderAdapter {
    entry: String,
    terminal: String,
}

impl ConventionBuilderAdapter {
    /// Create with custom entry and terminal names
    #[must_use]
    pub fn new(entry: impl Into<String>, terminal: impl Into<String>) -> Self {
        Self {
            entry: entry.into(),
            terminal: terminal.into(),
        }
    }
}

impl Default for ConventionBuilderAdapter {
    fn default() -> Self {
        Self::new("builder", "build")
    }
}

impl BuilderAdapter for ConventionBuilderAdapter {
    fn locate<'a>(&self, registry: &'a TypeRegistry, target: &'a TypeDef) -> Option<BuilderPlan<'a>> {
        let entry = registry
            .find_method(target, &self.entry, 0)
            .filter(|m| m.is_static() && m.accessible)?;
        let Returns::Type(builder_ty) = &entry.returns else {
            return None;
        };
        let builder = registry.composite(builder_ty.as_named()?).ok()?;
        let terminal = registry
            .find_method(builder, &self.terminal, 0)
            .filter(|m| !m.is_static() && m.accessible && m.returns_owner(&target.name))?;
        Some(BuilderPlan {
            entry,
            builder,
            terminal,
        })
    }

    fn discover_operations<'a>(
        &self,
        registry: &'a TypeRegistry,
        plan: &BuilderPlan<'a>,
        config: &PopulateConfig,
    ) -> Vec<&'a Method> {
        let builder = plan.builder;
        registry
            .methods_of(builder)
            .into_iter()
            .filter(|m| {
                m.accessible
                    && !m.is_static()
                    && m.arity() > 0
                    && m.name != plan.terminal.name
                    && m.returns_owner(&builder.name)
                    && !select::method_excluded(registry, builder, config, &m.name)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use effigy_types::{Constructor, Field, InvokeError, LeafKind, Object, TypeDescriptor, Value};

    fn registry() -> TypeRegistry {
        let order = effigy_types::TypeName::new("shop::Order");
        let builder = effigy_types::TypeName::new("shop::OrderBuilder");
        let target = order.clone();
        let building = builder.clone();
        TypeRegistry::new()
            .with(
                TypeDef::new(order.clone())
                    .field(Field::new("id", LeafKind::U64))
                    .constructor(Constructor::empty(&order, "new").private())
                    .method(Method::static_fn(
                        "builder",
                        vec![],
                        Returns::Type(TypeDescriptor::Named(builder.clone())),
                        move |_| Ok(Value::Object(Object::new(building.clone()))),
                    )),
            )
            .with(
                TypeDef::new(builder.clone())
                    .method(Method::fluent("id", "id", LeafKind::U64))
                    .method(Method::fluent("note", "note", LeafKind::String))
                    .method(Method::fluent("secret", "secret", LeafKind::String).private())
                    .method(Method::instance(
                        "build",
                        vec![],
                        Returns::Type(TypeDescriptor::Named(order.clone())),
                        move |receiver, _| {
                            let object = receiver.as_object().ok_or_else(|| InvokeError::NotAnObject {
                                member: "build".into(),
                            })?;
                            let mut built = Object::new(target.clone());
                            built.fields.clone_from(&object.fields);
                            Ok(Value::Object(built))
                        },
                    )),
            )
    }

    #[test]
    fn locates_entry_and_terminal() {
        let registry = registry();
        let order = registry.composite(&"shop::Order".into()).unwrap();
        let plan = ConventionBuilderAdapter::default().locate(&registry, order).unwrap();
        assert_eq!(plan.entry.name, "builder");
        assert_eq!(plan.terminal.name, "build");
        assert_eq!(plan.builder.name.short(), "OrderBuilder");
    }

    #[test]
    fn operations_skip_private_and_excluded() {
        let registry = registry();
        let order = registry.composite(&"shop::Order".into()).unwrap();
        let adapter = ConventionBuilderAdapter::default();
        let plan = adapter.locate(&registry, order).unwrap();

        let config = PopulateConfig::new().exclude_method("OrderBuilder::note");
        let names: Vec<_> = adapter
            .discover_operations(&registry, &plan, &config)
            .into_iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, vec!["id"]);
    }

    #[test]
    fn other_conventions_do_not_match() {
        let registry = registry();
        let order = registry.composite(&"shop::Order".into()).unwrap();
        assert!(ConventionBuilderAdapter::new("newBuilder", "build")
            .locate(&registry, order)
            .is_none());
    }
}
