//! Recursive population engine
//!
//! A [`Session`] lives for one top-level populate call. It classifies each
//! requested type, dispatches leaves to the value provider, composites to the
//! strategy resolver and collection-like shapes to the collection module, and
//! keeps the build trace in step with every descent.

use crate::adapter::BuilderAdapter;
use crate::collection;
use crate::config::{CircularPolicy, PopulateConfig};
use crate::context::Carrier;
use crate::error::PopulateError;
use crate::provider::ValueProvider;
use crate::resolver::StrategyResolver;
use effigy_trace::{NodeId, NodeKind, TraceRecorder, TraceTree};
use effigy_types::{Classification, TypeDef, TypeDescriptor, TypeRegistry, Value};

/// State of one populate call
#[derive(Debug)]
pub struct Session<'a> {
    registry: &'a TypeRegistry,
    config: &'a PopulateConfig,
    provider: &'a mut dyn ValueProvider,
    adapter: &'a dyn BuilderAdapter,
    resolver: &'a StrategyResolver,
    recorder: Option<TraceRecorder>,
}

impl<'a> Session<'a> {
    /// Start a call; a fresh recorder is created when tracing is enabled
    #[must_use]
    pub fn new(
        registry: &'a TypeRegistry,
        config: &'a PopulateConfig,
        provider: &'a mut dyn ValueProvider,
        adapter: &'a dyn BuilderAdapter,
        resolver: &'a StrategyResolver,
    ) -> Self {
        Self {
            registry,
            config,
            provider,
            adapter,
            resolver,
            recorder: config.trace.then(TraceRecorder::new),
        }
    }

    /// Type registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    /// Effective configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &'a PopulateConfig {
        self.config
    }

    /// Builder adapter
    #[inline]
    #[must_use]
    pub fn adapter(&self) -> &'a dyn BuilderAdapter {
        self.adapter
    }

    /// Trace node new constituents attach under
    #[inline]
    #[must_use]
    pub fn cursor(&self) -> Option<NodeId> {
        self.recorder.as_ref().and_then(TraceRecorder::cursor)
    }

    /// Populate the carrier's type
    ///
    /// # Errors
    /// Any [`PopulateError`]; the whole call is aborted on the first one.
    pub fn populate(&mut self, carrier: &Carrier) -> Result<Value, PopulateError> {
        if let Some(recorder) = &self.recorder {
            recorder.expect_cursor(carrier.node())?;
        }
        let ty = carrier.descriptor();
        if carrier.depth() > self.config.max_depth {
            tracing::warn!(ty = %ty, limit = self.config.max_depth, "depth limit exceeded");
            return Err(PopulateError::DepthExceeded {
                ty: ty.clone(),
                limit: self.config.max_depth,
            });
        }

        let registry = self.registry;
        match registry.classify(ty)? {
            Classification::Leaf(leaf) => {
                let value = self.provider.provide(&leaf)?;
                if let Some(recorder) = &mut self.recorder {
                    recorder.leaf(ty.clone(), value.clone())?;
                }
                Ok(value)
            }
            Classification::Composite(def) => {
                if carrier.guard().contains(&def.name) {
                    return self.on_cycle(def, carrier);
                }
                let resolver = self.resolver;
                resolver.resolve(def, &carrier.enter(&def.name), self)
            }
            Classification::Collection(shape) => collection::populate_collection(self, carrier, shape),
            Classification::Array(element) => collection::populate_array(self, carrier, element),
            Classification::Optional(inner) => {
                let node = self.open(NodeKind::Optional, ty.clone(), 1)?;
                let value = self.populate_child(carrier, inner)?;
                self.close(node)?;
                Ok(value)
            }
        }
    }

    /// Populate a constituent of `parent` under the current cursor
    ///
    /// # Errors
    /// As [`Session::populate`].
    pub fn populate_child(&mut self, parent: &Carrier, ty: &TypeDescriptor) -> Result<Value, PopulateError> {
        let child = parent.child(ty.clone(), self.cursor());
        self.populate(&child)
    }

    fn on_cycle(&mut self, def: &TypeDef, carrier: &Carrier) -> Result<Value, PopulateError> {
        match self.config.circular_policy {
            CircularPolicy::Null => {
                tracing::debug!(ty = %def.name, depth = carrier.depth(), "cycle resolved to null");
                self.null(carrier.descriptor())?;
                Ok(Value::Null)
            }
            CircularPolicy::Fail => {
                let path = carrier.guard().cycle_through(&def.name);
                tracing::warn!(ty = %def.name, depth = path.len(), "circular dependency");
                Err(PopulateError::CircularDependency {
                    ty: def.name.clone(),
                    path,
                })
            }
        }
    }

    /// Open a trace node; `None` when tracing is disabled
    ///
    /// # Errors
    /// [`PopulateError::Trace`] on a recorder protocol violation.
    pub fn open(
        &mut self,
        kind: NodeKind,
        ty: TypeDescriptor,
        expected: usize,
    ) -> Result<Option<NodeId>, PopulateError> {
        match &mut self.recorder {
            Some(recorder) => Ok(Some(recorder.open(kind, ty, expected)?)),
            None => Ok(None),
        }
    }

    /// Close a node returned by [`Session::open`]
    ///
    /// # Errors
    /// [`PopulateError::Trace`] if the node is not the cursor or unsaturated.
    pub fn close(&mut self, node: Option<NodeId>) -> Result<(), PopulateError> {
        if let (Some(recorder), Some(id)) = (&mut self.recorder, node) {
            recorder.close(id)?;
        }
        Ok(())
    }

    /// Record an absent value of type `ty`
    ///
    /// # Errors
    /// [`PopulateError::Trace`] on a recorder protocol violation.
    pub fn null(&mut self, ty: &TypeDescriptor) -> Result<(), PopulateError> {
        if let Some(recorder) = &mut self.recorder {
            recorder.null(ty.clone())?;
        }
        Ok(())
    }

    /// End the call and hand back the finished trace
    ///
    /// # Errors
    /// [`PopulateError::Trace`] if a node is still open.
    pub fn finish(self) -> Result<Option<TraceTree>, PopulateError> {
        Ok(self.recorder.map(TraceRecorder::finish).transpose()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::ConventionBuilderAdapter;
    use crate::provider::DefaultValueProvider;
    use effigy_types::{Constructor, EnumDef, LeafKind, Param, TypeName};

    fn registry() -> TypeRegistry {
        let node = TypeName::new("t::Node");
        TypeRegistry::new()
            .with(EnumDef::new("t::Color", ["Red", "Green"]))
            .with(TypeDef::new(node.clone()).constructor(Constructor::assigning(
                &node,
                "new",
                vec![Param::new("next", TypeDescriptor::named("t::Node"))],
            )))
    }

    fn run(
        registry: &TypeRegistry,
        config: &PopulateConfig,
        ty: TypeDescriptor,
    ) -> Result<(Value, Option<TraceTree>), PopulateError> {
        let resolver = StrategyResolver::from_config(config, &[], None)?;
        let adapter = ConventionBuilderAdapter::default();
        let mut provider = DefaultValueProvider::deterministic();
        let mut session = Session::new(registry, config, &mut provider, &adapter, &resolver);
        let value = session.populate(&Carrier::root(ty))?;
        Ok((value, session.finish()?))
    }

    #[test]
    fn leaf_root_records_single_node() {
        let (value, trace) = run(&registry(), &PopulateConfig::new(), LeafKind::I32.into()).unwrap();
        assert_eq!(value, Value::Int(1));
        assert_eq!(trace.unwrap().len(), 1);
    }

    #[test]
    fn enum_is_a_leaf() {
        let (value, _) = run(&registry(), &PopulateConfig::new(), TypeDescriptor::named("t::Color")).unwrap();
        assert!(matches!(value, Value::Enum { ref variant, .. } if variant == "Red"));
    }

    #[test]
    fn self_reference_is_nulled() {
        let (value, trace) = run(&registry(), &PopulateConfig::new(), TypeDescriptor::named("t::Node")).unwrap();
        assert_eq!(value.field("next"), Some(&Value::Null));
        let trace = trace.unwrap();
        let root = trace.root().unwrap();
        assert!(matches!(trace.node(trace.children(root)[0]).kind, NodeKind::Null));
    }

    #[test]
    fn self_reference_fails_under_fail_policy() {
        let config = PopulateConfig::new().with_circular_policy(CircularPolicy::Fail);
        let err = run(&registry(), &config, TypeDescriptor::named("t::Node")).unwrap_err();
        assert!(err.is_circular());
    }

    #[test]
    fn optional_wraps_inner_value() {
        let config = PopulateConfig::new();
        let (value, trace) = run(&registry(), &config, TypeDescriptor::optional(LeafKind::Bool.into())).unwrap();
        assert_eq!(value, Value::Bool(true));
        let trace = trace.unwrap();
        assert!(matches!(trace.node(trace.root().unwrap()).kind, NodeKind::Optional));
    }

    #[test]
    fn depth_limit_applies() {
        let config = PopulateConfig::new().with_max_depth(1);
        let ty = TypeDescriptor::seq(TypeDescriptor::seq(LeafKind::I32.into()));
        let err = run(&registry(), &config, ty).unwrap_err();
        assert!(matches!(err.root_cause(), PopulateError::DepthExceeded { limit: 1, .. }));
    }

    #[test]
    fn untraced_call_has_no_tree() {
        let config = PopulateConfig::new().with_trace(false);
        let (_, trace) = run(&registry(), &config, TypeDescriptor::named("t::Node")).unwrap();
        assert!(trace.is_none());
    }

    #[test]
    fn unknown_type_is_reported() {
        let err = run(&registry(), &PopulateConfig::new(), TypeDescriptor::named("t::Missing")).unwrap_err();
        assert!(matches!(err, PopulateError::UnknownType(_)));
    }
}
