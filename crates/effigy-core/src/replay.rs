//! Trace replay
//!
//! Re-executes a recorded build trace against a type registry, producing
//! the value the rendered statements would build. Useful for checking that
//! a serialized fixture still matches the types it was recorded from.

use crate::error::PopulateError;
use crate::strategy::invoke_on;
use effigy_trace::{NodeId, NodeKind, OperationStyle, RenderError, TraceTree};
use effigy_types::{TypeDef, TypeDescriptor, TypeRegistry, TypeName, Value};

/// Rebuilds values from build traces
#[derive(Debug, Clone, Copy)]
pub struct TraceReplayer<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> TraceReplayer<'r> {
    /// Replayer resolving members through `registry`
    #[must_use]
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    /// Rebuild the value described by `tree`
    ///
    /// # Errors
    /// [`RenderError::EmptyTrace`] for an empty tree,
    /// [`PopulateError::MissingMember`] when a recorded member cannot be
    /// found, or the failure of a replayed invocation.
    pub fn replay(&self, tree: &TraceTree) -> Result<Value, PopulateError> {
        let root = tree.root().ok_or(RenderError::EmptyTrace)?;
        self.node(tree, root)
    }

    fn node(&self, tree: &TraceTree, id: NodeId) -> Result<Value, PopulateError> {
        let node = tree.node(id);
        let children = tree.children(id);
        tracing::trace!(node = %id, kind = node.kind.tag(), "replaying");

        match &node.kind {
            NodeKind::Leaf => Ok(node.literal.clone().unwrap_or(Value::Null)),
            NodeKind::Null => Ok(Value::Null),
            NodeKind::Optional => match children.first() {
                Some(&child) => self.node(tree, child),
                None => Ok(Value::Null),
            },
            NodeKind::Constructor { ctor } => {
                let def = self.def(&node.ty)?;
                let args = self.all(tree, children)?;
                self.construct(def, ctor, args)
            }
            NodeKind::Factory { method } => {
                let def = self.def(&node.ty)?;
                let args = self.all(tree, children)?;
                let factory = self
                    .registry
                    .find_method(def, method, args.len())
                    .ok_or_else(|| missing(&def.name, method, args.len()))?;
                Ok(factory.invoke_static(args)?)
            }
            NodeKind::FieldBlock { ctor } | NodeKind::SetterBlock { ctor } => {
                let def = self.def(&node.ty)?;
                let mut instance = self.construct(def, ctor, Vec::new())?;
                self.operations(tree, def, &mut instance, children)?;
                Ok(instance)
            }
            NodeKind::MutatorBlock { ctor, init_args } => {
                let def = self.def(&node.ty)?;
                let split = (*init_args).min(children.len());
                let args = self.all(tree, &children[..split])?;
                let mut instance = self.construct(def, ctor, args)?;
                self.operations(tree, def, &mut instance, &children[split..])?;
                Ok(instance)
            }
            NodeKind::BuilderBlock { entry, terminal } => {
                let def = self.def(&node.ty)?;
                let entry_op = self
                    .registry
                    .find_method(def, entry, 0)
                    .ok_or_else(|| missing(&def.name, entry, 0))?;
                let mut builder = entry_op.invoke_static(Vec::new())?;
                let builder_name = builder
                    .as_object()
                    .map(|object| object.ty.clone())
                    .ok_or_else(|| missing(&def.name, entry, 0))?;
                let builder_def = self.registry.composite(&builder_name)?;
                self.operations(tree, builder_def, &mut builder, children)?;
                let terminal_op = self
                    .registry
                    .find_method(builder_def, terminal, 0)
                    .ok_or_else(|| missing(&builder_def.name, terminal, 0))?;
                Ok(terminal_op.invoke(&mut builder, Vec::new())?)
            }
            NodeKind::Sequence => Ok(Value::Seq(self.present(tree, children)?)),
            NodeKind::Set => Ok(Value::Set(self.present(tree, children)?)),
            NodeKind::Array => Ok(Value::Array(self.all(tree, children)?)),
            NodeKind::Map => {
                let mut map = Value::Map(Vec::new());
                if let [key, value] = children {
                    let key = self.node(tree, *key)?;
                    let value = self.node(tree, *value)?;
                    if !key.is_null() && !value.is_null() {
                        map.insert_entry(key, value)?;
                    }
                }
                Ok(map)
            }
            NodeKind::Pair => match children {
                [key, value] => Ok(Value::Pair(
                    Box::new(self.node(tree, *key)?),
                    Box::new(self.node(tree, *value)?),
                )),
                _ => Err(RenderError::UnexpectedNode {
                    kind: node.kind.tag(),
                    context: "replay",
                }
                .into()),
            },
            NodeKind::Operation { .. } => Err(RenderError::UnexpectedNode {
                kind: node.kind.tag(),
                context: "replay",
            }
            .into()),
        }
    }

    fn def(&self, ty: &TypeDescriptor) -> Result<&'r TypeDef, PopulateError> {
        let name = ty.as_named().ok_or_else(|| PopulateError::UnsupportedType { ty: ty.to_string() })?;
        Ok(self.registry.composite(name)?)
    }

    fn construct(&self, def: &TypeDef, ctor: &str, args: Vec<Value>) -> Result<Value, PopulateError> {
        let constructor = def
            .find_constructor(ctor, args.len())
            .ok_or_else(|| missing(&def.name, ctor, args.len()))?;
        Ok(constructor.invoke(args)?)
    }

    fn operations(
        &self,
        tree: &TraceTree,
        def: &TypeDef,
        receiver: &mut Value,
        ops: &[NodeId],
    ) -> Result<(), PopulateError> {
        for &op in ops {
            let node = tree.node(op);
            let NodeKind::Operation { name, style } = &node.kind else {
                return Err(RenderError::UnexpectedNode {
                    kind: node.kind.tag(),
                    context: "operation list",
                }
                .into());
            };
            let mut args = self.all(tree, tree.children(op))?;
            match style {
                OperationStyle::FieldAssign => {
                    let value = args.pop().unwrap_or(Value::Null);
                    receiver.set_field(name, value)?;
                }
                OperationStyle::Call => {
                    let method = self
                        .registry
                        .find_method(def, name, args.len())
                        .ok_or_else(|| missing(&def.name, name, args.len()))?;
                    invoke_on(method, receiver, args)?;
                }
            }
        }
        Ok(())
    }

    fn all(&self, tree: &TraceTree, ids: &[NodeId]) -> Result<Vec<Value>, PopulateError> {
        ids.iter().map(|&id| self.node(tree, id)).collect()
    }

    /// Child values with absent ones dropped
    fn present(&self, tree: &TraceTree, ids: &[NodeId]) -> Result<Vec<Value>, PopulateError> {
        Ok(self.all(tree, ids)?.into_iter().filter(|v| !v.is_null()).collect())
    }
}

fn missing(ty: &TypeName, member: &str, arity: usize) -> PopulateError {
    PopulateError::MissingMember {
        ty: ty.clone(),
        member: member.to_string(),
        arity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use effigy_trace::TraceRecorder;
    use effigy_types::{Constructor, LeafKind, Method, Param};

    fn registry() -> TypeRegistry {
        let counter = TypeName::new("t::Counter");
        TypeRegistry::new().with(
            TypeDef::new(counter.clone())
                .constructor(Constructor::assigning(
                    &counter,
                    "starting_at",
                    vec![Param::new("start", LeafKind::I64)],
                ))
                .method(Method::setter("set_step", "step", LeafKind::I64)),
        )
    }

    #[test]
    fn mutator_block_replays_constructor_then_operations() {
        let owner = TypeDescriptor::named("t::Counter");
        let mut rec = TraceRecorder::new();
        let block = rec
            .open(
                NodeKind::MutatorBlock {
                    ctor: "starting_at".into(),
                    init_args: 1,
                },
                owner.clone(),
                2,
            )
            .unwrap();
        rec.leaf(LeafKind::I64.into(), Value::Int(5)).unwrap();
        let op = rec
            .open(
                NodeKind::Operation {
                    name: "set_step".into(),
                    style: OperationStyle::Call,
                },
                owner,
                1,
            )
            .unwrap();
        rec.leaf(LeafKind::I64.into(), Value::Int(2)).unwrap();
        rec.close(op).unwrap();
        rec.close(block).unwrap();

        let registry = registry();
        let value = TraceReplayer::new(&registry).replay(&rec.finish().unwrap()).unwrap();
        assert_eq!(value.field("start"), Some(&Value::Int(5)));
        assert_eq!(value.field("step"), Some(&Value::Int(2)));
    }

    #[test]
    fn renamed_member_is_reported() {
        let mut rec = TraceRecorder::new();
        let node = rec
            .open(
                NodeKind::Constructor { ctor: "new".into() },
                TypeDescriptor::named("t::Counter"),
                0,
            )
            .unwrap();
        rec.close(node).unwrap();

        let registry = registry();
        let err = TraceReplayer::new(&registry).replay(&rec.finish().unwrap()).unwrap_err();
        assert!(matches!(err, PopulateError::MissingMember { ref member, arity: 0, .. } if member == "new"));
    }

    #[test]
    fn empty_trace_is_rejected() {
        let registry = registry();
        let err = TraceReplayer::new(&registry).replay(&TraceTree::default()).unwrap_err();
        assert!(matches!(err, PopulateError::Render(RenderError::EmptyTrace)));
    }
}
