//! Trace serializer
//!
//! Walks a finished [`TraceTree`] post-order and emits declaration statements
//! plus the symbols they reference. A node's children are fully emitted before
//! its own declaration, so every symbol is declared before use.

use crate::literal::{render_leaf, RenderError};
use crate::node::{NodeId, NodeKind, OperationStyle, TraceTree};
use effigy_types::{CollectionMode, CollectionShape, TypeDescriptor};
use std::collections::BTreeSet;

/// Symbols referenced by emitted statements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolRefs {
    /// Type paths to import (`app::model::Person`)
    pub imports: BTreeSet<String>,

    /// Associated members referenced through their type (`Person::new`)
    pub qualified: BTreeSet<String>,
}

impl SymbolRefs {
    /// Record a type path to import
    pub fn import(&mut self, path: &str) {
        self.imports.insert(path.to_string());
    }

    /// Record a `Type::member` reference
    pub fn qualify(&mut self, path: &str) {
        self.qualified.insert(path.to_string());
    }

    /// Record every import needed to name `ty`
    pub fn add_type(&mut self, ty: &TypeDescriptor) {
        match ty {
            TypeDescriptor::Leaf(kind) => {
                for path in kind.imports() {
                    self.import(path);
                }
            }
            TypeDescriptor::Named(name) => {
                if name.is_qualified() {
                    self.import(name.as_str());
                }
            }
            TypeDescriptor::Optional(inner) | TypeDescriptor::Array(inner) => self.add_type(inner),
            TypeDescriptor::Collection(collection) => {
                match &collection.mode {
                    CollectionMode::Literal => {
                        if let Some(path) = collection.literal_import() {
                            self.import(path);
                        }
                    }
                    CollectionMode::Constructed(concrete) => {
                        if concrete.name.is_qualified() {
                            self.import(concrete.name.as_str());
                        }
                    }
                }
                match &collection.shape {
                    CollectionShape::Sequence(e) | CollectionShape::Set(e) => self.add_type(e),
                    CollectionShape::Map(k, v) | CollectionShape::Pair(k, v) => {
                        self.add_type(k);
                        self.add_type(v);
                    }
                }
            }
        }
    }
}

/// Output of serializing one trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedTrace {
    /// Statements in declaration order
    pub statements: Vec<String>,

    /// Type paths the statements need imported
    pub imports: BTreeSet<String>,

    /// `Type::member` paths the statements reference
    pub qualified: BTreeSet<String>,

    /// Expression evaluating to the populated value
    pub root: String,
}

impl SerializedTrace {
    /// `use` declarations for every import
    #[must_use]
    pub fn use_lines(&self) -> Vec<String> {
        self.imports.iter().map(|path| format!("use {path};")).collect()
    }

    /// Statements followed by the root expression, one per line
    #[must_use]
    pub fn body(&self) -> String {
        let mut lines = self.statements.clone();
        lines.push(self.root.clone());
        lines.join("\n")
    }
}

/// Serialize a finished trace
///
/// # Errors
/// [`RenderError`] if the tree is empty or malformed.
pub fn serialize(tree: &TraceTree) -> Result<SerializedTrace, RenderError> {
    TraceSerializer::new(tree).run()
}

/// Post-order statement emitter over one tree
#[derive(Debug)]
pub struct TraceSerializer<'t> {
    tree: &'t TraceTree,
    statements: Vec<String>,
    refs: SymbolRefs,
}

/// One operation of a block, with its rendered arguments
struct RenderedOp<'t> {
    name: &'t str,
    style: OperationStyle,
    args: Vec<String>,
}

impl<'t> TraceSerializer<'t> {
    /// Create a serializer for `tree`
    #[must_use]
    pub fn new(tree: &'t TraceTree) -> Self {
        Self {
            tree,
            statements: Vec::new(),
            refs: SymbolRefs::default(),
        }
    }

    /// Emit the whole tree
    ///
    /// # Errors
    /// [`RenderError::EmptyTrace`] without a root, otherwise any node error.
    pub fn run(mut self) -> Result<SerializedTrace, RenderError> {
        let root = self.tree.root().ok_or(RenderError::EmptyTrace)?;
        let root = self.emit(root)?;
        tracing::debug!(statements = self.statements.len(), "serialized build trace");
        Ok(SerializedTrace {
            statements: self.statements,
            imports: self.refs.imports,
            qualified: self.refs.qualified,
            root,
        })
    }

    fn is_null(&self, id: NodeId) -> bool {
        matches!(self.tree.node(id).kind, NodeKind::Null)
    }

    fn declared_name(&self, id: NodeId) -> Result<&'t str, RenderError> {
        let node = self.tree.node(id);
        node.name
            .as_deref()
            .ok_or_else(|| RenderError::MissingName(node.ty.to_string()))
    }

    /// Emit `id` and return the expression to use at its parent
    fn emit(&mut self, id: NodeId) -> Result<String, RenderError> {
        let tree = self.tree;
        let node = tree.node(id);
        match &node.kind {
            NodeKind::Leaf => match &node.literal {
                Some(value) => render_leaf(&node.ty, value, &mut self.refs),
                None => Err(RenderError::LiteralMismatch {
                    ty: node.ty.to_string(),
                    value: "<missing>".to_string(),
                }),
            },
            NodeKind::Null => Ok("None".to_string()),
            NodeKind::Optional => {
                let child = self.only_child(id)?;
                if self.is_null(child) {
                    Ok("None".to_string())
                } else {
                    Ok(format!("Some({})", self.emit(child)?))
                }
            }
            NodeKind::Constructor { ctor } => self.emit_call(id, ctor),
            NodeKind::Factory { method } => self.emit_call(id, method),
            NodeKind::FieldBlock { ctor } | NodeKind::SetterBlock { ctor } => {
                self.emit_block(id, ctor, 0)
            }
            NodeKind::MutatorBlock { ctor, init_args } => self.emit_block(id, ctor, *init_args),
            NodeKind::BuilderBlock { entry, terminal } => self.emit_builder(id, entry, terminal),
            NodeKind::Sequence | NodeKind::Set | NodeKind::Array => self.emit_elements(id),
            NodeKind::Map => self.emit_map(id),
            NodeKind::Pair => {
                let name = self.declared_name(id)?;
                let (key, value) = self.two_children(id)?;
                let key = self.emit(key)?;
                let value = self.emit(value)?;
                self.statements.push(format!("let {name} = ({key}, {value});"));
                Ok(name.to_string())
            }
            NodeKind::Operation { .. } => Err(RenderError::UnexpectedNode {
                kind: node.kind.tag(),
                context: "value position",
            }),
        }
    }

    fn only_child(&self, id: NodeId) -> Result<NodeId, RenderError> {
        match self.tree.children(id) {
            [child] => Ok(*child),
            _ => Err(RenderError::UnexpectedNode {
                kind: self.tree.node(id).kind.tag(),
                context: "single-child node",
            }),
        }
    }

    fn two_children(&self, id: NodeId) -> Result<(NodeId, NodeId), RenderError> {
        match self.tree.children(id) {
            [first, second] => Ok((*first, *second)),
            _ => Err(RenderError::UnexpectedNode {
                kind: self.tree.node(id).kind.tag(),
                context: "two-child node",
            }),
        }
    }

    fn emit_args(&mut self, ids: &[NodeId]) -> Result<Vec<String>, RenderError> {
        ids.iter().map(|child| self.emit(*child)).collect()
    }

    /// Type name at use-site, recording the imports it needs
    fn type_text(&mut self, ty: &TypeDescriptor) -> String {
        self.refs.add_type(ty);
        ty.to_string()
    }

    /// `let name = Type::member(args);`
    fn emit_call(&mut self, id: NodeId, member: &str) -> Result<String, RenderError> {
        let node = self.tree.node(id);
        let name = self.declared_name(id)?;
        let args = self.emit_args(&node.children)?;
        let owner = self.type_text(&node.ty);
        self.refs.qualify(&format!("{owner}::{member}"));
        self.statements
            .push(format!("let {name} = {owner}::{member}({});", args.join(", ")));
        Ok(name.to_string())
    }

    fn emit_ops(&mut self, ids: &[NodeId]) -> Result<Vec<RenderedOp<'t>>, RenderError> {
        let tree = self.tree;
        let mut ops = Vec::with_capacity(ids.len());
        for op_id in ids {
            let op = tree.node(*op_id);
            let NodeKind::Operation { name, style } = &op.kind else {
                return Err(RenderError::UnexpectedNode {
                    kind: op.kind.tag(),
                    context: "operation list",
                });
            };
            let args = self.emit_args(&op.children)?;
            ops.push(RenderedOp {
                name,
                style: *style,
                args,
            });
        }
        Ok(ops)
    }

    /// Instantiate, then apply each operation to the declared symbol
    fn emit_block(&mut self, id: NodeId, ctor: &str, init_args: usize) -> Result<String, RenderError> {
        let node = self.tree.node(id);
        let name = self.declared_name(id)?;
        let split = init_args.min(node.children.len());
        let (ctor_ids, op_ids) = node.children.split_at(split);
        let args = self.emit_args(ctor_ids)?;
        let ops = self.emit_ops(op_ids)?;

        let owner = self.type_text(&node.ty);
        self.refs.qualify(&format!("{owner}::{ctor}"));
        let binding = if ops.is_empty() { "let" } else { "let mut" };
        self.statements
            .push(format!("{binding} {name} = {owner}::{ctor}({});", args.join(", ")));
        for op in ops {
            let statement = match op.style {
                OperationStyle::FieldAssign => {
                    format!("{name}.{} = {};", op.name, op.args.join(", "))
                }
                OperationStyle::Call => format!("{name}.{}({});", op.name, op.args.join(", ")),
            };
            self.statements.push(statement);
        }
        Ok(name.to_string())
    }

    /// `let name = Type::entry().op(args)...terminal();`
    fn emit_builder(&mut self, id: NodeId, entry: &str, terminal: &str) -> Result<String, RenderError> {
        let node = self.tree.node(id);
        let name = self.declared_name(id)?;
        let ops = self.emit_ops(&node.children)?;
        let owner = self.type_text(&node.ty);
        self.refs.qualify(&format!("{owner}::{entry}"));

        let mut chain = format!("let {name} = {owner}::{entry}()");
        for op in ops {
            chain.push_str(&format!(".{}({})", op.name, op.args.join(", ")));
        }
        chain.push_str(&format!(".{terminal}();"));
        self.statements.push(chain);
        Ok(name.to_string())
    }

    /// Sequences, sets and arrays holding one element
    fn emit_elements(&mut self, id: NodeId) -> Result<String, RenderError> {
        let node = self.tree.node(id);
        let name = self.declared_name(id)?;
        let element = self.only_child(id)?;
        let all_null = self.is_null(element);
        let element = if all_null { None } else { Some(self.emit(element)?) };

        let statements = match (&node.kind, &node.ty) {
            (NodeKind::Array, TypeDescriptor::Array(_)) => {
                let e = element.unwrap_or_else(|| "None".to_string());
                vec![format!("let {name} = [{e}];")]
            }
            (NodeKind::Sequence | NodeKind::Set, TypeDescriptor::Collection(collection)) => {
                let ty_text = self.type_text(&node.ty);
                match (&collection.mode, element) {
                    (_, None) => {
                        let outer = collection.type_short_name();
                        vec![format!("let {name}: {ty_text} = {outer}::new();")]
                    }
                    (CollectionMode::Literal, Some(e)) => {
                        if matches!(node.kind, NodeKind::Sequence) {
                            vec![format!("let {name} = vec![{e}];")]
                        } else {
                            self.refs.qualify("HashSet::from");
                            vec![format!("let {name} = HashSet::from([{e}]);")]
                        }
                    }
                    (CollectionMode::Constructed(concrete), Some(e)) => {
                        let outer = concrete.name.short();
                        vec![
                            format!("let mut {name} = {outer}::new();"),
                            format!("{name}.{}({e});", concrete.insert),
                        ]
                    }
                }
            }
            _ => {
                return Err(RenderError::UnexpectedNode {
                    kind: node.kind.tag(),
                    context: "element collection",
                })
            }
        };
        self.statements.extend(statements);
        Ok(name.to_string())
    }

    /// Maps holding one entry; an absent key or value leaves the map empty
    fn emit_map(&mut self, id: NodeId) -> Result<String, RenderError> {
        let node = self.tree.node(id);
        let name = self.declared_name(id)?;
        let TypeDescriptor::Collection(collection) = &node.ty else {
            return Err(RenderError::UnexpectedNode {
                kind: node.kind.tag(),
                context: "map type",
            });
        };
        let (key, value) = self.two_children(id)?;
        let entry = if self.is_null(key) || self.is_null(value) {
            None
        } else {
            Some((self.emit(key)?, self.emit(value)?))
        };

        let ty_text = self.type_text(&node.ty);
        match (&collection.mode, entry) {
            (_, None) => {
                let outer = collection.type_short_name();
                self.statements
                    .push(format!("let {name}: {ty_text} = {outer}::new();"));
            }
            (CollectionMode::Literal, Some((k, v))) => {
                self.refs.qualify("HashMap::from");
                self.statements
                    .push(format!("let {name} = HashMap::from([({k}, {v})]);"));
            }
            (CollectionMode::Constructed(concrete), Some((k, v))) => {
                let outer = concrete.name.short();
                self.statements.push(format!("let mut {name} = {outer}::new();"));
                self.statements
                    .push(format!("{name}.{}({k}, {v});", concrete.insert));
            }
        }
        Ok(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::TraceRecorder;
    use effigy_types::{ConcreteCollection, LeafKind, Value};
    use pretty_assertions::assert_eq;

    fn person() -> TypeDescriptor {
        TypeDescriptor::named("app::Person")
    }

    fn op(name: &str, style: OperationStyle) -> NodeKind {
        NodeKind::Operation {
            name: name.to_string(),
            style,
        }
    }

    #[test]
    fn constructor_with_nested_constructor() {
        let mut rec = TraceRecorder::new();
        let root = rec.open(NodeKind::Constructor { ctor: "new".into() }, person(), 2).unwrap();
        rec.leaf(TypeDescriptor::string(), Value::Str("string".into())).unwrap();
        let addr = rec
            .open(
                NodeKind::Constructor { ctor: "new".into() },
                TypeDescriptor::named("app::Address"),
                1,
            )
            .unwrap();
        rec.leaf(LeafKind::U32.into(), Value::UInt(1)).unwrap();
        rec.close(addr).unwrap();
        rec.close(root).unwrap();

        let out = serialize(&rec.finish().unwrap()).unwrap();
        assert_eq!(
            out.statements,
            vec![
                "let address_0 = Address::new(1u32);".to_string(),
                r#"let person_0 = Person::new("string".to_string(), address_0);"#.to_string(),
            ]
        );
        assert_eq!(out.root, "person_0");
        assert!(out.imports.contains("app::Person"));
        assert!(out.imports.contains("app::Address"));
        assert!(out.qualified.contains("Person::new"));
    }

    #[test]
    fn setter_block_declares_mut_and_calls() {
        let mut rec = TraceRecorder::new();
        let root = rec.open(NodeKind::SetterBlock { ctor: "new".into() }, person(), 2).unwrap();
        let o1 = rec.open(op("set_name", OperationStyle::Call), person(), 1).unwrap();
        rec.leaf(TypeDescriptor::string(), Value::Str("a".into())).unwrap();
        rec.close(o1).unwrap();
        let o2 = rec.open(op("age", OperationStyle::FieldAssign), person(), 1).unwrap();
        rec.leaf(LeafKind::I32.into(), Value::Int(3)).unwrap();
        rec.close(o2).unwrap();
        rec.close(root).unwrap();

        let out = serialize(&rec.finish().unwrap()).unwrap();
        assert_eq!(
            out.statements,
            vec![
                "let mut person_0 = Person::new();".to_string(),
                r#"person_0.set_name("a".to_string());"#.to_string(),
                "person_0.age = 3;".to_string(),
            ]
        );
    }

    #[test]
    fn builder_chain() {
        let mut rec = TraceRecorder::new();
        let order = TypeDescriptor::named("shop::Order");
        let root = rec
            .open(
                NodeKind::BuilderBlock {
                    entry: "builder".into(),
                    terminal: "build".into(),
                },
                order.clone(),
                1,
            )
            .unwrap();
        let o = rec.open(op("id", OperationStyle::Call), order, 1).unwrap();
        rec.leaf(LeafKind::U64.into(), Value::UInt(1)).unwrap();
        rec.close(o).unwrap();
        rec.close(root).unwrap();

        let out = serialize(&rec.finish().unwrap()).unwrap();
        assert_eq!(
            out.statements,
            vec!["let order_0 = Order::builder().id(1u64).build();".to_string()]
        );
        assert!(out.qualified.contains("Order::builder"));
    }

    #[test]
    fn null_element_suppresses_insertion() {
        let mut rec = TraceRecorder::new();
        let ty = TypeDescriptor::seq(person());
        let root = rec.open(NodeKind::Sequence, ty, 1).unwrap();
        rec.null(person()).unwrap();
        rec.close(root).unwrap();

        let out = serialize(&rec.finish().unwrap()).unwrap();
        assert_eq!(
            out.statements,
            vec!["let vec_0: Vec<Person> = Vec::new();".to_string()]
        );
    }

    #[test]
    fn constructed_map_inserts_once() {
        let mut rec = TraceRecorder::new();
        let ty = TypeDescriptor::map(TypeDescriptor::string(), LeafKind::I64.into())
            .constructed(ConcreteCollection::btree_map());
        let root = rec.open(NodeKind::Map, ty, 2).unwrap();
        rec.leaf(TypeDescriptor::string(), Value::Str("k".into())).unwrap();
        rec.leaf(LeafKind::I64.into(), Value::Int(1)).unwrap();
        rec.close(root).unwrap();

        let out = serialize(&rec.finish().unwrap()).unwrap();
        assert_eq!(
            out.statements,
            vec![
                "let mut b_tree_map_0 = BTreeMap::new();".to_string(),
                r#"b_tree_map_0.insert("k".to_string(), 1i64);"#.to_string(),
            ]
        );
        assert!(out.imports.contains("std::collections::BTreeMap"));
    }

    #[test]
    fn literal_map_with_null_value_is_empty() {
        let mut rec = TraceRecorder::new();
        let ty = TypeDescriptor::map(TypeDescriptor::string(), person());
        let root = rec.open(NodeKind::Map, ty, 2).unwrap();
        rec.leaf(TypeDescriptor::string(), Value::Str("k".into())).unwrap();
        rec.null(person()).unwrap();
        rec.close(root).unwrap();

        let out = serialize(&rec.finish().unwrap()).unwrap();
        assert_eq!(
            out.statements,
            vec!["let hash_map_0: HashMap<String, Person> = HashMap::new();".to_string()]
        );
        assert!(out.imports.contains("std::collections::HashMap"));
        assert!(out.imports.contains("app::Person"));
    }

    #[test]
    fn optional_and_leaf_root() {
        let mut rec = TraceRecorder::new();
        let root = rec
            .open(NodeKind::Optional, TypeDescriptor::optional(LeafKind::Bool.into()), 1)
            .unwrap();
        rec.leaf(LeafKind::Bool.into(), Value::Bool(true)).unwrap();
        rec.close(root).unwrap();
        let out = serialize(&rec.finish().unwrap()).unwrap();
        assert!(out.statements.is_empty());
        assert_eq!(out.root, "Some(true)");
    }

    #[test]
    fn serialization_is_idempotent() {
        let mut rec = TraceRecorder::new();
        let root = rec.open(NodeKind::Factory { method: "of".into() }, person(), 1).unwrap();
        rec.leaf(TypeDescriptor::string(), Value::Str("x".into())).unwrap();
        rec.close(root).unwrap();
        let tree = rec.finish().unwrap();
        assert_eq!(serialize(&tree).unwrap(), serialize(&tree).unwrap());
    }

    #[test]
    fn empty_tree_is_an_error() {
        assert_eq!(serialize(&TraceTree::default()), Err(RenderError::EmptyTrace));
    }

    #[test]
    fn body_and_use_lines() {
        let out = SerializedTrace {
            statements: vec!["let a_0 = A::new();".into()],
            imports: BTreeSet::from(["x::A".to_string()]),
            qualified: BTreeSet::new(),
            root: "a_0".into(),
        };
        assert_eq!(out.use_lines(), vec!["use x::A;".to_string()]);
        assert_eq!(out.body(), "let a_0 = A::new();\na_0");
    }
}
