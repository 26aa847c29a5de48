//! Build-trace nodes
//!
//! [`TraceTree`] is an arena of [`BuilderNode`]s addressed by [`NodeId`].
//! Parent/child links are indices, so the tree owns every node exactly once.

use effigy_types::{TypeDescriptor, Value};
use std::fmt;

/// Index of a node in its [`TraceTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Arena position
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How an operation node applies its arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationStyle {
    /// Direct field assignment (`x.field = arg`)
    FieldAssign,

    /// Method call (`x.method(args)`)
    Call,
}

/// Node kind tag
///
/// Block kinds carry the member names needed to render and replay them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Constructor call; children are its arguments
    Constructor {
        /// Constructor name
        ctor: String,
    },

    /// No-arg construction then field assignments; children are operations
    FieldBlock {
        /// No-arg constructor name
        ctor: String,
    },

    /// No-arg construction then setter calls; children are operations
    SetterBlock {
        /// No-arg constructor name
        ctor: String,
    },

    /// Construction then mutator calls
    ///
    /// The first `init_args` children are constructor arguments, the rest are
    /// operations.
    MutatorBlock {
        /// Constructor name
        ctor: String,
        /// Number of constructor arguments among the children
        init_args: usize,
    },

    /// Builder entry, chained operations, terminal; children are operations
    BuilderBlock {
        /// Static entry operation on the target type
        entry: String,
        /// Terminal operation on the builder
        terminal: String,
    },

    /// Static factory call; children are its arguments
    Factory {
        /// Factory operation name
        method: String,
    },

    /// One member application; children are its arguments
    Operation {
        /// Field or method name
        name: String,
        /// Assignment or call
        style: OperationStyle,
    },

    /// Sequence with one element
    Sequence,

    /// Set with one element
    Set,

    /// Map with one key and one value
    Map,

    /// Pair of key and value
    Pair,

    /// Array with one element
    Array,

    /// Optional wrapping its single child
    Optional,

    /// Provider-produced literal
    Leaf,

    /// Absent value
    Null,
}

impl NodeKind {
    /// Whether nodes of this kind declare a named symbol
    #[must_use]
    pub fn declares(&self) -> bool {
        !matches!(
            self,
            NodeKind::Operation { .. } | NodeKind::Optional | NodeKind::Leaf | NodeKind::Null
        )
    }

    /// Short tag for logs
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::Constructor { .. } => "constructor",
            NodeKind::FieldBlock { .. } => "field-block",
            NodeKind::SetterBlock { .. } => "setter-block",
            NodeKind::MutatorBlock { .. } => "mutator-block",
            NodeKind::BuilderBlock { .. } => "builder-block",
            NodeKind::Factory { .. } => "factory",
            NodeKind::Operation { .. } => "operation",
            NodeKind::Sequence => "sequence-literal",
            NodeKind::Set => "set-literal",
            NodeKind::Map => "map-literal",
            NodeKind::Pair => "pair-literal",
            NodeKind::Array => "array-literal",
            NodeKind::Optional => "optional",
            NodeKind::Leaf => "leaf-value",
            NodeKind::Null => "null-leaf",
        }
    }
}

/// One node of the build trace
#[derive(Debug, Clone)]
pub struct BuilderNode {
    /// Kind tag
    pub kind: NodeKind,

    /// Type this node builds (the owner type for operations)
    pub ty: TypeDescriptor,

    /// Declared symbol, for declaring kinds
    pub name: Option<String>,

    /// Number of children this node must receive
    pub expected: usize,

    /// Children in attachment order
    pub children: Vec<NodeId>,

    /// Parent, absent for the root
    pub parent: Option<NodeId>,

    /// Literal for leaf nodes
    pub literal: Option<Value>,
}

impl BuilderNode {
    /// Whether every expected child has been attached
    #[inline]
    #[must_use]
    pub fn is_saturated(&self) -> bool {
        self.children.len() == self.expected
    }
}

/// Arena of build-trace nodes with a single root
#[derive(Debug, Clone, Default)]
pub struct TraceTree {
    pub(crate) nodes: Vec<BuilderNode>,
    pub(crate) root: Option<NodeId>,
}

impl TraceTree {
    /// Root node, if any node was recorded
    #[inline]
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Node by id
    ///
    /// # Panics
    /// Panics if `id` does not belong to this tree.
    #[inline]
    #[must_use]
    pub fn node(&self, id: NodeId) -> &BuilderNode {
        &self.nodes[id.0]
    }

    /// Node by id, if present
    #[inline]
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&BuilderNode> {
        self.nodes.get(id.0)
    }

    /// Children of `id`
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Number of nodes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node was recorded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in creation (pre-order) order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &BuilderNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Indented outline of the tree, one node per line
    #[must_use]
    pub fn outline(&self) -> String {
        let mut out = String::new();
        if let Some(root) = self.root {
            self.outline_into(root, 0, &mut out);
        }
        out
    }

    fn outline_into(&self, id: NodeId, depth: usize, out: &mut String) {
        let node = self.node(id);
        out.push_str(&"  ".repeat(depth));
        out.push_str(node.kind.tag());
        out.push(' ');
        out.push_str(&node.ty.to_string());
        if let Some(name) = &node.name {
            out.push_str(" as ");
            out.push_str(name);
        }
        out.push('\n');
        for child in &node.children {
            self.outline_into(*child, depth + 1, out);
        }
    }
}
