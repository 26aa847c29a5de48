//! Effigy Build Trace
//!
//! Records how a value was built as a tree of [`BuilderNode`]s and renders
//! that tree as source statements that rebuild the value.
//!
//! # Core Concepts
//!
//! - [`TraceRecorder`]: Cursor-based builder enforcing child counts
//! - [`TraceTree`]: Arena of nodes with a single root
//! - [`NameCounter`]: Per-call `type_N` symbol names
//! - [`serialize`]: Post-order statement emission with import collection
//!
//! # Example
//!
//! ```rust
//! use effigy_trace::{serialize, NodeKind, TraceRecorder};
//! use effigy_types::{TypeDescriptor, Value};
//!
//! let mut rec = TraceRecorder::new();
//! let root = rec
//!     .open(NodeKind::Constructor { ctor: "new".into() }, TypeDescriptor::named("app::Tag"), 1)
//!     .unwrap();
//! rec.leaf(TypeDescriptor::string(), Value::Str("string".into())).unwrap();
//! rec.close(root).unwrap();
//!
//! let out = serialize(&rec.finish().unwrap()).unwrap();
//! assert_eq!(out.statements, vec![r#"let tag_0 = Tag::new("string".to_string());"#]);
//! assert_eq!(out.root, "tag_0");
//! ```

#![warn(unreachable_pub)]

mod literal;
mod naming;
mod node;
mod recorder;
mod serializer;

// Re-exports
pub use literal::{render_leaf, RenderError};
pub use naming::NameCounter;
pub use node::{BuilderNode, NodeId, NodeKind, OperationStyle, TraceTree};
pub use recorder::{TraceError, TraceRecorder};
pub use serializer::{serialize, SerializedTrace, SymbolRefs, TraceSerializer};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use effigy_types::{LeafKind, TypeDescriptor, Value};
    use pretty_assertions::assert_eq;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn nested_collections_declare_inner_first() {
        let mut rec = TraceRecorder::new();
        let outer_ty = TypeDescriptor::seq(TypeDescriptor::set(LeafKind::I32.into()));
        let outer = rec.open(NodeKind::Sequence, outer_ty, 1).unwrap();
        let inner = rec
            .open(NodeKind::Set, TypeDescriptor::set(LeafKind::I32.into()), 1)
            .unwrap();
        rec.leaf(LeafKind::I32.into(), Value::Int(1)).unwrap();
        rec.close(inner).unwrap();
        rec.close(outer).unwrap();

        let tree = rec.finish().unwrap();
        let out = serialize(&tree).unwrap();
        assert_eq!(
            out.statements,
            vec![
                "let hash_set_0 = HashSet::from([1]);".to_string(),
                "let vec_0 = vec![hash_set_0];".to_string(),
            ]
        );
        assert!(out.imports.contains("std::collections::HashSet"));
        assert_eq!(
            tree.outline(),
            "sequence-literal Vec<HashSet<i32>> as vec_0\n  set-literal HashSet<i32> as hash_set_0\n    leaf-value i32\n"
        );
    }

    #[test]
    fn every_declared_symbol_precedes_its_use() {
        let mut rec = TraceRecorder::new();
        let pair = TypeDescriptor::pair(TypeDescriptor::string(), TypeDescriptor::named("a::B"));
        let root = rec.open(NodeKind::Pair, pair, 2).unwrap();
        rec.leaf(TypeDescriptor::string(), Value::Str("k".into())).unwrap();
        let b = rec
            .open(NodeKind::Factory { method: "zero".into() }, TypeDescriptor::named("a::B"), 0)
            .unwrap();
        rec.close(b).unwrap();
        rec.close(root).unwrap();

        let out = serialize(&rec.finish().unwrap()).unwrap();
        assert_eq!(
            out.statements,
            vec![
                "let b_0 = B::zero();".to_string(),
                r#"let pair_0 = ("k".to_string(), b_0);"#.to_string(),
            ]
        );
    }
}
