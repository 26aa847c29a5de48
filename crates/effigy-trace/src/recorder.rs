//! Build-trace recorder
//!
//! [`TraceRecorder`] builds a [`TraceTree`] with a cursor discipline:
//! `open` attaches a node under the cursor and descends into it, `close`
//! ascends once the node holds every child it declared.

use crate::naming::NameCounter;
use crate::node::{BuilderNode, NodeId, NodeKind, TraceTree};
use effigy_types::{TypeDescriptor, Value};

/// Recorder protocol violations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TraceError {
    /// A node was opened under a parent that already has all its children
    #[error("node {parent} already holds its {expected} children")]
    Oversaturated {
        /// Saturated parent
        parent: NodeId,
        /// Its declared child count
        expected: usize,
    },

    /// A node was closed before receiving all its children
    #[error("node {node} closed with {actual} of {expected} children")]
    Unsaturated {
        /// Node being closed
        node: NodeId,
        /// Declared child count
        expected: usize,
        /// Attached child count
        actual: usize,
    },

    /// `close` named a node other than the cursor
    #[error("closing {node} but the cursor is at {cursor:?}")]
    Misaligned {
        /// Node being closed
        node: NodeId,
        /// Current cursor
        cursor: Option<NodeId>,
    },

    /// The cursor is not at the node a caller descended from
    #[error("expected the cursor at {expected:?}, found {cursor:?}")]
    Detached {
        /// Node the caller descended from
        expected: Option<NodeId>,
        /// Current cursor
        cursor: Option<NodeId>,
    },

    /// A second root was opened
    #[error("trace already has a root")]
    MultipleRoots,

    /// The trace was finished with nodes still open
    #[error("trace finished with node {0} still open")]
    Unfinished(NodeId),

    /// The trace was finished without any node
    #[error("trace is empty")]
    Empty,
}

/// Cursor-based tree builder
#[derive(Debug, Default)]
pub struct TraceRecorder {
    tree: TraceTree,
    cursor: Option<NodeId>,
    names: NameCounter,
}

impl TraceRecorder {
    /// Create new recorder with fresh name counters
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Node the next `open` attaches under
    #[inline]
    #[must_use]
    pub fn cursor(&self) -> Option<NodeId> {
        self.cursor
    }

    /// Tree recorded so far
    #[inline]
    #[must_use]
    pub fn tree(&self) -> &TraceTree {
        &self.tree
    }

    /// Open a node expecting `expected` children and move the cursor to it
    ///
    /// Declaring kinds receive a fresh per-type name.
    ///
    /// # Errors
    /// [`TraceError::Oversaturated`] if the cursor node is already full,
    /// [`TraceError::MultipleRoots`] if a root exists and the cursor is at the top.
    pub fn open(
        &mut self,
        kind: NodeKind,
        ty: TypeDescriptor,
        expected: usize,
    ) -> Result<NodeId, TraceError> {
        self.attach(kind, ty, expected, None)
    }

    /// Record a leaf literal; the cursor does not move
    ///
    /// # Errors
    /// As [`TraceRecorder::open`].
    pub fn leaf(&mut self, ty: TypeDescriptor, value: Value) -> Result<NodeId, TraceError> {
        let id = self.attach(NodeKind::Leaf, ty, 0, Some(value))?;
        self.close(id)?;
        Ok(id)
    }

    /// Record an absent value; the cursor does not move
    ///
    /// # Errors
    /// As [`TraceRecorder::open`].
    pub fn null(&mut self, ty: TypeDescriptor) -> Result<NodeId, TraceError> {
        let id = self.attach(NodeKind::Null, ty, 0, None)?;
        self.close(id)?;
        Ok(id)
    }

    fn attach(
        &mut self,
        kind: NodeKind,
        ty: TypeDescriptor,
        expected: usize,
        literal: Option<Value>,
    ) -> Result<NodeId, TraceError> {
        match self.cursor {
            Some(parent) => {
                let parent_node = &self.tree.nodes[parent.0];
                if parent_node.is_saturated() {
                    return Err(TraceError::Oversaturated {
                        parent,
                        expected: parent_node.expected,
                    });
                }
            }
            None if self.tree.root.is_some() => return Err(TraceError::MultipleRoots),
            None => {}
        }

        let name = kind.declares().then(|| self.names.next_for(&ty));
        let id = NodeId(self.tree.nodes.len());
        tracing::trace!(node = %id, kind = kind.tag(), ty = %ty, expected, "open trace node");
        self.tree.nodes.push(BuilderNode {
            kind,
            ty,
            name,
            expected,
            children: Vec::with_capacity(expected),
            parent: self.cursor,
            literal,
        });

        match self.cursor {
            Some(parent) => self.tree.nodes[parent.0].children.push(id),
            None => self.tree.root = Some(id),
        }
        self.cursor = Some(id);
        Ok(id)
    }

    /// Close the cursor node and ascend to its parent
    ///
    /// # Errors
    /// [`TraceError::Misaligned`] if `id` is not the cursor,
    /// [`TraceError::Unsaturated`] if it is missing children.
    pub fn close(&mut self, id: NodeId) -> Result<(), TraceError> {
        if self.cursor != Some(id) {
            return Err(TraceError::Misaligned {
                node: id,
                cursor: self.cursor,
            });
        }
        let node = &self.tree.nodes[id.0];
        if !node.is_saturated() {
            return Err(TraceError::Unsaturated {
                node: id,
                expected: node.expected,
                actual: node.children.len(),
            });
        }
        self.cursor = node.parent;
        Ok(())
    }

    /// Check that the cursor is at `expected`
    ///
    /// # Errors
    /// [`TraceError::Detached`] otherwise.
    pub fn expect_cursor(&self, expected: Option<NodeId>) -> Result<(), TraceError> {
        if self.cursor == expected {
            Ok(())
        } else {
            Err(TraceError::Detached {
                expected,
                cursor: self.cursor,
            })
        }
    }

    /// Finish recording
    ///
    /// # Errors
    /// [`TraceError::Unfinished`] if a node is still open,
    /// [`TraceError::Empty`] if nothing was recorded.
    pub fn finish(self) -> Result<TraceTree, TraceError> {
        if let Some(open) = self.cursor {
            return Err(TraceError::Unfinished(open));
        }
        if self.tree.root.is_none() {
            return Err(TraceError::Empty);
        }
        Ok(self.tree)
    }
}
