//! Population carrier and cycle guard
//!
//! A [`Carrier`] travels down every recursive populate call. It names the
//! type being populated, the composite types already in progress on the
//! active path, the trace node the value attaches under, and the depth.

use effigy_trace::NodeId;
use effigy_types::{TypeDescriptor, TypeName};

/// Composite types in progress on the active path, outermost first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleGuard {
    path: Vec<TypeName>,
}

impl CycleGuard {
    /// Whether `ty` is already in progress
    #[must_use]
    pub fn contains(&self, ty: &TypeName) -> bool {
        self.path.contains(ty)
    }

    /// Active path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &[TypeName] {
        &self.path
    }

    /// Active path closed by `ty`, for cycle reports
    #[must_use]
    pub fn cycle_through(&self, ty: &TypeName) -> Vec<TypeName> {
        let mut path = self.path.clone();
        path.push(ty.clone());
        path
    }

    fn extended(&self, ty: &TypeName) -> Self {
        Self {
            path: self.cycle_through(ty),
        }
    }
}

/// Per-descent population context
#[derive(Debug, Clone)]
pub struct Carrier {
    descriptor: TypeDescriptor,
    guard: CycleGuard,
    node: Option<NodeId>,
    depth: usize,
}

impl Carrier {
    /// Context of a top-level populate call
    #[must_use]
    pub fn root(descriptor: TypeDescriptor) -> Self {
        Self {
            descriptor,
            guard: CycleGuard::default(),
            node: None,
            depth: 0,
        }
    }

    /// Context for a constituent of this value, attaching under `node`
    #[must_use]
    pub fn child(&self, descriptor: TypeDescriptor, node: Option<NodeId>) -> Self {
        Self {
            descriptor,
            guard: self.guard.clone(),
            node,
            depth: self.depth + 1,
        }
    }

    /// Same context with `ty` marked in progress
    #[must_use]
    pub fn enter(&self, ty: &TypeName) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            guard: self.guard.extended(ty),
            node: self.node,
            depth: self.depth,
        }
    }

    /// Type to populate
    #[inline]
    #[must_use]
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// Types in progress
    #[inline]
    #[must_use]
    pub fn guard(&self) -> &CycleGuard {
        &self.guard
    }

    /// Trace node the value attaches under, `None` at the root or untraced
    #[inline]
    #[must_use]
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Nesting depth, zero at the root
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }
}
