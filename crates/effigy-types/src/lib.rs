//! Effigy Type Model
//!
//! Descriptors, dynamic values and the descriptor registry that stand in for
//! runtime reflection.
//!
//! # Core Concepts
//!
//! - [`TypeDescriptor`]: What to populate (leaf, named, optional, array, collection)
//! - [`TypeRegistry`]: Named type definitions with constructors, fields and operations
//! - [`Value`]: Dynamic instance produced by the engine
//! - [`Constructor`], [`Field`], [`Method`]: Introspectable members
//!
//! # Example
//!
//! ```rust
//! use effigy_types::{Constructor, Field, LeafKind, Param, TypeDef, TypeName, TypeRegistry};
//!
//! let name = TypeName::new("app::Point");
//! let point = TypeDef::new(name.clone())
//!     .field(Field::new("x", LeafKind::I32))
//!     .field(Field::new("y", LeafKind::I32))
//!     .constructor(Constructor::assigning(
//!         &name,
//!         "new",
//!         vec![Param::new("x", LeafKind::I32), Param::new("y", LeafKind::I32)],
//!     ));
//!
//! let registry = TypeRegistry::new().with(point);
//! assert!(registry.contains(&name));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod descriptor;
mod member;
mod name;
mod registry;
mod value;

// Re-exports
pub use descriptor::{
    CollectionDescriptor, CollectionMode, CollectionShape, ConcreteCollection, LeafKind,
    TypeDescriptor,
};
pub use member::{
    Constructor, ConstructorFn, Field, InstanceFn, InvokeError, Method, MethodBody, Param,
    Returns, StaticFn,
};
pub use name::TypeName;
pub use registry::{
    Classification, EnumDef, Leaf, RegistryError, TypeDef, TypeEntry, TypeRegistry,
};
pub use value::{Object, Value};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
