//! Type descriptors
//!
//! [`TypeDescriptor`] identifies what the engine is asked to populate: a leaf,
//! a named type resolved through the registry, an optional, an array, or a
//! collection-like shape with its type arguments.

use crate::name::TypeName;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Built-in leaf types producible without decomposition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafKind {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
    Uuid,
    Date,
    DateTime,
    Duration,
}

impl LeafKind {
    /// All built-in leaf kinds
    pub const ALL: [LeafKind; 17] = [
        LeafKind::Bool,
        LeafKind::Char,
        LeafKind::I8,
        LeafKind::I16,
        LeafKind::I32,
        LeafKind::I64,
        LeafKind::U8,
        LeafKind::U16,
        LeafKind::U32,
        LeafKind::U64,
        LeafKind::F32,
        LeafKind::F64,
        LeafKind::String,
        LeafKind::Uuid,
        LeafKind::Date,
        LeafKind::DateTime,
        LeafKind::Duration,
    ];

    /// Type name as written in source
    #[must_use]
    pub fn rust_name(self) -> &'static str {
        match self {
            LeafKind::Bool => "bool",
            LeafKind::Char => "char",
            LeafKind::I8 => "i8",
            LeafKind::I16 => "i16",
            LeafKind::I32 => "i32",
            LeafKind::I64 => "i64",
            LeafKind::U8 => "u8",
            LeafKind::U16 => "u16",
            LeafKind::U32 => "u32",
            LeafKind::U64 => "u64",
            LeafKind::F32 => "f32",
            LeafKind::F64 => "f64",
            LeafKind::String => "String",
            LeafKind::Uuid => "Uuid",
            LeafKind::Date => "NaiveDate",
            LeafKind::DateTime => "DateTime<Utc>",
            LeafKind::Duration => "Duration",
        }
    }

    /// Paths that must be imported to name this type
    #[must_use]
    pub fn imports(self) -> &'static [&'static str] {
        match self {
            LeafKind::Uuid => &["uuid::Uuid"],
            LeafKind::Date => &["chrono::NaiveDate"],
            LeafKind::DateTime => &["chrono::DateTime", "chrono::Utc"],
            LeafKind::Duration => &["std::time::Duration"],
            _ => &[],
        }
    }

    /// Whether this is a signed or unsigned integer kind
    #[inline]
    #[must_use]
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            LeafKind::I8
                | LeafKind::I16
                | LeafKind::I32
                | LeafKind::I64
                | LeafKind::U8
                | LeafKind::U16
                | LeafKind::U32
                | LeafKind::U64
        )
    }
}

/// A concrete, constructible collection
///
/// Populated by instantiating it empty and calling `insert` once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConcreteCollection {
    /// Collection type path, e.g. `std::collections::VecDeque`
    pub name: TypeName,

    /// Single-element insertion operation, e.g. `push_back`
    pub insert: String,
}

impl ConcreteCollection {
    /// Create a concrete collection description
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<TypeName>, insert: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            insert: insert.into(),
        }
    }

    /// `Vec` filled with `push`
    #[must_use]
    pub fn vec() -> Self {
        Self::new("Vec", "push")
    }

    /// `std::collections::VecDeque` filled with `push_back`
    #[must_use]
    pub fn vec_deque() -> Self {
        Self::new("std::collections::VecDeque", "push_back")
    }

    /// `std::collections::BTreeSet` filled with `insert`
    #[must_use]
    pub fn btree_set() -> Self {
        Self::new("std::collections::BTreeSet", "insert")
    }

    /// `std::collections::BTreeMap` filled with `insert`
    #[must_use]
    pub fn btree_map() -> Self {
        Self::new("std::collections::BTreeMap", "insert")
    }
}

/// How a collection is materialized
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum CollectionMode {
    /// The abstract collection: an inline immutable literal
    #[default]
    Literal,

    /// A concrete collection: instantiate empty, then insert
    Constructed(ConcreteCollection),
}

/// Collection-like shapes and their type arguments
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CollectionShape {
    /// Ordered sequence of elements
    Sequence(Box<TypeDescriptor>),

    /// Unique-element set
    Set(Box<TypeDescriptor>),

    /// Key-value map
    Map(Box<TypeDescriptor>, Box<TypeDescriptor>),

    /// Pair / entry
    Pair(Box<TypeDescriptor>, Box<TypeDescriptor>),
}

/// A collection descriptor: shape plus materialization mode
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionDescriptor {
    /// Element / key / value structure
    pub shape: CollectionShape,

    /// Literal or constructed
    pub mode: CollectionMode,
}

impl CollectionDescriptor {
    /// Type name of the collection in its literal form
    #[must_use]
    pub fn literal_name(&self) -> &'static str {
        match self.shape {
            CollectionShape::Sequence(_) => "Vec",
            CollectionShape::Set(_) => "HashSet",
            CollectionShape::Map(..) => "HashMap",
            CollectionShape::Pair(..) => "Pair",
        }
    }

    /// Import path of the literal collection type, if not in the prelude
    #[must_use]
    pub fn literal_import(&self) -> Option<&'static str> {
        match self.shape {
            CollectionShape::Set(_) => Some("std::collections::HashSet"),
            CollectionShape::Map(..) => Some("std::collections::HashMap"),
            CollectionShape::Sequence(_) | CollectionShape::Pair(..) => None,
        }
    }

    /// Short type name, whichever mode is active
    #[must_use]
    pub fn type_short_name(&self) -> &str {
        match &self.mode {
            CollectionMode::Literal => self.literal_name(),
            CollectionMode::Constructed(concrete) => concrete.name.short(),
        }
    }
}

/// Descriptor of a type the engine can populate
///
/// Immutable and structurally comparable. Named types are classified through
/// the registry (composite, enum or opaque leaf).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    /// Built-in leaf
    Leaf(LeafKind),

    /// Registered type
    Named(TypeName),

    /// Optional value of the inner type
    Optional(Box<TypeDescriptor>),

    /// Array of the element type
    Array(Box<TypeDescriptor>),

    /// Collection-like shape
    Collection(CollectionDescriptor),
}

impl TypeDescriptor {
    /// Leaf descriptor
    #[inline]
    #[must_use]
    pub fn leaf(kind: LeafKind) -> Self {
        Self::Leaf(kind)
    }

    /// `String` leaf
    #[inline]
    #[must_use]
    pub fn string() -> Self {
        Self::Leaf(LeafKind::String)
    }

    /// Registered named type
    #[inline]
    #[must_use]
    pub fn named(name: impl Into<TypeName>) -> Self {
        Self::Named(name.into())
    }

    /// Optional of `inner`
    #[inline]
    #[must_use]
    pub fn optional(inner: TypeDescriptor) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// Array of `element`
    #[inline]
    #[must_use]
    pub fn array(element: TypeDescriptor) -> Self {
        Self::Array(Box::new(element))
    }

    /// Literal sequence of `element`
    #[must_use]
    pub fn seq(element: TypeDescriptor) -> Self {
        Self::collection(CollectionShape::Sequence(Box::new(element)))
    }

    /// Literal set of `element`
    #[must_use]
    pub fn set(element: TypeDescriptor) -> Self {
        Self::collection(CollectionShape::Set(Box::new(element)))
    }

    /// Literal map from `key` to `value`
    #[must_use]
    pub fn map(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        Self::collection(CollectionShape::Map(Box::new(key), Box::new(value)))
    }

    /// Pair of `key` and `value`
    #[must_use]
    pub fn pair(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        Self::collection(CollectionShape::Pair(Box::new(key), Box::new(value)))
    }

    fn collection(shape: CollectionShape) -> Self {
        Self::Collection(CollectionDescriptor {
            shape,
            mode: CollectionMode::Literal,
        })
    }

    /// Switch a collection descriptor to constructed mode
    ///
    /// Non-collection descriptors are returned unchanged.
    #[must_use]
    pub fn constructed(self, concrete: ConcreteCollection) -> Self {
        match self {
            Self::Collection(mut collection) => {
                collection.mode = CollectionMode::Constructed(concrete);
                Self::Collection(collection)
            }
            other => other,
        }
    }

    /// Named type, if this descriptor is one
    #[inline]
    #[must_use]
    pub fn as_named(&self) -> Option<&TypeName> {
        match self {
            Self::Named(name) => Some(name),
            _ => None,
        }
    }

    /// Whether this is collection-like (sequence, set, map, pair) or an array
    #[inline]
    #[must_use]
    pub fn is_collection_like(&self) -> bool {
        matches!(self, Self::Collection(_) | Self::Array(_))
    }

    /// Identity used for per-type symbol naming
    #[must_use]
    pub fn identity(&self) -> String {
        match self {
            Self::Leaf(kind) => kind.rust_name().to_string(),
            Self::Named(name) => name.short().to_string(),
            Self::Optional(inner) => inner.identity(),
            Self::Array(_) => "Array".to_string(),
            Self::Collection(collection) => collection.type_short_name().to_string(),
        }
    }

    /// Whether `name` occurs anywhere in this descriptor
    #[must_use]
    pub fn mentions(&self, name: &TypeName) -> bool {
        match self {
            Self::Leaf(_) => false,
            Self::Named(own) => own == name,
            Self::Optional(inner) | Self::Array(inner) => inner.mentions(name),
            Self::Collection(collection) => match &collection.shape {
                CollectionShape::Sequence(e) | CollectionShape::Set(e) => e.mentions(name),
                CollectionShape::Map(k, v) | CollectionShape::Pair(k, v) => {
                    k.mentions(name) || v.mentions(name)
                }
            },
        }
    }
}

impl From<LeafKind> for TypeDescriptor {
    fn from(kind: LeafKind) -> Self {
        Self::Leaf(kind)
    }
}

impl Display for TypeDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(kind) => f.write_str(kind.rust_name()),
            Self::Named(name) => f.write_str(name.short()),
            Self::Optional(inner) => write!(f, "Option<{inner}>"),
            Self::Array(inner) => write!(f, "[{inner}; 1]"),
            Self::Collection(collection) => {
                let outer = collection.type_short_name();
                match &collection.shape {
                    CollectionShape::Pair(k, v) => write!(f, "({k}, {v})"),
                    CollectionShape::Sequence(e) | CollectionShape::Set(e) => {
                        write!(f, "{outer}<{e}>")
                    }
                    CollectionShape::Map(k, v) => write!(f, "{outer}<{k}, {v}>"),
                }
            }
        }
    }
}
