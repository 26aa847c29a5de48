//! Descriptor registry
//!
//! Provides [`TypeRegistry`], the table of named type definitions the engine
//! introspects instead of runtime reflection, and [`Classification`], the
//! engine's view of a [`TypeDescriptor`].

use crate::descriptor::{CollectionDescriptor, LeafKind, TypeDescriptor};
use crate::member::{Constructor, Field, Method};
use crate::name::TypeName;
use indexmap::IndexMap;
use std::collections::HashSet;

/// Registry lookup errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Named type was never registered
    #[error("unknown type: {0}")]
    UnknownType(TypeName),

    /// Named type is registered but is not a composite
    #[error("{0} is not a composite type")]
    NotComposite(TypeName),
}

/// Definition of a composite (user-defined) type
#[derive(Debug, Clone)]
pub struct TypeDef {
    /// Type identity
    pub name: TypeName,

    /// Parent type whose members are inherited
    pub parent: Option<TypeName>,

    /// Declared fields in order
    pub fields: Vec<Field>,

    /// Declared constructors in order
    pub constructors: Vec<Constructor>,

    /// Declared operations in order
    pub methods: Vec<Method>,
}

impl TypeDef {
    /// Empty definition
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            fields: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Inherit from `parent`
    #[inline]
    #[must_use]
    pub fn extends(mut self, parent: impl Into<TypeName>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Add a field
    #[inline]
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a constructor
    #[inline]
    #[must_use]
    pub fn constructor(mut self, constructor: Constructor) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Add an operation
    #[inline]
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    /// Accessible no-argument constructor, if declared
    #[must_use]
    pub fn no_arg_constructor(&self) -> Option<&Constructor> {
        self.constructors
            .iter()
            .find(|c| c.accessible && c.params.is_empty())
    }

    /// Constructor by name and arity
    #[must_use]
    pub fn find_constructor(&self, name: &str, arity: usize) -> Option<&Constructor> {
        self.constructors
            .iter()
            .find(|c| c.name == name && c.arity() == arity)
    }

    /// Declared operation by name and arity
    #[must_use]
    pub fn find_method(&self, name: &str, arity: usize) -> Option<&Method> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.arity() == arity)
    }
}

/// Definition of an enum; populated as a leaf
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    /// Type identity
    pub name: TypeName,

    /// Variant names in declaration order
    pub variants: Vec<String>,
}

impl EnumDef {
    /// Create an enum definition
    #[must_use]
    pub fn new<I, S>(name: impl Into<TypeName>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }
}

/// A registry entry
#[derive(Debug, Clone)]
pub enum TypeEntry {
    /// User-defined composite
    Composite(TypeDef),

    /// Enum, populated as a leaf
    Enum(EnumDef),

    /// Leaf type known only to a custom value provider
    Opaque(TypeName),
}

impl TypeEntry {
    /// Identity of the entry
    #[must_use]
    pub fn name(&self) -> &TypeName {
        match self {
            TypeEntry::Composite(def) => &def.name,
            TypeEntry::Enum(def) => &def.name,
            TypeEntry::Opaque(name) => name,
        }
    }
}

impl From<TypeDef> for TypeEntry {
    fn from(def: TypeDef) -> Self {
        TypeEntry::Composite(def)
    }
}

impl From<EnumDef> for TypeEntry {
    fn from(def: EnumDef) -> Self {
        TypeEntry::Enum(def)
    }
}

/// A leaf request handed to a value provider
#[derive(Debug, Clone, Copy)]
pub enum Leaf<'a> {
    /// Built-in leaf
    Builtin(LeafKind),

    /// Registered enum
    Enum(&'a EnumDef),

    /// Registered opaque type
    Opaque(&'a TypeName),
}

impl Leaf<'_> {
    /// Descriptor of the leaf
    #[must_use]
    pub fn descriptor(&self) -> TypeDescriptor {
        match self {
            Leaf::Builtin(kind) => TypeDescriptor::Leaf(*kind),
            Leaf::Enum(def) => TypeDescriptor::Named(def.name.clone()),
            Leaf::Opaque(name) => TypeDescriptor::Named((*name).clone()),
        }
    }
}

/// Engine view of a descriptor
#[derive(Debug, Clone, Copy)]
pub enum Classification<'a> {
    /// Directly producible
    Leaf(Leaf<'a>),

    /// Optional of the inner descriptor
    Optional(&'a TypeDescriptor),

    /// Array of the element descriptor
    Array(&'a TypeDescriptor),

    /// Collection-like shape
    Collection(&'a CollectionDescriptor),

    /// User-defined composite
    Composite(&'a TypeDef),
}

/// Table of registered types
///
/// Registration order is preserved; re-registering a name replaces the entry.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    entries: IndexMap<TypeName, TypeEntry>,
}

impl TypeRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry, returning the one it replaced
    pub fn register(&mut self, entry: impl Into<TypeEntry>) -> Option<TypeEntry> {
        let entry = entry.into();
        self.entries.insert(entry.name().clone(), entry)
    }

    /// Register an opaque leaf type
    pub fn register_opaque(&mut self, name: impl Into<TypeName>) -> Option<TypeEntry> {
        self.register(TypeEntry::Opaque(name.into()))
    }

    /// Builder-style registration
    #[inline]
    #[must_use]
    pub fn with(mut self, entry: impl Into<TypeEntry>) -> Self {
        self.register(entry);
        self
    }

    /// Look up an entry
    #[inline]
    #[must_use]
    pub fn get(&self, name: &TypeName) -> Option<&TypeEntry> {
        self.entries.get(name)
    }

    /// Check if a name is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &TypeName) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of registered entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all entries in registration order
    pub fn iter(&self) -> impl Iterator<Item = &TypeEntry> {
        self.entries.values()
    }

    /// Composite definition by name
    ///
    /// # Errors
    /// [`RegistryError::UnknownType`] or [`RegistryError::NotComposite`].
    pub fn composite(&self, name: &TypeName) -> Result<&TypeDef, RegistryError> {
        match self.entries.get(name) {
            Some(TypeEntry::Composite(def)) => Ok(def),
            Some(_) => Err(RegistryError::NotComposite(name.clone())),
            None => Err(RegistryError::UnknownType(name.clone())),
        }
    }

    /// Classify a descriptor for the engine
    ///
    /// # Errors
    /// [`RegistryError::UnknownType`] for unregistered named types.
    pub fn classify<'a>(&'a self, ty: &'a TypeDescriptor) -> Result<Classification<'a>, RegistryError> {
        Ok(match ty {
            TypeDescriptor::Leaf(kind) => Classification::Leaf(Leaf::Builtin(*kind)),
            TypeDescriptor::Optional(inner) => Classification::Optional(inner),
            TypeDescriptor::Array(inner) => Classification::Array(inner),
            TypeDescriptor::Collection(collection) => Classification::Collection(collection),
            TypeDescriptor::Named(name) => match self.entries.get(name) {
                Some(TypeEntry::Composite(def)) => Classification::Composite(def),
                Some(TypeEntry::Enum(def)) => Classification::Leaf(Leaf::Enum(def)),
                Some(TypeEntry::Opaque(name)) => Classification::Leaf(Leaf::Opaque(name)),
                None => return Err(RegistryError::UnknownType(name.clone())),
            },
        })
    }

    /// Ancestor chain of `def`, root-most first, ending with `def`
    ///
    /// Unregistered or non-composite parents end the chain; a parent cycle is
    /// cut at the first repeated name.
    #[must_use]
    pub fn lineage<'a>(&'a self, def: &'a TypeDef) -> Vec<&'a TypeDef> {
        let mut chain = vec![def];
        let mut seen: HashSet<&TypeName> = HashSet::from([&def.name]);
        let mut current = def;
        while let Some(parent) = &current.parent {
            let Ok(parent_def) = self.composite(parent) else {
                break;
            };
            if !seen.insert(&parent_def.name) {
                break;
            }
            chain.push(parent_def);
            current = parent_def;
        }
        chain.reverse();
        chain
    }

    /// Fields of `def` including inherited ones, parents first
    #[must_use]
    pub fn fields_of<'a>(&'a self, def: &'a TypeDef) -> Vec<&'a Field> {
        let mut fields: Vec<&Field> = Vec::new();
        for ty in self.lineage(def) {
            for field in &ty.fields {
                if let Some(slot) = fields.iter_mut().find(|f| f.name == field.name) {
                    *slot = field;
                } else {
                    fields.push(field);
                }
            }
        }
        fields
    }

    /// Operations of `def` including inherited ones, parents first
    ///
    /// A child operation with the same name and arity overrides its parent's
    /// in place.
    #[must_use]
    pub fn methods_of<'a>(&'a self, def: &'a TypeDef) -> Vec<&'a Method> {
        let mut methods: Vec<&Method> = Vec::new();
        for ty in self.lineage(def) {
            for method in &ty.methods {
                if let Some(slot) = methods
                    .iter_mut()
                    .find(|m| m.name == method.name && m.arity() == method.arity())
                {
                    *slot = method;
                } else {
                    methods.push(method);
                }
            }
        }
        methods
    }

    /// Operation by name and arity, searching inherited operations too
    #[must_use]
    pub fn find_method<'a>(&'a self, def: &'a TypeDef, name: &str, arity: usize) -> Option<&'a Method> {
        self.methods_of(def)
            .into_iter()
            .find(|m| m.name == name && m.arity() == arity)
    }
}
