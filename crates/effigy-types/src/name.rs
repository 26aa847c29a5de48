//! Nominal type identity
//!
//! Provides [`TypeName`], the `::`-separated path that identifies a named
//! type in the registry and in rendered source.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Fully qualified name of a named type
///
/// # Structure
/// - `path`: module segments (`["app", "model"]`)
/// - `short`: the type's own name (`"Person"`)
///
/// A name without `::` has no module path and never needs an import.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TypeName(String);

impl TypeName {
    /// Create from a path such as `app::model::Person`
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Full path as written
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment
    #[must_use]
    pub fn short(&self) -> &str {
        self.0.rsplit("::").next().unwrap_or(&self.0)
    }

    /// Module path without the last segment, if any
    #[must_use]
    pub fn module(&self) -> Option<&str> {
        self.0.rfind("::").map(|idx| &self.0[..idx])
    }

    /// Whether the name carries a module path and must be imported
    #[inline]
    #[must_use]
    pub fn is_qualified(&self) -> bool {
        self.0.contains("::")
    }
}

impl Display for TypeName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TypeName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<TypeName> for String {
    fn from(value: TypeName) -> Self {
        value.0
    }
}
