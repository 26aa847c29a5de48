//! Error types for Effigy Core
//!
//! Provides error handling for:
//! - Strategy resolution and construction failures
//! - Cycle and depth guards
//! - Leaf value generation
//! - Configuration loading
//! - Fixture persistence

use effigy_trace::{RenderError, TraceError};
use effigy_types::{InvokeError, RegistryError, TypeDescriptor, TypeName};
use std::path::PathBuf;

/// Main population error type
///
/// Every failure aborts the whole populate call; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum PopulateError {
    /// No configured strategy applies to the type
    #[error("no strategy can construct {ty} (attempted: {})", attempted.join(", "))]
    NoMatchingStrategy {
        /// Target type
        ty: TypeName,
        /// Strategy names tried, in order
        attempted: Vec<String>,
    },

    /// An applicable strategy failed while executing
    #[error("strategy {strategy} failed to create {ty}")]
    FailedToCreateObject {
        /// Target type
        ty: TypeName,
        /// Strategy that failed
        strategy: String,
        /// Underlying cause
        #[source]
        source: Box<PopulateError>,
    },

    /// Element synthesis for a collection-like value failed
    #[error("failed to create collection {ty}")]
    FailedToCreateCollection {
        /// Collection type
        ty: TypeDescriptor,
        /// Underlying cause
        #[source]
        source: Box<PopulateError>,
    },

    /// A type is already on the active path and the policy forbids nulling
    #[error("circular dependency on {ty} via {}", path.iter().map(TypeName::as_str).collect::<Vec<_>>().join(" -> "))]
    CircularDependency {
        /// Type seen twice
        ty: TypeName,
        /// Active path from the root, ending with `ty`
        path: Vec<TypeName>,
    },

    /// No leaf value can be produced for the type
    #[error("unsupported leaf type {ty}")]
    UnsupportedType {
        /// Offending type
        ty: String,
    },

    /// Nesting went beyond the configured limit
    #[error("depth limit {limit} exceeded while populating {ty}")]
    DepthExceeded {
        /// Type at the failing depth
        ty: TypeDescriptor,
        /// Configured limit
        limit: usize,
    },

    /// A named type is not in the registry
    #[error("unknown type {0}")]
    UnknownType(TypeName),

    /// A member recorded in a trace is missing from the registry
    #[error("{ty} has no member {member} taking {arity} argument(s)")]
    MissingMember {
        /// Declaring type
        ty: TypeName,
        /// Constructor or operation name
        member: String,
        /// Recorded argument count
        arity: usize,
    },

    /// The strategy order names a strategy nobody registered
    #[error("unknown strategy {0}")]
    UnknownStrategy(String),

    /// A constructor or operation rejected its invocation
    #[error("invocation failed: {0}")]
    Invoke(#[from] InvokeError),

    /// The build trace fell out of step with population
    #[error("trace error: {0}")]
    Trace(#[from] TraceError),

    /// The build trace could not be rendered
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Configuration is invalid
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl PopulateError {
    /// Innermost error under the wrapping variants
    #[must_use]
    pub fn root_cause(&self) -> &PopulateError {
        let mut current = self;
        while let Self::FailedToCreateObject { source, .. }
        | Self::FailedToCreateCollection { source, .. } = current
        {
            current = &**source;
        }
        current
    }

    /// Check if the failure comes from the cycle guard
    #[inline]
    #[must_use]
    pub fn is_circular(&self) -> bool {
        matches!(self.root_cause(), Self::CircularDependency { .. })
    }

    /// Wrap as a strategy failure
    #[inline]
    pub(crate) fn in_strategy(self, ty: &TypeName, strategy: impl Into<String>) -> Self {
        Self::FailedToCreateObject {
            ty: ty.clone(),
            strategy: strategy.into(),
            source: Box::new(self),
        }
    }

    /// Wrap as a collection failure
    #[inline]
    pub(crate) fn in_collection(self, ty: &TypeDescriptor) -> Self {
        Self::FailedToCreateCollection {
            ty: ty.clone(),
            source: Box::new(self),
        }
    }
}

impl From<RegistryError> for PopulateError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownType(name) => Self::UnknownType(name),
            RegistryError::NotComposite(name) => Self::UnsupportedType {
                ty: name.to_string(),
            },
        }
    }
}

impl From<ProviderError> for PopulateError {
    fn from(err: ProviderError) -> Self {
        Self::UnsupportedType {
            ty: err.type_name().to_string(),
        }
    }
}

/// Value provider errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// No mapping for the leaf type
    #[error("no value mapping for {0}")]
    UnsupportedType(String),

    /// Enum without variants
    #[error("enum {0} has no variants")]
    EmptyEnum(TypeName),
}

impl ProviderError {
    /// Type the provider failed on
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::UnsupportedType(ty) => ty,
            Self::EmptyEnum(name) => name.as_str(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON parse failure
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// File could not be read
    #[error("cannot read {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// File extension is neither `toml` nor `json`
    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    /// Values parsed but are inconsistent
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Fixture writer errors
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// Fixture name is not a valid identifier
    #[error("invalid fixture name: {0:?}")]
    InvalidName(String),

    /// File could not be written
    #[error("cannot write {path}: {source}")]
    Io {
        /// Target path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
}
