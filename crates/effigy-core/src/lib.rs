//! Effigy Core - Strategy-Based Object Population
//!
//! The engine that:
//! - Classifies requested types through the type registry
//! - Picks a construction strategy per composite in configured order
//! - Fills leaves from a pluggable value provider
//! - Gives every collection-like value exactly one element
//! - Terminates cycles and runaway nesting
//! - Records a build trace that renders as reconstruction code
//!
//! # Example
//!
//! ```rust
//! use effigy_core::Populator;
//! use effigy_types::{Constructor, LeafKind, Param, TypeDef, TypeName, TypeRegistry, Value};
//!
//! let name = TypeName::new("app::Person");
//! let registry = TypeRegistry::new().with(TypeDef::new(name.clone()).constructor(
//!     Constructor::assigning(
//!         &name,
//!         "new",
//!         vec![Param::new("name", LeafKind::String), Param::new("age", LeafKind::I32)],
//!     ),
//! ));
//!
//! let population = Populator::new(registry).populate_named("app::Person").unwrap();
//! assert_eq!(population.value.field("age"), Some(&Value::Int(1)));
//!
//! let code = population.serialize().unwrap();
//! assert_eq!(code.statements, vec![r#"let person_0 = Person::new("string".to_string(), 1);"#]);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod adapter;
mod collection;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod populator;
pub mod provider;
pub mod replay;
pub mod resolver;
pub mod strategy;
pub mod writer;

// Re-exports for convenience
pub use adapter::{BuilderAdapter, BuilderPlan, ConventionBuilderAdapter};
pub use config::{
    CircularPolicy, ConstructorSelection, FactorySelection, LeafPolicy, PopulateConfig, StrategyName,
};
pub use context::{Carrier, CycleGuard};
pub use engine::Session;
pub use error::{ConfigError, PopulateError, ProviderError, WriteError};
pub use populator::{Population, Populator, PopulatorBuilder};
pub use provider::{DefaultValueProvider, ValueProvider};
pub use replay::TraceReplayer;
pub use resolver::StrategyResolver;
pub use strategy::{CustomStrategy, Strategy};
pub use writer::{DirectoryWriter, Fixture, FixtureWriter, MemoryWriter};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Effigy Core
    pub use crate::{
        CircularPolicy, CustomStrategy, LeafPolicy, PopulateConfig, PopulateError, Population,
        Populator, StrategyName,
    };
    pub use effigy_types::{TypeDescriptor, TypeRegistry, Value};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
