//! Populator
//!
//! The entry point of the engine:
//! - Owns the registry, configuration and resolved strategy order
//! - Runs one [`Session`] per populate call
//! - Hands back the value together with its build trace

use crate::adapter::{BuilderAdapter, ConventionBuilderAdapter};
use crate::config::PopulateConfig;
use crate::context::Carrier;
use crate::engine::Session;
use crate::error::PopulateError;
use crate::error::ProviderError;
use crate::provider::{DefaultValueProvider, ValueProvider};
use crate::replay::TraceReplayer;
use crate::resolver::StrategyResolver;
use crate::strategy::CustomStrategy;
use crate::writer::Fixture;
use effigy_trace::{serialize, RenderError, SerializedTrace, TraceTree};
use effigy_types::{Leaf, TypeDescriptor, TypeRegistry, Value};
use parking_lot::Mutex;
use std::sync::Arc;

/// Result of one populate call
#[derive(Debug, Clone)]
pub struct Population {
    /// Requested type
    pub ty: TypeDescriptor,
    /// Populated value
    pub value: Value,
    /// Build trace, when tracing was enabled
    pub trace: Option<TraceTree>,
}

impl Population {
    /// Render the build trace as statements
    ///
    /// # Errors
    /// [`RenderError::EmptyTrace`] when the call ran without tracing, or any
    /// rendering failure.
    pub fn serialize(&self) -> Result<SerializedTrace, PopulateError> {
        let trace = self.trace.as_ref().ok_or(RenderError::EmptyTrace)?;
        Ok(serialize(trace)?)
    }

    /// Package the rendered trace as a named fixture function
    ///
    /// # Errors
    /// As [`Population::serialize`].
    pub fn fixture(&self, name: impl Into<String>) -> Result<Fixture, PopulateError> {
        Ok(Fixture::new(name, self.ty.clone(), self.serialize()?))
    }
}

/// Provider view taking the populator's lock for one draw at a time
#[derive(Debug)]
struct SharedProvider<'p>(&'p Mutex<Box<dyn ValueProvider>>);

impl ValueProvider for SharedProvider<'_> {
    fn provide(&mut self, leaf: &Leaf<'_>) -> Result<Value, ProviderError> {
        self.0.lock().provide(leaf)
    }
}

/// Strategy-based object populator
///
/// Safe to share between threads; the value provider is the only mutable
/// state and is locked per leaf draw, so strategies may call back into the
/// same populator.
#[derive(Debug)]
pub struct Populator {
    registry: Arc<TypeRegistry>,
    config: PopulateConfig,
    provider: Mutex<Box<dyn ValueProvider>>,
    adapter: Arc<dyn BuilderAdapter>,
    resolver: StrategyResolver,
}

impl Populator {
    /// Populator with the default configuration
    #[must_use]
    pub fn new(registry: impl Into<Arc<TypeRegistry>>) -> Self {
        let config = PopulateConfig::default();
        Self {
            registry: registry.into(),
            provider: Mutex::new(Box::new(DefaultValueProvider::from_config(&config))),
            config,
            adapter: Arc::new(ConventionBuilderAdapter::default()),
            resolver: StrategyResolver::default(),
        }
    }

    /// Start configuring a populator
    #[must_use]
    pub fn builder(registry: impl Into<Arc<TypeRegistry>>) -> PopulatorBuilder {
        PopulatorBuilder::new(registry)
    }

    /// Type registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Effective configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PopulateConfig {
        &self.config
    }

    /// Produce a fully populated instance of `ty`
    ///
    /// # Errors
    /// The first [`PopulateError`] raised anywhere in the descent.
    pub fn populate(&self, ty: &TypeDescriptor) -> Result<Population, PopulateError> {
        tracing::debug!(ty = %ty, "populating");
        let mut provider = SharedProvider(&self.provider);
        let mut session = Session::new(
            &self.registry,
            &self.config,
            &mut provider,
            &*self.adapter,
            &self.resolver,
        );

        let value = match session.populate(&Carrier::root(ty.clone())) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(ty = %ty, error = %err, "population failed");
                return Err(err);
            }
        };
        let trace = session.finish()?;
        tracing::info!(
            ty = %ty,
            nodes = trace.as_ref().map_or(0, TraceTree::len),
            "populated {}",
            ty
        );
        Ok(Population {
            ty: ty.clone(),
            value,
            trace,
        })
    }

    /// Populate a named type
    ///
    /// # Errors
    /// As [`Populator::populate`].
    pub fn populate_named(&self, name: &str) -> Result<Population, PopulateError> {
        self.populate(&TypeDescriptor::named(name))
    }

    /// Rebuild the value a trace describes against this populator's registry
    ///
    /// # Errors
    /// [`PopulateError::MissingMember`] if a recorded member no longer exists,
    /// or any invocation failure.
    pub fn replay(&self, trace: &TraceTree) -> Result<Value, PopulateError> {
        TraceReplayer::new(&self.registry).replay(trace)
    }
}

/// Builder for [`Populator`]
#[derive(Debug)]
pub struct PopulatorBuilder {
    registry: Arc<TypeRegistry>,
    config: PopulateConfig,
    provider: Option<Box<dyn ValueProvider>>,
    adapter: Option<Arc<dyn BuilderAdapter>>,
    customs: Vec<Arc<dyn CustomStrategy>>,
    fallback: Option<Arc<dyn CustomStrategy>>,
}

impl PopulatorBuilder {
    /// Builder over `registry` with the default configuration
    #[must_use]
    pub fn new(registry: impl Into<Arc<TypeRegistry>>) -> Self {
        Self {
            registry: registry.into(),
            config: PopulateConfig::default(),
            provider: None,
            adapter: None,
            customs: Vec::new(),
            fallback: None,
        }
    }

    /// Set configuration
    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: PopulateConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the leaf value provider
    ///
    /// Without one, a [`DefaultValueProvider`] is derived from the config.
    #[inline]
    #[must_use]
    pub fn with_provider(mut self, provider: impl ValueProvider + 'static) -> Self {
        self.provider = Some(Box::new(provider));
        self
    }

    /// Replace the builder adapter
    #[inline]
    #[must_use]
    pub fn with_adapter(mut self, adapter: impl BuilderAdapter + 'static) -> Self {
        self.adapter = Some(Arc::new(adapter));
        self
    }

    /// Register a custom strategy the order may reference by name
    #[inline]
    #[must_use]
    pub fn with_strategy(mut self, strategy: impl CustomStrategy + 'static) -> Self {
        self.customs.push(Arc::new(strategy));
        self
    }

    /// Strategy tried after the configured order
    #[inline]
    #[must_use]
    pub fn with_fallback(mut self, strategy: impl CustomStrategy + 'static) -> Self {
        self.fallback = Some(Arc::new(strategy));
        self
    }

    /// Validate the configuration and resolve the strategy order
    ///
    /// # Errors
    /// [`PopulateError::Config`] for an invalid configuration, or
    /// [`PopulateError::UnknownStrategy`] for an unregistered name.
    pub fn build(self) -> Result<Populator, PopulateError> {
        self.config.validate()?;
        let resolver = StrategyResolver::from_config(&self.config, &self.customs, self.fallback)?;
        let provider = self
            .provider
            .unwrap_or_else(|| Box::new(DefaultValueProvider::from_config(&self.config)));
        tracing::debug!(order = ?resolver.attempted(), "populator ready");

        Ok(Populator {
            registry: self.registry,
            config: self.config,
            provider: Mutex::new(provider),
            adapter: self
                .adapter
                .unwrap_or_else(|| Arc::new(ConventionBuilderAdapter::default())),
            resolver,
        })
    }
}
