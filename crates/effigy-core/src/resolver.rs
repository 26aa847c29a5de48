//! Strategy resolver
//!
//! Walks the configured strategy order and hands a composite to the first
//! strategy whose applicability check passes. An optional fallback gets the
//! last word before resolution fails.

use crate::config::PopulateConfig;
use crate::context::Carrier;
use crate::engine::Session;
use crate::error::PopulateError;
use crate::strategy::{CustomStrategy, Strategy};
use effigy_types::{TypeDef, Value};
use std::sync::Arc;

/// Ordered strategy dispatch
#[derive(Debug, Clone)]
pub struct StrategyResolver {
    order: Vec<Strategy>,
    fallback: Option<Strategy>,
}

impl StrategyResolver {
    /// Build from the configured order
    ///
    /// # Errors
    /// [`PopulateError::UnknownStrategy`] if the order names a custom
    /// strategy missing from `customs`.
    pub fn from_config(
        config: &PopulateConfig,
        customs: &[Arc<dyn CustomStrategy>],
        fallback: Option<Arc<dyn CustomStrategy>>,
    ) -> Result<Self, PopulateError> {
        let order = config
            .strategy_order
            .iter()
            .map(|name| Strategy::from_name(name, customs))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            order,
            fallback: fallback.map(Strategy::Custom),
        })
    }

    /// Strategies in the order they are tried
    #[inline]
    #[must_use]
    pub fn order(&self) -> &[Strategy] {
        &self.order
    }

    /// Names in the order they are tried
    #[must_use]
    pub fn attempted(&self) -> Vec<String> {
        self.order.iter().map(|s| s.name().to_string()).collect()
    }

    /// Construct `def` with the first applicable strategy
    ///
    /// # Errors
    /// [`PopulateError::NoMatchingStrategy`] if nothing applies, otherwise
    /// the strategy failure wrapped as [`PopulateError::FailedToCreateObject`].
    pub fn resolve(&self, def: &TypeDef, carrier: &Carrier, session: &mut Session<'_>) -> Result<Value, PopulateError> {
        let chosen = self
            .order
            .iter()
            .chain(self.fallback.as_ref())
            .find(|strategy| strategy.applicable(def, session));

        let Some(strategy) = chosen else {
            tracing::debug!(ty = %def.name, "no applicable strategy");
            return Err(PopulateError::NoMatchingStrategy {
                ty: def.name.clone(),
                attempted: self.attempted(),
            });
        };

        tracing::debug!(ty = %def.name, strategy = strategy.name(), depth = carrier.depth(), "resolved strategy");
        strategy
            .apply(def, carrier, session)
            .map_err(|err| err.in_strategy(&def.name, strategy.name()))
    }
}

impl Default for StrategyResolver {
    fn default() -> Self {
        Self {
            order: vec![
                Strategy::Constructor,
                Strategy::Builder,
                Strategy::Factory,
                Strategy::Setter,
                Strategy::Field,
                Strategy::Mutator,
            ],
            fallback: None,
        }
    }
}
