//! Population configuration
//!
//! [`PopulateConfig`] bundles the strategy order and every selection policy.
//! It loads from TOML or JSON; missing keys take their defaults.

use crate::error::ConfigError;
use effigy_types::TypeName;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Name of a strategy in the configured order
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StrategyName {
    /// Constructor injection
    Constructor,
    /// No-arg construction then field assignment
    Field,
    /// No-arg construction then setter calls
    Setter,
    /// Construction then mutator calls
    Mutator,
    /// Builder entry, operations, terminal
    Builder,
    /// Static factory
    Factory,
    /// User-registered strategy
    Custom(String),
}

impl StrategyName {
    /// Built-in strategy names in their default order
    pub const DEFAULT_ORDER: [StrategyName; 6] = [
        StrategyName::Constructor,
        StrategyName::Builder,
        StrategyName::Factory,
        StrategyName::Setter,
        StrategyName::Field,
        StrategyName::Mutator,
    ];

    /// Name as written in configuration
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Constructor => "constructor",
            Self::Field => "field",
            Self::Setter => "setter",
            Self::Mutator => "mutator",
            Self::Builder => "builder",
            Self::Factory => "factory",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for StrategyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for StrategyName {
    fn from(value: String) -> Self {
        match value.as_str() {
            "constructor" => Self::Constructor,
            "field" => Self::Field,
            "setter" => Self::Setter,
            "mutator" => Self::Mutator,
            "builder" => Self::Builder,
            "factory" => Self::Factory,
            _ => Self::Custom(value),
        }
    }
}

impl From<&str> for StrategyName {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<StrategyName> for String {
    fn from(value: StrategyName) -> Self {
        value.as_str().to_string()
    }
}

/// How leaf values are generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafPolicy {
    /// Fixed value per leaf type
    #[default]
    Deterministic,
    /// Fresh random value per request
    Random,
}

/// What happens when a composite type recurs on the active path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircularPolicy {
    /// Abort with a circular dependency error
    Fail,
    /// Use an absent value at the recurring position
    #[default]
    Null,
}

/// Constructor selection rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructorSelection {
    /// Most parameters, first declared on ties
    #[default]
    Largest,
    /// Fewest parameters (at least one), first declared on ties
    Smallest,
    /// The no-argument constructor
    NoArgs,
}

/// Static factory selection rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorySelection {
    /// Most parameters
    Largest,
    /// Fewest parameters
    Smallest,
    /// Lowest structural complexity over parameter types
    #[default]
    Simplest,
}

/// Population configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulateConfig {
    /// Strategies tried in order for every composite
    pub strategy_order: Vec<StrategyName>,
    /// Deterministic or random leaves
    pub leaf_policy: LeafPolicy,
    /// Seed for random leaves
    pub seed: Option<u64>,
    /// Cycle handling
    pub circular_policy: CircularPolicy,
    /// Constructor rule for constructor injection
    pub constructor_selection: ConstructorSelection,
    /// Constructor rule for mutator injection
    pub mutator_constructor_selection: ConstructorSelection,
    /// Factory rule for factory injection
    pub factory_selection: FactorySelection,
    /// Name prefixes recognized as setters
    pub setter_prefixes: Vec<String>,
    /// Field names never assigned (`name` or `Type::name`)
    pub excluded_fields: Vec<String>,
    /// Operation names never invoked (`name` or `Type::name`)
    pub excluded_methods: Vec<String>,
    /// Record a build trace
    pub trace: bool,
    /// Maximum nesting depth
    pub max_depth: usize,
}

impl Default for PopulateConfig {
    fn default() -> Self {
        Self {
            strategy_order: StrategyName::DEFAULT_ORDER.to_vec(),
            leaf_policy: LeafPolicy::Deterministic,
            seed: None,
            circular_policy: CircularPolicy::Null,
            constructor_selection: ConstructorSelection::Largest,
            mutator_constructor_selection: ConstructorSelection::NoArgs,
            factory_selection: FactorySelection::Simplest,
            setter_prefixes: vec!["set_".to_string()],
            excluded_fields: Vec::new(),
            excluded_methods: Vec::new(),
            trace: true,
            max_depth: 64,
        }
    }
}

impl PopulateConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With strategy order
    #[must_use]
    pub fn with_strategy_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<StrategyName>,
    {
        self.strategy_order = order.into_iter().map(Into::into).collect();
        self
    }

    /// With leaf policy
    #[inline]
    #[must_use]
    pub fn with_leaf_policy(mut self, policy: LeafPolicy) -> Self {
        self.leaf_policy = policy;
        self
    }

    /// With random seed
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// With circular policy
    #[inline]
    #[must_use]
    pub fn with_circular_policy(mut self, policy: CircularPolicy) -> Self {
        self.circular_policy = policy;
        self
    }

    /// With constructor selection
    #[inline]
    #[must_use]
    pub fn with_constructor_selection(mut self, selection: ConstructorSelection) -> Self {
        self.constructor_selection = selection;
        self
    }

    /// With mutator constructor selection
    #[inline]
    #[must_use]
    pub fn with_mutator_constructor_selection(mut self, selection: ConstructorSelection) -> Self {
        self.mutator_constructor_selection = selection;
        self
    }

    /// With factory selection
    #[inline]
    #[must_use]
    pub fn with_factory_selection(mut self, selection: FactorySelection) -> Self {
        self.factory_selection = selection;
        self
    }

    /// With setter prefixes
    #[must_use]
    pub fn with_setter_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.setter_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Exclude a field
    #[must_use]
    pub fn exclude_field(mut self, name: impl Into<String>) -> Self {
        self.excluded_fields.push(name.into());
        self
    }

    /// Exclude an operation
    #[must_use]
    pub fn exclude_method(mut self, name: impl Into<String>) -> Self {
        self.excluded_methods.push(name.into());
        self
    }

    /// With tracing enabled or disabled
    #[inline]
    #[must_use]
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// With depth limit
    #[inline]
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Whether `owner`'s field `name` is excluded
    #[must_use]
    pub fn is_field_excluded(&self, owner: &TypeName, name: &str) -> bool {
        excluded(&self.excluded_fields, owner, name)
    }

    /// Whether `owner`'s operation `name` is excluded
    #[must_use]
    pub fn is_method_excluded(&self, owner: &TypeName, name: &str) -> bool {
        excluded(&self.excluded_methods, owner, name)
    }

    /// Whether `name` starts with a setter prefix
    #[must_use]
    pub fn is_setter_name(&self, name: &str) -> bool {
        self.setter_prefixes
            .iter()
            .any(|prefix| name.len() > prefix.len() && name.starts_with(prefix.as_str()))
    }

    /// Check internal consistency
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] for an empty or duplicated strategy order,
    /// no setter prefixes, or a zero depth limit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.strategy_order.is_empty() {
            return Err(ConfigError::Invalid("strategy order is empty".into()));
        }
        let mut seen = HashSet::new();
        for name in &self.strategy_order {
            if !seen.insert(name) {
                return Err(ConfigError::Invalid(format!(
                    "strategy {name} appears more than once"
                )));
            }
        }
        if self.setter_prefixes.iter().all(String::is_empty) {
            return Err(ConfigError::Invalid("no setter prefix configured".into()));
        }
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be positive".into()));
        }
        Ok(())
    }

    /// Parse and validate TOML
    ///
    /// # Errors
    /// [`ConfigError::Toml`] or [`ConfigError::Invalid`].
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate JSON
    ///
    /// # Errors
    /// [`ConfigError::Json`] or [`ConfigError::Invalid`].
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.toml` or `.json` file
    ///
    /// # Errors
    /// [`ConfigError::Io`], [`ConfigError::UnsupportedFormat`], or a parse error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&text)?,
            Some("json") => Self::from_json_str(&text)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(
                    other.unwrap_or_default().to_string(),
                ))
            }
        };
        tracing::debug!(path = %path.display(), "loaded population config");
        Ok(config)
    }
}

fn excluded(list: &[String], owner: &TypeName, name: &str) -> bool {
    list.iter().any(|entry| match entry.rsplit_once("::") {
        Some((ty, member)) => member == name && (ty == owner.short() || ty == owner.as_str()),
        None => entry == name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_valid() {
        let config = PopulateConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.strategy_order[0], StrategyName::Constructor);
        assert_eq!(config.circular_policy, CircularPolicy::Null);
        assert!(config.trace);
    }

    #[test]
    fn toml_overrides_only_given_keys() {
        let config = PopulateConfig::from_toml_str(
            r#"
            strategy_order = ["setter", "marker", "constructor"]
            leaf_policy = "random"
            seed = 7
            excluded_fields = ["Person::age"]
            "#,
        )
        .unwrap();
        assert_eq!(
            config.strategy_order,
            vec![
                StrategyName::Setter,
                StrategyName::Custom("marker".into()),
                StrategyName::Constructor
            ]
        );
        assert_eq!(config.leaf_policy, LeafPolicy::Random);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.max_depth, 64);
        assert!(config.is_field_excluded(&TypeName::new("app::Person"), "age"));
        assert!(!config.is_field_excluded(&TypeName::new("app::Other"), "age"));
    }

    #[test]
    fn json_round_trip() {
        let config = PopulateConfig::new()
            .with_circular_policy(CircularPolicy::Fail)
            .with_factory_selection(FactorySelection::Largest)
            .exclude_method("reset");
        let text = serde_json::to_string(&config).unwrap();
        assert_eq!(PopulateConfig::from_json_str(&text).unwrap(), config);
    }

    #[test]
    fn validation_rejects_bad_orders() {
        let empty = PopulateConfig::new().with_strategy_order(Vec::<StrategyName>::new());
        assert!(matches!(empty.validate(), Err(ConfigError::Invalid(_))));

        let dup = PopulateConfig::new().with_strategy_order(["field", "field"]);
        assert!(matches!(dup.validate(), Err(ConfigError::Invalid(_))));

        let zero = PopulateConfig::new().with_max_depth(0);
        assert!(zero.validate().is_err());
    }

    #[test]
    fn setter_prefix_needs_a_suffix() {
        let config = PopulateConfig::new();
        assert!(config.is_setter_name("set_name"));
        assert!(!config.is_setter_name("set_"));
        assert!(!config.is_setter_name("name"));
    }

    #[test]
    fn load_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "trace: false").unwrap();
        assert!(matches!(
            PopulateConfig::load(&path),
            Err(ConfigError::UnsupportedFormat(ext)) if ext == "yaml"
        ));

        let path = dir.path().join("config.toml");
        std::fs::write(&path, "trace = false").unwrap();
        assert!(!PopulateConfig::load(&path).unwrap().trace);
    }
}
