//! Leaf value provider
//!
//! [`ValueProvider`] produces values for leaf types. The default provider
//! returns one fixed value per kind, or random values from a seedable
//! [`StdRng`].

use crate::config::{LeafPolicy, PopulateConfig};
use crate::error::ProviderError;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use effigy_types::{Leaf, LeafKind, Value};
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Length of random strings
const RANDOM_STRING_LEN: usize = 12;

/// Source of leaf values
pub trait ValueProvider: Send + fmt::Debug {
    /// Produce a value for `leaf`
    ///
    /// # Errors
    /// [`ProviderError::UnsupportedType`] when the leaf has no mapping.
    fn provide(&mut self, leaf: &Leaf<'_>) -> Result<Value, ProviderError>;
}

/// Built-in provider for every [`LeafKind`] and registered enums
#[derive(Debug)]
pub struct DefaultValueProvider {
    policy: LeafPolicy,
    rng: StdRng,
}

impl DefaultValueProvider {
    /// Fixed value per kind
    #[must_use]
    pub fn deterministic() -> Self {
        Self {
            policy: LeafPolicy::Deterministic,
            rng: StdRng::seed_from_u64(0),
        }
    }

    /// Random values from an entropy-seeded generator
    #[must_use]
    pub fn random() -> Self {
        Self {
            policy: LeafPolicy::Random,
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible random values
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            policy: LeafPolicy::Random,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Provider matching the leaf policy and seed of `config`
    #[must_use]
    pub fn from_config(config: &PopulateConfig) -> Self {
        match (config.leaf_policy, config.seed) {
            (LeafPolicy::Deterministic, _) => Self::deterministic(),
            (LeafPolicy::Random, Some(seed)) => Self::seeded(seed),
            (LeafPolicy::Random, None) => Self::random(),
        }
    }

    /// Active policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> LeafPolicy {
        self.policy
    }

    fn fixed(kind: LeafKind) -> Value {
        match kind {
            LeafKind::Bool => Value::Bool(true),
            LeafKind::Char => Value::Char('a'),
            LeafKind::I8 | LeafKind::I16 | LeafKind::I32 | LeafKind::I64 => Value::Int(1),
            LeafKind::U8 | LeafKind::U16 | LeafKind::U32 | LeafKind::U64 => Value::UInt(1),
            LeafKind::F32 | LeafKind::F64 => Value::Float(1.0),
            LeafKind::String => Value::Str("string".to_string()),
            LeafKind::Uuid => Value::Uuid(Uuid::from_u128(1)),
            LeafKind::Date => Value::Date(NaiveDate::default()),
            LeafKind::DateTime => Value::DateTime(DateTime::<Utc>::default()),
            LeafKind::Duration => Value::Duration(Duration::from_secs(1)),
        }
    }

    fn sample(&mut self, kind: LeafKind) -> Value {
        let rng = &mut self.rng;
        match kind {
            LeafKind::Bool => Value::Bool(rng.gen()),
            LeafKind::Char => Value::Char(char::from(rng.sample(Alphanumeric))),
            LeafKind::I8 => Value::Int(i64::from(rng.gen::<i8>())),
            LeafKind::I16 => Value::Int(i64::from(rng.gen::<i16>())),
            LeafKind::I32 => Value::Int(i64::from(rng.gen::<i32>())),
            LeafKind::I64 => Value::Int(rng.gen()),
            LeafKind::U8 => Value::UInt(u64::from(rng.gen::<u8>())),
            LeafKind::U16 => Value::UInt(u64::from(rng.gen::<u16>())),
            LeafKind::U32 => Value::UInt(u64::from(rng.gen::<u32>())),
            LeafKind::U64 => Value::UInt(rng.gen()),
            LeafKind::F32 => Value::Float(f64::from(rng.gen::<f32>())),
            LeafKind::F64 => Value::Float(rng.gen()),
            LeafKind::String => Value::Str(
                rng.sample_iter(&Alphanumeric)
                    .take(RANDOM_STRING_LEN)
                    .map(char::from)
                    .collect(),
            ),
            LeafKind::Uuid => Value::Uuid(uuid::Builder::from_random_bytes(rng.gen()).into_uuid()),
            LeafKind::Date => {
                let days = rng.gen_range(719_163..766_645);
                Value::Date(NaiveDate::from_num_days_from_ce_opt(days).unwrap_or_default())
            }
            LeafKind::DateTime => {
                let secs = rng.gen_range(0..4_102_444_800);
                Value::DateTime(Utc.timestamp_opt(secs, 0).single().unwrap_or_default())
            }
            LeafKind::Duration => Value::Duration(Duration::from_millis(rng.gen_range(1..86_400_000))),
        }
    }
}

impl Default for DefaultValueProvider {
    fn default() -> Self {
        Self::deterministic()
    }
}

impl ValueProvider for DefaultValueProvider {
    fn provide(&mut self, leaf: &Leaf<'_>) -> Result<Value, ProviderError> {
        match leaf {
            Leaf::Builtin(kind) => Ok(match self.policy {
                LeafPolicy::Deterministic => Self::fixed(*kind),
                LeafPolicy::Random => self.sample(*kind),
            }),
            Leaf::Enum(def) => {
                if def.variants.is_empty() {
                    return Err(ProviderError::EmptyEnum(def.name.clone()));
                }
                let idx = match self.policy {
                    LeafPolicy::Deterministic => 0,
                    LeafPolicy::Random => self.rng.gen_range(0..def.variants.len()),
                };
                Ok(Value::Enum {
                    ty: def.name.clone(),
                    variant: def.variants[idx].clone(),
                })
            }
            Leaf::Opaque(name) => Err(ProviderError::UnsupportedType(name.to_string())),
        }
    }
}
