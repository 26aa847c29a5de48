//! Per-call symbol naming
//!
//! [`NameCounter`] hands out `snake_case(identity)_N` names with one
//! monotonic counter per type identity. A counter lives inside one recorder,
//! so names never leak between populate calls.

use effigy_types::TypeDescriptor;
use heck::ToSnakeCase;
use std::collections::HashMap;

/// Monotonic per-identity name generator
#[derive(Debug, Clone, Default)]
pub struct NameCounter {
    counters: HashMap<String, usize>,
}

impl NameCounter {
    /// Create new counter with no names issued
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next name for `ty`
    pub fn next_for(&mut self, ty: &TypeDescriptor) -> String {
        self.next(&ty.identity())
    }

    /// Next name for a raw identity
    pub fn next(&mut self, identity: &str) -> String {
        let base = identity.to_snake_case();
        let base = if base.is_empty() { "value".to_string() } else { base };
        let counter = self.counters.entry(base.clone()).or_insert(0);
        let name = format!("{base}_{counter}");
        *counter += 1;
        name
    }

    /// Names issued so far for `identity`
    #[must_use]
    pub fn issued(&self, identity: &str) -> usize {
        self.counters
            .get(&identity.to_snake_case())
            .copied()
            .unwrap_or(0)
    }
}
