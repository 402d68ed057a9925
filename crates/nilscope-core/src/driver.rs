//! Fact routing between per-package passes.
//!
//! The driver schedules one inference pass per package in dependency order;
//! passes for unrelated packages may run concurrently but each owns its own
//! `InferredMap`. The `FactStore` is the synchronization boundary: it holds
//! the encoded fact of every finished package, seeds new passes from the
//! facts of their direct dependencies, and records each pass's minimal
//! export.

use std::collections::BTreeMap;

use nilscope_inference::{FactCodecError, InferredMap};

/// Encoded per-package inference facts, keyed by import path.
#[derive(Debug, Default)]
pub struct FactStore {
    facts: BTreeMap<String, Vec<u8>>,
}

impl FactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the starting map for a pass over a package with the given
    /// direct dependencies. A dependency without a recorded fact contributes
    /// nothing (it exported nothing, or is outside the analysis scope); that
    /// is not an error.
    pub fn seed(&self, deps: &[&str]) -> Result<InferredMap, FactCodecError> {
        let mut map = InferredMap::new();
        for dep in deps {
            let Some(bytes) = self.facts.get(*dep) else {
                tracing::debug!(pkg = %dep, "no upstream fact recorded; continuing without it");
                continue;
            };
            let payload = InferredMap::decode(bytes)?;
            map.import_upstream(&payload);
        }
        Ok(map)
    }

    /// Export `map` at the end of the pass over `pkg` and keep the encoded
    /// fact for downstream passes. Returns whether anything was emitted.
    pub fn record(&mut self, pkg: &str, map: &InferredMap) -> Result<bool, FactCodecError> {
        let Some(fact) = map.export() else {
            tracing::debug!(pkg = %pkg, "nothing new to export");
            return Ok(false);
        };
        let bytes = fact.encode()?;
        tracing::debug!(pkg = %pkg, sites = fact.len(), bytes = bytes.len(), "recorded package fact");
        self.facts.insert(pkg.to_string(), bytes);
        Ok(true)
    }

    /// The encoded fact recorded for `pkg`, if any.
    pub fn fact(&self, pkg: &str) -> Option<&[u8]> {
        self.facts.get(pkg).map(Vec::as_slice)
    }

    /// Number of packages with a recorded fact.
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}
