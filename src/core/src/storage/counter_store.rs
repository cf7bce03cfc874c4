//! Counter Store
//!
//! This module defines the `CounterStore` trait, the small piece of durable
//! state the artifact store keeps between runs: the last identity handed
//! out and the cached artifact count.
//!
//! Implementors must make `set` durable before returning. If a crash right
//! after `set` could lose the write, `lastArtifactNumber` could move
//! backwards and the next run would hand out an identity that is already on
//! disk.

use std::collections::HashMap;

use crate::error_handling::types::CounterError;

/// Key under which the last assigned artifact identity is kept.
pub const LAST_ARTIFACT_NUMBER_KEY: &str = "lastArtifactNumber";

/// Key under which the cached number of artifacts on disk is kept.
pub const ARTIFACT_COUNT_KEY: &str = "artifactCount";

/// Durable string-keyed integer counters scoped to one artifact directory.
pub trait CounterStore {
    /// Current value of `key`, or `0` if it was never set.
    fn get(&self, key: &str) -> Result<u64, CounterError>;

    /// Stores `value` under `key` and flushes it durably.
    fn set(&mut self, key: &str, value: u64) -> Result<(), CounterError>;
}

/// Non-durable counters, for tests and throwaway stores.
#[derive(Debug, Default, Clone)]
pub struct MemoryCounterStore {
    values: HashMap<String, u64>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CounterStore for MemoryCounterStore {
    fn get(&self, key: &str) -> Result<u64, CounterError> {
        Ok(self.values.get(key).copied().unwrap_or(0))
    }

    fn set(&mut self, key: &str, value: u64) -> Result<(), CounterError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}
