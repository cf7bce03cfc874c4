//! Storage subsystem
//!
//! This module owns the artifact directory and the counters persisted
//! alongside it.
//!
//! Components:
//! - `artifact_store`: [`ArtifactStore`], creation, eviction, bulk delete and dedup.
//! - `naming`: file name generation, sanitization and parsing.
//! - `counter_store`: the `CounterStore` trait and an in-memory implementation.
//! - `file_counter_store`: durable one-file-per-key counters.
//! - `types`: reports returned by store operations.

pub mod artifact_store;
pub mod counter_store;
pub mod file_counter_store;
pub mod naming;
pub mod types;

pub use artifact_store::{capture_once, ArtifactStore};
pub use counter_store::{CounterStore, MemoryCounterStore};
pub use file_counter_store::FileCounterStore;
pub use types::{CreatedArtifact, HousekeepingReport};
