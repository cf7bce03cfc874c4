//! Bounded, disk-resident store for sequentially numbered screenshots.
//!
//! ```no_run
//! use screenshots::configuration::StoreConfig;
//! use screenshots::data_capture::CommandCapture;
//! use screenshots::storage::ArtifactStore;
//!
//! let config = StoreConfig::new("screenshots").with_eviction_threshold(200);
//! let mut store = ArtifactStore::new(&config, Box::new(CommandCapture::new("grim")))?;
//! let shot = store.create_artifact("login page")?;
//! println!("saved {}", shot.path.display());
//! # Ok::<(), screenshots::error_handling::StoreError>(())
//! ```

#[macro_use]
pub mod logging;

pub mod configuration;
pub mod data_capture;
pub mod error_handling;
pub mod storage;

pub use configuration::StoreConfig;
pub use data_capture::{Capture, CommandCapture};
pub use error_handling::{CaptureError, StoreError};
pub use storage::{capture_once, ArtifactStore, CreatedArtifact, HousekeepingReport};
