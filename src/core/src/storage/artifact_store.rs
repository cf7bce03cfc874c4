//! The artifact store: numbered screenshots in one flat directory.
//!
//! Every successful capture gets the next identity (`lastArtifactNumber + 1`)
//! and a name built by [`generate_name`]. Once the directory holds more than
//! `eviction_threshold` artifacts, the oldest `eviction_threshold / 2` are
//! deleted, so eviction runs roughly once every `eviction_threshold / 2`
//! creations and the directory never grows past `eviction_threshold + 1`.
//!
//! The cached `artifactCount` is bumped on every creation but re-read from a
//! directory scan after every bulk operation. Deletions are best effort and
//! may partly fail, so the scan is the only trustworthy number.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use log::{Level, Log};

use crate::configuration::StoreConfig;
use crate::data_capture::Capture;
use crate::error_handling::types::{CaptureError, StoreError};
use crate::logging::{global_logger, SharedLogger};
use crate::storage::counter_store::{CounterStore, ARTIFACT_COUNT_KEY, LAST_ARTIFACT_NUMBER_KEY};
use crate::storage::file_counter_store::FileCounterStore;
use crate::storage::naming::{artifact_label, generate_name, is_artifact_name, parse_artifact_number};
use crate::storage::types::{CreatedArtifact, HousekeepingReport};

/// Bulk deletions above this size log their progress.
const BULK_PROGRESS_THRESHOLD: usize = 1000;
const BULK_PROGRESS_STEP: usize = 1000;

/// A bounded directory of sequentially numbered screenshots.
///
/// # Single writer
///
/// Nothing here locks the directory or the counter files. Two stores (in one
/// process or in several) working on the same directory can read the same
/// `lastArtifactNumber` and hand out the same identity twice. Use exactly one
/// store per directory at a time.
pub struct ArtifactStore {
    directory: PathBuf,
    eviction_threshold: usize,
    max_name_length: usize,
    counters: Box<dyn CounterStore>,
    capture: Box<dyn Capture>,
    logger: SharedLogger,
}

struct PendingArtifact {
    number: u64,
    file_name: String,
    path: PathBuf,
}

impl ArtifactStore {
    /// Opens (creating if needed) the directory from `config`, with counters
    /// persisted next to the artifacts and logs going to the `log` facade.
    pub fn new(config: &StoreConfig, capture: Box<dyn Capture>) -> Result<Self, StoreError> {
        Self::with_logger(config, capture, global_logger())
    }

    pub fn with_logger(
        config: &StoreConfig,
        capture: Box<dyn Capture>,
        logger: SharedLogger,
    ) -> Result<Self, StoreError> {
        let directory = prepare_directory(config, &*logger)?;
        let counters = Box::new(FileCounterStore::new(&directory));
        Self::assemble(config, directory, counters, capture, logger)
    }

    /// Like [`ArtifactStore::with_logger`] but with caller-provided counters,
    /// e.g. a [`MemoryCounterStore`](crate::storage::MemoryCounterStore).
    pub fn with_counter_store(
        config: &StoreConfig,
        capture: Box<dyn Capture>,
        counters: Box<dyn CounterStore>,
        logger: SharedLogger,
    ) -> Result<Self, StoreError> {
        let directory = prepare_directory(config, &*logger)?;
        Self::assemble(config, directory, counters, capture, logger)
    }

    fn assemble(
        config: &StoreConfig,
        directory: PathBuf,
        counters: Box<dyn CounterStore>,
        capture: Box<dyn Capture>,
        logger: SharedLogger,
    ) -> Result<Self, StoreError> {
        let mut store = Self {
            directory,
            eviction_threshold: config.eviction_threshold,
            max_name_length: config.max_name_length,
            counters,
            capture,
            logger,
        };
        store.reconcile_count()?;
        Ok(store)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn eviction_threshold(&self) -> usize {
        self.eviction_threshold
    }

    pub fn max_name_length(&self) -> usize {
        self.max_name_length
    }

    /// Identity of the most recently created artifact, `0` for a fresh store.
    pub fn last_artifact_number(&self) -> Result<u64, StoreError> {
        Ok(self.counters.get(LAST_ARTIFACT_NUMBER_KEY)?)
    }

    /// The persisted artifact count. Exact after bulk operations, optimistic
    /// in between.
    pub fn artifact_count(&self) -> Result<u64, StoreError> {
        Ok(self.counters.get(ARTIFACT_COUNT_KEY)?)
    }

    /// Fresh scan of artifact names, oldest first. Malformed names sort last.
    pub fn artifact_names(&self) -> Result<Vec<String>, StoreError> {
        let mut names = self.scan()?;
        names.sort_by_cached_key(|name| {
            let number = parse_artifact_number(name);
            (number.is_none(), number, name.clone())
        });
        Ok(names)
    }

    /// Captures a new artifact with the store's own capture source.
    ///
    /// On capture failure nothing is persisted and the error carries the
    /// cause. A partially written file may remain at the target path.
    pub fn create_artifact(&mut self, label: &str) -> Result<CreatedArtifact, StoreError> {
        let pending = self.prepare_artifact(label)?;
        let outcome = self.capture.capture(&pending.path);
        self.finish_artifact(pending, outcome)
    }

    /// Same as [`ArtifactStore::create_artifact`], but this one call uses
    /// `capture` instead of the store's capture source.
    pub fn create_artifact_with(
        &mut self,
        label: &str,
        capture: &dyn Capture,
    ) -> Result<CreatedArtifact, StoreError> {
        let pending = self.prepare_artifact(label)?;
        let outcome = capture.capture(&pending.path);
        self.finish_artifact(pending, outcome)
    }

    fn prepare_artifact(&self, label: &str) -> Result<PendingArtifact, StoreError> {
        let number = self.last_artifact_number()? + 1;
        store_log!(self.logger, Level::Debug, "Number for new screenshot: {}", number);
        let file_name = generate_name(number, label, self.max_name_length);
        let path = self.directory.join(&file_name);
        store_log!(self.logger, Level::Debug, "Create screenshot in path: {}", path.display());
        Ok(PendingArtifact {
            number,
            file_name,
            path,
        })
    }

    fn finish_artifact(
        &mut self,
        pending: PendingArtifact,
        outcome: Result<(), CaptureError>,
    ) -> Result<CreatedArtifact, StoreError> {
        if let Err(source) = outcome {
            store_log!(
                self.logger,
                Level::Error,
                "Unable to create screenshot with name {}: {}",
                pending.file_name,
                source
            );
            return Err(StoreError::CaptureFailed {
                path: pending.path,
                source,
            });
        }

        self.counters.set(LAST_ARTIFACT_NUMBER_KEY, pending.number)?;
        let count = self.counters.get(ARTIFACT_COUNT_KEY)? + 1;
        self.counters.set(ARTIFACT_COUNT_KEY, count)?;

        // Housekeeping never fails a capture that already succeeded.
        let eviction = if count > self.eviction_threshold as u64 {
            match self.evict_oldest() {
                Ok(report) => Some(report),
                Err(e) => {
                    store_log!(self.logger, Level::Error, "Eviction after {} failed: {}", pending.file_name, e);
                    None
                }
            }
        } else {
            None
        };

        Ok(CreatedArtifact {
            number: pending.number,
            file_name: pending.file_name,
            path: pending.path,
            eviction,
        })
    }

    fn evict_oldest(&mut self) -> Result<HousekeepingReport, StoreError> {
        let names = self.scan()?;
        let examined = names.len();
        // Someone else already thinned the directory out.
        if examined < self.eviction_threshold {
            let remaining = self.store_count(examined)?;
            return Ok(HousekeepingReport {
                examined,
                remaining,
                ..HousekeepingReport::default()
            });
        }

        let mut malformed = 0;
        let mut numbered: Vec<(u64, String)> = Vec::with_capacity(examined);
        for name in names {
            match parse_artifact_number(&name) {
                Some(number) => numbered.push((number, name)),
                None => {
                    store_log!(self.logger, Level::Warn, "Wrong filename of the screenshot: {}", name);
                    malformed += 1;
                }
            }
        }
        numbered.sort();

        let to_delete: Vec<String> = numbered
            .into_iter()
            .take(self.eviction_threshold / 2)
            .map(|(_, name)| name)
            .collect();
        let (deleted, failed) = self.delete_files(&to_delete);
        let remaining = self.reconcile_count()?;
        store_log!(
            self.logger,
            Level::Info,
            "Evicted {} old screenshot(s) from {}, {} remain",
            deleted,
            self.directory.display(),
            remaining
        );
        Ok(HousekeepingReport {
            examined,
            deleted,
            failed,
            malformed,
            remaining,
        })
    }

    /// Deletes every artifact in the directory. Safe on an empty directory.
    pub fn delete_all_artifacts(&mut self) -> Result<HousekeepingReport, StoreError> {
        let names = self.scan()?;
        store_log!(
            self.logger,
            Level::Info,
            "Delete all screenshots in the directory {}: {} to delete",
            self.directory.display(),
            names.len()
        );
        let (deleted, failed) = self.delete_files(&names);
        let remaining = self.reconcile_count()?;
        Ok(HousekeepingReport {
            examined: names.len(),
            deleted,
            failed,
            malformed: 0,
            remaining,
        })
    }

    /// Keeps one artifact per distinct label and deletes the rest.
    ///
    /// The artifact kept for a label is the one with the highest identity,
    /// so the outcome does not depend on directory listing order. Unlabeled
    /// artifacts (`<number>.png`) are kept unless `delete_unlabeled` is set.
    pub fn delete_non_unique_artifacts(
        &mut self,
        delete_unlabeled: bool,
    ) -> Result<HousekeepingReport, StoreError> {
        let names = self.scan()?;
        let mut malformed = 0;
        let mut by_label: HashMap<&str, &str> = HashMap::new();
        let mut unlabeled: Vec<&str> = Vec::new();

        for name in &names {
            if parse_artifact_number(name).is_none() {
                malformed += 1;
            }
            match artifact_label(name) {
                Some(label) => {
                    let newer = match by_label.get(label) {
                        Some(kept) => dedup_rank(name) > dedup_rank(kept),
                        None => true,
                    };
                    if newer {
                        by_label.insert(label, name);
                    }
                }
                None => unlabeled.push(name),
            }
        }

        let mut keep: HashSet<&str> = by_label.into_values().collect();
        if !delete_unlabeled {
            keep.extend(unlabeled);
        }
        let to_delete: Vec<String> = names
            .iter()
            .filter(|name| !keep.contains(name.as_str()))
            .cloned()
            .collect();
        store_log!(
            self.logger,
            Level::Info,
            "Delete not unique screenshots in {}: {} of {}",
            self.directory.display(),
            to_delete.len(),
            names.len()
        );

        let (deleted, failed) = self.delete_files(&to_delete);
        let remaining = self.reconcile_count()?;
        Ok(HousekeepingReport {
            examined: names.len(),
            deleted,
            failed,
            malformed,
            remaining,
        })
    }

    /// Names of all artifacts, in directory listing order.
    fn scan(&self) -> Result<Vec<String>, StoreError> {
        let entries = fs::read_dir(&self.directory).map_err(|e| {
            store_log!(self.logger, Level::Error, "Failed to read {}: {}", self.directory.display(), e);
            StoreError::DirectoryUnavailable {
                path: self.directory.clone(),
                source: e,
            }
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    store_log!(self.logger, Level::Warn, "Dir entry error in {}: {}", self.directory.display(), e);
                    continue;
                }
            };
            let Ok(name) = entry.file_name().into_string() else {
                store_log!(self.logger, Level::Debug, "Skipping non UTF-8 name {:?}", entry.file_name());
                continue;
            };
            if is_artifact_name(&name) && entry.path().is_file() {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// Removes `names` one by one; returns `(deleted, failed)`.
    fn delete_files(&self, names: &[String]) -> (usize, usize) {
        let report_progress = names.len() > BULK_PROGRESS_THRESHOLD;
        let mut deleted = 0;
        let mut failed = 0;
        for (done, name) in names.iter().enumerate() {
            let path = self.directory.join(name);
            match fs::remove_file(&path) {
                Ok(()) => {
                    store_log!(self.logger, Level::Debug, "Delete screenshot: {}", name);
                    deleted += 1;
                }
                Err(e) => {
                    store_log!(self.logger, Level::Warn, "Unable to delete screenshot {}: {}", path.display(), e);
                    failed += 1;
                }
            }
            if report_progress && (done + 1) % BULK_PROGRESS_STEP == 0 {
                store_log!(self.logger, Level::Info, "Deleted {}/{} screenshots", done + 1, names.len());
            }
        }
        (deleted, failed)
    }

    fn reconcile_count(&mut self) -> Result<usize, StoreError> {
        let count = self.scan()?.len();
        self.store_count(count)
    }

    fn store_count(&mut self, count: usize) -> Result<usize, StoreError> {
        self.counters.set(ARTIFACT_COUNT_KEY, count as u64)?;
        store_log!(self.logger, Level::Debug, "Screenshots in the directory: {}", count);
        Ok(count)
    }
}

/// Orders candidates for the same label: higher identity wins, then name.
fn dedup_rank(name: &str) -> (Option<u64>, &str) {
    (parse_artifact_number(name), name)
}

fn prepare_directory(config: &StoreConfig, logger: &dyn Log) -> Result<PathBuf, StoreError> {
    config.validate()?;
    let unavailable = |e: std::io::Error| {
        store_log!(logger, Level::Error, "Failed to prepare {}: {}", config.directory.display(), e);
        StoreError::DirectoryUnavailable {
            path: config.directory.clone(),
            source: e,
        }
    };
    if !config.directory.is_dir() {
        fs::create_dir_all(&config.directory).map_err(unavailable)?;
        store_log!(
            logger,
            Level::Info,
            "Created directory for the screenshots: {}",
            config.directory.display()
        );
    }
    fs::canonicalize(&config.directory).map_err(unavailable)
}

/// Opens a store over `directory` with default limits and creates a single
/// artifact in it.
pub fn capture_once<C, P>(capture: C, label: &str, directory: P) -> Result<CreatedArtifact, StoreError>
where
    C: Capture + 'static,
    P: AsRef<Path>,
{
    let config = StoreConfig::new(directory);
    ArtifactStore::new(&config, Box::new(capture))?.create_artifact(label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::testing::RecordingLogger;
    use crate::storage::MemoryCounterStore;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn write_png(path: &Path) -> Result<(), CaptureError> {
        fs::write(path, b"\x89PNG")?;
        Ok(())
    }

    fn open(dir: &Path, logger: Arc<RecordingLogger>) -> ArtifactStore {
        ArtifactStore::with_counter_store(
            &StoreConfig::new(dir),
            Box::new(write_png),
            Box::new(MemoryCounterStore::new()),
            logger,
        )
        .unwrap()
    }

    #[test]
    fn test_delete_files_counts_failures() {
        let dir = TempDir::new().unwrap();
        let logger = Arc::new(RecordingLogger::default());
        let store = open(dir.path(), logger.clone());
        fs::write(dir.path().join("1.png"), b"x").unwrap();

        let (deleted, failed) = store.delete_files(&["1.png".to_string(), "2_gone.png".to_string()]);

        assert_eq!((deleted, failed), (1, 1));
        let warnings = logger.messages(Level::Warn);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("2_gone.png"));
    }

    #[test]
    fn test_scan_ignores_other_files_and_directories() {
        let dir = TempDir::new().unwrap();
        let store = open(dir.path(), Arc::new(RecordingLogger::default()));
        fs::write(dir.path().join("1.png"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::create_dir(dir.path().join("2_folder.png")).unwrap();

        assert_eq!(store.scan().unwrap(), vec!["1.png".to_string()]);
    }

    #[test]
    fn test_large_bulk_delete_reports_progress() {
        let dir = TempDir::new().unwrap();
        let logger = Arc::new(RecordingLogger::default());
        let mut store = open(dir.path(), logger.clone());
        for i in 1..=1001 {
            fs::write(dir.path().join(format!("{}.png", i)), b"").unwrap();
        }

        let report = store.delete_all_artifacts().unwrap();

        assert_eq!(report.deleted, 1001);
        assert!(logger
            .messages(Level::Info)
            .iter()
            .any(|m| m == "Deleted 1000/1001 screenshots"));
    }

    #[test]
    fn test_dedup_rank_prefers_higher_identity() {
        assert!(dedup_rank("10_a.png") > dedup_rank("9_a.png"));
        assert!(dedup_rank("1_a.png") > dedup_rank("x_a.png"));
    }
}
