use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::{debug, error};
use tempfile::NamedTempFile;

use crate::error_handling::types::CounterError;
use crate::storage::counter_store::CounterStore;

/// Counters kept as one small text file per key (`<key>.txt`).
///
/// Writes go to a temp file in the same directory, are synced, renamed over
/// the previous value and followed by a sync of the directory itself, so a
/// crash leaves either the old or the new value on disk, never a torn one.
pub struct FileCounterStore {
    base_path: PathBuf,
}

impl FileCounterStore {
    /// The directory must already exist.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn counter_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.txt", key))
    }

    fn io_error(key: &str, source: std::io::Error) -> CounterError {
        CounterError::Io {
            key: key.to_string(),
            source,
        }
    }

    #[cfg(unix)]
    fn sync_dir(&self) -> std::io::Result<()> {
        File::open(&self.base_path)?.sync_all()
    }

    #[cfg(not(unix))]
    fn sync_dir(&self) -> std::io::Result<()> {
        Ok(())
    }
}

impl CounterStore for FileCounterStore {
    fn get(&self, key: &str) -> Result<u64, CounterError> {
        let path = self.counter_path(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                error!("Failed to read counter file {}: {}", path.display(), e);
                return Err(Self::io_error(key, e));
            }
        };
        content.trim().parse::<u64>().map_err(|_| {
            error!("Invalid counter value in {}: {:?}", path.display(), content);
            CounterError::Corrupt {
                key: key.to_string(),
                content,
            }
        })
    }

    fn set(&mut self, key: &str, value: u64) -> Result<(), CounterError> {
        let path = self.counter_path(key);
        let mut tmp = NamedTempFile::new_in(&self.base_path).map_err(|e| {
            error!("Failed to create temp file in {}: {}", self.base_path.display(), e);
            Self::io_error(key, e)
        })?;
        tmp.write_all(value.to_string().as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| {
                error!("Failed to write counter {}: {}", key, e);
                Self::io_error(key, e)
            })?;
        tmp.persist(&path).map_err(|e| {
            error!("Failed to replace counter file {}: {}", path.display(), e.error);
            Self::io_error(key, e.error)
        })?;
        self.sync_dir().map_err(|e| {
            error!("Failed to sync {}: {}", self.base_path.display(), e);
            Self::io_error(key, e)
        })?;
        debug!("Counter {} = {}", key, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_reads_as_zero() {
        let dir = TempDir::new().unwrap();
        let store = FileCounterStore::new(dir.path());
        assert_eq!(store.get("artifactCount").unwrap(), 0);
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let mut store = FileCounterStore::new(dir.path());
        store.set("lastArtifactNumber", 41).unwrap();
        store.set("lastArtifactNumber", 42).unwrap();
        drop(store);

        let reopened = FileCounterStore::new(dir.path());
        assert_eq!(reopened.get("lastArtifactNumber").unwrap(), 42);
        assert_eq!(
            fs::read_to_string(dir.path().join("lastArtifactNumber.txt")).unwrap(),
            "42"
        );
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let mut store = FileCounterStore::new(dir.path());
        for i in 0..5 {
            store.set("artifactCount", i).unwrap();
        }
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["artifactCount.txt".to_string()]);
    }

    #[test]
    fn test_corrupt_value_is_reported() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("artifactCount.txt"), "many").unwrap();
        let store = FileCounterStore::new(dir.path());
        let err = store.get("artifactCount").unwrap_err();
        assert!(matches!(err, CounterError::Corrupt { ref content, .. } if content == "many"));
    }

    #[test]
    fn test_surrounding_whitespace_is_tolerated() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("artifactCount.txt"), "12\n").unwrap();
        let store = FileCounterStore::new(dir.path());
        assert_eq!(store.get("artifactCount").unwrap(), 12);
    }

    #[test]
    fn test_set_in_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let mut store = FileCounterStore::new(dir.path().join("gone"));
        let err = store.set("artifactCount", 1).unwrap_err();
        assert!(matches!(err, CounterError::Io { .. }));
    }
}
