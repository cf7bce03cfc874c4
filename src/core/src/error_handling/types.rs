use std::fmt;
use std::path::PathBuf;
use std::process::ExitStatus;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    NotInRange(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::NotInRange(e) => write!(f, "Value out of range: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

/// Failure reported by a capture source while writing an artifact.
#[derive(Debug)]
pub enum CaptureError {
    Io(std::io::Error),
    CommandFailed { program: String, status: ExitStatus },
    MissingOutput(PathBuf),
    Other(String),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::Io(e) => write!(f, "Capture IO error: {}", e),
            CaptureError::CommandFailed { program, status } => {
                write!(f, "Capture command `{}` failed: {}", program, status)
            }
            CaptureError::MissingOutput(path) => {
                write!(f, "Capture produced no file at {}", path.display())
            }
            CaptureError::Other(e) => write!(f, "Capture error: {}", e),
        }
    }
}

impl std::error::Error for CaptureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CaptureError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::Io(err)
    }
}

#[derive(Debug)]
pub enum CounterError {
    Io { key: String, source: std::io::Error },
    Corrupt { key: String, content: String },
}

impl fmt::Display for CounterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CounterError::Io { key, source } => {
                write!(f, "Counter `{}` IO error: {}", key, source)
            }
            CounterError::Corrupt { key, content } => {
                write!(f, "Counter `{}` holds a non-integer value: {:?}", key, content)
            }
        }
    }
}

impl std::error::Error for CounterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CounterError::Io { source, .. } => Some(source),
            CounterError::Corrupt { .. } => None,
        }
    }
}

/// Errors surfaced to callers of `ArtifactStore`.
///
/// Housekeeping problems (unparseable names, files that refuse to be
/// deleted) never show up here; they are logged and tallied in
/// `HousekeepingReport` instead.
#[derive(Debug)]
pub enum StoreError {
    CaptureFailed { path: PathBuf, source: CaptureError },
    Counter(CounterError),
    DirectoryUnavailable { path: PathBuf, source: std::io::Error },
    Config(ConfigError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::CaptureFailed { path, source } => {
                write!(f, "Unable to capture {}: {}", path.display(), source)
            }
            StoreError::Counter(e) => write!(f, "Counter store error: {}", e),
            StoreError::DirectoryUnavailable { path, source } => {
                write!(f, "Artifact directory {} unavailable: {}", path.display(), source)
            }
            StoreError::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::CaptureFailed { source, .. } => Some(source),
            StoreError::Counter(e) => Some(e),
            StoreError::DirectoryUnavailable { source, .. } => Some(source),
            StoreError::Config(e) => Some(e),
        }
    }
}

impl From<CounterError> for StoreError {
    fn from(err: CounterError) -> Self {
        StoreError::Counter(err)
    }
}

impl From<ConfigError> for StoreError {
    fn from(err: ConfigError) -> Self {
        StoreError::Config(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn capture_failure_keeps_its_cause() {
        let err = StoreError::CaptureFailed {
            path: PathBuf::from("/tmp/1_x.png"),
            source: CaptureError::Other("display not found".into()),
        };
        assert!(err.to_string().contains("/tmp/1_x.png"));
        assert!(err.to_string().contains("display not found"));
        assert!(err.source().is_some());
    }

    #[test]
    fn counter_error_converts_into_store_error() {
        let err: StoreError = CounterError::Corrupt {
            key: "artifactCount".into(),
            content: "abc".into(),
        }
        .into();
        assert!(matches!(err, StoreError::Counter(CounterError::Corrupt { .. })));
        assert!(err.to_string().contains("artifactCount"));
    }
}
