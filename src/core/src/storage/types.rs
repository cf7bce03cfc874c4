use std::path::PathBuf;

/// Result of a successful `create_artifact` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedArtifact {
    /// Identity assigned to the new artifact.
    pub number: u64,
    pub file_name: String,
    pub path: PathBuf,
    /// Present when the creation pushed the directory over the threshold.
    pub eviction: Option<HousekeepingReport>,
}

/// What a bulk operation (eviction, delete-all, dedup) actually did.
///
/// Failures here are best effort: they were logged and skipped, and
/// `remaining` comes from a fresh scan rather than arithmetic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HousekeepingReport {
    /// Artifacts found by the scan that started the operation.
    pub examined: usize,
    pub deleted: usize,
    /// Deletions that errored and were skipped.
    pub failed: usize,
    /// Names whose numeric prefix could not be parsed.
    pub malformed: usize,
    /// Artifacts on disk after the operation, also written to `artifactCount`.
    pub remaining: usize,
}
