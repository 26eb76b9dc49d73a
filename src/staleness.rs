//! Decide whether a built artifact is older than the sources it came from.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use anyhow::Result;

/// Why an artifact needs rebuilding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleReason {
    /// The artifact could not be stat'd, so it was never built.
    ArtifactMissing,
    /// A tracked file was modified after the artifact.
    NewerSource(PathBuf),
    /// The VCS could not list tracked files.
    EnumerationFailed(String),
    /// A tracked file could not be stat'd (e.g. deleted but still tracked).
    StatFailed(PathBuf),
    /// The caller asked for a build regardless.
    Forced,
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaleReason::ArtifactMissing => write!(f, "artifact has never been built"),
            StaleReason::NewerSource(path) => write!(f, "{} is newer", path.display()),
            StaleReason::EnumerationFailed(err) => {
                write!(f, "could not list tracked files ({err})")
            }
            StaleReason::StatFailed(path) => write!(f, "could not stat {}", path.display()),
            StaleReason::Forced => write!(f, "build forced"),
        }
    }
}

/// Result of a freshness check. `None` means up to date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub reason: Option<StaleReason>,
}

impl Verdict {
    pub fn fresh() -> Self {
        Self { reason: None }
    }

    pub fn stale(reason: StaleReason) -> Self {
        Self {
            reason: Some(reason),
        }
    }

    pub fn is_stale(&self) -> bool {
        self.reason.is_some()
    }
}

/// Last build time of the artifact, or `None` if it cannot be stat'd.
pub fn artifact_build_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

/// Check `artifact` against the files returned by `list_tracked`.
///
/// Listing is skipped when the artifact is missing. Listing and stat
/// failures are folded into the verdict instead of being returned.
pub fn evaluate<F>(artifact: &Path, list_tracked: F) -> Verdict
where
    F: FnOnce() -> Result<Vec<PathBuf>>,
{
    let Some(built) = artifact_build_time(artifact) else {
        tracing::debug!(path = %artifact.display(), "artifact not found");
        return Verdict::stale(StaleReason::ArtifactMissing);
    };

    let files = match list_tracked() {
        Ok(files) => files,
        Err(err) => {
            tracing::warn!(?err, "failed to list tracked files, assuming stale");
            return Verdict::stale(StaleReason::EnumerationFailed(format!("{err:#}")));
        }
    };
    tracing::debug!(count = files.len(), "listed tracked files");

    compare(built, &files)
}

fn compare(built: SystemTime, files: &[PathBuf]) -> Verdict {
    for file in files {
        let modified = match fs::metadata(file).and_then(|meta| meta.modified()) {
            Ok(modified) => modified,
            Err(err) => {
                tracing::debug!(?err, path = %file.display(), "failed to stat tracked file");
                return Verdict::stale(StaleReason::StatFailed(file.clone()));
            }
        };
        if modified > built {
            return Verdict::stale(StaleReason::NewerSource(file.clone()));
        }
    }
    Verdict::fresh()
}
