//! Removes build output, IDE metadata and OS bookkeeping from the sorted tree.
//! Uses `walkdir` for the traversal; artifact directories are not descended into.

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::services::config::SorterConfig;
use crate::services::fs_utils::file_utils::extension_of;
use crate::services::report::{Report, ReportEvent};
use crate::types::errors::{PipelineError, PipelineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub kind: ArtifactKind,
}

#[derive(Debug, Clone)]
pub struct CleanFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Per-item outcome of a cleaning pass.
#[derive(Debug, Clone, Default)]
pub struct CleanSummary {
    pub deleted: Vec<Artifact>,
    pub failures: Vec<CleanFailure>,
}

/// Find every artifact under `root` (the root itself is never a candidate).
pub fn find_artifacts(root: &Path, config: &SorterConfig) -> Vec<Artifact> {
    let mut artifacts = Vec::new();

    let mut walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("Skipping unreadable entry: {e}");
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy();
        if entry.file_type().is_dir() {
            if config.is_artifact_dir(&name) {
                artifacts.push(Artifact {
                    path: entry.path().to_path_buf(),
                    kind: ArtifactKind::Directory,
                });
                walker.skip_current_dir();
            }
            continue;
        }

        let ext = extension_of(entry.path());
        if config.is_artifact_file(&name, ext.as_deref()) {
            artifacts.push(Artifact {
                path: entry.path().to_path_buf(),
                kind: ArtifactKind::File,
            });
        }
    }

    artifacts
}

/// Delete every artifact under `root`. Each deletion is independent: a failure is
/// recorded in the summary and the pass continues.
pub fn clean_tree(
    root: &Path,
    config: &SorterConfig,
    report: &mut dyn Report,
) -> PipelineResult<CleanSummary> {
    if !root.is_dir() {
        return Err(PipelineError::PathNotFound(root.to_path_buf()));
    }

    let mut summary = CleanSummary::default();

    for artifact in find_artifacts(root, config) {
        let (result, label) = match artifact.kind {
            ArtifactKind::File => (fs::remove_file(&artifact.path), "file"),
            ArtifactKind::Directory => (fs::remove_dir_all(&artifact.path), "dir"),
        };

        match result {
            Ok(()) => {
                report.record(ReportEvent::success(format!(
                    "Deleted {label} '{}'",
                    artifact.path.display()
                )));
                summary.deleted.push(artifact);
            }
            Err(e) => {
                report.record(ReportEvent::failure(format!(
                    "Error deleting {label} '{}': {e}",
                    artifact.path.display()
                )));
                summary.failures.push(CleanFailure {
                    path: artifact.path,
                    error: e.to_string(),
                });
            }
        }
    }

    log::info!(
        "Cleanup removed {} artifacts ({} failures)",
        summary.deleted.len(),
        summary.failures.len()
    );
    Ok(summary)
}

#[cfg(test)]
#[path = "tests/cleaner_tests.rs"]
mod tests;
