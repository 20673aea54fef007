use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),
    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),
    #[error("Malformed submission filename '{name}': expected at least 4 ' - ' segments, found {segments}")]
    MalformedFilename { name: String, segments: usize },
    #[error("Could not parse submission timestamp '{raw}'")]
    DateParse { raw: String },
    #[error("Corrupt archive '{}': {reason}", path.display())]
    CorruptArchive { path: PathBuf, reason: String },
    #[error("Unsupported submission type: {}", .0.display())]
    UnsupportedSubmissionType(PathBuf),
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    /// Classify an I/O failure on `path` into the matching taxonomy variant.
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => PipelineError::PathNotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => PipelineError::PermissionDenied(path.to_path_buf()),
            _ => PipelineError::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
#[path = "tests/errors_tests.rs"]
mod tests;
