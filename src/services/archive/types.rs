use std::path::PathBuf;

use crate::services::collision::DisambiguationKey;
use crate::services::config::SorterConfig;
use crate::services::grammar::{self, SubmissionName};
use crate::types::errors::PipelineResult;

/// How an archive's contents are laid out on extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveShape {
    /// The LMS master download: extracted straight into the (cleared) destination.
    BulkExport { assignment: Option<String> },
    /// One student's submission: extracted into a timestamp-keyed subdirectory.
    SingleSubmission(SubmissionName),
}

impl ArchiveShape {
    /// Classify an archive by its file name.
    ///
    /// A name that parses as a submission filename is always a single submission,
    /// even when it happens to contain the bulk-export markers.
    pub fn detect(file_name: &str, config: &SorterConfig) -> PipelineResult<Self> {
        match grammar::parse(file_name) {
            Ok(name) => Ok(Self::SingleSubmission(name)),
            Err(e) if config.is_bulk_export_name(file_name) => {
                log::debug!("'{file_name}' is not a submission name ({e}); treating as bulk export");
                Ok(Self::master(file_name, config))
            }
            Err(e) => Err(e),
        }
    }

    /// Shape of the master archive. The assignment name is only known for
    /// standard LMS download names ("Project 3 Download Mar 30, 2025 507 PM.zip").
    pub fn master(file_name: &str, config: &SorterConfig) -> Self {
        let assignment = if config.is_bulk_export_name(file_name) {
            file_name
                .split(config.download_marker.as_str())
                .next()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        } else {
            None
        };
        Self::BulkExport { assignment }
    }
}

/// Result of an extraction operation.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub archive_path: PathBuf,
    pub dest_path: PathBuf,
    /// Set for single submissions: the subdirectory name that was reserved.
    pub key: Option<DisambiguationKey>,
    pub files_extracted: usize,
    /// Entries skipped because their path would escape the destination.
    pub unsafe_entries: usize,
}
