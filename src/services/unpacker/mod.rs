//! Second pass over student directories: expands per-submission archives and
//! strips the export prefix from single-file submissions.

use std::fs;
use std::path::{Path, PathBuf};

use crate::services::archive::ArchiveExtractor;
use crate::services::config::SorterConfig;
use crate::services::fs_utils::file_utils::{self, extension_of, file_name_of};
use crate::services::grammar::{self, SubmissionName};
use crate::services::report::{Report, ReportEvent};
use crate::types::errors::{PipelineError, PipelineResult};

/// What a file inside a student directory turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionKind {
    Archive(SubmissionName),
    SingleFile(SubmissionName),
}

#[derive(Debug, Clone, Default)]
pub struct UnpackSummary {
    /// Timestamp-keyed directories created from nested archives.
    pub expanded: Vec<PathBuf>,
    /// Single-file submissions renamed to their original filename.
    pub flattened: Vec<PathBuf>,
    /// Files left untouched because they are not recognized submissions.
    pub invalid: Vec<PathBuf>,
    /// Recognized files that could not be processed (missing, name taken).
    pub skipped: Vec<PathBuf>,
}

/// Classify a file by extension and name.
pub fn classify(path: &Path, config: &SorterConfig) -> PipelineResult<SubmissionKind> {
    let unsupported = || PipelineError::UnsupportedSubmissionType(path.to_path_buf());

    let ext = extension_of(path).ok_or_else(unsupported)?;
    let is_archive = config.is_archive_extension(&ext);
    if !is_archive && !config.is_single_file_extension(&ext) {
        return Err(unsupported());
    }

    // Without the export prefix there is nothing to key or strip
    let name = grammar::parse(&file_name_of(path)).map_err(|_| unsupported())?;
    Ok(if is_archive {
        SubmissionKind::Archive(name)
    } else {
        SubmissionKind::SingleFile(name)
    })
}

/// Process every file directly inside each of `dirs`.
///
/// Missing archives and unsupported files are recorded and skipped. A corrupt
/// archive or an unexpected I/O failure stops the pass.
pub fn unpack_student_dirs(
    dirs: &[PathBuf],
    extractor: &mut ArchiveExtractor<'_>,
    report: &mut dyn Report,
) -> PipelineResult<UnpackSummary> {
    let mut summary = UnpackSummary::default();

    for dir in dirs {
        if let Err(e) = unpack_student(dir, extractor, report, &mut summary) {
            report.record(ReportEvent::failure(format!(
                "An error occurred while extracting student zip files: {e}"
            )));
            return Err(e);
        }
    }

    log::info!(
        "Unpacked {} archives, flattened {} files, {} invalid",
        summary.expanded.len(),
        summary.flattened.len(),
        summary.invalid.len()
    );
    Ok(summary)
}

fn unpack_student(
    student_dir: &Path,
    extractor: &mut ArchiveExtractor<'_>,
    report: &mut dyn Report,
    summary: &mut UnpackSummary,
) -> PipelineResult<()> {
    let files: Vec<PathBuf> = file_utils::sorted_entries(student_dir)?
        .into_iter()
        .filter(|p| p.is_file())
        .collect();

    for path in files {
        match classify(&path, extractor.config) {
            Ok(SubmissionKind::Archive(_)) => {
                expand_archive(&path, student_dir, extractor, report, summary)?
            }
            Ok(SubmissionKind::SingleFile(name)) => {
                let target = student_dir.join(&name.original_name);
                if target.exists() {
                    report.record(ReportEvent::notice(format!(
                        "'{}' already exists; kept '{}' as is",
                        target.display(),
                        path.display()
                    )));
                    summary.skipped.push(path);
                    continue;
                }
                fs::rename(&path, &target).map_err(|e| PipelineError::from_io(&path, e))?;
                report.record(ReportEvent::success(format!(
                    "Submission file '{}' was renamed to '{}'",
                    path.display(),
                    target.display()
                )));
                summary.flattened.push(target);
            }
            Err(PipelineError::UnsupportedSubmissionType(_)) => {
                report.record(ReportEvent::notice(format!(
                    "'{}' is not a valid submission",
                    path.display()
                )));
                summary.invalid.push(path);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Extract one nested archive into a keyed directory beside it, then delete it.
///
/// `classify` only yields archives whose names parse, so the extractor always picks
/// the single-submission layout here and never clears `student_dir`.
fn expand_archive(
    path: &Path,
    student_dir: &Path,
    extractor: &mut ArchiveExtractor<'_>,
    report: &mut dyn Report,
    summary: &mut UnpackSummary,
) -> PipelineResult<()> {
    match extractor.extract(path, student_dir, report) {
        Ok(result) => {
            fs::remove_file(path).map_err(|e| PipelineError::from_io(path, e))?;
            report.record(ReportEvent::success(format!(
                "Removed extracted archive '{}'",
                path.display()
            )));
            summary.expanded.push(result.dest_path);
        }
        // Already recorded by the extractor
        Err(PipelineError::PathNotFound(_)) => summary.skipped.push(path.to_path_buf()),
        Err(e @ PipelineError::DateParse { .. }) => {
            report.record(ReportEvent::notice(format!(
                "Skipped '{}': {e}",
                path.display()
            )));
            summary.skipped.push(path.to_path_buf());
        }
        Err(e) => return Err(e),
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/unpacker_tests.rs"]
mod tests;
