//! Groups a flat bulk export into one directory per student.
//!
//! The pass is all-or-nothing with respect to filename parsing: every top-level entry
//! is parsed before anything on disk changes, so a malformed name leaves the batch as
//! it was extracted.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::services::config::SorterConfig;
use crate::services::fs_utils::file_utils::{self, file_name_of};
use crate::services::grammar::{self, SubmissionName};
use crate::services::report::{Report, ReportEvent};
use crate::types::errors::{PipelineError, PipelineResult};

/// One student observed in the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRecord {
    /// Canonical `Last, First` identity, also the directory name.
    pub identity: String,
    pub dir: PathBuf,
    /// Submission entries now inside `dir`.
    pub submissions: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct OrganizeSummary {
    /// Sorted ascending by identity.
    pub students: Vec<StudentRecord>,
    pub renamed: usize,
    pub moved: usize,
}

/// Rename every top-level submission to its canonical form and move it into
/// `<extract_dir>/<Last, First>/`.
///
/// Any failure is recorded and returned; callers treat it as fatal.
pub fn organize_students(
    extract_dir: &Path,
    config: &SorterConfig,
    report: &mut dyn Report,
) -> PipelineResult<OrganizeSummary> {
    organize_inner(extract_dir, config, report).inspect_err(|e| {
        report.record(ReportEvent::failure(format!(
            "An error occurred while organizing student folders: {e}"
        )));
    })
}

fn organize_inner(
    extract_dir: &Path,
    config: &SorterConfig,
    report: &mut dyn Report,
) -> PipelineResult<OrganizeSummary> {
    let plan = plan_renames(extract_dir, config)?;
    let mut summary = OrganizeSummary::default();

    // Rename in place so name and timestamp segments are canonical
    for (source, normalized) in &plan {
        let target = extract_dir.join(normalized.to_filename());
        if *source == target {
            continue;
        }
        fs::rename(source, &target).map_err(|e| PipelineError::from_io(source, e))?;
        report.record(ReportEvent::success(format!(
            "Renamed '{}' to '{}'",
            source.display(),
            target.display()
        )));
        summary.renamed += 1;
    }

    // Distinct identities, sorted by canonical string
    let mut students: BTreeMap<String, StudentRecord> = BTreeMap::new();
    for (_, normalized) in &plan {
        students
            .entry(normalized.identity.clone())
            .or_insert_with(|| StudentRecord {
                identity: normalized.identity.clone(),
                dir: extract_dir.join(&normalized.identity),
                submissions: Vec::new(),
            });
    }

    for record in students.values() {
        file_utils::prepare_directory(&record.dir, report)?;
    }

    // Re-scan after renaming and route each file by its identity segment
    for source in submission_files(extract_dir, config)? {
        let file_name = file_name_of(&source);
        let name = grammar::parse(&file_name)?;
        let record = students.get_mut(&name.identity).ok_or_else(|| {
            PipelineError::PathNotFound(extract_dir.join(&name.identity))
        })?;

        let destination = record.dir.join(&file_name);
        file_utils::move_entry(&source, &destination)?;
        report.record(ReportEvent::success(format!(
            "Moved '{}' to '{}'",
            source.display(),
            record.dir.display()
        )));
        record.submissions.push(destination);
        summary.moved += 1;
    }

    summary.students = students.into_values().collect();
    log::info!(
        "Organized {} submissions for {} students",
        summary.moved,
        summary.students.len()
    );
    Ok(summary)
}

/// Parse and normalize every top-level submission before touching the disk.
fn plan_renames(
    extract_dir: &Path,
    config: &SorterConfig,
) -> PipelineResult<Vec<(PathBuf, SubmissionName)>> {
    let mut plan = Vec::new();
    let mut targets: HashSet<String> = HashSet::new();

    for source in submission_files(extract_dir, config)? {
        let file_name = file_name_of(&source);
        let normalized = grammar::parse(&file_name)?.normalized(&config.timestamp_format)?;
        let target_name = normalized.to_filename();

        let target = extract_dir.join(&target_name);
        let clashes_on_disk = target_name != file_name && target.exists();
        if clashes_on_disk || !targets.insert(target_name) {
            return Err(PipelineError::Io {
                path: target,
                source: io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("normalized name of '{file_name}' is already taken"),
                ),
            });
        }

        plan.push((source, normalized));
    }
    Ok(plan)
}

/// Top-level files of the extraction directory, minus manifests.
fn submission_files(extract_dir: &Path, config: &SorterConfig) -> PipelineResult<Vec<PathBuf>> {
    Ok(file_utils::sorted_entries(extract_dir)?
        .into_iter()
        .filter(|p| !p.is_dir())
        .filter(|p| !config.is_manifest(&file_name_of(p)))
        .collect())
}

#[cfg(test)]
#[path = "tests/organizer_tests.rs"]
mod tests;
