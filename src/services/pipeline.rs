//! End-to-end run: master archive → student directories → unpacked, cleaned tree.

use std::path::{Path, PathBuf};

use crate::services::archive::{ArchiveExtractor, ArchiveShape};
use crate::services::cleaner::{self, CleanSummary};
use crate::services::collision::CollisionResolver;
use crate::services::config::SorterConfig;
use crate::services::fs_utils::file_utils::file_name_of;
use crate::services::organizer::{self, OrganizeSummary};
use crate::services::report::{Report, ReportEvent};
use crate::services::unpacker::{self, UnpackSummary};
use crate::types::errors::{PipelineError, PipelineResult};

#[derive(Debug, Clone)]
pub struct PipelineSummary {
    pub output_dir: PathBuf,
    pub organize: OrganizeSummary,
    pub unpack: UnpackSummary,
    pub clean: CleanSummary,
}

/// Strip backslashes and quote characters that terminals add around dragged-in paths.
pub fn sanitize_input_path(raw: &str) -> PathBuf {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '\\' | '"' | '\''))
        .collect();
    PathBuf::from(cleaned.trim())
}

/// `"<prefix> <assignment> <run-ts>"` for standard LMS downloads, else `"<prefix> <run-ts>"`.
pub fn output_dir_name(master_name: &str, config: &SorterConfig, run_timestamp: &str) -> String {
    match ArchiveShape::master(master_name, config) {
        ArchiveShape::BulkExport {
            assignment: Some(assignment),
        } => format!(
            "{} {} {}",
            config.output_prefix,
            sanitize_filename::sanitize(assignment),
            run_timestamp
        ),
        _ => format!("{} {}", config.output_prefix, run_timestamp),
    }
}

/// Run every stage against `master`, writing the result under `output_root`.
///
/// Any returned error is fatal for the run; it has already been recorded in `report`.
/// Partial output is left in place.
pub fn run(
    master: &Path,
    config: &SorterConfig,
    output_root: &Path,
    run_timestamp: &str,
    report: &mut dyn Report,
) -> PipelineResult<PipelineSummary> {
    if let Err(e) = config.validate() {
        report.record(ReportEvent::failure(e.to_string()));
        return Err(e);
    }

    if !master.is_file() {
        report.record(ReportEvent::failure(format!(
            "Could not find zip file: '{}'",
            master.display()
        )));
        return Err(PipelineError::PathNotFound(master.to_path_buf()));
    }

    let master_name = file_name_of(master);
    let output_dir = output_root.join(output_dir_name(&master_name, config, run_timestamp));
    log::info!("Sorting '{}' into '{}'", master.display(), output_dir.display());

    let mut resolver = CollisionResolver::new();
    let mut extractor = ArchiveExtractor::new(config, &mut resolver);

    let shape = ArchiveShape::master(&master_name, config);
    extractor.extract_as(master, &output_dir, &shape, report)?;

    let organize = organizer::organize_students(&output_dir, config, report)?;

    let dirs: Vec<PathBuf> = organize.students.iter().map(|s| s.dir.clone()).collect();
    let unpack = unpacker::unpack_student_dirs(&dirs, &mut extractor, report)?;

    let clean = cleaner::clean_tree(&output_dir, config, report)?;

    Ok(PipelineSummary {
        output_dir,
        organize,
        unpack,
        clean,
    })
}

#[cfg(test)]
#[path = "tests/pipeline_tests.rs"]
mod tests;
