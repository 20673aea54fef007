use super::types::{ArchiveShape, ExtractionResult};
use crate::services::collision::{CollisionResolver, DisambiguationKey};
use crate::services::config::SorterConfig;
use crate::services::fs_utils::file_utils::{self, file_name_of};
use crate::services::report::{Report, ReportEvent};
use crate::types::errors::{PipelineError, PipelineResult};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Shared state for archive extraction within one run.
pub struct ArchiveExtractor<'a> {
    pub config: &'a SorterConfig,
    pub resolver: &'a mut CollisionResolver,
}

impl<'a> ArchiveExtractor<'a> {
    pub fn new(config: &'a SorterConfig, resolver: &'a mut CollisionResolver) -> Self {
        Self { config, resolver }
    }

    /// Extract `archive_path` under `destination`, picking the layout from the archive name.
    ///
    /// Steps:
    /// 1. Verify the archive exists (missing: recorded, `PathNotFound`)
    /// 2. Open it as a zip (unreadable: recorded, `CorruptArchive`)
    /// 3. Bulk export: clear `destination`. Single submission: reserve a
    ///    `<timestamp> #<n>` subdirectory under `destination`
    /// 4. Write every entry, preserving relative paths
    pub fn extract(
        &mut self,
        archive_path: &Path,
        destination: &Path,
        report: &mut dyn Report,
    ) -> PipelineResult<ExtractionResult> {
        let shape = ArchiveShape::detect(&file_name_of(archive_path), self.config)?;
        self.extract_as(archive_path, destination, &shape, report)
    }

    /// Extract with an explicit shape.
    pub fn extract_as(
        &mut self,
        archive_path: &Path,
        destination: &Path,
        shape: &ArchiveShape,
        report: &mut dyn Report,
    ) -> PipelineResult<ExtractionResult> {
        if !archive_path.is_file() {
            report.record(ReportEvent::failure(format!(
                "Could not find zip file: '{}'",
                archive_path.display()
            )));
            return Err(PipelineError::PathNotFound(archive_path.to_path_buf()));
        }

        let mut archive = match open_zip(archive_path) {
            Ok(a) => a,
            Err(e) => {
                report.record(ReportEvent::failure(format!(
                    "An error occurred while extracting '{}': {e}",
                    archive_path.display()
                )));
                return Err(e);
            }
        };

        let (dest_path, key) = match shape {
            ArchiveShape::BulkExport { .. } => {
                file_utils::prepare_directory(destination, report)?;
                (destination.to_path_buf(), None)
            }
            ArchiveShape::SingleSubmission(name) => {
                let timestamp = name.timestamp_key(&self.config.timestamp_format)?;
                let key = self
                    .resolver
                    .reserve(destination, DisambiguationKey::new(timestamp))?;
                let dest_path = destination.join(key.to_string());
                fs::create_dir_all(&dest_path)
                    .map_err(|e| PipelineError::from_io(&dest_path, e))?;
                (dest_path, Some(key))
            }
        };

        let (files_extracted, unsafe_entries) =
            match extract_zip_inner(&mut archive, archive_path, &dest_path, report) {
                Ok(counts) => counts,
                Err(e) => {
                    report.record(ReportEvent::failure(format!(
                        "An error occurred while extracting '{}': {e}",
                        archive_path.display()
                    )));
                    return Err(e);
                }
            };

        report.record(ReportEvent::success(format!(
            "Contents of '{}' was extracted to '{}'",
            archive_path.display(),
            dest_path.display()
        )));

        Ok(ExtractionResult {
            archive_path: archive_path.to_path_buf(),
            dest_path,
            key,
            files_extracted,
            unsafe_entries,
        })
    }
}

fn open_zip(archive_path: &Path) -> PipelineResult<zip::ZipArchive<fs::File>> {
    let file = fs::File::open(archive_path).map_err(|e| PipelineError::from_io(archive_path, e))?;
    zip::ZipArchive::new(file).map_err(|e| corrupt(archive_path, e))
}

fn corrupt(archive_path: &Path, error: zip::result::ZipError) -> PipelineError {
    PipelineError::CorruptArchive {
        path: archive_path.to_path_buf(),
        reason: error.to_string(),
    }
}

fn extract_zip_inner(
    archive: &mut zip::ZipArchive<fs::File>,
    archive_path: &Path,
    dest_path: &Path,
    report: &mut dyn Report,
) -> PipelineResult<(usize, usize)> {
    let mut count: usize = 0;
    let mut skipped: usize = 0;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| corrupt(archive_path, e))?;

        let entry_path: PathBuf = match entry.enclosed_name() {
            Some(p) => p.to_path_buf(),
            None => {
                report.record(ReportEvent::notice(format!(
                    "Skipped unsafe entry '{}' in '{}'",
                    entry.name(),
                    archive_path.display()
                )));
                skipped += 1;
                continue;
            }
        };

        let output_path = dest_path.join(&entry_path);

        if entry.is_dir() {
            fs::create_dir_all(&output_path).map_err(|e| PipelineError::from_io(&output_path, e))?;
        } else {
            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent).map_err(|e| PipelineError::from_io(parent, e))?;
            }
            let mut outfile = fs::File::create(&output_path)
                .map_err(|e| PipelineError::from_io(&output_path, e))?;
            io::copy(&mut entry, &mut outfile).map_err(|e| match e.kind() {
                io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => {
                    PipelineError::CorruptArchive {
                        path: archive_path.to_path_buf(),
                        reason: e.to_string(),
                    }
                }
                _ => PipelineError::from_io(&output_path, e),
            })?;
            count += 1;
        }
    }
    Ok((count, skipped))
}
