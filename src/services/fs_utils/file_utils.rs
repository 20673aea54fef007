use std::fs;
use std::path::{Path, PathBuf};

use crate::services::report::{Report, ReportEvent};
use crate::types::errors::{PipelineError, PipelineResult};

/// Move a file or directory. Falls back to copy + delete through `fs_extra`
/// when `fs::rename` fails (cross-device moves).
pub fn move_entry(from: &Path, to: &Path) -> PipelineResult<()> {
    let rename_err = match fs::rename(from, to) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };

    log::warn!(
        "fs::rename failed (cross-device?): {}. Attempting fallback move...",
        rename_err
    );

    if !from.exists() {
        return Err(PipelineError::PathNotFound(from.to_path_buf()));
    }
    if to.exists() {
        return Err(PipelineError::from_io(to, rename_err));
    }

    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|e| PipelineError::from_io(parent, e))?;
    }

    let moved = if from.is_dir() {
        let mut options = fs_extra::dir::CopyOptions::new();
        options.copy_inside = true;
        fs_extra::dir::move_dir(from, to, &options).map(|_| ())
    } else {
        let options = fs_extra::file::CopyOptions::new();
        fs_extra::file::move_file(from, to, &options).map(|_| ())
    };

    moved.map_err(|err| PipelineError::Io {
        path: from.to_path_buf(),
        source: std::io::Error::other(err.to_string()),
    })
}

/// Make `path` an empty directory: whatever is there (file or tree) is removed first.
///
/// Permission errors are returned as `PermissionDenied` and are fatal for callers.
pub fn prepare_directory(path: &Path, report: &mut dyn Report) -> PipelineResult<()> {
    let result = clear_and_create(path);
    match &result {
        Ok(()) => report.record(ReportEvent::success(format!(
            "Prepared directory '{}'",
            path.display()
        ))),
        Err(PipelineError::PermissionDenied(_)) => report.record(ReportEvent::failure(format!(
            "Permission denied: Unable to create dir '{}'",
            path.display()
        ))),
        Err(e) => report.record(ReportEvent::failure(format!(
            "An error occurred while preparing directory '{}': {e}",
            path.display()
        ))),
    }
    result
}

fn clear_and_create(path: &Path) -> PipelineResult<()> {
    let io_err = |e| PipelineError::from_io(path, e);

    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path).map_err(io_err)?,
        Ok(_) => fs::remove_file(path).map_err(io_err)?,
        Err(_) => {}
    }

    fs::create_dir_all(path).map_err(io_err)
}

/// Immediate children of `dir`, sorted by file name.
pub fn sorted_entries(dir: &Path) -> PipelineResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| PipelineError::from_io(dir, e))?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(e) => paths.push(e.path()),
            Err(e) => log::warn!("Skipping unreadable entry in {}: {e}", dir.display()),
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

/// Final path component as an owned string (lossy).
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Lowercased extension, if any.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_lowercase())
}
