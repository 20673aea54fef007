use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::services::grammar::SEGMENT_DELIMITER;
use crate::types::errors::{PipelineError, PipelineResult};

/// Rules for one sorting run. Every field falls back to its default when absent
/// from the config file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SorterConfig {
    /// Marks a master archive name as an LMS bulk download ("Project 3 Download ...").
    pub download_marker: String,
    /// Assignment-type words, at least one of which must appear next to the download marker.
    pub assignment_markers: Vec<String>,
    /// Generated manifest files skipped while organizing.
    pub manifest_names: Vec<String>,
    pub archive_extensions: Vec<String>,
    /// Single-file submissions that get their export prefix stripped.
    pub single_file_extensions: Vec<String>,
    pub artifact_dir_names: Vec<String>,
    pub artifact_file_names: Vec<String>,
    pub artifact_extensions: Vec<String>,
    pub output_prefix: String,
    /// chrono format of the run timestamp in output and log names.
    pub run_timestamp_format: String,
    /// chrono format of normalized submission timestamps.
    pub timestamp_format: String,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for SorterConfig {
    fn default() -> Self {
        Self {
            download_marker: "Download".into(),
            assignment_markers: strings(&["Project", "Lab Problem"]),
            manifest_names: strings(&["index.html"]),
            archive_extensions: strings(&["zip"]),
            single_file_extensions: strings(&["java", "md", "txt"]),
            artifact_dir_names: strings(&[
                "__MACOSX", "out", "bin", "lib", ".idea", ".vscode", ".DS_Store",
            ]),
            artifact_file_names: strings(&[".gitignore", ".DS_Store"]),
            artifact_extensions: strings(&["iml"]),
            output_prefix: "StudentSubmissions".into(),
            run_timestamp_format: "%m-%d-%Y %H-%M-%S".into(),
            timestamp_format: "%Y-%m-%d %H:%M:%S".into(),
        }
    }
}

impl SorterConfig {
    /// Reject settings that would make a run misbehave halfway through.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.download_marker.trim().is_empty() {
            return Err(PipelineError::Config(
                "download_marker must not be empty".to_string(),
            ));
        }
        check_format("run_timestamp_format", &self.run_timestamp_format)?;
        check_format("timestamp_format", &self.timestamp_format)?;
        if self.timestamp_format.contains('/') || self.run_timestamp_format.contains('/') {
            return Err(PipelineError::Config(
                "timestamp formats end up in file names and must not contain '/'".to_string(),
            ));
        }
        check_submission_format(&self.timestamp_format)?;
        Ok(())
    }

    /// True when `name` carries both the download marker and an assignment marker.
    pub fn is_bulk_export_name(&self, name: &str) -> bool {
        name.contains(&self.download_marker)
            && self.assignment_markers.iter().any(|m| name.contains(m.as_str()))
    }

    pub fn is_manifest(&self, name: &str) -> bool {
        self.manifest_names.iter().any(|m| m == name)
    }

    pub fn is_archive_extension(&self, ext: &str) -> bool {
        contains_ignore_case(&self.archive_extensions, ext)
    }

    pub fn is_single_file_extension(&self, ext: &str) -> bool {
        contains_ignore_case(&self.single_file_extensions, ext)
    }

    pub fn is_artifact_dir(&self, name: &str) -> bool {
        self.artifact_dir_names.iter().any(|d| d == name)
    }

    pub fn is_artifact_file(&self, name: &str, ext: Option<&str>) -> bool {
        self.artifact_file_names.iter().any(|f| f == name)
            || ext.is_some_and(|e| contains_ignore_case(&self.artifact_extensions, e))
    }
}

fn contains_ignore_case(list: &[String], value: &str) -> bool {
    list.iter().any(|item| item.eq_ignore_ascii_case(value))
}

fn check_format(field: &str, format: &str) -> PipelineResult<()> {
    if format.is_empty() || StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(PipelineError::Config(format!(
            "{field} is not a valid chrono format: '{format}'"
        )));
    }
    Ok(())
}

/// Normalized timestamps are written back into submission file names and read again
/// when nested archives are keyed, so the format has to survive that trip intact.
fn check_submission_format(format: &str) -> PipelineResult<()> {
    let sample: NaiveDateTime = NaiveDate::from_ymd_opt(2024, 12, 7)
        .and_then(|d| d.and_hms_opt(21, 15, 0))
        .ok_or_else(|| PipelineError::Config("sample timestamp out of range".to_string()))?;
    let rendered = sample.format(format).to_string();

    if rendered.contains(SEGMENT_DELIMITER) {
        return Err(PipelineError::Config(format!(
            "timestamp_format renders '{rendered}', which contains the segment delimiter '{SEGMENT_DELIMITER}'"
        )));
    }
    match NaiveDateTime::parse_from_str(&rendered, format) {
        Ok(parsed) if parsed == sample => Ok(()),
        _ => Err(PipelineError::Config(format!(
            "timestamp_format '{format}' must keep the date, hour and minute so '{rendered}' can be read back"
        ))),
    }
}
