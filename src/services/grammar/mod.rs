//! Filename grammar for LMS bulk-export submissions.
//!
//! The export encodes its metadata positionally in each entry's filename:
//! `<idPair> - <First Last> - <Mon D, YYYY HMM AM> - <original filename>`.
//! Each export format is a [`GrammarVariant`]; new LMS formats are added as variants.

use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::LazyLock;

use crate::types::errors::{PipelineError, PipelineResult};

/// Separator between metadata segments.
pub const SEGMENT_DELIMITER: &str = " - ";

/// Compact clock token such as `915` or `1042`.
static RE_COMPACT_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3,4}$").expect("Invalid regex"));

/// Calendar layouts accepted once the colon has been inserted into the clock token.
const DATE_LAYOUTS: &[&str] = &[
    "%B %d, %Y %I:%M %p",
    "%B %d %Y %I:%M %p",
    "%B %d, %Y %H:%M",
    "%B %d %Y %H:%M",
];

/// Index of the clock token within the date segment (`Dec`, `7,`, `2024`, `915`, `PM`).
const CLOCK_TOKEN_INDEX: usize = 3;

/// Known export naming schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrammarVariant {
    /// `<idPair> - <First Last> - <date time> - <original name>`
    #[default]
    PilotExport,
}

impl GrammarVariant {
    pub const ALL: &'static [GrammarVariant] = &[GrammarVariant::PilotExport];

    /// Number of positional fields; the last one absorbs any further delimiters.
    pub fn segment_count(self) -> usize {
        match self {
            GrammarVariant::PilotExport => 4,
        }
    }

    pub fn parse(self, filename: &str) -> PipelineResult<SubmissionName> {
        let fields: Vec<&str> = filename
            .splitn(self.segment_count(), SEGMENT_DELIMITER)
            .collect();

        if fields.len() < self.segment_count()
            || fields.iter().any(|f| f.trim().is_empty())
            || !is_full_name(fields[1])
        {
            return Err(PipelineError::MalformedFilename {
                name: filename.to_string(),
                segments: filename.split(SEGMENT_DELIMITER).count(),
            });
        }

        match self {
            GrammarVariant::PilotExport => Ok(SubmissionName {
                variant: self,
                id_pair: fields[0].to_string(),
                identity: fields[1].to_string(),
                timestamp_raw: fields[2].to_string(),
                original_name: fields[3].to_string(),
            }),
        }
    }

    /// First variant that accepts `filename`.
    pub fn detect(filename: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.parse(filename).is_ok())
    }
}

/// Metadata carried by one submission filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionName {
    pub variant: GrammarVariant,
    pub id_pair: String,
    pub identity: String,
    pub timestamp_raw: String,
    pub original_name: String,
}

impl SubmissionName {
    /// Reassemble the filename from its fields.
    pub fn to_filename(&self) -> String {
        [
            self.id_pair.as_str(),
            self.identity.as_str(),
            self.timestamp_raw.as_str(),
            self.original_name.as_str(),
        ]
        .join(SEGMENT_DELIMITER)
    }

    /// Same submission with a `Last, First` identity and a normalized timestamp.
    pub fn normalized(&self, timestamp_format: &str) -> PipelineResult<SubmissionName> {
        Ok(SubmissionName {
            identity: canonicalize_identity(&self.identity),
            timestamp_raw: self.timestamp_key(timestamp_format)?,
            ..self.clone()
        })
    }

    /// Normalized timestamp, reusing the segment when it is already normalized.
    pub fn timestamp_key(&self, timestamp_format: &str) -> PipelineResult<String> {
        if NaiveDateTime::parse_from_str(&self.timestamp_raw, timestamp_format).is_ok() {
            return Ok(self.timestamp_raw.clone());
        }
        normalize_timestamp(&self.timestamp_raw, timestamp_format)
    }
}

/// Parse with the default export variant.
pub fn parse(filename: &str) -> PipelineResult<SubmissionName> {
    GrammarVariant::default().parse(filename)
}

/// `First Last` with at least two tokens, or an already canonical `Last, First`.
fn is_full_name(identity: &str) -> bool {
    identity.contains(',') || identity.split_whitespace().nth(1).is_some()
}

/// Turn `First Middle Last` into `Last, First Middle`.
///
/// A name that already contains a comma is taken as canonical. [`parse`] rejects
/// single-token names, so the fallback for one token only applies to direct callers.
pub fn canonicalize_identity(identity: &str) -> String {
    if identity.contains(',') {
        return identity.trim().to_string();
    }

    let tokens: Vec<&str> = identity.split_whitespace().collect();
    match tokens.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{}, {}", last, rest.join(" ")),
        Some((only, _)) => only.to_string(),
        None => String::new(),
    }
}

/// Normalize an export date such as `Dec 7, 2024 915 PM` into `timestamp_format`.
pub fn normalize_timestamp(raw: &str, timestamp_format: &str) -> PipelineResult<String> {
    let date_error = || PipelineError::DateParse {
        raw: raw.to_string(),
    };

    let mut tokens: Vec<String> = raw.split_whitespace().map(str::to_string).collect();
    let clock = tokens.get_mut(CLOCK_TOKEN_INDEX).ok_or_else(date_error)?;

    if !clock.contains(':') {
        if !RE_COMPACT_TIME.is_match(clock) {
            return Err(date_error());
        }
        clock.insert(clock.len() - 2, ':');
    }

    let spaced = tokens.join(" ");
    let parsed = DATE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(&spaced, layout).ok())
        .ok_or_else(date_error)?;

    Ok(parsed.format(timestamp_format).to_string())
}

#[cfg(test)]
#[path = "tests/grammar_tests.rs"]
mod tests;
