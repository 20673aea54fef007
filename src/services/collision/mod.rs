//! Disambiguation keys for submissions that share a timestamp.
//!
//! Keys look like `2024-12-07 21:15:00 #0`. Uniqueness is scoped to one destination
//! directory. The resolver reads each destination once and then tracks handed-out keys
//! in memory, so the result does not depend on directory enumeration order.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::errors::{PipelineError, PipelineResult};

const SUFFIX_MARKER: &str = " #";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisambiguationKey {
    pub timestamp: String,
    pub index: u32,
}

impl DisambiguationKey {
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            index: 0,
        }
    }

    pub fn next(&self) -> Self {
        Self {
            timestamp: self.timestamp.clone(),
            index: self.index + 1,
        }
    }
}

impl fmt::Display for DisambiguationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.timestamp, SUFFIX_MARKER, self.index)
    }
}

/// Hands out keys that are free in their destination at the time of the call.
/// Creating the directory is left to the caller.
#[derive(Debug, Default)]
pub struct CollisionResolver {
    reserved: HashMap<PathBuf, HashSet<String>>,
}

impl CollisionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `key` if unused under `destination`, otherwise the next free `#n`.
    pub fn reserve(
        &mut self,
        destination: &Path,
        key: DisambiguationKey,
    ) -> PipelineResult<DisambiguationKey> {
        let taken = self.taken_in(destination)?;

        let mut candidate = key;
        while taken.contains(&candidate.to_string()) {
            candidate = candidate.next();
        }

        taken.insert(candidate.to_string());
        Ok(candidate)
    }

    fn taken_in(&mut self, destination: &Path) -> PipelineResult<&mut HashSet<String>> {
        match self.reserved.entry(destination.to_path_buf()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => Ok(entry.insert(existing_names(destination)?)),
        }
    }
}

fn existing_names(destination: &Path) -> PipelineResult<HashSet<String>> {
    if !destination.exists() {
        return Ok(HashSet::new());
    }

    let entries = fs::read_dir(destination).map_err(|e| PipelineError::from_io(destination, e))?;
    Ok(entries
        .flatten()
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect())
}

#[cfg(test)]
#[path = "tests/collision_tests.rs"]
mod tests;
