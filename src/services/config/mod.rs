pub mod models;

pub use models::*;

use crate::types::errors::{PipelineError, PipelineResult};
use std::fs;
use std::path::Path;

/// Load settings from an optional JSON file. `None` means built-in defaults.
pub fn load_config(path: Option<&Path>) -> PipelineResult<SorterConfig> {
    let Some(path) = path else {
        return Ok(SorterConfig::default());
    };

    let raw = fs::read_to_string(path).map_err(|e| PipelineError::from_io(path, e))?;
    let config: SorterConfig = serde_json::from_str(&raw)
        .map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))?;

    config.validate()?;

    log::info!("Loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
