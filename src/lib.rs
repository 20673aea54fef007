pub mod services;
pub mod types;
#[cfg(test)]
pub mod test_utils;

pub use services::config::{load_config, SorterConfig};
pub use services::pipeline::{run, sanitize_input_path, PipelineSummary};
pub use services::report::{LogFileReport, MemoryReport, Report, ReportEvent};
pub use types::errors::{PipelineError, PipelineResult};
