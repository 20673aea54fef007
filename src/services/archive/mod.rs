pub mod extract;
pub mod types;

pub use extract::ArchiveExtractor;
pub use types::*;

#[cfg(test)]
#[path = "tests/archive_tests.rs"]
mod tests;
