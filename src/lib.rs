pub mod collector;
pub mod config;
pub mod grouper;
pub mod parser;
pub mod render;
pub mod schema;
pub mod source;
pub mod views;

pub use collector::collect;
pub use config::{ConfigError, DashboardConfig};
pub use parser::{FieldParseError, FrameOutcome, parse_frame};
pub use schema::{FrameRecord, ParsedLog, Report};
pub use source::SourceError;
pub use views::{DashboardViews, PresenceTable};

use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetlogError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Parse(#[from] FieldParseError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Usage(String),
}

impl DetlogError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            DetlogError::Source(_) | DetlogError::Config(_) => 1,
            DetlogError::Parse(_) | DetlogError::Usage(_) => 2,
        }
    }
}

/// Read a log file and parse it at `threshold`.
pub fn parse_file(path: &Path, threshold: f64) -> Result<ParsedLog, DetlogError> {
    let lines = source::read_lines(path)?;
    Ok(collect(&lines, threshold)?)
}
