//! Error types for DOM analysis
//!
//! Simple, flat error hierarchy. No over-engineering.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalyzerError>;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("document has no root node")]
    MissingRoot,

    #[error("invalid analyzer config: {0}")]
    InvalidConfig(#[source] serde_json::Error),
}
