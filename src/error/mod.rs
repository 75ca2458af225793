//! Error handling for the antibiogram core.

use thiserror::Error;

/// Specialized error type for antibiogram consolidation and episode
/// segmentation.
///
/// Row-level data quality problems (missing dates, unmapped categories) are
/// not errors: the affected rows are excluded and reported through
/// [`crate::models::quality::QualityReport`]. This type covers the failures
/// that invalidate a whole call.
#[derive(Debug, Error)]
pub enum AntibiogramError {
    /// Required columns are missing or the supplied index columns are not a
    /// valid surrogate key for isolate identity
    #[error("Schema error: {0}")]
    SchemaError(String),
    /// Input data violates a quality requirement that cannot be worked around
    #[error("Data quality error: {0}")]
    DataQualityError(String),
    /// An internal invariant was violated; indicates a bug, not bad data
    #[error("Logic error: {0}")]
    LogicError(String),
}

impl AntibiogramError {
    /// Create a `SchemaError` from any displayable message
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::SchemaError(msg.into())
    }

    /// Create a `DataQualityError` from any displayable message
    pub fn data_quality(msg: impl Into<String>) -> Self {
        Self::DataQualityError(msg.into())
    }

    /// Create a `LogicError` from any displayable message
    pub fn logic(msg: impl Into<String>) -> Self {
        Self::LogicError(msg.into())
    }
}

/// Result type for antibiogram operations
pub type Result<T> = std::result::Result<T, AntibiogramError>;
