//! A Rust library for consolidating antimicrobial susceptibility results into
//! per-isolate antibiograms and separating repeated positive cultures into
//! bloodstream infection episodes.
//!
//! The crate operates on in-memory record sets that an upstream pipeline has
//! already normalized: dates parsed, organism synonyms resolved, and
//! interpretations mapped into the closed S/I/R/N vocabulary. It never reads
//! files itself; callers hand it materialized records and receive typed
//! collections that convert to flat Arrow tables for persistence.

pub mod algorithm;
pub mod error;
pub mod models;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use error::{AntibiogramError, Result};
pub use models::antibiogram::{AntibiogramMatrix, AntibiogramRow};
pub use models::episode::{EpisodeAnnotation, EpisodeIndex};
pub use models::interpretation::Interpretation;
pub use models::isolate::IsolateRecord;
pub use models::quality::{ExclusionReason, QualityReport};

// Algorithms
pub use algorithm::antibiogram::{ConsolidationResult, Consolidator, ConsolidatorConfig};
pub use algorithm::episodes::{EpisodeConfig, SegmentationResult, Segmenter};

// Arrow types
pub use arrow::datatypes::Schema as ArrowSchema;
pub use arrow::record_batch::RecordBatch;
