//! Domain models for the antibiogram core
//!
//! This module contains the typed data model shared by result consolidation
//! and episode segmentation: the closed interpretation vocabulary, the
//! canonical isolate record, and the two derived artifacts (antibiogram
//! matrix and episode index) together with the quality report that
//! accompanies every partial-success result.

// Re-export entity models
pub mod antibiogram;
pub mod episode;
pub mod interpretation;
pub mod isolate;
pub mod quality;

// Re-export commonly used types
pub use antibiogram::{AntibiogramMatrix, AntibiogramRow};
pub use episode::{EpisodeAnnotation, EpisodeIndex};
pub use interpretation::Interpretation;
pub use isolate::IsolateRecord;
pub use quality::{ExclusionReason, GroupFailure, QualityReport};
