//! Episode segmentation (greedy interval clustering)
//!
//! Partitions each patient/organism's positive cultures into clinically
//! distinct bloodstream infection episodes under a caller-chosen cutoff,
//! flagging the chronologically first isolate of every episode as its index
//! isolate. Groups are independent and processed in parallel for large
//! inputs; within a group the pass is strictly sequential.

mod config;
mod grouping;
mod segment;

pub use config::{DEFAULT_CUTOFF_DAYS, DEFAULT_ISOLATE_ID_PREFIX, EpisodeConfig, EpisodeConfigBuilder};

use crate::error::{AntibiogramError, Result};
use crate::models::episode::{EpisodeAnnotation, EpisodeIndex};
use crate::models::isolate::IsolateRecord;
use crate::models::quality::QualityReport;
use crate::utils::progress;
use log::info;
use rayon::prelude::*;

/// Group count below which segmentation stays on the calling thread
const PARALLEL_GROUP_THRESHOLD: usize = 64;

/// Result of a segmentation run
#[derive(Debug, Clone)]
pub struct SegmentationResult {
    /// Episode metadata per kept isolate
    pub index: EpisodeIndex,
    /// What was excluded and which groups failed
    pub report: QualityReport,
}

/// Segments a record set into bloodstream infection episodes
#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    config: EpisodeConfig,
}

impl Segmenter {
    /// Create a segmenter with the given configuration
    #[must_use]
    pub fn new(config: EpisodeConfig) -> Self {
        Self { config }
    }

    /// Create a segmenter with the default configuration and an explicit
    /// cutoff
    #[must_use]
    pub fn with_cutoff_days(cutoff_days: i64) -> Self {
        Self::new(EpisodeConfig::builder().cutoff_days(cutoff_days).build())
    }

    /// Segment a record set into episodes
    ///
    /// Rows without an isolate identifier, outside the lab namespace, or
    /// without a collection date are excluded and counted; they never appear
    /// in the output, so callers merging the index back onto a wider table
    /// must left-join and treat absent episode fields as not applicable. A
    /// group whose rows all lack dates fails on its own and is recorded in
    /// the report while the remaining groups succeed.
    ///
    /// # Errors
    /// `LogicError` when a structural invariant is violated; this aborts the
    /// whole call because it indicates a bug rather than bad data.
    pub fn segment(&self, records: &[IsolateRecord]) -> Result<SegmentationResult> {
        let mut report = QualityReport::new();
        let groups = grouping::build_groups(records, &self.config.isolate_id_prefix, &mut report);

        info!(
            "Segmenting {} groups with a {} day cutoff",
            groups.len(),
            self.config.cutoff_days
        );

        let outcomes: Vec<Result<Vec<EpisodeAnnotation>>> =
            if self.config.parallel && groups.len() >= PARALLEL_GROUP_THRESHOLD {
                let pb = progress::create_main_progress_bar(
                    groups.len() as u64,
                    Some("Segmenting episodes"),
                );
                let outcomes: Vec<_> = groups
                    .par_iter()
                    .map(|group| {
                        let outcome = segment::annotate_group(group, self.config.cutoff_days);
                        pb.inc(1);
                        outcome
                    })
                    .collect();
                progress::finish_progress_bar(&pb, Some("Segmentation complete"));
                outcomes
            } else {
                groups
                    .iter()
                    .map(|group| segment::annotate_group(group, self.config.cutoff_days))
                    .collect()
            };

        let mut annotations = Vec::new();
        for (group, outcome) in groups.iter().zip(outcomes) {
            match outcome {
                Ok(group_annotations) => annotations.extend(group_annotations),
                Err(AntibiogramError::DataQualityError(message)) => {
                    report.record_group_failure(group.patient_id, group.organism, message);
                }
                Err(fatal) => return Err(fatal),
            }
        }

        info!(
            "Annotated {} isolates across {} groups",
            annotations.len(),
            groups.len() - report.group_failures().len()
        );
        report.warn_summary();

        Ok(SegmentationResult {
            index: EpisodeIndex::from_annotations(annotations),
            report,
        })
    }
}
