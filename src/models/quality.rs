//! Quality report for partial-success results
//!
//! Real-world laboratory extracts are imperfect: rows miss dates, carry
//! foreign isolate namespaces, or lack a tested drug. Those rows are excluded
//! rather than failing the whole call, and every exclusion is counted here so
//! callers always know exactly what a result does not cover.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// How many offending keys to retain per exclusion reason
const SAMPLE_KEY_LIMIT: usize = 10;

/// Why a row was excluded from a computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExclusionReason {
    /// No drug on a row entering consolidation
    MissingDrug,
    /// No interpretation on a row entering consolidation
    MissingInterpretation,
    /// Interpretation outside {S, I, R} while only testable rows are kept
    NotTestable,
    /// No parseable collection date on a row entering segmentation
    MissingCollectionDate,
    /// No isolate identifier on a row entering segmentation
    MissingIsolateId,
    /// Isolate identifier outside the lab-assigned namespace
    ForeignIsolateNamespace,
}

impl ExclusionReason {
    /// Human-readable description for log lines
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::MissingDrug => "rows without a tested drug",
            Self::MissingInterpretation => "rows without an interpretation",
            Self::NotTestable => "rows with a non-testable interpretation",
            Self::MissingCollectionDate => "rows without a collection date",
            Self::MissingIsolateId => "rows without an isolate identifier",
            Self::ForeignIsolateNamespace => "rows outside the isolate namespace",
        }
    }
}

/// Count and sample keys for one exclusion reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionEntry {
    /// Why the rows were excluded
    pub reason: ExclusionReason,
    /// How many rows were excluded for this reason
    pub count: usize,
    /// Up to [`SAMPLE_KEY_LIMIT`] offending keys, in encounter order
    pub sample_keys: Vec<String>,
}

/// A (patient, organism) group that failed segmentation as a whole
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupFailure {
    /// Patient part of the failed group key
    pub patient_id: String,
    /// Organism part of the failed group key
    pub organism: String,
    /// What went wrong with the group
    pub message: String,
}

/// Structured record of everything a computation excluded or could not
/// process, returned alongside every result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityReport {
    exclusions: Vec<ExclusionEntry>,
    group_failures: Vec<GroupFailure>,
}

impl QualityReport {
    /// Create an empty report
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one excluded row, with its key when one is known
    pub fn record_exclusion(&mut self, reason: ExclusionReason, key: Option<&str>) {
        let idx = match self.exclusions.iter().position(|e| e.reason == reason) {
            Some(idx) => idx,
            None => {
                self.exclusions.push(ExclusionEntry {
                    reason,
                    count: 0,
                    sample_keys: Vec::new(),
                });
                self.exclusions.len() - 1
            }
        };
        let entry = &mut self.exclusions[idx];
        entry.count += 1;
        if let Some(key) = key {
            if entry.sample_keys.len() < SAMPLE_KEY_LIMIT {
                entry.sample_keys.push(key.to_string());
            }
        }
    }

    /// Record a group that failed segmentation as a whole
    pub fn record_group_failure(
        &mut self,
        patient_id: impl Into<String>,
        organism: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.group_failures.push(GroupFailure {
            patient_id: patient_id.into(),
            organism: organism.into(),
            message: message.into(),
        });
    }

    /// Number of rows excluded for one reason
    #[must_use]
    pub fn count(&self, reason: ExclusionReason) -> usize {
        self.exclusions
            .iter()
            .find(|e| e.reason == reason)
            .map_or(0, |e| e.count)
    }

    /// Total number of excluded rows across all reasons
    #[must_use]
    pub fn total_excluded(&self) -> usize {
        self.exclusions.iter().map(|e| e.count).sum()
    }

    /// Exclusion entries in first-encounter order
    #[must_use]
    pub fn exclusions(&self) -> &[ExclusionEntry] {
        &self.exclusions
    }

    /// Groups that failed segmentation as a whole
    #[must_use]
    pub fn group_failures(&self) -> &[GroupFailure] {
        &self.group_failures
    }

    /// Whether nothing was excluded and no group failed
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.exclusions.is_empty() && self.group_failures.is_empty()
    }

    /// Fold another report into this one, summing per-reason counts
    pub fn merge(&mut self, other: Self) {
        for entry in other.exclusions {
            match self.exclusions.iter().position(|e| e.reason == entry.reason) {
                Some(idx) => {
                    let existing = &mut self.exclusions[idx];
                    existing.count += entry.count;
                    for key in entry.sample_keys {
                        if existing.sample_keys.len() >= SAMPLE_KEY_LIMIT {
                            break;
                        }
                        existing.sample_keys.push(key);
                    }
                }
                None => self.exclusions.push(entry),
            }
        }
        self.group_failures.extend(other.group_failures);
    }

    /// Log one warning per non-empty exclusion reason and failed group
    ///
    /// A clean report logs a single debug line instead.
    pub fn warn_summary(&self) {
        if self.is_clean() {
            debug!("No rows excluded");
            return;
        }
        for entry in &self.exclusions {
            warn!("Excluded {} {}", entry.count, entry.reason.describe());
        }
        for failure in &self.group_failures {
            warn!(
                "Group ({}, {}) failed: {}",
                failure.patient_id, failure.organism, failure.message
            );
        }
    }

    /// Render the report as pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
