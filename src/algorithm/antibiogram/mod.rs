//! Result consolidation (pivot-and-reduce)
//!
//! Turns the long-format record set, one row per isolate, drug and test
//! event, into a wide antibiogram matrix with exactly one interpretation per
//! isolate/drug pair. Conflicting raw rows are reduced with the clinical
//! precedence rule in [`reduce_interpretations`]; every dropped row is
//! counted in the accompanying quality report.

mod config;
mod reduce;
mod validation;

pub use config::{ConsolidatorConfig, ConsolidatorConfigBuilder};
pub use reduce::{InterpretationSet, collect_distinct, reduce_interpretations};

use crate::error::Result;
use crate::models::antibiogram::{AntibiogramMatrix, AntibiogramRow};
use crate::models::interpretation::Interpretation;
use crate::models::isolate::IsolateRecord;
use crate::models::quality::{ExclusionReason, QualityReport};
use crate::utils::progress;
use indicatif::ParallelProgressIterator;
use log::info;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

/// Group count below which reduction stays on the calling thread
const PARALLEL_GROUP_THRESHOLD: usize = 64;

/// Result of a consolidation run
#[derive(Debug, Clone)]
pub struct ConsolidationResult {
    /// The wide isolate-by-drug matrix
    pub matrix: AntibiogramMatrix,
    /// What was excluded on the way
    pub report: QualityReport,
}

/// Consolidates raw susceptibility rows into an antibiogram matrix
#[derive(Debug, Clone, Default)]
pub struct Consolidator {
    config: ConsolidatorConfig,
}

impl Consolidator {
    /// Create a consolidator with the given configuration
    #[must_use]
    pub fn new(config: ConsolidatorConfig) -> Self {
        Self { config }
    }

    /// Create a consolidator with the default configuration
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Consolidate a record set into a wide matrix keyed by `index_columns`
    ///
    /// `index_columns` name the columns that identify a clinical isolate
    /// context; the caller guarantees they form a surrogate key and the
    /// consolidator verifies it before pivoting. Row order follows the first
    /// appearance of each index tuple; every tuple keeps its row even when
    /// all of its raw rows are filtered out.
    ///
    /// # Errors
    /// `SchemaError` when an index column cannot be resolved or the key check
    /// fails; `DataQualityError` when a required value column is entirely
    /// missing.
    pub fn consolidate(
        &self,
        records: &[IsolateRecord],
        index_columns: &[&str],
    ) -> Result<ConsolidationResult> {
        validation::check_index_columns(records, index_columns)?;
        let owned_columns: Vec<String> = index_columns.iter().map(ToString::to_string).collect();

        if records.is_empty() {
            return Ok(ConsolidationResult {
                matrix: AntibiogramMatrix::from_parts(owned_columns, Vec::new(), Vec::new()),
                report: QualityReport::new(),
            });
        }

        validation::check_value_columns(records)?;
        validation::check_surrogate_key(records, index_columns)?;

        let mut report = QualityReport::new();

        // Canonical row index: one row per distinct index tuple, in first
        // appearance order, established before any value filtering.
        let mut row_lookup: FxHashMap<Vec<Option<String>>, usize> = FxHashMap::default();
        let mut row_keys: Vec<Vec<Option<String>>> = Vec::new();
        for record in records {
            let tuple = validation::index_tuple(record, index_columns);
            row_lookup.entry(tuple).or_insert_with_key(|key| {
                row_keys.push(key.clone());
                row_keys.len() - 1
            });
        }

        // Collect the distinct interpretation set per (row, drug) group
        let mut drug_lookup: FxHashMap<String, usize> = FxHashMap::default();
        let mut drug_names: Vec<String> = Vec::new();
        let mut groups: FxHashMap<(usize, usize), InterpretationSet> = FxHashMap::default();
        for record in records {
            let Some(drug) = record.drug.as_deref() else {
                report.record_exclusion(ExclusionReason::MissingDrug, record.isolate_id.as_deref());
                continue;
            };
            let Some(interpretation) = record.interpretation else {
                report.record_exclusion(
                    ExclusionReason::MissingInterpretation,
                    record.isolate_id.as_deref(),
                );
                continue;
            };
            if self.config.only_testable && !interpretation.is_testable() {
                report.record_exclusion(
                    ExclusionReason::NotTestable,
                    record.isolate_id.as_deref(),
                );
                continue;
            }

            let tuple = validation::index_tuple(record, index_columns);
            let row_idx = row_lookup[&tuple];
            let drug_idx = match drug_lookup.get(drug) {
                Some(&idx) => idx,
                None => {
                    drug_names.push(drug.to_string());
                    drug_lookup.insert(drug.to_string(), drug_names.len() - 1);
                    drug_names.len() - 1
                }
            };
            collect_distinct(groups.entry((row_idx, drug_idx)).or_default(), interpretation);
        }

        info!(
            "Consolidating {} raw rows into {} isolates across {} drugs ({} groups)",
            records.len(),
            row_keys.len(),
            drug_names.len(),
            groups.len()
        );

        let reduced = self.reduce_groups(groups);

        // Assemble the cell grid and drop drug columns with no surviving value
        let mut cells = vec![vec![None::<Interpretation>; drug_names.len()]; row_keys.len()];
        for ((row_idx, drug_idx), value) in reduced {
            cells[row_idx][drug_idx] = value;
        }
        let kept_drugs: Vec<usize> = (0..drug_names.len())
            .filter(|&drug_idx| cells.iter().any(|row| row[drug_idx].is_some()))
            .collect();

        let drugs: Vec<String> = kept_drugs
            .iter()
            .map(|&idx| drug_names[idx].clone())
            .collect();
        let rows: Vec<AntibiogramRow> = row_keys
            .into_iter()
            .zip(cells)
            .map(|(index_values, row_cells)| AntibiogramRow {
                index_values,
                cells: kept_drugs.iter().map(|&idx| row_cells[idx]).collect(),
            })
            .collect();

        let mut matrix = AntibiogramMatrix::from_parts(owned_columns, drugs, rows);
        if self.config.backfill_not_tested {
            matrix.backfill_not_tested();
        }

        report.warn_summary();
        Ok(ConsolidationResult { matrix, report })
    }

    /// Reduce every group's distinct-value set to its single cell value
    ///
    /// Groups are independent, so large inputs are reduced on the rayon pool.
    fn reduce_groups(
        &self,
        groups: FxHashMap<(usize, usize), InterpretationSet>,
    ) -> Vec<((usize, usize), Option<Interpretation>)> {
        let groups: Vec<((usize, usize), InterpretationSet)> = groups.into_iter().collect();

        if self.config.parallel && groups.len() >= PARALLEL_GROUP_THRESHOLD {
            let pb = progress::create_main_progress_bar(
                groups.len() as u64,
                Some("Reducing result groups"),
            );
            let reduced: Vec<_> = groups
                .into_par_iter()
                .progress_with(pb)
                .map(|(key, values)| (key, reduce_interpretations(&values)))
                .collect();
            reduced
        } else {
            groups
                .into_iter()
                .map(|(key, values)| (key, reduce_interpretations(&values)))
                .collect()
        }
    }
}
