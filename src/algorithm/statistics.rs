//! Cohort statistics and summaries
//!
//! Descriptive counts computed over the canonical record set and the
//! consolidated matrix, feeding the surveillance report tables downstream.
//! Counting unit is the distinct isolate identifier; rows without one count
//! individually.

use crate::models::antibiogram::AntibiogramMatrix;
use crate::models::interpretation::Interpretation;
use crate::models::isolate::IsolateRecord;
use crate::utils::demographics::age_to_age_group;
use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// Distinct isolates per organism, most frequent first
#[must_use]
pub fn organism_counts(records: &[IsolateRecord]) -> Vec<(String, usize)> {
    let mut per_organism: FxHashMap<&str, (FxHashSet<&str>, usize)> = FxHashMap::default();
    for record in records {
        let entry = per_organism.entry(record.organism.as_str()).or_default();
        match record.isolate_id.as_deref() {
            Some(isolate_id) => {
                entry.0.insert(isolate_id);
            }
            None => entry.1 += 1,
        }
    }

    per_organism
        .into_iter()
        .map(|(organism, (ids, anonymous))| (organism.to_string(), ids.len() + anonymous))
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .collect()
}

/// Organism-by-year crosstab of distinct isolate counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualOrganismCounts {
    /// Collection years present in the record set, ascending
    pub years: Vec<i32>,
    /// One row per organism, ordered by total count descending; counts are
    /// aligned with `years`
    pub rows: Vec<(String, Vec<usize>)>,
}

impl AnnualOrganismCounts {
    /// Count for one organism and year, zero when absent
    #[must_use]
    pub fn count(&self, organism: &str, year: i32) -> usize {
        let Some(year_idx) = self.years.iter().position(|&y| y == year) else {
            return 0;
        };
        self.rows
            .iter()
            .find(|(name, _)| name == organism)
            .map_or(0, |(_, counts)| counts[year_idx])
    }
}

/// Crosstab of distinct isolate counts per organism and collection year
///
/// Rows without a collection date are skipped; they have no year to land in.
#[must_use]
pub fn annual_counts_by_organism(records: &[IsolateRecord]) -> AnnualOrganismCounts {
    use chrono::Datelike;

    let mut per_cell: FxHashMap<(&str, i32), (FxHashSet<&str>, usize)> = FxHashMap::default();
    for record in records {
        let Some(collected) = record.collection_datetime else {
            continue;
        };
        let entry = per_cell
            .entry((record.organism.as_str(), collected.year()))
            .or_default();
        match record.isolate_id.as_deref() {
            Some(isolate_id) => {
                entry.0.insert(isolate_id);
            }
            None => entry.1 += 1,
        }
    }

    let years: Vec<i32> = per_cell.keys().map(|&(_, year)| year).unique().sorted().collect();

    let mut per_organism: FxHashMap<&str, Vec<usize>> = FxHashMap::default();
    for (&(organism, year), (ids, anonymous)) in &per_cell {
        let counts = per_organism
            .entry(organism)
            .or_insert_with(|| vec![0; years.len()]);
        if let Some(year_idx) = years.iter().position(|&y| y == year) {
            counts[year_idx] = ids.len() + anonymous;
        }
    }

    let rows: Vec<(String, Vec<usize>)> = per_organism
        .into_iter()
        .map(|(organism, counts)| (organism.to_string(), counts))
        .sorted_by(|a, b| {
            let total_a: usize = a.1.iter().sum();
            let total_b: usize = b.1.iter().sum();
            total_b.cmp(&total_a).then_with(|| a.0.cmp(&b.0))
        })
        .collect();

    AnnualOrganismCounts { years, rows }
}

/// S/I/R/N counts for one drug column of a consolidated matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugProfile {
    /// Drug column name
    pub drug: String,
    /// Isolates susceptible to the drug
    pub susceptible: usize,
    /// Isolates with intermediate susceptibility
    pub intermediate: usize,
    /// Isolates resistant to the drug
    pub resistant: usize,
    /// Isolates never tested against the drug (absent cells included)
    pub not_tested: usize,
}

/// Per-drug interpretation counts over a consolidated matrix, drugs in
/// alphabetical order
#[must_use]
pub fn interpretation_profile(matrix: &AntibiogramMatrix) -> Vec<DrugProfile> {
    matrix
        .drugs()
        .iter()
        .sorted()
        .map(|drug| {
            let mut profile = DrugProfile {
                drug: drug.clone(),
                susceptible: 0,
                intermediate: 0,
                resistant: 0,
                not_tested: 0,
            };
            for row in 0..matrix.num_rows() {
                match matrix.cell(row, drug) {
                    Some(Interpretation::Susceptible) => profile.susceptible += 1,
                    Some(Interpretation::Intermediate) => profile.intermediate += 1,
                    Some(Interpretation::Resistant) => profile.resistant += 1,
                    Some(Interpretation::NotTested) | None => profile.not_tested += 1,
                }
            }
            profile
        })
        .collect()
}

/// Headline counts and demographics for a record set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortSummary {
    /// Distinct patients
    pub n_patients: usize,
    /// Distinct lab-identified isolates
    pub n_isolates: usize,
    /// Distinct organisms
    pub n_organisms: usize,
    /// Distinct patients per (age band, gender), present only when records
    /// carry the conventional `age` and `gender` attributes
    pub age_gender: Vec<(String, String, usize)>,
}

impl CohortSummary {
    /// Compute the summary from a record set
    #[must_use]
    pub fn from_records(records: &[IsolateRecord]) -> Self {
        let mut patients: FxHashSet<&str> = FxHashSet::default();
        let mut isolates: FxHashSet<&str> = FxHashSet::default();
        let mut organisms: FxHashSet<&str> = FxHashSet::default();
        let mut cell_patients: FxHashMap<(String, String), FxHashSet<&str>> = FxHashMap::default();

        for record in records {
            patients.insert(record.patient_id.as_str());
            organisms.insert(record.organism.as_str());
            if let Some(isolate_id) = record.isolate_id.as_deref() {
                isolates.insert(isolate_id);
            }

            let age_band = record
                .attribute("age")
                .and_then(|age| age.parse::<i32>().ok())
                .map(age_to_age_group);
            if let (Some(band), Some(gender)) = (age_band, record.attribute("gender")) {
                cell_patients
                    .entry((band.to_string(), gender.to_string()))
                    .or_default()
                    .insert(record.patient_id.as_str());
            }
        }

        let age_gender: Vec<(String, String, usize)> = cell_patients
            .into_iter()
            .map(|((band, gender), cell)| (band, gender, cell.len()))
            .sorted()
            .collect();

        Self {
            n_patients: patients.len(),
            n_isolates: isolates.len(),
            n_organisms: organisms.len(),
            age_gender,
        }
    }

    /// Render a human-readable summary block
    #[must_use]
    pub fn format_summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("Cohort Summary:\n");
        summary.push_str(&format!("  Patients: {}\n", self.n_patients));
        summary.push_str(&format!("  Isolates: {}\n", self.n_isolates));
        summary.push_str(&format!("  Organisms: {}\n", self.n_organisms));
        if !self.age_gender.is_empty() {
            summary.push_str("  Patients by age band and gender:\n");
            for (band, gender, count) in &self.age_gender {
                summary.push_str(&format!("    {band} / {gender}: {count}\n"));
            }
        }
        summary
    }
}
