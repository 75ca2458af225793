//! Antibiogram matrix model
//!
//! The wide isolate-by-drug result of consolidation: one row per distinct
//! index tuple, one column per drug that retained at least one result, one
//! interpretation per cell. An absent cell means the combination was never
//! tested; it stays absent unless the caller explicitly backfills.

use crate::error::{AntibiogramError, Result};
use crate::models::interpretation::Interpretation;
use crate::models::isolate::IsolateRecord;
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One row of the matrix: an isolate context and its consolidated cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntibiogramRow {
    /// Values of the index columns, in the order the caller named them
    pub index_values: Vec<Option<String>>,
    /// One cell per drug column, in matrix column order
    pub cells: Vec<Option<Interpretation>>,
}

/// Wide isolate-by-drug matrix of consolidated interpretations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AntibiogramMatrix {
    index_columns: Vec<String>,
    drugs: Vec<String>,
    rows: Vec<AntibiogramRow>,
    #[serde(skip)]
    drug_positions: FxHashMap<String, usize>,
}

impl AntibiogramMatrix {
    /// Assemble a matrix from consolidated parts
    ///
    /// The consolidator guarantees one row per distinct index tuple and one
    /// cell per drug on every row; this constructor only wires up the lookup
    /// structures.
    pub(crate) fn from_parts(
        index_columns: Vec<String>,
        drugs: Vec<String>,
        rows: Vec<AntibiogramRow>,
    ) -> Self {
        let drug_positions = drugs
            .iter()
            .enumerate()
            .map(|(idx, drug)| (drug.clone(), idx))
            .collect();
        Self {
            index_columns,
            drugs,
            rows,
            drug_positions,
        }
    }

    /// The caller-supplied index column names, in order
    #[must_use]
    pub fn index_columns(&self) -> &[String] {
        &self.index_columns
    }

    /// Drug columns that survived consolidation
    #[must_use]
    pub fn drugs(&self) -> &[String] {
        &self.drugs
    }

    /// Matrix rows in canonical (first-appearance) index order
    #[must_use]
    pub fn rows(&self) -> &[AntibiogramRow] {
        &self.rows
    }

    /// Number of isolate rows
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of drug columns
    #[must_use]
    pub fn num_drugs(&self) -> usize {
        self.drugs.len()
    }

    /// Look up a cell by row position and drug name
    #[must_use]
    pub fn cell(&self, row: usize, drug: &str) -> Option<Interpretation> {
        let drug_idx = *self.drug_positions.get(drug)?;
        self.rows.get(row)?.cells[drug_idx]
    }

    /// Position of the first row whose named index column holds `value`
    #[must_use]
    pub fn find_row(&self, column: &str, value: &str) -> Option<usize> {
        let col_idx = self.index_columns.iter().position(|c| c == column)?;
        self.rows
            .iter()
            .position(|row| row.index_values[col_idx].as_deref() == Some(value))
    }

    /// Fill every absent cell with [`Interpretation::NotTested`]
    ///
    /// Opt-in: an absent cell normally stays absent so callers can tell
    /// "never tested" apart from a reduced result.
    pub fn backfill_not_tested(&mut self) {
        for row in &mut self.rows {
            for cell in &mut row.cells {
                if cell.is_none() {
                    *cell = Some(Interpretation::NotTested);
                }
            }
        }
    }

    /// Reshape the matrix back into long-format records
    ///
    /// Emits one record per present cell. Index columns that name built-in
    /// record fields are restored into those fields; the rest become
    /// attributes. Consolidating the output again reproduces this matrix.
    #[must_use]
    pub fn to_long(&self) -> Vec<IsolateRecord> {
        let mut records = Vec::new();
        for row in &self.rows {
            for (drug_idx, cell) in row.cells.iter().enumerate() {
                let Some(interpretation) = cell else {
                    continue;
                };
                let mut record = IsolateRecord::new("", "");
                for (col, value) in self.index_columns.iter().zip(&row.index_values) {
                    let Some(value) = value else { continue };
                    match col.as_str() {
                        "isolate_id" => record.isolate_id = Some(value.clone()),
                        "patient_id" => record.patient_id = value.clone(),
                        "organism" => record.organism = value.clone(),
                        "collection_datetime" => {
                            record.collection_datetime =
                                chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                                    .ok();
                        }
                        _ => record.attributes.push((col.clone(), value.clone())),
                    }
                }
                record.drug = Some(self.drugs[drug_idx].clone());
                record.interpretation = Some(*interpretation);
                records.push(record);
            }
        }
        records
    }

    /// Get the Arrow schema for this matrix: index columns first, then one
    /// nullable column of single-letter codes per drug
    #[must_use]
    pub fn schema(&self) -> Schema {
        let mut fields: Vec<Field> = self
            .index_columns
            .iter()
            .map(|name| Field::new(name.as_str(), DataType::Utf8, true))
            .collect();
        for drug in &self.drugs {
            fields.push(Field::new(drug.as_str(), DataType::Utf8, true));
        }
        Schema::new(fields)
    }

    /// Convert the matrix to a flat Arrow `RecordBatch`
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(self.index_columns.len() + self.drugs.len());
        for col_idx in 0..self.index_columns.len() {
            columns.push(Arc::new(
                self.rows
                    .iter()
                    .map(|row| row.index_values[col_idx].as_deref())
                    .collect::<StringArray>(),
            ));
        }
        for drug_idx in 0..self.drugs.len() {
            columns.push(Arc::new(
                self.rows
                    .iter()
                    .map(|row| row.cells[drug_idx].map(Interpretation::code))
                    .collect::<StringArray>(),
            ));
        }
        RecordBatch::try_new(Arc::new(self.schema()), columns)
            .map_err(|e| AntibiogramError::schema(format!("Failed to build matrix batch: {e}")))
    }
}
