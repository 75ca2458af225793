//! Canonical isolate record model
//!
//! One record per culture test event, as handed over by the upstream
//! normalization pipeline: dates already parsed, organism synonyms already
//! resolved, interpretations already mapped into the closed vocabulary.
//! Descriptive attributes (facility, demographics, admission data) ride along
//! untouched and only ever serve as pivot-index columns.

use crate::error::{AntibiogramError, Result};
use crate::models::interpretation::Interpretation;
use crate::utils::arrow::{datetime_at, string_at};
use arrow::array::{ArrayRef, StringArray, TimestampMicrosecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{NaiveDate, NaiveDateTime};
use log::warn;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Columns every record resolves without consulting its attributes
pub const BUILTIN_COLUMNS: [&str; 6] = [
    "isolate_id",
    "patient_id",
    "organism",
    "collection_datetime",
    "drug",
    "interpretation",
];

/// Format used when an index column renders a collection timestamp
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One row of the canonical record set: a single drug susceptibility test
/// event on a bacterial isolate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolateRecord {
    /// Lab-assigned isolate identifier (BI number); absent for synthetic rows
    pub isolate_id: Option<String>,
    /// Patient the culture was drawn from
    pub patient_id: String,
    /// Canonicalized organism name
    pub organism: String,
    /// When the culture was drawn; the primary ordering key
    pub collection_datetime: Option<NaiveDateTime>,
    /// Antimicrobial agent tested; absent rows are excluded from consolidation
    pub drug: Option<String>,
    /// Interpretation of the test
    pub interpretation: Option<Interpretation>,
    /// Descriptive columns carried through unmodified, in input order
    pub attributes: Vec<(String, String)>,
}

impl IsolateRecord {
    /// Create a record with only the mandatory identity columns set
    #[must_use]
    pub fn new(patient_id: impl Into<String>, organism: impl Into<String>) -> Self {
        Self {
            isolate_id: None,
            patient_id: patient_id.into(),
            organism: organism.into(),
            collection_datetime: None,
            drug: None,
            interpretation: None,
            attributes: Vec::new(),
        }
    }

    /// Set the lab-assigned isolate identifier
    #[must_use]
    pub fn with_isolate_id(mut self, isolate_id: impl Into<String>) -> Self {
        self.isolate_id = Some(isolate_id.into());
        self
    }

    /// Set the collection timestamp
    #[must_use]
    pub fn with_collection_datetime(mut self, collected: NaiveDateTime) -> Self {
        self.collection_datetime = Some(collected);
        self
    }

    /// Set the tested drug and its interpretation
    #[must_use]
    pub fn with_drug_result(
        mut self,
        drug: impl Into<String>,
        interpretation: Interpretation,
    ) -> Self {
        self.drug = Some(drug.into());
        self.interpretation = Some(interpretation);
        self
    }

    /// Attach a descriptive attribute, replacing any previous value under the
    /// same name
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        if let Some(existing) = self.attributes.iter_mut().find(|(n, _)| *n == name) {
            existing.1 = value.into();
        } else {
            self.attributes.push((name, value.into()));
        }
        self
    }

    /// Whether a column name refers to one of the fixed record fields
    #[must_use]
    pub fn is_builtin_column(name: &str) -> bool {
        BUILTIN_COLUMNS.contains(&name)
    }

    /// Look up a descriptive attribute by name
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Resolve a column by name, built-in fields first, then attributes
    ///
    /// Returns the rendered value, or `None` when the column is unknown or
    /// its value is missing on this record.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<String> {
        match name {
            "isolate_id" => self.isolate_id.clone(),
            "patient_id" => Some(self.patient_id.clone()),
            "organism" => Some(self.organism.clone()),
            "collection_datetime" => self
                .collection_datetime
                .map(|dt| dt.format(DATETIME_FORMAT).to_string()),
            "drug" => self.drug.clone(),
            "interpretation" => self.interpretation.map(|i| i.code().to_string()),
            _ => self.attribute(name).map(str::to_string),
        }
    }

    /// Calendar date of collection, without the time component
    #[must_use]
    pub fn collection_date(&self) -> Option<NaiveDate> {
        self.collection_datetime.map(|dt| dt.date())
    }

    /// Get the Arrow schema for a record set with the given attribute columns
    #[must_use]
    pub fn schema(attribute_columns: &[String]) -> Schema {
        let mut fields = vec![
            Field::new("isolate_id", DataType::Utf8, true),
            Field::new("patient_id", DataType::Utf8, false),
            Field::new("organism", DataType::Utf8, false),
            Field::new(
                "collection_datetime",
                DataType::Timestamp(TimeUnit::Microsecond, None),
                true,
            ),
            Field::new("drug", DataType::Utf8, true),
            Field::new("interpretation", DataType::Utf8, true),
        ];
        for name in attribute_columns {
            fields.push(Field::new(name.as_str(), DataType::Utf8, true));
        }
        Schema::new(fields)
    }

    /// Convert a record set to a flat Arrow `RecordBatch`
    ///
    /// Attribute columns are the union of attribute names across all records,
    /// in first-appearance order; records missing an attribute get a null.
    pub fn to_record_batch(records: &[Self]) -> Result<RecordBatch> {
        let mut attribute_columns: Vec<String> = Vec::new();
        for record in records {
            for (name, _) in &record.attributes {
                if !attribute_columns.contains(name) {
                    attribute_columns.push(name.clone());
                }
            }
        }

        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(
                records
                    .iter()
                    .map(|r| r.isolate_id.as_deref())
                    .collect::<StringArray>(),
            ),
            Arc::new(
                records
                    .iter()
                    .map(|r| Some(r.patient_id.as_str()))
                    .collect::<StringArray>(),
            ),
            Arc::new(
                records
                    .iter()
                    .map(|r| Some(r.organism.as_str()))
                    .collect::<StringArray>(),
            ),
            Arc::new(
                records
                    .iter()
                    .map(|r| {
                        r.collection_datetime
                            .map(|dt| dt.and_utc().timestamp_micros())
                    })
                    .collect::<TimestampMicrosecondArray>(),
            ),
            Arc::new(
                records
                    .iter()
                    .map(|r| r.drug.as_deref())
                    .collect::<StringArray>(),
            ),
            Arc::new(
                records
                    .iter()
                    .map(|r| r.interpretation.map(Interpretation::code))
                    .collect::<StringArray>(),
            ),
        ];

        for name in &attribute_columns {
            columns.push(Arc::new(
                records
                    .iter()
                    .map(|r| r.attribute(name))
                    .collect::<StringArray>(),
            ));
        }

        RecordBatch::try_new(Arc::new(Self::schema(&attribute_columns)), columns)
            .map_err(|e| AntibiogramError::schema(format!("Failed to build record batch: {e}")))
    }

    /// Read a record set back from a flat Arrow `RecordBatch`
    ///
    /// `patient_id` and `organism` are required columns; the remaining fixed
    /// columns are optional. Every other `Utf8` column becomes an attribute.
    /// Interpretation values that do not map into the closed vocabulary are
    /// dropped to null and counted in a single warning.
    pub fn from_record_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let schema = batch.schema();

        let patient_ids = column_by_name(batch, "patient_id").ok_or_else(|| {
            AntibiogramError::schema("Required column 'patient_id' not found in record batch")
        })?;
        let organisms = column_by_name(batch, "organism").ok_or_else(|| {
            AntibiogramError::schema("Required column 'organism' not found in record batch")
        })?;
        let isolate_ids = column_by_name(batch, "isolate_id");
        let collected = column_by_name(batch, "collection_datetime");
        let drugs = column_by_name(batch, "drug");
        let interpretations = column_by_name(batch, "interpretation");

        let attribute_columns: Vec<(String, &ArrayRef)> = schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(_, field)| {
                !Self::is_builtin_column(field.name()) && field.data_type() == &DataType::Utf8
            })
            .map(|(idx, field)| (field.name().clone(), batch.column(idx)))
            .collect();

        let mut unmapped_interpretations = 0usize;
        let mut records = Vec::with_capacity(batch.num_rows());
        for row in 0..batch.num_rows() {
            let patient_id = string_at(patient_ids, row).ok_or_else(|| {
                AntibiogramError::data_quality(format!("Null patient_id at row {row}"))
            })?;
            let organism = string_at(organisms, row).ok_or_else(|| {
                AntibiogramError::data_quality(format!("Null organism at row {row}"))
            })?;

            let interpretation = interpretations
                .and_then(|col| string_at(col, row))
                .and_then(|raw| {
                    let parsed = Interpretation::parse(&raw);
                    if parsed.is_none() {
                        unmapped_interpretations += 1;
                    }
                    parsed
                });

            let mut record = Self {
                isolate_id: isolate_ids.and_then(|col| string_at(col, row)),
                patient_id,
                organism,
                collection_datetime: collected.and_then(|col| datetime_at(col, row)),
                drug: drugs.and_then(|col| string_at(col, row)),
                interpretation,
                attributes: Vec::with_capacity(attribute_columns.len()),
            };
            for (name, col) in &attribute_columns {
                if let Some(value) = string_at(col, row) {
                    record.attributes.push((name.clone(), value));
                }
            }
            records.push(record);
        }

        if unmapped_interpretations > 0 {
            warn!(
                "Dropped {unmapped_interpretations} interpretation values outside the S/I/R/N vocabulary"
            );
        }

        Ok(records)
    }
}

/// Find a column by name in a record batch
fn column_by_name<'a>(batch: &'a RecordBatch, name: &str) -> Option<&'a ArrayRef> {
    batch
        .schema()
        .index_of(name)
        .ok()
        .map(|idx| batch.column(idx))
}
