//! Input validation for consolidation
//!
//! Column and key checks performed before any pivoting. These failures are
//! fatal and local to the call: no partial matrix is ever returned.

use crate::error::{AntibiogramError, Result};
use crate::models::isolate::IsolateRecord;
use rustc_hash::FxHashMap;

/// Render the index-column values of a record, in caller order
pub(crate) fn index_tuple(record: &IsolateRecord, index_columns: &[&str]) -> Vec<Option<String>> {
    index_columns.iter().map(|col| record.field(col)).collect()
}

/// Check that every named index column resolves on the record set
///
/// A column resolves when it is a built-in field or at least one record
/// carries an attribute under that name.
pub(crate) fn check_index_columns(
    records: &[IsolateRecord],
    index_columns: &[&str],
) -> Result<()> {
    if index_columns.is_empty() {
        return Err(AntibiogramError::schema("No index columns supplied"));
    }
    for col in index_columns {
        if IsolateRecord::is_builtin_column(col) {
            continue;
        }
        if !records.iter().any(|r| r.attribute(col).is_some()) {
            return Err(AntibiogramError::schema(format!(
                "Index column '{col}' not found on any record"
            )));
        }
    }
    Ok(())
}

/// Check that the value columns are not entirely absent
pub(crate) fn check_value_columns(records: &[IsolateRecord]) -> Result<()> {
    if records.iter().all(|r| r.drug.is_none()) {
        return Err(AntibiogramError::data_quality(
            "Column 'drug' is entirely missing from the record set",
        ));
    }
    if records.iter().all(|r| r.interpretation.is_none()) {
        return Err(AntibiogramError::data_quality(
            "Column 'interpretation' is entirely missing from the record set",
        ));
    }
    Ok(())
}

/// Check that the index columns form a valid surrogate key for isolates
///
/// Every row carrying the same isolate identifier must resolve to the same
/// index tuple; diverging descriptive data under one identifier is an error,
/// not something to resolve silently.
pub(crate) fn check_surrogate_key(
    records: &[IsolateRecord],
    index_columns: &[&str],
) -> Result<()> {
    let mut seen: FxHashMap<&str, Vec<Option<String>>> = FxHashMap::default();
    for record in records {
        let Some(isolate_id) = record.isolate_id.as_deref() else {
            continue;
        };
        let tuple = index_tuple(record, index_columns);
        match seen.get(isolate_id) {
            Some(existing) if *existing != tuple => {
                return Err(AntibiogramError::schema(format!(
                    "Index columns are not a valid isolate key: isolate '{isolate_id}' appears with diverging index values"
                )));
            }
            Some(_) => {}
            None => {
                seen.insert(isolate_id, tuple);
            }
        }
    }
    Ok(())
}
