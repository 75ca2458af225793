//! Grouping and filtering ahead of segmentation
//!
//! Rows are filtered on the isolate namespace first, then grouped by
//! (patient, organism), then filtered on collection dates inside each group.
//! A group therefore knows how many of its rows lacked dates, which is what
//! separates "group never existed" from "group exists but cannot be
//! segmented".

use crate::models::isolate::IsolateRecord;
use crate::models::quality::{ExclusionReason, QualityReport};
use chrono::NaiveDateTime;
use rustc_hash::FxHashMap;

/// One dated row of a segmentation group
#[derive(Debug, Clone, Copy)]
pub(super) struct GroupRow<'a> {
    /// Lab-assigned isolate identifier
    pub isolate_id: &'a str,
    /// Collection timestamp
    pub collected: NaiveDateTime,
}

/// All rows of one (patient, organism) group
#[derive(Debug)]
pub(super) struct IsolateGroup<'a> {
    /// Patient part of the group key
    pub patient_id: &'a str,
    /// Organism part of the group key
    pub organism: &'a str,
    /// Dated rows, stable-sorted by collection timestamp
    pub rows: Vec<GroupRow<'a>>,
    /// Rows that belonged here but carried no collection date
    pub rows_without_dates: usize,
}

/// Partition a record set into (patient, organism) groups
///
/// Groups come back in first-appearance order; rows within a group are
/// stable-sorted by collection timestamp so same-instant cultures keep their
/// input order. Every excluded row is counted in `report`.
pub(super) fn build_groups<'a>(
    records: &'a [IsolateRecord],
    isolate_id_prefix: &str,
    report: &mut QualityReport,
) -> Vec<IsolateGroup<'a>> {
    let mut lookup: FxHashMap<(&str, &str), usize> = FxHashMap::default();
    let mut groups: Vec<IsolateGroup<'a>> = Vec::new();

    for record in records {
        let Some(isolate_id) = record.isolate_id.as_deref() else {
            report.record_exclusion(
                ExclusionReason::MissingIsolateId,
                Some(record.patient_id.as_str()),
            );
            continue;
        };
        if !isolate_id.starts_with(isolate_id_prefix) {
            report.record_exclusion(ExclusionReason::ForeignIsolateNamespace, Some(isolate_id));
            continue;
        }

        let key = (record.patient_id.as_str(), record.organism.as_str());
        let group_idx = match lookup.get(&key) {
            Some(&idx) => idx,
            None => {
                groups.push(IsolateGroup {
                    patient_id: key.0,
                    organism: key.1,
                    rows: Vec::new(),
                    rows_without_dates: 0,
                });
                lookup.insert(key, groups.len() - 1);
                groups.len() - 1
            }
        };

        match record.collection_datetime {
            Some(collected) => groups[group_idx].rows.push(GroupRow {
                isolate_id,
                collected,
            }),
            None => {
                groups[group_idx].rows_without_dates += 1;
                report.record_exclusion(ExclusionReason::MissingCollectionDate, Some(isolate_id));
            }
        }
    }

    for group in &mut groups {
        // Vec::sort_by_key is stable, ties keep input order
        group.rows.sort_by_key(|row| row.collected);
    }

    groups
}
