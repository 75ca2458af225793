//! Per-group episode assignment
//!
//! A single forward pass over one group's date-sorted rows, carrying
//! `(episode_number, index_cum_diff)` as fold state and writing into a
//! pre-sized assignment buffer.

use crate::algorithm::episodes::grouping::{GroupRow, IsolateGroup};
use crate::error::{AntibiogramError, Result};
use crate::models::episode::EpisodeAnnotation;
use crate::utils::dates::whole_days_between;
use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};

/// Episode assignment for one row of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct EpisodeAssignment {
    /// 1-based episode number
    pub episode_number: u32,
    /// Whether the row opens its episode
    pub is_index_isolate: bool,
}

/// Assign every date-sorted row of a group to an episode
///
/// Offsets are whole days from the group's first collection date. A row
/// within `cutoff_days` of the running episode's anchor joins that episode;
/// otherwise it opens a new one and becomes its index isolate. The anchor is
/// the index isolate's offset from the group's original start, not from the
/// episode's own start; this keeps the reference pipeline's cumulative
/// semantics.
pub(super) fn assign_episodes(rows: &[GroupRow], cutoff_days: i64) -> Vec<EpisodeAssignment> {
    let mut assignments = Vec::with_capacity(rows.len());
    let Some(first) = rows.first() else {
        return assignments;
    };

    let group_start = first.collected;
    let mut episode_number = 1u32;
    let mut index_cum_diff = 0i64;
    assignments.push(EpisodeAssignment {
        episode_number,
        is_index_isolate: true,
    });

    for row in &rows[1..] {
        let cum_diff = whole_days_between(group_start, row.collected);
        if cum_diff <= index_cum_diff + cutoff_days {
            assignments.push(EpisodeAssignment {
                episode_number,
                is_index_isolate: false,
            });
        } else {
            episode_number += 1;
            index_cum_diff = cum_diff;
            assignments.push(EpisodeAssignment {
                episode_number,
                is_index_isolate: true,
            });
        }
    }

    assignments
}

/// Verify the structural invariants of a group's assignments
///
/// Episode numbers must be contiguous from 1 and every episode must have
/// exactly one index isolate, its first row. A violation here is a bug in
/// the assignment pass, not bad input data.
pub(super) fn check_group_invariants(assignments: &[EpisodeAssignment]) -> Result<()> {
    let mut previous = 0u32;
    for assignment in assignments {
        let opens_episode = assignment.episode_number == previous + 1;
        if opens_episode {
            previous = assignment.episode_number;
        } else if assignment.episode_number != previous {
            return Err(AntibiogramError::logic(format!(
                "Episode numbers not contiguous: {} after {}",
                assignment.episode_number, previous
            )));
        }
        if assignment.is_index_isolate != opens_episode {
            return Err(AntibiogramError::logic(format!(
                "Episode {} has a misplaced index isolate flag",
                assignment.episode_number
            )));
        }
    }
    Ok(())
}

/// Segment one group and emit its annotations in collection order
///
/// # Errors
/// `DataQualityError` when the group has no rows with a valid collection
/// date; `LogicError` when an internal invariant is violated.
pub(super) fn annotate_group(
    group: &IsolateGroup<'_>,
    cutoff_days: i64,
) -> Result<Vec<EpisodeAnnotation>> {
    if group.rows.is_empty() {
        return Err(AntibiogramError::data_quality(format!(
            "No rows with a valid collection date ({} excluded)",
            group.rows_without_dates
        )));
    }
    if group.rows.len() == 1 {
        debug!(
            "Group ({}, {}) has a single isolate, trivially one episode",
            group.patient_id, group.organism
        );
    }

    let assignments = assign_episodes(&group.rows, cutoff_days);
    check_group_invariants(&assignments)?;

    let total_episodes = assignments
        .last()
        .map_or(0, |assignment| assignment.episode_number);

    // Distinct isolate identifiers per episode; repeat rows of one isolate
    // collapse to one
    let mut isolates_per_episode: FxHashMap<u32, FxHashSet<&str>> = FxHashMap::default();
    for (row, assignment) in group.rows.iter().zip(&assignments) {
        isolates_per_episode
            .entry(assignment.episode_number)
            .or_default()
            .insert(row.isolate_id);
    }

    Ok(group
        .rows
        .iter()
        .zip(&assignments)
        .map(|(row, assignment)| EpisodeAnnotation {
            isolate_id: row.isolate_id.to_string(),
            patient_id: group.patient_id.to_string(),
            organism: group.organism.to_string(),
            episode_number: assignment.episode_number,
            is_index_isolate: assignment.is_index_isolate,
            isolates_in_episode: isolates_per_episode[&assignment.episode_number].len() as u32,
            total_episodes_for_group: total_episodes,
        })
        .collect())
}
