//! Tests for episode segmentation
//!
//! Covers the cutoff rule, the structural invariants, the row filters, and
//! the per-group failure path.

use antibiogram::models::quality::ExclusionReason;
use antibiogram::{EpisodeConfig, EpisodeIndex, IsolateRecord, Segmenter};
use chrono::{Days, NaiveDate, NaiveDateTime};
use rustc_hash::FxHashSet;

fn day(offset: u64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2021, 1, 1)
        .unwrap()
        .checked_add_days(Days::new(offset))
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

fn culture(patient_id: &str, organism: &str, isolate_id: &str, offset: u64) -> IsolateRecord {
    IsolateRecord::new(patient_id, organism)
        .with_isolate_id(isolate_id)
        .with_collection_datetime(day(offset))
}

/// Episode contiguity, single index isolate per episode, and the cutoff
/// bounds, checked over every (patient, organism) group of an index
fn assert_structural_invariants(index: &EpisodeIndex) {
    let groups: FxHashSet<(String, String)> = index
        .annotations()
        .iter()
        .map(|a| (a.patient_id.clone(), a.organism.clone()))
        .collect();

    for (patient_id, organism) in groups {
        let annotations = index.group(&patient_id, &organism);
        let total = annotations[0].total_episodes_for_group;

        let numbers: FxHashSet<u32> = annotations.iter().map(|a| a.episode_number).collect();
        assert_eq!(
            numbers,
            (1..=total).collect::<FxHashSet<u32>>(),
            "episode numbers not contiguous for ({patient_id}, {organism})"
        );

        for episode in 1..=total {
            let index_isolates = annotations
                .iter()
                .filter(|a| a.episode_number == episode && a.is_index_isolate)
                .count();
            assert_eq!(
                index_isolates, 1,
                "episode {episode} of ({patient_id}, {organism}) must have exactly one index isolate"
            );
        }
    }
}

#[test]
fn test_thirty_day_cutoff_scenario() {
    // Days 0, 10, 45, 50 with a 30 day cutoff split into two episodes with
    // index isolates on day 0 and day 45
    let records = vec![
        culture("P1", "SA", "BI001", 0),
        culture("P1", "SA", "BI002", 10),
        culture("P1", "SA", "BI003", 45),
        culture("P1", "SA", "BI004", 50),
    ];

    let result = Segmenter::with_cutoff_days(30).segment(&records).unwrap();
    let index = &result.index;

    let numbers: Vec<u32> = index.annotations().iter().map(|a| a.episode_number).collect();
    assert_eq!(numbers, vec![1, 1, 2, 2]);

    assert!(index.get("BI001").unwrap().is_index_isolate);
    assert!(!index.get("BI002").unwrap().is_index_isolate);
    assert!(index.get("BI003").unwrap().is_index_isolate);
    assert!(!index.get("BI004").unwrap().is_index_isolate);

    assert_eq!(index.total_episodes("P1", "SA"), Some(2));
    assert_eq!(index.get("BI001").unwrap().isolates_in_episode, 2);
    assert_eq!(index.get("BI004").unwrap().isolates_in_episode, 2);

    assert_structural_invariants(index);
    assert!(result.report.is_clean());
}

#[test]
fn test_single_isolate_group() {
    let records = vec![culture("P1", "SA", "BI001", 0)];

    let result = Segmenter::with_cutoff_days(30).segment(&records).unwrap();
    let annotation = result.index.get("BI001").unwrap();

    assert_eq!(annotation.episode_number, 1);
    assert!(annotation.is_index_isolate);
    assert_eq!(annotation.isolates_in_episode, 1);
    assert_eq!(annotation.total_episodes_for_group, 1);
}

#[test]
fn test_boundary_day_stays_in_episode() {
    // Exactly cutoff days after the anchor still belongs to the episode;
    // one day past it opens a new one
    let records = vec![
        culture("P1", "SA", "BI001", 0),
        culture("P1", "SA", "BI002", 30),
        culture("P1", "SA", "BI003", 31),
    ];

    let result = Segmenter::with_cutoff_days(30).segment(&records).unwrap();

    assert_eq!(result.index.get("BI002").unwrap().episode_number, 1);
    assert_eq!(result.index.get("BI003").unwrap().episode_number, 2);
    assert!(result.index.get("BI003").unwrap().is_index_isolate);
}

#[test]
fn test_anchor_is_cumulative_from_group_start() {
    // The second episode's window opens at its index isolate's cumulative
    // offset (day 40), so day 70 still joins it and day 71 does not
    let records = vec![
        culture("P1", "SA", "BI001", 0),
        culture("P1", "SA", "BI002", 40),
        culture("P1", "SA", "BI003", 70),
        culture("P1", "SA", "BI004", 71),
    ];

    let result = Segmenter::with_cutoff_days(30).segment(&records).unwrap();

    let numbers: Vec<u32> = result
        .index
        .annotations()
        .iter()
        .map(|a| a.episode_number)
        .collect();
    assert_eq!(numbers, vec![1, 2, 2, 3]);
    assert_structural_invariants(&result.index);
}

#[test]
fn test_same_day_cultures_keep_input_order() {
    let records = vec![
        culture("P1", "SA", "BI001", 5),
        culture("P1", "SA", "BI002", 5),
    ];

    let result = Segmenter::with_cutoff_days(30).segment(&records).unwrap();
    let annotations = result.index.annotations();

    assert_eq!(annotations[0].isolate_id, "BI001");
    assert!(annotations[0].is_index_isolate);
    assert_eq!(annotations[1].isolate_id, "BI002");
    assert!(!annotations[1].is_index_isolate);
}

#[test]
fn test_groups_are_independent() {
    let records = vec![
        culture("P1", "SA", "BI001", 0),
        culture("P1", "EC", "BI002", 0),
        culture("P2", "SA", "BI003", 0),
        culture("P1", "SA", "BI004", 100),
    ];

    let result = Segmenter::with_cutoff_days(30).segment(&records).unwrap();
    let index = &result.index;

    assert_eq!(index.total_episodes("P1", "SA"), Some(2));
    assert_eq!(index.total_episodes("P1", "EC"), Some(1));
    assert_eq!(index.total_episodes("P2", "SA"), Some(1));
    assert_structural_invariants(index);
}

#[test]
fn test_namespace_filter_excludes_foreign_isolates() {
    let records = vec![
        culture("P1", "SA", "BI001", 0),
        culture("P1", "SA", "QC999", 5),
    ];

    let result = Segmenter::with_cutoff_days(30).segment(&records).unwrap();

    assert!(result.index.get("BI001").is_some());
    assert!(result.index.get("QC999").is_none());
    assert_eq!(
        result.report.count(ExclusionReason::ForeignIsolateNamespace),
        1
    );
}

#[test]
fn test_missing_isolate_id_excluded() {
    let mut anonymous = culture("P1", "SA", "BI001", 0);
    anonymous.isolate_id = None;
    let records = vec![anonymous, culture("P1", "SA", "BI002", 1)];

    let result = Segmenter::with_cutoff_days(30).segment(&records).unwrap();

    assert_eq!(result.index.len(), 1);
    assert_eq!(result.report.count(ExclusionReason::MissingIsolateId), 1);
}

#[test]
fn test_missing_date_excluded_but_group_survives() {
    let mut undated = culture("P1", "SA", "BI002", 0);
    undated.collection_datetime = None;
    let records = vec![culture("P1", "SA", "BI001", 0), undated];

    let result = Segmenter::with_cutoff_days(30).segment(&records).unwrap();

    assert_eq!(result.index.len(), 1);
    assert!(result.index.get("BI002").is_none());
    assert_eq!(
        result.report.count(ExclusionReason::MissingCollectionDate),
        1
    );
    assert!(result.report.group_failures().is_empty());
}

#[test]
fn test_group_with_no_valid_dates_fails_alone() {
    // P1's only row has no date: the group fails and is reported. P2 is
    // segmented normally.
    let mut undated = culture("P1", "SA", "BI001", 0);
    undated.collection_datetime = None;
    let records = vec![undated, culture("P2", "SA", "BI002", 0)];

    let result = Segmenter::with_cutoff_days(30).segment(&records).unwrap();

    assert!(result.index.get("BI001").is_none());
    assert!(result.index.get("BI002").is_some());

    let failures = result.report.group_failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].patient_id, "P1");
    assert_eq!(failures[0].organism, "SA");
}

#[test]
fn test_repeat_rows_of_one_isolate_collapse_in_counts() {
    let records = vec![
        culture("P1", "SA", "BI001", 0),
        culture("P1", "SA", "BI001", 0),
        culture("P1", "SA", "BI002", 3),
    ];

    let result = Segmenter::with_cutoff_days(30).segment(&records).unwrap();

    // Three annotated rows, two distinct isolates in the episode
    assert_eq!(result.index.len(), 3);
    assert_eq!(result.index.get("BI001").unwrap().isolates_in_episode, 2);
    assert_structural_invariants(&result.index);
}

#[test]
fn test_custom_isolate_prefix() {
    let config = EpisodeConfig::builder()
        .cutoff_days(14)
        .isolate_id_prefix("LAB")
        .build();
    let records = vec![
        culture("P1", "SA", "LAB01", 0),
        culture("P1", "SA", "BI001", 1),
    ];

    let result = Segmenter::new(config).segment(&records).unwrap();

    assert!(result.index.get("LAB01").is_some());
    assert!(result.index.get("BI001").is_none());
}

#[test]
fn test_cutoff_bounds_hold_across_a_long_history() {
    // A fortnightly culture over two years keeps every invariant intact
    let records: Vec<IsolateRecord> = (0..50)
        .map(|i| culture("P1", "SA", &format!("BI{i:03}"), i * 14))
        .collect();

    let result = Segmenter::with_cutoff_days(30).segment(&records).unwrap();
    assert_structural_invariants(&result.index);

    // Non-index isolates sit within the window of their episode's anchor
    let annotations = result.index.annotations();
    let mut anchor_offset = 0i64;
    for (i, annotation) in annotations.iter().enumerate() {
        let offset = (i as i64) * 14;
        if annotation.is_index_isolate {
            anchor_offset = offset;
        } else {
            assert!(offset - anchor_offset <= 30);
        }
    }
}

#[test]
fn test_parallel_and_sequential_agree() {
    // Enough groups to cross the parallel threshold
    let mut records = Vec::new();
    for patient in 0..80 {
        let patient_id = format!("P{patient:03}");
        for culture_idx in 0..4u64 {
            records.push(culture(
                &patient_id,
                "SA",
                &format!("BI{patient:03}{culture_idx}"),
                culture_idx * 20,
            ));
        }
    }

    let parallel = Segmenter::new(EpisodeConfig::builder().cutoff_days(30).parallel(true).build())
        .segment(&records)
        .unwrap();
    let sequential =
        Segmenter::new(EpisodeConfig::builder().cutoff_days(30).parallel(false).build())
            .segment(&records)
            .unwrap();

    assert_eq!(parallel.index.annotations(), sequential.index.annotations());
    assert_eq!(parallel.report, sequential.report);
    assert_structural_invariants(&parallel.index);
}
