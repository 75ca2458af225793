//! Tests for result consolidation
//!
//! Covers the precedence reduction, the pivot invariants, and the fatal
//! validation paths.

use antibiogram::models::quality::ExclusionReason;
use antibiogram::{
    AntibiogramError, AntibiogramMatrix, Consolidator, ConsolidatorConfig, Interpretation,
    IsolateRecord,
};
use chrono::{NaiveDate, NaiveDateTime};

fn collected(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

fn test_record(
    isolate_id: &str,
    patient_id: &str,
    drug: &str,
    interpretation: Interpretation,
) -> IsolateRecord {
    IsolateRecord::new(patient_id, "SA")
        .with_isolate_id(isolate_id)
        .with_collection_datetime(collected(2022, 3, 1))
        .with_drug_result(drug, interpretation)
}

const INDEX: &[&str] = &["patient_id", "isolate_id", "organism"];

#[test]
fn test_conflicting_results_reduce_to_resistant() {
    // The same isolate tested twice against Vancomycin with disagreeing
    // outcomes keeps the conservative one
    let records = vec![
        test_record("BI001", "P1", "Vancomycin", Interpretation::Susceptible),
        test_record("BI001", "P1", "Vancomycin", Interpretation::Resistant),
    ];

    let result = Consolidator::with_defaults()
        .consolidate(&records, INDEX)
        .unwrap();

    assert_eq!(result.matrix.num_rows(), 1);
    assert_eq!(
        result.matrix.cell(0, "Vancomycin"),
        Some(Interpretation::Resistant)
    );
}

#[test]
fn test_precedence_without_resistant() {
    let records = vec![
        test_record("BI001", "P1", "Cefazolin", Interpretation::Susceptible),
        test_record("BI001", "P1", "Cefazolin", Interpretation::Intermediate),
        test_record("BI001", "P1", "Penicillin", Interpretation::Susceptible),
    ];

    let result = Consolidator::with_defaults()
        .consolidate(&records, INDEX)
        .unwrap();

    assert_eq!(
        result.matrix.cell(0, "Cefazolin"),
        Some(Interpretation::Intermediate)
    );
    assert_eq!(
        result.matrix.cell(0, "Penicillin"),
        Some(Interpretation::Susceptible)
    );
}

#[test]
fn test_not_tested_rows_excluded_by_default() {
    // An isolate whose only Ampicillin row is NotTested gets no cell at all
    let records = vec![
        test_record("BI001", "P1", "Ampicillin", Interpretation::NotTested),
        test_record("BI001", "P1", "Vancomycin", Interpretation::Susceptible),
    ];

    let result = Consolidator::with_defaults()
        .consolidate(&records, INDEX)
        .unwrap();

    assert_eq!(result.matrix.num_rows(), 1);
    assert_eq!(result.matrix.drugs(), &["Vancomycin".to_string()]);
    assert_eq!(result.matrix.cell(0, "Ampicillin"), None);
    assert_eq!(result.report.count(ExclusionReason::NotTestable), 1);
}

#[test]
fn test_only_testable_false_keeps_not_tested() {
    let records = vec![test_record(
        "BI001",
        "P1",
        "Ampicillin",
        Interpretation::NotTested,
    )];

    let config = ConsolidatorConfig::builder().only_testable(false).build();
    let result = Consolidator::new(config)
        .consolidate(&records, INDEX)
        .unwrap();

    assert_eq!(
        result.matrix.cell(0, "Ampicillin"),
        Some(Interpretation::NotTested)
    );
    assert!(result.report.is_clean());
}

#[test]
fn test_rows_keep_first_appearance_order_and_stay_unique() {
    let records = vec![
        test_record("BI002", "P2", "Vancomycin", Interpretation::Susceptible),
        test_record("BI001", "P1", "Vancomycin", Interpretation::Resistant),
        test_record("BI002", "P2", "Cefazolin", Interpretation::Susceptible),
    ];

    let result = Consolidator::with_defaults()
        .consolidate(&records, INDEX)
        .unwrap();
    let matrix = &result.matrix;

    assert_eq!(matrix.num_rows(), 2);
    assert_eq!(matrix.find_row("isolate_id", "BI002"), Some(0));
    assert_eq!(matrix.find_row("isolate_id", "BI001"), Some(1));

    // Index tuples are unique across rows
    let mut keys: Vec<_> = matrix.rows().iter().map(|r| r.index_values.clone()).collect();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), matrix.num_rows());
}

#[test]
fn test_rows_without_values_still_keep_their_row() {
    // An isolate whose rows are all filtered out keeps an all-absent row so
    // the matrix covers the full canonical index
    let mut no_result = IsolateRecord::new("P3", "SA").with_isolate_id("BI003");
    no_result.collection_datetime = Some(collected(2022, 5, 1));
    let records = vec![
        test_record("BI001", "P1", "Vancomycin", Interpretation::Resistant),
        no_result,
    ];

    let result = Consolidator::with_defaults()
        .consolidate(&records, INDEX)
        .unwrap();

    assert_eq!(result.matrix.num_rows(), 2);
    let row = result.matrix.find_row("isolate_id", "BI003").unwrap();
    assert_eq!(result.matrix.cell(row, "Vancomycin"), None);
    assert_eq!(result.report.count(ExclusionReason::MissingDrug), 1);
}

#[test]
fn test_missing_interpretation_counted() {
    let mut record = test_record("BI001", "P1", "Vancomycin", Interpretation::Susceptible);
    record.interpretation = None;
    let records = vec![
        record,
        test_record("BI002", "P2", "Vancomycin", Interpretation::Susceptible),
    ];

    let result = Consolidator::with_defaults()
        .consolidate(&records, INDEX)
        .unwrap();

    assert_eq!(result.report.count(ExclusionReason::MissingInterpretation), 1);
    assert_eq!(result.report.total_excluded(), 1);
}

#[test]
fn test_backfill_not_tested() {
    let records = vec![
        test_record("BI001", "P1", "Vancomycin", Interpretation::Resistant),
        test_record("BI002", "P2", "Cefazolin", Interpretation::Susceptible),
    ];

    let config = ConsolidatorConfig::builder().backfill_not_tested(true).build();
    let result = Consolidator::new(config)
        .consolidate(&records, INDEX)
        .unwrap();

    assert_eq!(
        result.matrix.cell(0, "Cefazolin"),
        Some(Interpretation::NotTested)
    );
    assert_eq!(
        result.matrix.cell(1, "Vancomycin"),
        Some(Interpretation::NotTested)
    );
}

#[test]
fn test_schema_error_on_diverging_index_values() {
    // One isolate id carrying two different facilities under an index that
    // includes the facility is a broken surrogate key
    let records = vec![
        test_record("BI001", "P1", "Vancomycin", Interpretation::Susceptible)
            .with_attribute("facility", "North"),
        test_record("BI001", "P1", "Cefazolin", Interpretation::Susceptible)
            .with_attribute("facility", "South"),
    ];

    let result = Consolidator::with_defaults().consolidate(
        &records,
        &["patient_id", "isolate_id", "organism", "facility"],
    );

    assert!(matches!(result, Err(AntibiogramError::SchemaError(_))));
}

#[test]
fn test_schema_error_on_unknown_index_column() {
    let records = vec![test_record(
        "BI001",
        "P1",
        "Vancomycin",
        Interpretation::Susceptible,
    )];

    let result = Consolidator::with_defaults().consolidate(&records, &["patient_id", "ward"]);
    assert!(matches!(result, Err(AntibiogramError::SchemaError(_))));

    let result = Consolidator::with_defaults().consolidate(&records, &[]);
    assert!(matches!(result, Err(AntibiogramError::SchemaError(_))));
}

#[test]
fn test_data_quality_error_when_value_column_entirely_missing() {
    let mut record = IsolateRecord::new("P1", "SA").with_isolate_id("BI001");
    record.interpretation = Some(Interpretation::Susceptible);
    let records = vec![record];

    let result = Consolidator::with_defaults().consolidate(&records, INDEX);
    assert!(matches!(result, Err(AntibiogramError::DataQualityError(_))));
}

#[test]
fn test_empty_input_yields_empty_matrix() {
    let result = Consolidator::with_defaults()
        .consolidate(&[], &["patient_id"])
        .unwrap();

    assert_eq!(result.matrix.num_rows(), 0);
    assert_eq!(result.matrix.num_drugs(), 0);
    assert!(result.report.is_clean());
}

fn assert_same_cells(a: &AntibiogramMatrix, b: &AntibiogramMatrix) {
    assert_eq!(a.num_rows(), b.num_rows());
    let mut drugs_a: Vec<_> = a.drugs().to_vec();
    let mut drugs_b: Vec<_> = b.drugs().to_vec();
    drugs_a.sort();
    drugs_b.sort();
    assert_eq!(drugs_a, drugs_b);

    for (row_idx, row) in a.rows().iter().enumerate() {
        assert_eq!(row.index_values, b.rows()[row_idx].index_values);
        for drug in &drugs_a {
            assert_eq!(a.cell(row_idx, drug), b.cell(row_idx, drug));
        }
    }
}

#[test]
fn test_consolidation_is_idempotent() {
    let records = vec![
        test_record("BI001", "P1", "Vancomycin", Interpretation::Susceptible),
        test_record("BI001", "P1", "Vancomycin", Interpretation::Resistant),
        test_record("BI001", "P1", "Cefazolin", Interpretation::Susceptible),
        test_record("BI002", "P2", "Cefazolin", Interpretation::Intermediate),
        test_record("BI002", "P2", "Penicillin", Interpretation::Resistant),
    ];

    let consolidator = Consolidator::with_defaults();
    let first = consolidator.consolidate(&records, INDEX).unwrap();

    let long = first.matrix.to_long();
    let second = consolidator.consolidate(&long, INDEX).unwrap();

    assert_same_cells(&first.matrix, &second.matrix);
    assert!(second.report.is_clean());
}
