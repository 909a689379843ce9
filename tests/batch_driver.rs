//! Integration tests for the folder driver.
//!
//! Tests cover:
//! - Corrupt files reported as failures without stopping the batch
//! - Annotated copies written under the prefixed name
//! - Parallel and sequential runs agreeing
//! - The CSV region report

mod common;

use std::fs;
use std::path::Path;

use barcode_locator_lib::{
    run_batch, write_regions_csv, BatchOptions, Config, FileOutcome, PipelineConfig,
};

use common::*;

fn populate(dir: &Path) {
    barcode_image().save(dir.join("barcode.png")).unwrap();
    blank_image().save(dir.join("blank.jpg")).unwrap();
    fs::write(dir.join("corrupt.png"), b"\x89PNG this is not really an image").unwrap();
    fs::write(dir.join("readme.txt"), b"ignored").unwrap();
}

fn config_for(input: &Path, output: &Path, use_parallel: bool) -> Config {
    Config {
        input_path: input.to_string_lossy().into_owned(),
        output_base_dir: output.to_string_lossy().into_owned(),
        use_parallel,
        ..Config::default()
    }
}

#[test]
fn corrupt_input_is_reported_and_batch_continues() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    populate(input.path());

    let config = config_for(input.path(), output.path(), true);
    let report = run_batch(&config, &PipelineConfig::default(), BatchOptions::default(), None)
        .unwrap();

    let names: Vec<_> = report
        .outcomes
        .iter()
        .map(|o| o.path().file_name().unwrap().to_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["barcode.png", "blank.jpg", "corrupt.png"]);

    match &report.outcomes[0] {
        FileOutcome::Processed { regions, output_path, .. } => {
            assert_eq!(regions.len(), 1);
            assert_eq!(output_path, &output.path().join("processed_barcode.png"));
            assert!(output_path.exists());
        }
        other => panic!("barcode.png should have been processed: {:?}", other),
    }
    match &report.outcomes[1] {
        FileOutcome::Processed { regions, .. } => assert!(regions.is_empty()),
        other => panic!("blank.jpg should have been processed: {:?}", other),
    }
    assert!(matches!(report.outcomes[2], FileOutcome::Failed { .. }));

    assert_eq!(report.processed_count(), 2);
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.total_regions(), 1);
    assert!(!report.stopped_early);
    assert!(output.path().join("processed_blank.jpg").exists());
    assert!(!output.path().join("processed_corrupt.png").exists());
}

#[test]
fn sequential_and_parallel_runs_agree() {
    let input = tempfile::tempdir().unwrap();
    populate(input.path());

    let parallel_out = tempfile::tempdir().unwrap();
    let sequential_out = tempfile::tempdir().unwrap();
    let pipeline = PipelineConfig::default();

    let parallel = run_batch(
        &config_for(input.path(), parallel_out.path(), true),
        &pipeline,
        BatchOptions::default(),
        None,
    )
    .unwrap();
    let sequential = run_batch(
        &config_for(input.path(), sequential_out.path(), false),
        &pipeline,
        BatchOptions::default(),
        None,
    )
    .unwrap();

    assert_eq!(parallel.outcomes.len(), sequential.outcomes.len());
    for (p, s) in parallel.outcomes.iter().zip(&sequential.outcomes) {
        assert_eq!(p.path(), s.path());
        match (p, s) {
            (
                FileOutcome::Processed { regions: a, .. },
                FileOutcome::Processed { regions: b, .. },
            ) => assert_eq!(a, b),
            (FileOutcome::Failed { .. }, FileOutcome::Failed { .. }) => {}
            mismatch => panic!("outcomes differ: {:?}", mismatch),
        }
    }
}

#[test]
fn region_report_lists_every_accepted_region() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    populate(input.path());

    let config = config_for(input.path(), output.path(), false);
    let report = run_batch(&config, &PipelineConfig::default(), BatchOptions::default(), None)
        .unwrap();
    let csv_path = write_regions_csv(&report, output.path()).unwrap();

    let content = fs::read_to_string(csv_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains("barcode.png,0,"));
}

#[test]
fn single_file_input_is_processed() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let path = input.path().join("only.png");
    rectangle_image().save(&path).unwrap();

    let config = Config {
        input_path: path.to_string_lossy().into_owned(),
        output_base_dir: output.path().to_string_lossy().into_owned(),
        ..Config::default()
    };
    let report = run_batch(&config, &rectangle_config(1.5), BatchOptions::default(), None)
        .unwrap();

    assert_eq!(report.processed_count(), 1);
    assert_eq!(report.total_regions(), 1);
    assert!(output.path().join("processed_only.png").exists());
}
