//! End-to-end tests for the complete load -> score -> report flow.
//!
//! These tests build a dataset fixture shaped like the bundled synthetic
//! dataset (exactly `ANOMALOUS_REVIEWER_SIZE` planted reviewers split over
//! the three classes) and drive the loader and every report over it.

use reviewmine_core::dataset;
use reviewmine_core::evaluation::labels::{classify, AnomalousCounts};
use reviewmine_core::evaluation::metrics::{
    auc, dcg, ideal_dcg, ndcg_report, ranking_report, roc_points, threshold_sweep,
};
use reviewmine_core::graph::{MemoryGraph, ReviewGraph};
use reviewmine_core::ANOMALOUS_REVIEWER_SIZE;
use std::fmt::Write as _;
use std::fs;
use tempfile::TempDir;

const NORMAL_REVIEWERS: usize = 143;
const TOTAL_REVIEWERS: usize = ANOMALOUS_REVIEWER_SIZE + NORMAL_REVIEWERS;

/// Writes a dataset with 19 reviewers of each anomaly class plus
/// `NORMAL_REVIEWERS` normal ones, ten products, and one review per
/// reviewer.
fn write_fixture() -> TempDir {
    let dir = TempDir::new().unwrap();

    let mut reviewers = String::new();
    let mut reviews = String::new();
    let mut id = 0;
    let mut add = |name: &str, reviewers: &mut String, reviews: &mut String| {
        id += 1;
        writeln!(reviewers, "{id} {name}").unwrap();
        writeln!(reviews, "{id} {} {}", id % 10 + 1, id % 6).unwrap();
    };

    for i in 0..19 {
        add(&format!("anomaly{i}"), &mut reviewers, &mut reviews);
        add(&format!("anomaly{}_1", i + 19), &mut reviewers, &mut reviews);
        add(&format!("anomaly{}_2", i + 38), &mut reviewers, &mut reviews);
    }
    for i in 0..NORMAL_REVIEWERS {
        add(&format!("reviewer{i}"), &mut reviewers, &mut reviews);
    }

    let mut products = String::new();
    for p in 1..=10 {
        writeln!(products, "{p} product{p}").unwrap();
    }

    fs::write(dir.path().join(dataset::REVIEWER_FILE), reviewers).unwrap();
    fs::write(dir.path().join(dataset::PRODUCT_FILE), products).unwrap();
    fs::write(dir.path().join(dataset::REVIEW_FILE), reviews).unwrap();
    dir
}

/// Loads the fixture and assigns a perfectly separating score: anomalous
/// reviewers high, normal reviewers low.
fn loaded_perfect_graph(dir: &TempDir) -> MemoryGraph {
    let mut graph = MemoryGraph::new();
    dataset::load(&mut graph, dir.path()).unwrap();
    for r in graph.reviewers_mut() {
        r.anomalous_score = if classify(&r.name).is_anomalous() {
            0.9
        } else {
            0.1
        };
    }
    graph
}

#[test]
fn test_fixture_matches_dataset_contract() {
    let dir = write_fixture();
    let mut graph = MemoryGraph::new();
    dataset::load(&mut graph, dir.path()).unwrap();

    let reviewers = graph.reviewers();
    assert_eq!(reviewers.len(), TOTAL_REVIEWERS);
    let counts = AnomalousCounts::tally(&reviewers);
    assert_eq!(counts.total(), ANOMALOUS_REVIEWER_SIZE);
    assert_eq!((counts.type1, counts.type2, counts.type3), (19, 19, 19));
}

#[test]
fn test_loading_twice_is_stable() {
    let dir = write_fixture();

    let mut first = MemoryGraph::new();
    dataset::load(&mut first, dir.path()).unwrap();
    let mut second = MemoryGraph::new();
    dataset::load(&mut second, dir.path()).unwrap();

    let mut names_a: Vec<String> = first.reviewers().into_iter().map(|r| r.name).collect();
    let mut names_b: Vec<String> = second.reviewers().into_iter().map(|r| r.name).collect();
    names_a.sort();
    names_b.sort();
    assert_eq!(names_a, names_b);
    assert_eq!(first.review_count(), second.review_count());
}

#[test]
fn test_threshold_sweep_extremes() {
    let dir = write_fixture();
    let graph = loaded_perfect_graph(&dir);
    let reviewers = graph.reviewers();

    let records = threshold_sweep(&reviewers, 100);

    // Threshold 0 includes everyone.
    let first = records.first().unwrap();
    assert_eq!(first.true_positive, ANOMALOUS_REVIEWER_SIZE as i64);
    assert_eq!(first.false_positive, NORMAL_REVIEWERS as i64);
    assert_eq!(first.false_negative, 0);
    assert_eq!(first.true_negative, 0);

    // Threshold 1.0 is above every score in this fixture.
    let last = records.last().unwrap();
    assert_eq!(last.true_positive, 0);
    assert_eq!(last.false_positive, 0);
    assert_eq!(last.false_negative, ANOMALOUS_REVIEWER_SIZE as i64);
    assert_eq!(last.true_negative, NORMAL_REVIEWERS as i64);

    let points = roc_points(&records, reviewers.len()).unwrap();
    assert_eq!(points[0].false_positive_rate, 1.0);
    assert_eq!(points[0].true_positive_rate, 1.0);

    // A perfectly separating score gives the full unit area.
    assert!((auc(&points) - 1.0).abs() < 1e-9);
}

#[test]
fn test_ranking_report_on_perfect_ranking() {
    let dir = write_fixture();
    let mut graph = loaded_perfect_graph(&dir);

    let records = ranking_report(&mut graph, 3).unwrap();

    assert_eq!(records.len(), 3);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.iteration, i);
        assert_eq!((record.a1, record.a2, record.a3), (19, 19, 19));
        assert_eq!(record.a1_precision, 1.0);
        assert_eq!(record.a2_precision, 1.0);
        assert_eq!(record.a3_precision, 1.0);
        assert_eq!(record.error, 0);
        assert_eq!(record.error_rate, 0.0);
    }
}

#[test]
fn test_ndcg_report_on_perfect_ranking() {
    let dir = write_fixture();
    let graph = loaded_perfect_graph(&dir);
    let reviewers = graph.reviewers();

    assert!((dcg(&reviewers, ANOMALOUS_REVIEWER_SIZE) - ideal_dcg(ANOMALOUS_REVIEWER_SIZE)).abs() < 1e-9);

    let records = ndcg_report(&reviewers, ANOMALOUS_REVIEWER_SIZE);
    assert_eq!(records.len(), ANOMALOUS_REVIEWER_SIZE);
    for record in records {
        assert!((record.score - 1.0).abs() < 1e-9, "k={} score={}", record.k, record.score);
    }
}

#[test]
fn test_reports_serialize_as_ndjson() {
    let dir = write_fixture();
    let graph = loaded_perfect_graph(&dir);
    let reviewers = graph.reviewers();

    let mut out = String::new();
    for record in threshold_sweep(&reviewers, 100) {
        writeln!(out, "{}", serde_json::to_string(&record).unwrap()).unwrap();
    }

    assert_eq!(out.lines().count(), 100);
    for line in out.lines() {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        for key in [
            "threshold",
            "true-positive",
            "true-negative",
            "false-positive",
            "false-negative",
        ] {
            assert!(value.get(key).is_some(), "missing key {key} in {line}");
        }
    }
}
