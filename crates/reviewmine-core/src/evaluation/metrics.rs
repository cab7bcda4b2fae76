//! Ranking-quality metrics over scored reviewer collections.
//!
//! All metrics consume [`Reviewer`] snapshots whose `anomalous_score` has
//! been finalized by the algorithm under evaluation. Relevance is binary
//! and derived purely from the name-encoded labels in
//! [`labels`](crate::evaluation::labels).
//!
//! The two evaluation reports deliberately handle empty denominators
//! differently: the threshold sweep emits raw confusion counts and never
//! divides, while the ranking report treats an empty anomaly class as a
//! [`MetricError::EmptyClass`]. The asymmetry is part of the contract;
//! keep the branches separate.

use crate::config::ANOMALOUS_REVIEWER_SIZE;
use crate::error::MetricError;
use crate::evaluation::labels::{classify, AnomalousCounts, AnomalyClass};
use crate::graph::{ReviewGraph, Reviewer};
use serde::Serialize;
use std::cmp::Ordering;

// ============================================================================
// DCG
// ============================================================================

/// Computes the DCG score of the top-k anomalous-degree ranking.
///
/// Reviewers are ranked descending by score with a stable sort, so ties
/// keep their input order and identical input reproduces the identical
/// total order. A reviewer at rank `i` contributes `gain(i)` if it is
/// anomalous and nothing otherwise.
///
/// Returns 0.0 for `k = 0` or an empty collection.
pub fn dcg(reviewers: &[Reviewer], k: usize) -> f64 {
    ranked(reviewers)
        .into_iter()
        .take(k)
        .enumerate()
        .filter(|(_, r)| classify(&r.name).is_anomalous())
        .map(|(i, _)| gain(i + 1))
        .sum()
}

/// Computes the ideal DCG score: the DCG of a k-length ranking whose every
/// position is anomalous.
///
/// Closed form over the rank positions; `ideal_dcg(0) == 0` and
/// `ideal_dcg(k) == 1 + sum(1/log2(i) for i in 2..=k)` otherwise.
pub fn ideal_dcg(k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }
    1.0 + (2..=k).map(gain).sum::<f64>()
}

/// Gain of an anomalous reviewer at 1-based rank `i`.
fn gain(rank: usize) -> f64 {
    if rank == 1 {
        1.0
    } else {
        1.0 / (rank as f64).log2()
    }
}

/// Ranks reviewers descending by anomalous score.
///
/// `sort_by` is stable, which is what makes the tie-break deterministic.
fn ranked(reviewers: &[Reviewer]) -> Vec<&Reviewer> {
    let mut order: Vec<&Reviewer> = reviewers.iter().collect();
    order.sort_by(|a, b| {
        b.anomalous_score
            .partial_cmp(&a.anomalous_score)
            .unwrap_or(Ordering::Equal)
    });
    order
}

// ============================================================================
// Threshold sweep
// ============================================================================

/// Confusion counts at one classification threshold.
///
/// Serialized field names match the evaluation output format consumed by
/// downstream tooling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdRecord {
    /// The classification cutoff: reviewers with `anomalous_score >=
    /// threshold` are predicted anomalous.
    pub threshold: f64,
    /// Predicted anomalous, actually anomalous.
    #[serde(rename = "true-positive")]
    pub true_positive: i64,
    /// Predicted normal, actually normal.
    #[serde(rename = "true-negative")]
    pub true_negative: i64,
    /// Predicted anomalous, actually normal.
    #[serde(rename = "false-positive")]
    pub false_positive: i64,
    /// Predicted normal, actually anomalous.
    #[serde(rename = "false-negative")]
    pub false_negative: i64,
}

impl ThresholdRecord {
    /// Fraction of predicted-anomalous reviewers that are truly anomalous.
    ///
    /// When nothing passes the threshold this report defines precision as
    /// 0, unlike the ranking report, which treats an empty denominator as
    /// an error. The two conventions are historical and intentionally not
    /// unified.
    pub fn precision(&self) -> f64 {
        let predicted = self.true_positive + self.false_positive;
        if predicted == 0 {
            0.0
        } else {
            self.true_positive as f64 / predicted as f64
        }
    }

    /// Fraction of truly anomalous reviewers that passed the threshold,
    /// 0 when the anomalous population is empty.
    pub fn recall(&self) -> f64 {
        let anomalous = self.true_positive + self.false_negative;
        if anomalous == 0 {
            0.0
        } else {
            self.true_positive as f64 / anomalous as f64
        }
    }
}

/// Sweeps the classification threshold over [0, 1] inclusive and emits
/// confusion counts per cutoff, in ascending threshold order.
///
/// `steps` is the number of evenly spaced thresholds (canonically
/// [`THRESHOLD_STEPS`](crate::config::THRESHOLD_STEPS)). False negatives
/// and true negatives are derived
/// from [`ANOMALOUS_REVIEWER_SIZE`]; counts are signed so a collection
/// whose anomaly population does not match the dataset contract shows up
/// as negative counts instead of a panic.
pub fn threshold_sweep(reviewers: &[Reviewer], steps: usize) -> Vec<ThresholdRecord> {
    let normal_total = reviewers.len() as i64 - ANOMALOUS_REVIEWER_SIZE as i64;
    thresholds(steps)
        .map(|threshold| {
            let passing: Vec<&Reviewer> = reviewers
                .iter()
                .filter(|r| r.anomalous_score >= threshold)
                .collect();
            let true_positive = AnomalousCounts::tally(passing.iter().copied()).total() as i64;
            let false_positive = passing.len() as i64 - true_positive;
            ThresholdRecord {
                threshold,
                true_positive,
                true_negative: normal_total - false_positive,
                false_positive,
                false_negative: ANOMALOUS_REVIEWER_SIZE as i64 - true_positive,
            }
        })
        .collect()
}

/// Evenly spaced values spanning [0, 1] inclusive.
fn thresholds(steps: usize) -> impl Iterator<Item = f64> {
    (0..steps).map(move |i| {
        if steps < 2 {
            0.0
        } else {
            i as f64 / (steps - 1) as f64
        }
    })
}

// ============================================================================
// ROC derivation
// ============================================================================

/// One point of the ROC curve derived from a threshold record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RocPoint {
    /// `fp / normal_total` at this threshold.
    pub false_positive_rate: f64,
    /// `tp / ANOMALOUS_REVIEWER_SIZE` at this threshold.
    pub true_positive_rate: f64,
}

/// Derives ROC curve points from a threshold sweep.
///
/// `total_reviewers` is the size of the scored collection the sweep ran
/// over. A collection with no normal reviewers has no defined false
/// positive rate and yields [`MetricError::NoNormalReviewers`].
pub fn roc_points(
    records: &[ThresholdRecord],
    total_reviewers: usize,
) -> Result<Vec<RocPoint>, MetricError> {
    let normal_total = total_reviewers as i64 - ANOMALOUS_REVIEWER_SIZE as i64;
    if normal_total <= 0 {
        return Err(MetricError::NoNormalReviewers);
    }
    Ok(records
        .iter()
        .map(|record| RocPoint {
            false_positive_rate: record.false_positive as f64 / normal_total as f64,
            true_positive_rate: record.true_positive as f64 / ANOMALOUS_REVIEWER_SIZE as f64,
        })
        .collect())
}

/// Area under the ROC curve by trapezoidal integration.
///
/// Expects points in ascending threshold order, where the false positive
/// rate runs from 1 down to 0; the signed trapezoid sum is negated to
/// report a positive area.
pub fn auc(points: &[RocPoint]) -> f64 {
    let signed: f64 = points
        .windows(2)
        .map(|pair| {
            (pair[1].false_positive_rate - pair[0].false_positive_rate)
                * (pair[0].true_positive_rate + pair[1].true_positive_rate)
                / 2.0
        })
        .sum();
    -signed
}

// ============================================================================
// Ranking report
// ============================================================================

/// Per-iteration precision of the top-57 anomalous-degree ranking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankingRecord {
    /// Type-1 reviewers found in the top cut.
    pub a1: u64,
    /// `a1` over the total type-1 population.
    #[serde(rename = "a1-precision")]
    pub a1_precision: f64,
    /// Type-2 reviewers found in the top cut.
    pub a2: u64,
    /// `a2` over the total type-2 population.
    #[serde(rename = "a2-precision")]
    pub a2_precision: f64,
    /// Type-3 reviewers found in the top cut.
    pub a3: u64,
    /// `a3` over the total type-3 population.
    #[serde(rename = "a3-precision")]
    pub a3_precision: f64,
    /// Normal reviewers in the top cut.
    pub error: i64,
    /// `error` over the total reviewer count.
    #[serde(rename = "error-rate")]
    pub error_rate: f64,
    /// 0-based iteration index.
    #[serde(rename = "loop")]
    pub iteration: usize,
}

/// Runs the algorithm for `loops` iterations and reports per-class
/// precision of the top-57 ranking after each one.
///
/// The cut is always [`ANOMALOUS_REVIEWER_SIZE`] positions, not the live
/// anomaly count. Per-class population totals are tallied over the full
/// collection before the first iteration; a zero total for any class makes
/// its precision undefined and fails with [`MetricError::EmptyClass`] -
/// that signals a dataset/label mismatch, not a zero score.
///
/// Callers resolve the requested loop count before calling (single-shot
/// algorithm variants run exactly one iteration; see the registry layer).
pub fn ranking_report<G>(graph: &mut G, loops: usize) -> Result<Vec<RankingRecord>, MetricError>
where
    G: ReviewGraph + ?Sized,
{
    let population = graph.reviewers();
    let total_reviewers = population.len();
    let totals = AnomalousCounts::tally(&population);
    if totals.type1 == 0 {
        return Err(MetricError::EmptyClass(AnomalyClass::Type1));
    }
    if totals.type2 == 0 {
        return Err(MetricError::EmptyClass(AnomalyClass::Type2));
    }
    if totals.type3 == 0 {
        return Err(MetricError::EmptyClass(AnomalyClass::Type3));
    }

    let mut records = Vec::with_capacity(loops);
    for iteration in 0..loops {
        graph.update();
        let reviewers = graph.reviewers();
        let top: Vec<&Reviewer> = ranked(&reviewers)
            .into_iter()
            .take(ANOMALOUS_REVIEWER_SIZE)
            .collect();
        let found = AnomalousCounts::tally(top.iter().copied());
        let error = top.len() as i64 - found.total() as i64;

        records.push(RankingRecord {
            a1: found.type1 as u64,
            a1_precision: found.type1 as f64 / totals.type1 as f64,
            a2: found.type2 as u64,
            a2_precision: found.type2 as f64 / totals.type2 as f64,
            a3: found.type3 as u64,
            a3_precision: found.type3 as f64 / totals.type3 as f64,
            error,
            error_rate: error as f64 / total_reviewers as f64,
            iteration,
        });
    }
    Ok(records)
}

// ============================================================================
// nDCG report
// ============================================================================

/// Normalized DCG of one top-k cut.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DcgRecord {
    /// The cut length.
    pub k: usize,
    /// `dcg(reviewers, k) / ideal_dcg(k)`.
    pub score: f64,
}

/// Reports normalized DCG for every cut `k` in `1..=max_k`.
///
/// The canonical sweep runs to [`ANOMALOUS_REVIEWER_SIZE`].
pub fn ndcg_report(reviewers: &[Reviewer], max_k: usize) -> Vec<DcgRecord> {
    (1..=max_k)
        .map(|k| DcgRecord {
            k,
            score: dcg(reviewers, k) / ideal_dcg(k),
        })
        .collect()
}
