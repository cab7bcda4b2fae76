//! Built-in baseline detection algorithms.
//!
//! These are simple reference scorers implementing the
//! [`ReviewGraph`] contract so the evaluation commands can run without any
//! external algorithm crate installed. Both keep the bipartite graph as
//! flat adjacency lists; duplicate (reviewer, product) reviews from the
//! source data are kept and contribute to every mean.

use reviewmine_core::graph::{ProductId, ReviewGraph, Reviewer, ReviewerId};
use std::collections::BTreeMap;
use thiserror::Error;

/// Algorithm parameters parsed from the command line (`--param key=value`).
pub type Params = BTreeMap<String, f64>;

/// Failure to construct an algorithm graph from user-supplied parameters.
///
/// This is a configuration mistake by the caller, reported as such; it is
/// unrelated to dataset or metric errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The algorithm does not understand a given parameter name.
    #[error("unknown parameter {name:?} (supported: {supported})")]
    UnknownParameter {
        /// The offending parameter name.
        name: String,
        /// Comma-separated supported names, or "none".
        supported: &'static str,
    },
    /// A parameter value is outside the algorithm's accepted range.
    #[error("parameter {name:?} must be {constraint}, got {value}")]
    InvalidValue {
        /// The offending parameter name.
        name: String,
        /// Human-readable constraint.
        constraint: &'static str,
        /// The rejected value.
        value: f64,
    },
}

/// Rejects any parameter whose name is not in `supported`; `label` is the
/// human-readable list used in the error message.
fn check_params(
    params: &Params,
    supported: &[&str],
    label: &'static str,
) -> Result<(), ConfigError> {
    for name in params.keys() {
        if !supported.contains(&name.as_str()) {
            return Err(ConfigError::UnknownParameter {
                name: name.clone(),
                supported: label,
            });
        }
    }
    Ok(())
}

// ============================================================================
// Deviation
// ============================================================================

/// Mutually reinforcing deviation scorer.
///
/// Each [`update`](ReviewGraph::update) recomputes product qualities as
/// trust-weighted means of their review scores (trust = 1 - the reviewer's
/// current anomalous score), then scores each reviewer by the mean
/// absolute deviation of its reviews from those qualities. Reviewers whose
/// ratings disagree with the trusted consensus drift toward 1; both
/// quantities stay within [0, 1].
///
/// The optional `damping` parameter in [0, 1) blends each new reviewer
/// score with the previous one.
#[derive(Debug)]
pub struct DeviationGraph {
    damping: f64,
    reviewers: Vec<Reviewer>,
    product_quality: Vec<f64>,
    /// Per reviewer: (product index, review score).
    reviews_by_reviewer: Vec<Vec<(usize, f64)>>,
    /// Per product: (reviewer index, review score).
    reviews_by_product: Vec<Vec<(usize, f64)>>,
}

impl DeviationGraph {
    /// Creates an empty graph from CLI parameters.
    pub fn new(params: &Params) -> Result<Self, ConfigError> {
        check_params(params, &["damping"], "damping")?;
        let damping = params.get("damping").copied().unwrap_or(0.0);
        if !(0.0..1.0).contains(&damping) {
            return Err(ConfigError::InvalidValue {
                name: "damping".to_string(),
                constraint: "in [0, 1)",
                value: damping,
            });
        }
        Ok(Self {
            damping,
            reviewers: Vec::new(),
            product_quality: Vec::new(),
            reviews_by_reviewer: Vec::new(),
            reviews_by_product: Vec::new(),
        })
    }
}

impl ReviewGraph for DeviationGraph {
    fn new_reviewer(&mut self, name: &str) -> ReviewerId {
        let id = ReviewerId::from_index(self.reviewers.len());
        self.reviewers.push(Reviewer {
            name: name.to_string(),
            anomalous_score: 0.0,
        });
        self.reviews_by_reviewer.push(Vec::new());
        id
    }

    fn new_product(&mut self, _name: &str) -> ProductId {
        let id = ProductId::from_index(self.product_quality.len());
        self.product_quality.push(0.0);
        self.reviews_by_product.push(Vec::new());
        id
    }

    fn add_review(&mut self, reviewer: ReviewerId, product: ProductId, score: f64) {
        self.reviews_by_reviewer[reviewer.index()].push((product.index(), score));
        self.reviews_by_product[product.index()].push((reviewer.index(), score));
    }

    fn reviewers(&self) -> Vec<Reviewer> {
        self.reviewers.clone()
    }

    fn update(&mut self) {
        // Product pass: trust-weighted mean of review scores. A product
        // whose reviewers are all fully distrusted falls back to the
        // unweighted mean.
        for (product, reviews) in self.reviews_by_product.iter().enumerate() {
            if reviews.is_empty() {
                continue;
            }
            let mut weighted = 0.0;
            let mut weight = 0.0;
            for &(reviewer, score) in reviews {
                let trust = 1.0 - self.reviewers[reviewer].anomalous_score;
                weighted += trust * score;
                weight += trust;
            }
            self.product_quality[product] = if weight > 0.0 {
                weighted / weight
            } else {
                reviews.iter().map(|&(_, s)| s).sum::<f64>() / reviews.len() as f64
            };
        }

        // Reviewer pass: mean absolute deviation from product quality.
        for (reviewer, reviews) in self.reviews_by_reviewer.iter().enumerate() {
            if reviews.is_empty() {
                continue;
            }
            let deviation = reviews
                .iter()
                .map(|&(product, score)| (score - self.product_quality[product]).abs())
                .sum::<f64>()
                / reviews.len() as f64;
            let previous = self.reviewers[reviewer].anomalous_score;
            self.reviewers[reviewer].anomalous_score =
                self.damping * previous + (1.0 - self.damping) * deviation;
        }
    }
}

// ============================================================================
// Spread
// ============================================================================

/// Single-pass rating-spread scorer.
///
/// Scores each reviewer by half the range of its review scores: a reviewer
/// rating everything identically scores 0, one swinging between 0 and 1
/// scores 0.5 and up. The score depends only on the loaded reviews, so one
/// update pass fully determines it; the registry marks this algorithm
/// single-shot and further updates recompute the same values.
#[derive(Debug, Default)]
pub struct SpreadGraph {
    reviewers: Vec<Reviewer>,
    products: usize,
    reviews_by_reviewer: Vec<Vec<f64>>,
}

impl SpreadGraph {
    /// Creates an empty graph; `spread` takes no parameters.
    pub fn new(params: &Params) -> Result<Self, ConfigError> {
        check_params(params, &[], "none")?;
        Ok(Self::default())
    }
}

impl ReviewGraph for SpreadGraph {
    fn new_reviewer(&mut self, name: &str) -> ReviewerId {
        let id = ReviewerId::from_index(self.reviewers.len());
        self.reviewers.push(Reviewer {
            name: name.to_string(),
            anomalous_score: 0.0,
        });
        self.reviews_by_reviewer.push(Vec::new());
        id
    }

    fn new_product(&mut self, _name: &str) -> ProductId {
        let id = ProductId::from_index(self.products);
        self.products += 1;
        id
    }

    fn add_review(&mut self, reviewer: ReviewerId, _product: ProductId, score: f64) {
        self.reviews_by_reviewer[reviewer.index()].push(score);
    }

    fn reviewers(&self) -> Vec<Reviewer> {
        self.reviewers.clone()
    }

    fn update(&mut self) {
        for (reviewer, scores) in self.reviews_by_reviewer.iter().enumerate() {
            let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
            for &score in scores {
                lo = lo.min(score);
                hi = hi.max(score);
            }
            self.reviewers[reviewer].anomalous_score = if scores.is_empty() {
                0.0
            } else {
                (hi - lo) / 2.0
            };
        }
    }
}
