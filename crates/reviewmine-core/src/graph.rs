//! The review graph capability contract.
//!
//! Detection algorithms are consumed through the [`ReviewGraph`] trait:
//! the loader populates a graph with reviewers, products, and reviews, the
//! driver calls [`ReviewGraph::update`] some number of times, and the
//! metrics engine reads back scored [`Reviewer`] snapshots. Nothing in this
//! crate depends on how an algorithm stores the bipartite graph or computes
//! its scores.
//!
//! [`MemoryGraph`] is a minimal implementation with a no-op update. It is
//! used by this crate's tests and works as a scaffold for algorithm
//! authors.

use std::collections::HashMap;

/// Opaque handle to a reviewer created via [`ReviewGraph::new_reviewer`].
///
/// Handles are only meaningful for the graph instance that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReviewerId(usize);

impl ReviewerId {
    /// Creates a handle from a graph-internal index.
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Returns the graph-internal index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Opaque handle to a product created via [`ReviewGraph::new_product`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProductId(usize);

impl ProductId {
    /// Creates a handle from a graph-internal index.
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Returns the graph-internal index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Snapshot of a reviewer's state as exposed by a graph.
///
/// The name encodes the ground-truth anomaly label (see
/// [`evaluation::labels`](crate::evaluation::labels)); the anomalous score
/// is whatever the algorithm has computed so far, with semantics defined by
/// the algorithm itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Reviewer {
    /// Display name, fixed at load time.
    pub name: String,
    /// Current anomalous degree assigned by the algorithm.
    pub anomalous_score: f64,
}

/// Capability contract a detection algorithm's graph must provide.
///
/// The loader calls the three construction methods exactly once per input
/// record; handles are remembered only for the duration of the load.
pub trait ReviewGraph {
    /// Creates a reviewer and returns its handle.
    fn new_reviewer(&mut self, name: &str) -> ReviewerId;

    /// Creates a product and returns its handle.
    fn new_product(&mut self, name: &str) -> ProductId;

    /// Adds a review edge with a normalized score.
    ///
    /// Duplicate (reviewer, product) pairs may occur in the source data;
    /// implementations that key reviews uniquely must document their
    /// overwrite behavior.
    fn add_review(&mut self, reviewer: ReviewerId, product: ProductId, score: f64);

    /// Returns a snapshot of every reviewer with its current score.
    fn reviewers(&self) -> Vec<Reviewer>;

    /// Advances the algorithm's internal state by one iteration.
    fn update(&mut self);
}

/// Plain in-memory bipartite graph with a no-op [`update`](ReviewGraph::update).
///
/// Reviews are keyed by (reviewer, product); when the source data contains
/// duplicate pairs, the last review wins.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    reviewers: Vec<Reviewer>,
    products: Vec<String>,
    reviews: HashMap<(ReviewerId, ProductId), f64>,
}

impl MemoryGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of products in the graph.
    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    /// Number of distinct (reviewer, product) review edges.
    pub fn review_count(&self) -> usize {
        self.reviews.len()
    }

    /// Score of the review between the given pair, if one exists.
    pub fn review_score(&self, reviewer: ReviewerId, product: ProductId) -> Option<f64> {
        self.reviews.get(&(reviewer, product)).copied()
    }

    /// Mutable access to the stored reviewers, for assigning scores.
    pub fn reviewers_mut(&mut self) -> impl Iterator<Item = &mut Reviewer> {
        self.reviewers.iter_mut()
    }
}

impl ReviewGraph for MemoryGraph {
    fn new_reviewer(&mut self, name: &str) -> ReviewerId {
        let id = ReviewerId::from_index(self.reviewers.len());
        self.reviewers.push(Reviewer {
            name: name.to_string(),
            anomalous_score: 0.0,
        });
        id
    }

    fn new_product(&mut self, name: &str) -> ProductId {
        let id = ProductId::from_index(self.products.len());
        self.products.push(name.to_string());
        id
    }

    fn add_review(&mut self, reviewer: ReviewerId, product: ProductId, score: f64) {
        self.reviews.insert((reviewer, product), score);
    }

    fn reviewers(&self) -> Vec<Reviewer> {
        self.reviewers.clone()
    }

    fn update(&mut self) {}
}
