//! # Reviewmine Core
//!
//! Evaluation engine for graph-based review fraud detection algorithms.
//!
//! A detection algorithm is modeled as a bipartite review graph that scores
//! each reviewer with an *anomalous degree*. This crate loads the synthetic
//! labeled dataset into such a graph and measures how well the resulting
//! scores recover the planted anomalous reviewers.
//!
//! ## Modules
//!
//! - [`graph`] - The [`ReviewGraph`] capability contract algorithms implement
//! - [`dataset`] - Loader for the three-table synthetic dataset
//! - [`evaluation`] - Label classification and ranking-quality metrics
//! - [`config`] - Dataset contract constants
//! - [`error`] - Error types for loading and metric computation
//!
//! ## Example
//!
//! ```
//! use reviewmine_core::evaluation::metrics::{dcg, ideal_dcg};
//! use reviewmine_core::graph::Reviewer;
//!
//! let reviewers = vec![
//!     Reviewer { name: "anomaly7".into(), anomalous_score: 0.9 },
//!     Reviewer { name: "alice".into(), anomalous_score: 0.2 },
//! ];
//!
//! let ndcg = dcg(&reviewers, 2) / ideal_dcg(2);
//! assert!(ndcg > 0.0 && ndcg <= 1.0);
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod graph;

pub use config::ANOMALOUS_REVIEWER_SIZE;
pub use error::{DatasetError, MetricError};
pub use graph::{MemoryGraph, ProductId, ReviewGraph, Reviewer, ReviewerId};
