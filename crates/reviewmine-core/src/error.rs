//! Error types for reviewmine-core.
//!
//! Loading errors and metric errors are kept as separate types so callers
//! can tell "the dataset is malformed" apart from "the metric is undefined
//! for this collection".

use crate::evaluation::labels::AnomalyClass;
use thiserror::Error;

/// Errors that can occur while loading the synthetic dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Failed to open or read a dataset table.
    #[error("failed to read {file}: {source}")]
    Io {
        /// Path of the table being read.
        file: String,
        #[source]
        source: std::io::Error,
    },
    /// A record did not match the expected table format. Carries the raw
    /// line so the offending input can be located.
    #[error("{file}:{line}: {reason}: {raw:?}")]
    InvalidRecord {
        /// Table file name.
        file: String,
        /// 1-based line number.
        line: usize,
        /// What was wrong with the record.
        reason: String,
        /// The offending line, verbatim.
        raw: String,
    },
    /// A review referenced a reviewer id that was never declared.
    ///
    /// Only raised under [`UnknownRefPolicy::Fail`](crate::dataset::UnknownRefPolicy);
    /// the default loader skips such records.
    #[error("{file}:{line}: review references unknown reviewer id {id:?}")]
    UnknownReviewer {
        /// Table file name.
        file: String,
        /// 1-based line number.
        line: usize,
        /// The dangling reviewer id.
        id: String,
    },
    /// A review referenced a product id that was never declared.
    #[error("{file}:{line}: review references unknown product id {id:?}")]
    UnknownProduct {
        /// Table file name.
        file: String,
        /// 1-based line number.
        line: usize,
        /// The dangling product id.
        id: String,
    },
}

/// Errors that can occur during metric computation.
///
/// These signal a degenerate metric (an undefined division), which points
/// at a dataset/label mismatch rather than a legitimate zero score.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricError {
    /// A per-class precision denominator was zero: the collection contains
    /// no reviewers of the given anomaly class.
    #[error("collection contains no {0} reviewers; precision is undefined")]
    EmptyClass(AnomalyClass),
    /// The collection contains no normal reviewers, so a false positive
    /// rate cannot be computed.
    #[error("collection contains no normal reviewers; false positive rate is undefined")]
    NoNormalReviewers,
}
