//! Ranking-quality evaluation against the planted ground truth.
//!
//! Ground-truth anomaly labels are encoded in reviewer names (see
//! [`labels`]); the metrics in [`metrics`] measure how well an algorithm's
//! anomalous scores recover them:
//!
//! | Report | Question it answers |
//! |--------|---------------------|
//! | Threshold sweep | Confusion counts as the decision cutoff moves over [0, 1] |
//! | Ranking report | Per-class precision of the top-57 ranking, per iteration |
//! | nDCG report | Position-weighted ranking quality for each top-k cut |

pub mod labels;
pub mod metrics;

pub use labels::{classify, AnomalousCounts, AnomalyClass};
pub use metrics::{
    auc, dcg, ideal_dcg, ndcg_report, ranking_report, roc_points, threshold_sweep, DcgRecord,
    RankingRecord, RocPoint, ThresholdRecord,
};
