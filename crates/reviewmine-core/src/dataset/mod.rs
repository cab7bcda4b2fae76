//! Loader for the synthetic review dataset.
//!
//! The dataset is three line-oriented tables with space-separated fields
//! and no header row, all in one directory:
//!
//! ```text
//! reviewer.dat    <external_id> <name>
//! product.dat     <external_id> <name>
//! review.dat      <reviewer_id> <product_id> <raw_score 0-5>
//! ```
//!
//! [`load`] reads the tables in that order and populates a caller-owned
//! [`ReviewGraph`] in place. Raw review scores are normalized by dividing
//! by 5. External ids exist only to join the tables; they are forgotten
//! once the load returns.
//!
//! A review referencing an id that was never declared is skipped by
//! default, matching the historical loader behavior; use
//! [`load_with_policy`] with [`UnknownRefPolicy::Fail`] to make dangling
//! references fatal instead. Malformed lines always fail the load, and the
//! error carries the offending raw line.
//!
//! The loader has no side effects beyond calls into the supplied graph: it
//! never logs, prints, or writes. Each table file is opened, fully
//! consumed, and closed before the next is opened.

use crate::error::DatasetError;
use crate::graph::{ProductId, ReviewGraph, ReviewerId};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Reviewer table file name.
pub const REVIEWER_FILE: &str = "reviewer.dat";
/// Product table file name.
pub const PRODUCT_FILE: &str = "product.dat";
/// Review table file name.
pub const REVIEW_FILE: &str = "review.dat";

/// How the loader treats a review whose reviewer or product id is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownRefPolicy {
    /// Skip the record silently. This is the default and matches the
    /// historical loader.
    #[default]
    Skip,
    /// Fail the load with [`DatasetError::UnknownReviewer`] or
    /// [`DatasetError::UnknownProduct`].
    Fail,
}

/// Loads the dataset from `data_dir` into `graph`, skipping reviews with
/// unknown reviewer or product ids.
pub fn load<G>(graph: &mut G, data_dir: &Path) -> Result<(), DatasetError>
where
    G: ReviewGraph + ?Sized,
{
    load_with_policy(graph, data_dir, UnknownRefPolicy::Skip)
}

/// Loads the dataset from `data_dir` into `graph` with an explicit
/// unknown-reference policy.
pub fn load_with_policy<G>(
    graph: &mut G,
    data_dir: &Path,
    policy: UnknownRefPolicy,
) -> Result<(), DatasetError>
where
    G: ReviewGraph + ?Sized,
{
    let reviewers = load_entities(data_dir, REVIEWER_FILE, |name| graph.new_reviewer(name))?;
    let products = load_entities(data_dir, PRODUCT_FILE, |name| graph.new_product(name))?;
    load_reviews(graph, data_dir, &reviewers, &products, policy)
}

/// Reads a two-column entity table, creating one entity per record and
/// returning the external id to handle mapping.
fn load_entities<H>(
    data_dir: &Path,
    file: &str,
    mut create: impl FnMut(&str) -> H,
) -> Result<HashMap<String, H>, DatasetError> {
    let mut handles = HashMap::new();
    for record in read_table(data_dir, file)? {
        let (line_no, line) = record.map_err(|source| DatasetError::Io {
            file: file.to_string(),
            source,
        })?;
        let mut fields = line.split_whitespace();
        match (fields.next(), fields.next(), fields.next()) {
            (Some(id), Some(name), None) => {
                handles.insert(id.to_string(), create(name));
            }
            _ => {
                return Err(DatasetError::InvalidRecord {
                    file: file.to_string(),
                    line: line_no,
                    reason: "expected 2 fields (id, name)".to_string(),
                    raw: line,
                });
            }
        }
    }
    Ok(handles)
}

/// Reads the review table and adds one edge per record, normalizing the
/// raw 0-5 score by dividing by 5.
fn load_reviews<G>(
    graph: &mut G,
    data_dir: &Path,
    reviewers: &HashMap<String, ReviewerId>,
    products: &HashMap<String, ProductId>,
    policy: UnknownRefPolicy,
) -> Result<(), DatasetError>
where
    G: ReviewGraph + ?Sized,
{
    for record in read_table(data_dir, REVIEW_FILE)? {
        let (line_no, line) = record.map_err(|source| DatasetError::Io {
            file: REVIEW_FILE.to_string(),
            source,
        })?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [reviewer_id, product_id, raw_score] = fields[..] else {
            return Err(DatasetError::InvalidRecord {
                file: REVIEW_FILE.to_string(),
                line: line_no,
                reason: format!(
                    "expected 3 fields (reviewer, product, score), got {}",
                    fields.len()
                ),
                raw: line,
            });
        };

        let score: f64 = raw_score.parse().map_err(|_| DatasetError::InvalidRecord {
            file: REVIEW_FILE.to_string(),
            line: line_no,
            reason: format!("non-numeric score {raw_score:?}"),
            raw: line.clone(),
        })?;

        let (reviewer, product) = match (reviewers.get(reviewer_id), products.get(product_id)) {
            (Some(&reviewer), Some(&product)) => (reviewer, product),
            (None, _) if policy == UnknownRefPolicy::Fail => {
                return Err(DatasetError::UnknownReviewer {
                    file: REVIEW_FILE.to_string(),
                    line: line_no,
                    id: reviewer_id.to_string(),
                });
            }
            (_, None) if policy == UnknownRefPolicy::Fail => {
                return Err(DatasetError::UnknownProduct {
                    file: REVIEW_FILE.to_string(),
                    line: line_no,
                    id: product_id.to_string(),
                });
            }
            _ => continue,
        };

        graph.add_review(reviewer, product, score / 5.0);
    }
    Ok(())
}

/// Opens a table and yields its non-empty lines with 1-based line numbers.
///
/// The file handle lives only as long as the returned iterator, so each
/// table is closed before the next one is opened.
fn read_table(
    data_dir: &Path,
    file: &str,
) -> Result<impl Iterator<Item = std::io::Result<(usize, String)>>, DatasetError> {
    let path = data_dir.join(file);
    let handle = File::open(&path).map_err(|source| DatasetError::Io {
        file: path.display().to_string(),
        source,
    })?;
    Ok(BufReader::new(handle)
        .lines()
        .enumerate()
        .map(|(i, line)| line.map(|l| (i + 1, l)))
        .filter(|record| !matches!(record, Ok((_, line)) if line.trim().is_empty())))
}
