//! Registry of installed detection algorithms.
//!
//! Each algorithm is a string key mapped to a constructor producing a boxed
//! [`ReviewGraph`]. An algorithm that is not built into this binary simply
//! has no key; callers list the installed keys in their error messages.
//!
//! Single-pass scorers converge after one update, so their entries carry
//! the `single_shot` flag and [`AlgorithmEntry::effective_loops`] clamps
//! the requested iteration count to 1 for them.

use crate::algorithms::{ConfigError, DeviationGraph, Params, SpreadGraph};
use reviewmine_core::graph::ReviewGraph;
use std::collections::BTreeMap;

/// Constructs an algorithm graph from CLI parameters.
pub type GraphConstructor = fn(&Params) -> Result<Box<dyn ReviewGraph>, ConfigError>;

/// One installed algorithm.
pub struct AlgorithmEntry {
    /// Builds an empty, unloaded graph.
    pub constructor: GraphConstructor,
    /// Whether the algorithm runs exactly one iteration regardless of the
    /// requested loop count.
    pub single_shot: bool,
}

impl AlgorithmEntry {
    /// Resolves the requested loop count against the single-shot flag.
    pub fn effective_loops(&self, requested: usize) -> usize {
        if self.single_shot {
            1
        } else {
            requested
        }
    }
}

/// Returns the table of algorithms built into this binary, keyed by the
/// name used on the command line.
pub fn installed_algorithms() -> BTreeMap<&'static str, AlgorithmEntry> {
    let mut algorithms = BTreeMap::new();
    algorithms.insert(
        "deviation",
        AlgorithmEntry {
            constructor: |params| {
                DeviationGraph::new(params).map(|g| Box::new(g) as Box<dyn ReviewGraph>)
            },
            single_shot: false,
        },
    );
    algorithms.insert(
        "spread",
        AlgorithmEntry {
            constructor: |params| {
                SpreadGraph::new(params).map(|g| Box::new(g) as Box<dyn ReviewGraph>)
            },
            single_shot: true,
        },
    );
    algorithms
}
