//! Reliability block diagrams
//!
//! - **graph**: topology, observer wiring, path search and edge export
//! - **metrics**: inclusion–exclusion formulas and their integrals
//! - **cuts**: minimal cut sets
//! - **cache**: the per-graph memo cleared on every mutation

mod cache;
mod cuts;
mod graph;
mod metrics;
mod node;

pub use cache::Metric;
pub use cuts::MinimalCut;
pub use graph::ReliabilityGraph;
pub use node::{Node, Successors, SINK_LABEL, SOURCE_LABEL};

use serde::{Deserialize, Serialize};

/// Graph analysis configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Most success paths inclusion–exclusion will expand (2^n - 1 subsets)
    pub max_paths: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self { max_paths: 24 }
    }
}
