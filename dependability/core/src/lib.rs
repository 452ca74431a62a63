//! Dependability Core
//!
//! Reliability, availability and maintainability of repairable systems,
//! from closed-form block diagrams and from Markov chains

pub mod algebra; // Exponential sums and binomials
pub mod error;
pub mod loader;  // JSON model files
pub mod markov;  // Generator matrices and the matrix exponential
pub mod model;   // Components, voters and the Dependability trait
pub mod system;  // Reliability block diagrams, metrics and minimal cuts

pub use algebra::{ExpSum, ExpTerm};
pub use error::{DependabilityError, DependabilityResult};
pub use loader::{
    load_model, parse_model, AnalysisConfig, LoadError, LoadResult, Model, ModelSpec,
};
pub use markov::{InitialDistribution, MarkovConfig, MarkovProcess, StatePredicate, Transition};
pub use model::{Component, Dependability, Element, Observer, Voter};
pub use system::{GraphConfig, Metric, MinimalCut, Node, ReliabilityGraph, Successors};
