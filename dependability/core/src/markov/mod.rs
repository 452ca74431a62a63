//! Markov analysis
//!
//! - **lu**: LU solves with partial pivoting
//! - **expm**: Padé scaling-and-squaring matrix exponential
//! - **process**: generator construction, transient probabilities, predicates

mod expm;
mod lu;
mod process;

pub use expm::expm;
pub use lu::solve;
pub use process::{InitialDistribution, MarkovConfig, MarkovProcess, StatePredicate, Transition};
