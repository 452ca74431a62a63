//! Component model
//!
//! - **component**: leaf components with constant rates and observer hooks
//! - **voter**: M-out-of-N redundancy over a replicated element
//! - **element**: the tagged variant placed on diagram nodes
//!
//! All three expose the [`Dependability`] capability set.

mod component;
mod element;
mod voter;

pub use component::{Component, Observer};
pub use element::Element;
pub use voter::Voter;

use crate::algebra::ExpSum;
use crate::error::{DependabilityError, DependabilityResult};

/// Reliability, availability and maintainability as closed-form functions of time
pub trait Dependability {
    /// Unique name
    fn name(&self) -> &str;

    /// R(t): probability of no failure over [0, t]
    fn reliability(&self) -> ExpSum;

    /// A(t): probability of being up at t
    fn availability(&self) -> ExpSum;

    /// M(t): probability of being repaired by t
    fn maintainability(&self) -> ExpSum;

    /// `∫ R(t) dt`
    fn mttf(&self) -> DependabilityResult<f64> {
        self.reliability()
            .integral()
            .ok_or_else(|| DependabilityError::divergent("mttf"))
    }

    /// `∫ 1 - M(t) dt`
    fn mttr(&self) -> DependabilityResult<f64> {
        self.maintainability()
            .complement()
            .integral()
            .ok_or_else(|| DependabilityError::divergent("mttr"))
    }
}
