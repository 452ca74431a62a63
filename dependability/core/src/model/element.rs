//! Diagram elements: a leaf component or a voter

use super::{Component, Dependability, Voter};
use crate::algebra::ExpSum;
use crate::error::DependabilityResult;
use std::fmt;

/// Anything that can sit on a node of a reliability diagram
#[derive(Debug, Clone)]
pub enum Element {
    Leaf(Component),
    Voter(Voter),
}

impl Element {
    /// Every component whose rates feed this element's metrics
    ///
    /// For a voter this is its own component followed by the replica's
    /// components, recursively.
    pub fn components(&self) -> Vec<Component> {
        match self {
            Element::Leaf(component) => vec![component.clone()],
            Element::Voter(voter) => {
                let mut components = vec![voter.own().clone()];
                components.extend(voter.replica().components());
                components
            }
        }
    }

    /// Whether two elements are backed by the same component handle
    pub fn same(&self, other: &Element) -> bool {
        match (self, other) {
            (Element::Leaf(a), Element::Leaf(b)) => a.same(b),
            (Element::Voter(a), Element::Voter(b)) => a.own().same(b.own()),
            _ => false,
        }
    }

    /// The leaf component, if this element is one
    pub fn as_component(&self) -> Option<&Component> {
        match self {
            Element::Leaf(component) => Some(component),
            Element::Voter(_) => None,
        }
    }
}

impl Dependability for Element {
    fn name(&self) -> &str {
        match self {
            Element::Leaf(c) => Dependability::name(c),
            Element::Voter(v) => v.name(),
        }
    }

    fn reliability(&self) -> ExpSum {
        match self {
            Element::Leaf(c) => c.reliability(),
            Element::Voter(v) => v.reliability(),
        }
    }

    fn availability(&self) -> ExpSum {
        match self {
            Element::Leaf(c) => c.availability(),
            Element::Voter(v) => v.availability(),
        }
    }

    fn maintainability(&self) -> ExpSum {
        match self {
            Element::Leaf(c) => c.maintainability(),
            Element::Voter(v) => v.maintainability(),
        }
    }

    fn mttf(&self) -> DependabilityResult<f64> {
        match self {
            Element::Leaf(c) => c.mttf(),
            Element::Voter(v) => v.mttf(),
        }
    }

    fn mttr(&self) -> DependabilityResult<f64> {
        match self {
            Element::Leaf(c) => c.mttr(),
            Element::Voter(v) => v.mttr(),
        }
    }
}

impl From<Component> for Element {
    fn from(component: Component) -> Self {
        Element::Leaf(component)
    }
}

impl From<&Component> for Element {
    fn from(component: &Component) -> Self {
        Element::Leaf(component.clone())
    }
}

impl From<Voter> for Element {
    fn from(voter: Voter) -> Self {
        Element::Voter(voter)
    }
}

impl From<&Voter> for Element {
    fn from(voter: &Voter) -> Self {
        Element::Voter(voter.clone())
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
