//! Model loader
//!
//! Reads a JSON description of components, voters, a block diagram and an
//! optional Markov process, and builds the corresponding live objects.

pub mod json;

pub use json::{load_model, load_models, parse_model};

use crate::error::DependabilityError;
use crate::markov::{MarkovConfig, MarkovProcess};
use crate::model::{Component, Dependability, Element, Voter};
use crate::system::{GraphConfig, ReliabilityGraph};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Analysis limits, the optional `config` block of a model file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub graph: GraphConfig,
    pub markov: MarkovConfig,
}

/// A model file as written on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Model name
    pub name: String,

    #[serde(default)]
    pub config: AnalysisConfig,

    #[serde(default)]
    pub components: Vec<ComponentSpec>,

    /// Voters, each replicating a component or an earlier voter
    #[serde(default)]
    pub voters: Vec<VoterSpec>,

    /// Edges in insertion order; `source` must come first
    #[serde(default)]
    pub diagram: Vec<EdgeSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markov: Option<MarkovSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentSpec {
    pub name: String,
    pub lambda: f64,
    #[serde(default)]
    pub mu: f64,
    #[serde(default = "default_available")]
    pub initially_available: bool,
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoterSpec {
    /// Defaults to `"{m}-out-of-{n} {component}"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Replicated element
    pub component: String,
    pub m: u32,
    pub n: u32,
    #[serde(default)]
    pub lambda: f64,
    #[serde(default)]
    pub mu: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub from: String,
    pub to: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkovSpec {
    /// Tracked components, in bit order
    pub components: Vec<String>,
    /// Sparse initial distribution; all components up when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<BTreeMap<usize, f64>>,
}

/// A loaded, ready-to-analyse model
#[derive(Debug)]
pub struct Model {
    pub name: String,
    pub config: AnalysisConfig,
    pub components: Vec<Component>,
    pub voters: Vec<Voter>,
    pub graph: ReliabilityGraph,
    pub markov: Option<MarkovProcess>,
}

impl Model {
    /// Look up a component by name
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name() == name)
    }

    /// Look up a component or voter by name
    pub fn element(&self, name: &str) -> Option<Element> {
        self.component(name)
            .map(Element::from)
            .or_else(|| self.voters.iter().find(|v| v.name() == name).map(Element::from))
    }
}

/// Model loader result
pub type LoadResult<T> = Result<T, LoadError>;

/// Model loading errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error(transparent)]
    Model(#[from] DependabilityError),
}
