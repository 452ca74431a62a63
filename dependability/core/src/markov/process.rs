//! Continuous-time Markov chains over binary component states
//!
//! State `i` encodes one bit per component: component `k` is bit `N-1-k`,
//! a set bit meaning the component is down. State 0 is therefore "all up".
//! Rates are read once, when the process is built.

use super::expm::expm;
use crate::error::{DependabilityError, DependabilityResult};
use crate::model::{Component, Dependability, Element};
use log::{debug, warn};
use ndarray::{Array2, ArrayView1};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Markov analysis configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkovConfig {
    /// Most components a process may track (2^n states)
    pub max_components: usize,
}

impl Default for MarkovConfig {
    fn default() -> Self {
        Self { max_components: 10 }
    }
}

/// Probability distribution over states at t = 0
#[derive(Debug, Clone, PartialEq)]
pub enum InitialDistribution {
    /// One probability per state
    Dense(Vec<f64>),
    /// `(state, probability)` pairs, every other state has probability 0
    Sparse(Vec<(usize, f64)>),
}

impl InitialDistribution {
    /// Every component up with certainty
    pub fn all_up() -> Self {
        InitialDistribution::Sparse(vec![(0, 1.0)])
    }

    fn into_dense(self, states: usize) -> DependabilityResult<Vec<f64>> {
        let dense = match self {
            InitialDistribution::Dense(values) => {
                if values.len() != states {
                    return Err(DependabilityError::InvalidArgument(format!(
                        "initial distribution has {} entries, expected {}",
                        values.len(),
                        states
                    )));
                }
                values
            }
            InitialDistribution::Sparse(entries) => {
                let mut values = vec![0.0; states];
                for (state, probability) in entries {
                    let slot = values.get_mut(state).ok_or_else(|| {
                        DependabilityError::InvalidArgument(format!(
                            "initial state {} out of range 0..{}",
                            state, states
                        ))
                    })?;
                    *slot += probability;
                }
                values
            }
        };

        if let Some(bad) = dense.iter().find(|p| !p.is_finite() || **p < 0.0) {
            return Err(DependabilityError::InvalidArgument(format!(
                "initial probability {} is not a finite non-negative number",
                bad
            )));
        }
        let total: f64 = dense.iter().sum();
        if (total - 1.0).abs() > 1e-9 {
            warn!("initial distribution sums to {}, not 1", total);
        }
        Ok(dense)
    }
}

impl Default for InitialDistribution {
    fn default() -> Self {
        Self::all_up()
    }
}

static NEXT_PREDICATE_ID: AtomicU64 = AtomicU64::new(0);

/// A test over component up/down vectors, identified by instance
///
/// `up[k]` is true when the k-th component of the process works. Clones
/// share the identity, so the selected states are computed once per process.
#[derive(Clone)]
pub struct StatePredicate {
    id: u64,
    test: Arc<dyn Fn(&[bool]) -> bool + Send + Sync>,
}

impl StatePredicate {
    pub fn new(test: impl Fn(&[bool]) -> bool + Send + Sync + 'static) -> Self {
        Self {
            id: NEXT_PREDICATE_ID.fetch_add(1, Ordering::Relaxed),
            test: Arc::new(test),
        }
    }

    /// "System works": some success path has all of its components up
    ///
    /// Every element on the paths must be a plain component of `components`.
    pub fn from_success_paths(
        paths: &[Vec<Element>],
        components: &[Component],
    ) -> DependabilityResult<Self> {
        let mut indexed: Vec<Vec<usize>> = Vec::with_capacity(paths.len());
        for path in paths {
            let mut indices = Vec::with_capacity(path.len());
            for element in path {
                let position = element
                    .as_component()
                    .and_then(|c| components.iter().position(|other| other.same(c)))
                    .ok_or_else(|| {
                        DependabilityError::InvalidArgument(format!(
                            "{} is not a component of the process",
                            element.name()
                        ))
                    })?;
                indices.push(position);
            }
            indexed.push(indices);
        }

        Ok(Self::new(move |up| {
            indexed
                .iter()
                .any(|path| path.iter().all(|&k| up.get(k).copied().unwrap_or(false)))
        }))
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn matches(&self, up: &[bool]) -> bool {
        (self.test)(up)
    }
}

impl fmt::Debug for StatePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatePredicate").field("id", &self.id).finish()
    }
}

/// A non-zero off-diagonal generator entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub from: usize,
    pub to: usize,
    pub rate: f64,
}

/// Markov model of a fixed tuple of repairable components
pub struct MarkovProcess {
    components: Vec<Component>,
    generator: Array2<f64>,
    initial: Vec<f64>,
    states: Mutex<FxHashMap<u64, Arc<Vec<usize>>>>,
}

impl MarkovProcess {
    pub fn new(
        components: Vec<Component>,
        initial: InitialDistribution,
    ) -> DependabilityResult<Self> {
        Self::with_config(components, initial, MarkovConfig::default())
    }

    pub fn with_config(
        components: Vec<Component>,
        initial: InitialDistribution,
        config: MarkovConfig,
    ) -> DependabilityResult<Self> {
        let n = components.len();
        if n > config.max_components {
            return Err(DependabilityError::StateSpaceTooLarge {
                components: n,
                limit: config.max_components,
            });
        }
        let size = 1usize << n;
        let initial = initial.into_dense(size)?;

        let mut generator = Array2::<f64>::zeros((size, size));
        for (k, component) in components.iter().enumerate() {
            let bit = 1usize << (n - 1 - k);
            let (lambda, mu) = (component.lambda(), component.mu());
            for i in (0..size).filter(|i| i & bit == 0) {
                let j = i | bit;
                generator[[i, j]] = lambda;
                generator[[j, i]] = mu;
            }
        }
        // Diagonal is still zero here, so the row sum is the outflow.
        for (i, mut row) in generator.rows_mut().into_iter().enumerate() {
            let outflow = row.sum();
            row[i] = -outflow;
        }

        debug!("built {}-state Markov process over {} component(s)", size, n);
        Ok(Self {
            components,
            generator,
            initial,
            states: Mutex::new(FxHashMap::default()),
        })
    }

    /// The tracked components, in bit order
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Number of states, `2^N`
    pub fn state_count(&self) -> usize {
        self.generator.nrows()
    }

    pub fn generator(&self) -> &Array2<f64> {
        &self.generator
    }

    pub fn initial(&self) -> &[f64] {
        &self.initial
    }

    /// Up/down vector of a state, true meaning up
    pub fn state(&self, index: usize) -> Vec<bool> {
        let n = self.components.len();
        (0..n).map(|k| index & (1 << (n - 1 - k)) == 0).collect()
    }

    /// Bit string of a state, `1` for an up component, component 0 first
    pub fn state_label(&self, index: usize) -> String {
        self.state(index)
            .into_iter()
            .map(|up| if up { '1' } else { '0' })
            .collect()
    }

    /// Off-diagonal non-zero generator entries, row by row
    pub fn transitions(&self) -> Vec<Transition> {
        self.generator
            .indexed_iter()
            .filter(|&((from, to), &rate)| from != to && rate != 0.0)
            .map(|((from, to), &rate)| Transition { from, to, rate })
            .collect()
    }

    /// State probabilities `p(t) = p(0) · exp(t·M)`
    pub fn distribution(&self, t: f64) -> DependabilityResult<Vec<f64>> {
        if !t.is_finite() || t < 0.0 {
            return Err(DependabilityError::InvalidArgument(format!(
                "time must be finite and non-negative, got {}",
                t
            )));
        }
        let transition = expm(&self.generator.mapv(|rate| rate * t))?;
        Ok(ArrayView1::from(&self.initial[..]).dot(&transition).to_vec())
    }

    /// Probability, at `t`, of being in a state selected by `predicate`
    pub fn value(&self, t: f64, predicate: &StatePredicate) -> DependabilityResult<f64> {
        let distribution = self.distribution(t)?;
        let states = self.states_matching(predicate);
        Ok(states.iter().map(|&i| distribution[i]).sum())
    }

    /// Indices of the states selected by `predicate`, cached per predicate
    pub fn states_matching(&self, predicate: &StatePredicate) -> Arc<Vec<usize>> {
        let mut cache = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        cache
            .entry(predicate.id())
            .or_insert_with(|| {
                Arc::new(
                    (0..self.state_count())
                        .filter(|&i| predicate.matches(&self.state(i)))
                        .collect(),
                )
            })
            .clone()
    }
}

impl fmt::Debug for MarkovProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.components.iter().map(|c| c.name()).collect();
        f.debug_struct("MarkovProcess")
            .field("components", &names)
            .field("states", &self.state_count())
            .finish()
    }
}
