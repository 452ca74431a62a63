//! System-level metrics by inclusion–exclusion over success paths
//!
//! `F_sys = Σ_{∅≠S⊆paths} (-1)^(|S|+1) · Π_{e ∈ ∪S} f_e`
//!
//! Subsets are folded path by path into a map from component union to its
//! signed multiplicity, so every distinct union is multiplied out once.

use super::cache::{Cached, Metric};
use super::graph::ReliabilityGraph;
use crate::algebra::ExpSum;
use crate::error::{DependabilityError, DependabilityResult};
use crate::model::{Dependability, Element};
use log::debug;
use rustc_hash::FxHashMap;

/// Set of element indices, one bit per distinct element
type Union = Vec<u64>;

fn union_with(a: &Union, b: &Union) -> Union {
    a.iter().zip(b).map(|(x, y)| x | y).collect()
}

fn members(union: &Union) -> impl Iterator<Item = usize> + '_ {
    union.iter().enumerate().flat_map(|(word, bits)| {
        (0..64).filter_map(move |bit| (bits & (1u64 << bit) != 0).then_some(word * 64 + bit))
    })
}

/// Signed multiplicity of each component union over all non-empty path subsets
fn union_coefficients(path_unions: &[Union]) -> FxHashMap<Union, i64> {
    let mut coefficients: FxHashMap<Union, i64> = FxHashMap::default();
    for path in path_unions {
        let mut next = coefficients.clone();
        for (union, coefficient) in &coefficients {
            *next.entry(union_with(union, path)).or_insert(0) -= coefficient;
        }
        *next.entry(path.clone()).or_insert(0) += 1;
        next.retain(|_, coefficient| *coefficient != 0);
        coefficients = next;
    }
    coefficients
}

impl ReliabilityGraph {
    /// System reliability R(t)
    pub fn reliability(&self) -> DependabilityResult<ExpSum> {
        self.formula(Metric::Reliability, Element::reliability)
    }

    /// System availability A(t)
    pub fn availability(&self) -> DependabilityResult<ExpSum> {
        self.formula(Metric::Availability, Element::availability)
    }

    /// System maintainability M(t)
    pub fn maintainability(&self) -> DependabilityResult<ExpSum> {
        self.formula(Metric::Maintainability, Element::maintainability)
    }

    /// Mean time to failure, `∫ R(t) dt`
    pub fn mttf(&self) -> DependabilityResult<f64> {
        self.value(Metric::Mttf, |graph| {
            graph
                .reliability()?
                .integral()
                .ok_or_else(|| DependabilityError::divergent("mttf"))
        })
    }

    /// Mean time to repair, `∫ 1 - M(t) dt`
    pub fn mttr(&self) -> DependabilityResult<f64> {
        self.value(Metric::Mttr, |graph| {
            graph
                .maintainability()?
                .complement()
                .integral()
                .ok_or_else(|| DependabilityError::divergent("mttr"))
        })
    }

    fn formula(
        &self,
        metric: Metric,
        element_metric: fn(&Element) -> ExpSum,
    ) -> DependabilityResult<ExpSum> {
        if let Some(Cached::Formula(formula)) = self.cache.get(metric) {
            return Ok(formula);
        }

        let generation = self.cache.generation();
        let formula = self.inclusion_exclusion(metric, element_metric)?;
        self.cache
            .insert(metric, Cached::Formula(formula.clone()), generation);
        Ok(formula)
    }

    fn value(
        &self,
        metric: Metric,
        compute: impl FnOnce(&Self) -> DependabilityResult<f64>,
    ) -> DependabilityResult<f64> {
        if let Some(Cached::Value(value)) = self.cache.get(metric) {
            return Ok(value);
        }

        let generation = self.cache.generation();
        let value = compute(self)?;
        self.cache.insert(metric, Cached::Value(value), generation);
        Ok(value)
    }

    fn inclusion_exclusion(
        &self,
        metric: Metric,
        element_metric: fn(&Element) -> ExpSum,
    ) -> DependabilityResult<ExpSum> {
        let paths = self.success_paths_shared();
        let limit = self.config.max_paths;
        if paths.len() > limit {
            return Err(DependabilityError::PathLimitExceeded {
                paths: paths.len(),
                limit,
            });
        }
        if paths.is_empty() {
            return Ok(ExpSum::zero());
        }

        // One formula per distinct element.
        let mut index: FxHashMap<&str, usize> = FxHashMap::default();
        let mut formulas: Vec<ExpSum> = Vec::new();
        for element in paths.iter().flatten() {
            if !index.contains_key(element.name()) {
                index.insert(element.name(), formulas.len());
                formulas.push(element_metric(element));
            }
        }

        let words = formulas.len().div_ceil(64).max(1);
        let path_unions: Vec<Union> = paths
            .iter()
            .map(|path| {
                let mut union = vec![0u64; words];
                for element in path {
                    if let Some(&i) = index.get(element.name()) {
                        union[i / 64] |= 1u64 << (i % 64);
                    }
                }
                union
            })
            .collect();

        let coefficients = union_coefficients(&path_unions);
        debug!(
            "{}: {} path(s), {} distinct element(s), {} surviving union(s)",
            metric.as_str(),
            paths.len(),
            formulas.len(),
            coefficients.len()
        );

        let mut total = ExpSum::zero();
        for (union, coefficient) in &coefficients {
            let product: ExpSum = members(union).map(|i| &formulas[i]).product();
            total = total + product.scale(*coefficient as f64);
        }
        Ok(total)
    }
}
