//! Minimal cut sets
//!
//! Columns of the path × element incidence matrix are grouped into
//! k-combinations for k = 1..=order. A group is a cut when every success
//! path goes through at least one of its members. Elements that are cuts on
//! their own leave the candidate set, and groups containing an already found
//! cut are skipped, so every reported cut is minimal.

use super::graph::ReliabilityGraph;
use crate::model::{Dependability, Element};
use log::debug;
use rustc_hash::FxHashSet;
use std::fmt;

/// A set of elements whose simultaneous failure fails the system
#[derive(Debug, Clone)]
pub struct MinimalCut {
    elements: Vec<Element>,
}

impl MinimalCut {
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn names(&self) -> Vec<&str> {
        self.elements.iter().map(Element::name).collect()
    }

    /// Order of the cut
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.elements.iter().any(|e| e.name() == name)
    }
}

impl fmt::Display for MinimalCut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.names().join(", "))
    }
}

/// Lexicographic k-combinations of `0..n`
fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    let mut result = Vec::new();
    if k == 0 || k > n {
        return result;
    }
    let mut current: Vec<usize> = (0..k).collect();
    loop {
        result.push(current.clone());

        // Rightmost position that can still move forward.
        let Some(i) = (0..k).rev().find(|&i| current[i] < n - k + i) else {
            return result;
        };
        current[i] += 1;
        for j in i + 1..k {
            current[j] = current[j - 1] + 1;
        }
    }
}

impl ReliabilityGraph {
    /// All minimal cuts of order at most `order`
    ///
    /// Order 0 yields no cut. A graph without any success path is failed by
    /// every element alone.
    pub fn minimal_cuts(&self, order: usize) -> Vec<MinimalCut> {
        let paths = self.success_paths_shared();
        let columns = self.components();

        // incidence[p] = set of column indices lying on path p
        let incidence: Vec<FxHashSet<usize>> = paths
            .iter()
            .map(|path| {
                columns
                    .iter()
                    .enumerate()
                    .filter(|(_, column)| path.iter().any(|e| e.same(column)))
                    .map(|(i, _)| i)
                    .collect()
            })
            .collect();
        let covers = |group: &[usize]| {
            incidence
                .iter()
                .all(|on_path| group.iter().any(|i| on_path.contains(i)))
        };

        let mut remaining: Vec<usize> = (0..columns.len()).collect();
        let mut found: Vec<Vec<usize>> = Vec::new();

        for k in 1..=order {
            if remaining.len() < k {
                break;
            }

            let mut new_cuts = Vec::new();
            for combination in combinations(remaining.len(), k) {
                let group: Vec<usize> = combination.iter().map(|&i| remaining[i]).collect();
                let subsumed = found
                    .iter()
                    .any(|cut| cut.iter().all(|member| group.contains(member)));
                if !subsumed && covers(&group) {
                    new_cuts.push(group);
                }
            }

            if k == 1 {
                let singles: FxHashSet<usize> = new_cuts.iter().map(|cut| cut[0]).collect();
                remaining.retain(|i| !singles.contains(i));
            }
            debug!("found {} minimal cut(s) of order {}", new_cuts.len(), k);
            found.extend(new_cuts);
        }

        found
            .into_iter()
            .map(|group| MinimalCut {
                elements: group.into_iter().map(|i| columns[i].clone()).collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Component;
    use crate::system::Node;

    fn components(n: usize) -> Vec<Component> {
        (0..n)
            .map(|i| Component::non_repairable(format!("C{}", i), 1e-3).unwrap())
            .collect()
    }

    fn cut_names(cuts: &[MinimalCut]) -> Vec<Vec<&str>> {
        cuts.iter().map(MinimalCut::names).collect()
    }

    #[test]
    fn test_combinations() {
        assert_eq!(
            combinations(4, 2),
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
        assert_eq!(combinations(3, 3), vec![vec![0, 1, 2]]);
        assert!(combinations(2, 3).is_empty());
        assert!(combinations(2, 0).is_empty());
    }

    #[test]
    fn test_series_chain_cuts() {
        let c = components(3);
        let mut graph = ReliabilityGraph::new();
        graph.insert_edges(Node::Source, &c[0]).unwrap();
        graph.insert_edges(&c[0], &c[1]).unwrap();
        graph.insert_edges(&c[1], &c[2]).unwrap();
        graph.insert_edges(&c[2], Node::Sink).unwrap();

        assert_eq!(
            cut_names(&graph.minimal_cuts(1)),
            vec![vec!["C0"], vec!["C1"], vec!["C2"]]
        );
        // No pair can be minimal once every element is a cut alone.
        assert_eq!(graph.minimal_cuts(3).len(), 3);
        assert!(graph.minimal_cuts(0).is_empty());
    }

    #[test]
    fn test_parallel_cuts() {
        let c = components(2);
        let mut graph = ReliabilityGraph::new();
        graph.insert_edges(Node::Source, [&c[0], &c[1]]).unwrap();
        graph.insert_edges(&c[0], Node::Sink).unwrap();
        graph.insert_edges(&c[1], Node::Sink).unwrap();

        assert!(graph.minimal_cuts(1).is_empty());
        assert_eq!(cut_names(&graph.minimal_cuts(2)), vec![vec!["C0", "C1"]]);
    }

    #[test]
    fn test_higher_order_cuts_stay_minimal() {
        // Three parallel branches, the last one a chain of two.
        let c = components(4);
        let mut graph = ReliabilityGraph::new();
        graph.insert_edges(Node::Source, [&c[0], &c[1], &c[2]]).unwrap();
        graph.insert_edges(&c[0], Node::Sink).unwrap();
        graph.insert_edges(&c[1], Node::Sink).unwrap();
        graph.insert_edges(&c[2], &c[3]).unwrap();
        graph.insert_edges(&c[3], Node::Sink).unwrap();

        let cuts = graph.minimal_cuts(4);
        assert_eq!(
            cut_names(&cuts),
            vec![vec!["C0", "C1", "C2"], vec!["C0", "C1", "C3"]]
        );
        assert!(cuts[1].contains("C3"));
        assert_eq!(cuts[0].to_string(), "{C0, C1, C2}");
    }

    #[test]
    fn test_no_path_means_every_element_is_a_cut() {
        let c = components(2);
        let mut graph = ReliabilityGraph::new();
        graph.insert_edges(Node::Source, &c[0]).unwrap();
        graph.insert_edges(&c[0], &c[1]).unwrap();

        assert_eq!(cut_names(&graph.minimal_cuts(2)), vec![vec!["C0"], vec!["C1"]]);
    }
}
