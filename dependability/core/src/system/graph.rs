//! Reliability block diagram as a directed graph from SOURCE to SINK

use super::cache::{Cached, Metric, MetricCache};
use super::node::{Node, NodeKey, Successors};
use super::GraphConfig;
use crate::error::{DependabilityError, DependabilityResult};
use crate::model::{Component, Dependability, Element, Observer};
use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use std::sync::{Arc, Weak};

/// A reliability diagram whose edges mean "predecessor working enables successor"
///
/// Every element placed on the graph is observed: changing the rates of any
/// component it depends on clears the graph's cached formulas.
///
/// # Example
///
/// ```rust
/// use dependability_core::{Component, Node, ReliabilityGraph};
///
/// let pump = Component::non_repairable("pump", 1e-4).unwrap();
/// let valve = Component::non_repairable("valve", 2e-5).unwrap();
///
/// let mut graph = ReliabilityGraph::new();
/// graph.insert_edges(Node::Source, &pump).unwrap();
/// graph.insert_edges(&pump, &valve).unwrap();
/// graph.insert_edges(&valve, Node::Sink).unwrap();
///
/// let mttf = graph.mttf().unwrap();
/// assert!((mttf - 1.0 / 1.2e-4).abs() < 1e-6);
/// ```
pub struct ReliabilityGraph {
    pub(crate) config: GraphConfig,
    /// Node keys in insertion order (sentinels included)
    order: Vec<NodeKey>,
    elements: FxHashMap<String, Element>,
    successors: FxHashMap<NodeKey, Vec<NodeKey>>,
    pub(crate) cache: Arc<MetricCache>,
    observer: Weak<dyn Observer>,
}

impl Default for ReliabilityGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ReliabilityGraph {
    /// Create an empty graph with the default configuration
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    /// Create an empty graph
    pub fn with_config(config: GraphConfig) -> Self {
        let cache = Arc::new(MetricCache::default());
        let as_observer: Arc<dyn Observer> = cache.clone();
        let observer = Arc::downgrade(&as_observer);

        Self {
            config,
            order: Vec::new(),
            elements: FxHashMap::default(),
            successors: FxHashMap::default(),
            cache,
            observer,
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Add edges `predecessor -> s` for every successor
    ///
    /// SOURCE must be inserted (as a predecessor) before any other node.
    /// Nothing is modified when validation fails.
    pub fn insert_edges(
        &mut self,
        predecessor: impl Into<Node>,
        successors: impl Into<Successors>,
    ) -> DependabilityResult<()> {
        let predecessor = predecessor.into();
        let successors = successors.into().into_nodes();

        self.validate_insertion(&predecessor, &successors)?;

        let from = self.add_node(predecessor);
        for successor in successors {
            let to = self.add_node(successor);
            let targets = self.successors.entry(from.clone()).or_default();
            if !targets.contains(&to) {
                targets.push(to);
            }
        }

        self.cache.clear();
        Ok(())
    }

    /// Remove a node together with all its incident edges
    pub fn remove_node(&mut self, node: impl Into<Node>) -> DependabilityResult<()> {
        let node = node.into();
        let key = node.key();
        if !self.order.contains(&key) {
            return Err(DependabilityError::InvalidArgument(format!(
                "{} is not part of the graph",
                node.label()
            )));
        }

        self.order.retain(|k| k != &key);
        self.successors.remove(&key);
        for targets in self.successors.values_mut() {
            targets.retain(|k| k != &key);
        }

        if let NodeKey::Named(name) = &key {
            if let Some(removed) = self.elements.remove(name) {
                self.release(&removed);
            }
        }

        debug!("removed node {} from graph", node.label());
        self.cache.clear();
        Ok(())
    }

    /// Whether SOURCE has been inserted
    pub fn has_source(&self) -> bool {
        self.order.contains(&NodeKey::Source)
    }

    /// Number of nodes, sentinels included
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether an element with this name sits on the graph
    pub fn contains(&self, name: &str) -> bool {
        self.elements.contains_key(name)
    }

    /// Elements on the graph in insertion order, sentinels excluded
    pub fn components(&self) -> Vec<Element> {
        self.order
            .iter()
            .filter_map(|key| match key {
                NodeKey::Named(name) => self.elements.get(name).cloned(),
                _ => None,
            })
            .collect()
    }

    /// Read-only edge enumeration for external renderers
    pub fn edges(&self) -> Vec<(Node, Node)> {
        let mut edges = Vec::new();
        for from in &self.order {
            if let Some(targets) = self.successors.get(from) {
                for to in targets {
                    if let (Some(a), Some(b)) = (self.node(from), self.node(to)) {
                        edges.push((a, b));
                    }
                }
            }
        }
        edges
    }

    /// Whether a metric is currently memoised
    pub fn is_cached(&self, metric: Metric) -> bool {
        self.cache.contains(metric)
    }

    /// A new graph with the same topology and shared component handles
    ///
    /// The copy has its own cache and registers itself as an observer.
    pub fn duplicate(&self) -> DependabilityResult<Self> {
        let mut copy = Self::with_config(self.config);
        if self.has_source() {
            copy.insert_edges(Node::Source, Vec::<Node>::new())?;
        }
        for from in &self.order {
            let targets: Vec<Node> = self
                .successors
                .get(from)
                .map(|targets| targets.iter().filter_map(|to| self.node(to)).collect())
                .unwrap_or_default();
            if targets.is_empty() {
                continue;
            }
            if let Some(node) = self.node(from) {
                copy.insert_edges(node, targets)?;
            }
        }
        Ok(copy)
    }

    /// All simple paths between two nodes, endpoints included
    pub fn paths_between(
        &self,
        from: impl Into<Node>,
        to: impl Into<Node>,
    ) -> Vec<Vec<Node>> {
        let start = from.into().key();
        let end = to.into().key();
        if !self.order.contains(&start) || !self.order.contains(&end) {
            return Vec::new();
        }

        let mut found = Vec::new();
        let mut path = vec![start.clone()];
        let mut on_path = FxHashSet::default();
        on_path.insert(start.clone());
        self.walk(&start, &end, &mut path, &mut on_path, &mut found);

        found
            .into_iter()
            .map(|keys| keys.iter().filter_map(|key| self.node(key)).collect())
            .collect()
    }

    /// All simple SOURCE -> SINK paths, as element sequences without sentinels
    pub fn success_paths(&self) -> Vec<Vec<Element>> {
        self.success_paths_shared().as_ref().clone()
    }

    pub(crate) fn success_paths_shared(&self) -> Arc<Vec<Vec<Element>>> {
        if let Some(Cached::Paths(paths)) = self.cache.get(Metric::SuccessPaths) {
            return paths;
        }

        let generation = self.cache.generation();
        let paths: Vec<Vec<Element>> = self
            .paths_between(Node::Source, Node::Sink)
            .into_iter()
            .map(|path| {
                path.into_iter()
                    .filter_map(|node| match node {
                        Node::Element(element) => Some(element),
                        _ => None,
                    })
                    .collect()
            })
            .collect();
        debug!("found {} success path(s)", paths.len());

        let paths = Arc::new(paths);
        self.cache
            .insert(Metric::SuccessPaths, Cached::Paths(paths.clone()), generation);
        paths
    }

    fn walk(
        &self,
        current: &NodeKey,
        end: &NodeKey,
        path: &mut Vec<NodeKey>,
        on_path: &mut FxHashSet<NodeKey>,
        found: &mut Vec<Vec<NodeKey>>,
    ) {
        if current == end {
            found.push(path.clone());
            return;
        }
        let Some(targets) = self.successors.get(current) else {
            return;
        };
        for next in targets {
            if on_path.contains(next) {
                continue;
            }
            path.push(next.clone());
            on_path.insert(next.clone());
            self.walk(next, end, path, on_path, found);
            on_path.remove(next);
            path.pop();
        }
    }

    fn validate_insertion(
        &self,
        predecessor: &Node,
        successors: &[Node],
    ) -> DependabilityResult<()> {
        if !predecessor.is_source() && !self.has_source() {
            return Err(DependabilityError::InvalidTopology(format!(
                "source must be inserted before {}",
                predecessor.label()
            )));
        }
        if predecessor.is_sink() {
            return Err(DependabilityError::InvalidTopology(
                "sink cannot have successors".to_string(),
            ));
        }
        if successors.iter().any(Node::is_source) {
            return Err(DependabilityError::InvalidTopology(
                "source cannot be a successor".to_string(),
            ));
        }

        // Names must stay bound to one element, within this call too.
        let mut pending: FxHashMap<&str, &Element> = FxHashMap::default();
        for element in std::iter::once(predecessor)
            .chain(successors.iter())
            .filter_map(Node::element)
        {
            let name = element.name();
            let bound = self.elements.get(name).or_else(|| pending.get(name).copied());
            match bound {
                Some(existing) if !existing.same(element) => {
                    return Err(DependabilityError::InvalidArgument(format!(
                        "name {} is already bound to another element",
                        name
                    )));
                }
                Some(_) => {}
                None => {
                    pending.insert(name, element);
                }
            }
        }
        Ok(())
    }

    fn add_node(&mut self, node: Node) -> NodeKey {
        let key = node.key();
        if !self.order.contains(&key) {
            self.order.push(key.clone());
        }
        if let Node::Element(element) = node {
            if !self.elements.contains_key(element.name()) {
                for component in element.components() {
                    component.attach(&self.observer);
                }
                self.elements.insert(element.name().to_string(), element);
            }
        }
        key
    }

    /// Stop observing components no remaining element depends on
    fn release(&self, removed: &Element) {
        let still_used: Vec<Component> = self
            .elements
            .values()
            .flat_map(Element::components)
            .collect();
        for component in removed.components() {
            if !still_used.iter().any(|c| c.same(&component)) {
                component.detach(&self.observer);
            }
        }
    }

    fn node(&self, key: &NodeKey) -> Option<Node> {
        match key {
            NodeKey::Source => Some(Node::Source),
            NodeKey::Sink => Some(Node::Sink),
            NodeKey::Named(name) => self.elements.get(name).cloned().map(Node::Element),
        }
    }
}

impl fmt::Debug for ReliabilityGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let edges: Vec<(String, String)> = self
            .edges()
            .iter()
            .map(|(a, b)| (a.label().to_string(), b.label().to_string()))
            .collect();
        f.debug_struct("ReliabilityGraph")
            .field("nodes", &self.order.len())
            .field("edges", &edges)
            .finish()
    }
}
