//! JSON model files

use super::{LoadError, LoadResult, Model, ModelSpec};
use crate::markov::{InitialDistribution, MarkovProcess};
use crate::model::{Component, Dependability, Element, Voter};
use crate::system::{Node, ReliabilityGraph, SINK_LABEL, SOURCE_LABEL};
use log::{info, warn};
use rustc_hash::FxHashMap;
use std::fs;
use std::path::Path;

impl ModelSpec {
    /// Build components, voters, the diagram and the Markov process
    pub fn build(&self) -> LoadResult<Model> {
        let mut elements: FxHashMap<String, Element> = FxHashMap::default();
        let mut components = Vec::with_capacity(self.components.len());
        let mut voters = Vec::with_capacity(self.voters.len());

        for spec in &self.components {
            let mut component = Component::new(spec.name.as_str(), spec.lambda, spec.mu)?;
            if !spec.initially_available {
                component = component.initially_unavailable();
            }
            register(&mut elements, Element::from(&component))?;
            components.push(component);
        }

        for spec in &self.voters {
            let replica = elements.get(&spec.component).cloned().ok_or_else(|| {
                LoadError::InvalidFormat(format!(
                    "voter replicates unknown element {}",
                    spec.component
                ))
            })?;
            let name = spec
                .name
                .clone()
                .unwrap_or_else(|| format!("{}-out-of-{} {}", spec.m, spec.n, spec.component));
            let own = Component::new(name, spec.lambda, spec.mu)?;
            let voter = Voter::with_own(own, replica, spec.m, spec.n)?;
            register(&mut elements, Element::from(&voter))?;
            voters.push(voter);
        }

        let mut graph = ReliabilityGraph::with_config(self.config.graph);
        for edge in &self.diagram {
            let from = resolve(&elements, &edge.from)?;
            let to = edge
                .to
                .iter()
                .map(|name| resolve(&elements, name))
                .collect::<LoadResult<Vec<Node>>>()?;
            graph.insert_edges(from, to)?;
        }

        let markov = match &self.markov {
            Some(spec) => {
                let tracked = spec
                    .components
                    .iter()
                    .map(|name| {
                        components
                            .iter()
                            .find(|c| c.name() == name.as_str())
                            .cloned()
                            .ok_or_else(|| {
                                LoadError::InvalidFormat(format!(
                                    "Markov process tracks unknown component {}",
                                    name
                                ))
                            })
                    })
                    .collect::<LoadResult<Vec<Component>>>()?;
                let initial = match &spec.initial {
                    Some(map) => InitialDistribution::Sparse(
                        map.iter().map(|(&state, &p)| (state, p)).collect(),
                    ),
                    None => InitialDistribution::all_up(),
                };
                Some(MarkovProcess::with_config(
                    tracked,
                    initial,
                    self.config.markov,
                )?)
            }
            None => None,
        };

        Ok(Model {
            name: self.name.clone(),
            config: self.config,
            components,
            voters,
            graph,
            markov,
        })
    }
}

fn register(elements: &mut FxHashMap<String, Element>, element: Element) -> LoadResult<()> {
    let name = element.name().to_string();
    if name == SOURCE_LABEL || name == SINK_LABEL {
        return Err(LoadError::InvalidFormat(format!("{} is a reserved name", name)));
    }
    if elements.contains_key(&name) {
        return Err(LoadError::InvalidFormat(format!("duplicate element name {}", name)));
    }
    elements.insert(name, element);
    Ok(())
}

fn resolve(elements: &FxHashMap<String, Element>, name: &str) -> LoadResult<Node> {
    match name {
        SOURCE_LABEL => Ok(Node::Source),
        SINK_LABEL => Ok(Node::Sink),
        _ => elements
            .get(name)
            .map(Node::from)
            .ok_or_else(|| {
                LoadError::InvalidFormat(format!("diagram names unknown node {}", name))
            }),
    }
}

/// Parse and build a model from JSON text
pub fn parse_model(json: &str) -> LoadResult<Model> {
    let spec: ModelSpec =
        serde_json::from_str(json).map_err(|e| LoadError::ParseError(e.to_string()))?;
    let model = spec.build()?;
    info!(
        "loaded model {}: {} component(s), {} voter(s), {} diagram node(s)",
        model.name,
        model.components.len(),
        model.voters.len(),
        model.graph.len()
    );
    Ok(model)
}

/// Load a model from a JSON file
pub fn load_model<P: AsRef<Path>>(path: P) -> LoadResult<Model> {
    let path = path.as_ref();

    let contents = fs::read_to_string(path)
        .map_err(|e| LoadError::FileNotFound(format!("{}: {}", path.display(), e)))?;

    parse_model(&contents)
}

/// Load every `.json` model in a directory, skipping files that fail
pub fn load_models<P: AsRef<Path>>(dir: P) -> LoadResult<Vec<Model>> {
    let dir = dir.as_ref();

    if !dir.is_dir() {
        return Err(LoadError::FileNotFound(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)
        .map_err(|e| LoadError::FileNotFound(format!("{}: {}", dir.display(), e)))?
    {
        let entry = entry.map_err(|e| LoadError::FileNotFound(e.to_string()))?;
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut models = Vec::new();
    for path in paths {
        match load_model(&path) {
            Ok(model) => models.push(model),
            Err(e) => warn!("failed to load {}: {}", path.display(), e),
        }
    }
    Ok(models)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DependabilityError;

    const PARALLEL: &str = r#"{
        "name": "parallel pair",
        "components": [
            { "name": "A", "lambda": 1e-3, "mu": 1e-2 },
            { "name": "B", "lambda": 1e-3, "mu": 1e-2 }
        ],
        "diagram": [
            { "from": "source", "to": ["A", "B"] },
            { "from": "A", "to": ["sink"] },
            { "from": "B", "to": ["sink"] }
        ],
        "markov": { "components": ["A", "B"] }
    }"#;

    #[test]
    fn test_parse_parallel() {
        let model = parse_model(PARALLEL).unwrap();
        assert_eq!(model.name, "parallel pair");
        assert_eq!(model.graph.success_paths().len(), 2);
        assert!((model.graph.mttf().unwrap() - 1500.0).abs() < 1e-9);

        let markov = model.markov.as_ref().unwrap();
        assert_eq!(markov.state_count(), 4);
        assert_eq!(markov.initial()[0], 1.0);
    }

    #[test]
    fn test_voter_references() {
        let model = parse_model(
            r#"{
                "name": "voted",
                "components": [{ "name": "M", "lambda": 1e-4 }],
                "voters": [
                    { "component": "M", "m": 2, "n": 3 },
                    { "name": "outer", "component": "2-out-of-3 M", "m": 1, "n": 2 }
                ],
                "diagram": [
                    { "from": "source", "to": ["outer"] },
                    { "from": "outer", "to": ["sink"] }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(model.voters.len(), 2);
        assert!(model.element("2-out-of-3 M").is_some());
        assert!(model.element("outer").is_some());
        assert!(model.graph.contains("outer"));
    }

    #[test]
    fn test_rejections() {
        assert!(matches!(parse_model("{"), Err(LoadError::ParseError(_))));

        let reserved = r#"{ "name": "x", "components": [{ "name": "sink", "lambda": 1.0 }] }"#;
        assert!(matches!(parse_model(reserved), Err(LoadError::InvalidFormat(_))));

        let unknown = r#"{ "name": "x", "diagram": [{ "from": "source", "to": ["Z"] }] }"#;
        assert!(matches!(parse_model(unknown), Err(LoadError::InvalidFormat(_))));

        let negative = r#"{ "name": "x", "components": [{ "name": "A", "lambda": -1.0 }] }"#;
        assert!(matches!(
            parse_model(negative),
            Err(LoadError::Model(DependabilityError::InvalidRate { .. }))
        ));

        let late_source = r#"{
            "name": "x",
            "components": [{ "name": "A", "lambda": 1.0 }],
            "diagram": [{ "from": "A", "to": ["sink"] }]
        }"#;
        assert!(matches!(
            parse_model(late_source),
            Err(LoadError::Model(DependabilityError::InvalidTopology(_)))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_model("/definitely/not/here.json"),
            Err(LoadError::FileNotFound(_))
        ));
    }
}
