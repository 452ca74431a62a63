//! Diagram nodes and the successor argument of `insert_edges`

use crate::model::{Component, Dependability, Element, Voter};
use std::fmt;

/// Label used for the source sentinel in exports and model files
pub const SOURCE_LABEL: &str = "source";

/// Label used for the sink sentinel in exports and model files
pub const SINK_LABEL: &str = "sink";

/// A node of a reliability diagram
#[derive(Debug, Clone)]
pub enum Node {
    /// Entry of the diagram; must be inserted before anything else
    Source,
    /// Exit of the diagram
    Sink,
    /// A component or voter
    Element(Element),
}

/// Hashable identity of a node within one graph
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum NodeKey {
    Source,
    Sink,
    Named(String),
}

impl Node {
    pub(crate) fn key(&self) -> NodeKey {
        match self {
            Node::Source => NodeKey::Source,
            Node::Sink => NodeKey::Sink,
            Node::Element(element) => NodeKey::Named(element.name().to_string()),
        }
    }

    /// Display label: the element name, or `source` / `sink`
    pub fn label(&self) -> &str {
        match self {
            Node::Source => SOURCE_LABEL,
            Node::Sink => SINK_LABEL,
            Node::Element(element) => element.name(),
        }
    }

    /// The element behind the node, `None` for sentinels
    pub fn element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_source(&self) -> bool {
        matches!(self, Node::Source)
    }

    pub fn is_sink(&self) -> bool {
        matches!(self, Node::Sink)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<&Element> for Node {
    fn from(element: &Element) -> Self {
        Node::Element(element.clone())
    }
}

impl From<Component> for Node {
    fn from(component: Component) -> Self {
        Node::Element(component.into())
    }
}

impl From<&Component> for Node {
    fn from(component: &Component) -> Self {
        Node::Element(component.into())
    }
}

impl From<Voter> for Node {
    fn from(voter: Voter) -> Self {
        Node::Element(voter.into())
    }
}

impl From<&Voter> for Node {
    fn from(voter: &Voter) -> Self {
        Node::Element(voter.into())
    }
}

/// Successors given to `insert_edges`: a single node or a list of nodes
#[derive(Debug, Clone)]
pub enum Successors {
    One(Node),
    Many(Vec<Node>),
}

impl Successors {
    pub(crate) fn into_nodes(self) -> Vec<Node> {
        match self {
            Successors::One(node) => vec![node],
            Successors::Many(nodes) => nodes,
        }
    }
}

macro_rules! successors_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Successors {
                fn from(node: $ty) -> Self {
                    Successors::One(node.into())
                }
            }

            impl From<Vec<$ty>> for Successors {
                fn from(nodes: Vec<$ty>) -> Self {
                    Successors::Many(nodes.into_iter().map(Into::into).collect())
                }
            }

            impl<const N: usize> From<[$ty; N]> for Successors {
                fn from(nodes: [$ty; N]) -> Self {
                    Successors::Many(nodes.into_iter().map(Into::into).collect())
                }
            }
        )*
    };
}

impl From<Node> for Successors {
    fn from(node: Node) -> Self {
        Successors::One(node)
    }
}

impl From<Vec<Node>> for Successors {
    fn from(nodes: Vec<Node>) -> Self {
        Successors::Many(nodes)
    }
}

impl<const N: usize> From<[Node; N]> for Successors {
    fn from(nodes: [Node; N]) -> Self {
        Successors::Many(nodes.into())
    }
}

successors_from!(Element, &Element, Component, &Component, Voter, &Voter);
