//! Graphviz renderers for diagrams, fault trees and Markov chains

use dependability_core::{MarkovProcess, MinimalCut, ReliabilityGraph};

fn quote(label: &str) -> String {
    format!("\"{}\"", label.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Wrap statements in a `digraph`, one per tab-indented line
fn digraph(header: &[&str], statements: Vec<String>) -> String {
    let body: Vec<String> = header
        .iter()
        .map(|line| line.to_string())
        .chain(statements)
        .map(|line| format!("\t{}\n", line))
        .collect();
    format!("digraph G {{\n{}}}\n", body.concat())
}

/// The block diagram, one edge per line
pub fn diagram(graph: &ReliabilityGraph) -> String {
    let edges = graph
        .edges()
        .into_iter()
        .map(|(from, to)| format!("{} -> {};", quote(from.label()), quote(to.label())))
        .collect();
    digraph(&["rankdir=LR;"], edges)
}

/// `not_S` is the OR of one AND gate per minimal cut
pub fn fault_tree(cuts: &[MinimalCut]) -> String {
    let mut statements = vec!["\"not_S\" -> \"or\";".to_string()];
    for (i, cut) in cuts.iter().enumerate() {
        statements.push(format!("or -> and_{};", i));
        statements.extend(
            cut.names()
                .into_iter()
                .map(|name| format!("and_{} -> {};", i, quote(name))),
        );
    }
    digraph(&[], statements)
}

/// States labelled by their bit strings, edges by transition rates
///
/// Self-loops carry the probability of staying over a unit step, `1 + M[i,i]`.
pub fn markov(process: &MarkovProcess) -> String {
    let generator = process.generator();
    let loops = (0..process.state_count()).filter_map(|state| {
        let stay = generator[[state, state]];
        (stay != 0.0).then(|| {
            let label = quote(&process.state_label(state));
            format!("{} -> {} [label = \"{}\"];", label, label, 1.0 + stay)
        })
    });
    let moves = process.transitions().into_iter().map(|transition| {
        format!(
            "{} -> {} [label = \"{}\"];",
            quote(&process.state_label(transition.from)),
            quote(&process.state_label(transition.to)),
            transition.rate
        )
    });
    digraph(&["rankdir=LR;"], loops.chain(moves).collect())
}
