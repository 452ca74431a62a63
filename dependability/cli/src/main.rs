//! Dependability CLI
//!
//! Loads a JSON model file and reports diagram metrics, minimal cuts and
//! Markov state probabilities, or renders the model as Graphviz DOT.
//!
//! # Usage
//!
//! ```bash
//! # MTTF / MTTR and R, A, M at chosen times
//! dependability report plant.json --time 1000 --time 10000
//!
//! # Minimal cut sets up to order 3
//! dependability cuts plant.json --order 3
//!
//! # Markov probability that the diagram works, plus the full distribution
//! dependability markov plant.json --time 5000 --states
//!
//! # Fault tree as Graphviz
//! dependability dot plant.json fault-tree --order 2 | dot -Tpng > tree.png
//! ```

mod dot;

use clap::{Parser, Subcommand, ValueEnum};
use dependability_core::{load_model, DependabilityResult, Model, StatePredicate};
use log::info;
use serde_json::json;

#[derive(Parser)]
#[command(name = "dependability")]
#[command(about = "Reliability, availability and maintainability of repairable systems")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print MTTF, MTTR and the time-dependent metrics of the diagram.
    Report {
        /// Model file (JSON).
        model: String,

        /// Evaluation times; may be repeated.
        #[arg(short, long)]
        time: Vec<f64>,

        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// List minimal cut sets.
    Cuts {
        /// Model file (JSON).
        model: String,

        /// Largest cut order to search.
        #[arg(short, long, default_value = "2")]
        order: usize,
    },

    /// Evaluate the model's Markov process.
    Markov {
        /// Model file (JSON).
        model: String,

        /// Evaluation time.
        #[arg(short, long)]
        time: f64,

        /// Also print every state probability.
        #[arg(short, long)]
        states: bool,
    },

    /// Render the model as Graphviz DOT.
    Dot {
        /// Model file (JSON).
        model: String,

        /// What to render.
        #[arg(value_enum)]
        kind: DotKind,

        /// Cut order for the fault tree.
        #[arg(short, long, default_value = "2")]
        order: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DotKind {
    Diagram,
    FaultTree,
    Markov,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Report { model, time, json } => cmd_report(&open(&model), &time, json),
        Commands::Cuts { model, order } => cmd_cuts(&open(&model), order),
        Commands::Markov {
            model,
            time,
            states,
        } => cmd_markov(&open(&model), time, states),
        Commands::Dot { model, kind, order } => cmd_dot(&open(&model), kind, order),
    }
}

fn open(path: &str) -> Model {
    match load_model(path) {
        Ok(model) => {
            info!("analysing {}", model.name);
            model
        }
        Err(e) => fail(format!("Failed to load {}: {}", path, e)),
    }
}

fn fail(message: String) -> ! {
    eprintln!("{}", message);
    std::process::exit(1);
}

fn or_fail<T>(result: DependabilityResult<T>) -> T {
    result.unwrap_or_else(|e| fail(e.to_string()))
}

fn cmd_report(model: &Model, times: &[f64], as_json: bool) {
    let graph = &model.graph;
    let reliability = or_fail(graph.reliability());
    let availability = or_fail(graph.availability());
    let maintainability = or_fail(graph.maintainability());
    let mttf = graph.mttf().ok();
    let mttr = graph.mttr().ok();

    if as_json {
        let samples: Vec<_> = times
            .iter()
            .map(|&t| {
                json!({
                    "t": t,
                    "reliability": reliability.eval(t),
                    "availability": availability.eval(t),
                    "maintainability": maintainability.eval(t),
                })
            })
            .collect();
        let report = json!({
            "model": model.name,
            "mttf": mttf,
            "mttr": mttr,
            "reliability": reliability,
            "availability": availability,
            "maintainability": maintainability,
            "samples": samples,
        });
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => fail(format!("Failed to serialise report: {}", e)),
        }
        return;
    }

    let show = |value: Option<f64>| match value {
        Some(v) => format!("{:.6}", v),
        None => "diverges".to_string(),
    };
    println!("Model: {}", model.name);
    println!("  success paths: {}", graph.success_paths().len());
    println!("  MTTF: {}", show(mttf));
    println!("  MTTR: {}", show(mttr));
    println!("  R(t) = {}", reliability);
    println!("  A(t) = {}", availability);
    println!("  M(t) = {}", maintainability);
    for &t in times {
        println!(
            "  t = {:<12} R = {:.9}  A = {:.9}  M = {:.9}",
            t,
            reliability.eval(t),
            availability.eval(t),
            maintainability.eval(t)
        );
    }
}

fn cmd_cuts(model: &Model, order: usize) {
    let cuts = model.graph.minimal_cuts(order);
    println!("{} minimal cut(s) of order <= {}", cuts.len(), order);
    for cut in &cuts {
        println!("  [{}] {}", cut.len(), cut);
    }
}

fn cmd_markov(model: &Model, t: f64, show_states: bool) {
    let Some(process) = model.markov.as_ref() else {
        fail(format!("{} has no markov block", model.name));
    };

    let works = or_fail(StatePredicate::from_success_paths(
        &model.graph.success_paths(),
        process.components(),
    ));
    let p = or_fail(process.value(t, &works));
    println!("P(system works at t = {}) = {:.9}", t, p);

    if show_states {
        let distribution = or_fail(process.distribution(t));
        for (state, probability) in distribution.iter().enumerate() {
            println!("  {}  {:.9}", process.state_label(state), probability);
        }
    }
}

fn cmd_dot(model: &Model, kind: DotKind, order: usize) {
    let text = match kind {
        DotKind::Diagram => dot::diagram(&model.graph),
        DotKind::FaultTree => dot::fault_tree(&model.graph.minimal_cuts(order)),
        DotKind::Markov => match model.markov.as_ref() {
            Some(process) => dot::markov(process),
            None => fail(format!("{} has no markov block", model.name)),
        },
    };
    print!("{}", text);
}
