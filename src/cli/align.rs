//! Align command - match two contact maps.

use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;
use crate::core::graph::ContactGraph;
use crate::matching::alignment::SequenceAlignment;
use crate::matching::{
    AnnealingParams, DiscretizationStrategy, MatchConfig, MatchEngine, MatchResult,
};
use crate::parsing::contacts::parse_graph_file;

/// Arguments for the align command
#[derive(Args)]
pub struct AlignArgs {
    /// First contact map file (plain or gzipped)
    #[arg(required = true)]
    pub input_a: PathBuf,

    /// Second contact map file (plain or gzipped)
    #[arg(required = true)]
    pub input_b: PathBuf,

    /// Residue sequence of the first protein, used for the alignment
    #[arg(long)]
    pub sequence_a: Option<String>,

    /// Residue sequence of the second protein, used for the alignment
    #[arg(long)]
    pub sequence_b: Option<String>,

    /// Print the gapped sequence alignment
    #[arg(long)]
    pub alignment: bool,

    /// JSON file with annealing parameters; individual flags override it
    #[arg(long)]
    pub params: Option<PathBuf>,

    // === Annealing schedule overrides ===
    /// Initial inverse temperature
    #[arg(long)]
    pub b0: Option<f64>,

    /// Final inverse temperature
    #[arg(long)]
    pub bf: Option<f64>,

    /// Inverse temperature growth factor per pass
    #[arg(long)]
    pub br: Option<f64>,

    /// Maximum assignment iterations per temperature
    #[arg(long)]
    pub i0: Option<usize>,

    /// Maximum Sinkhorn passes per assignment iteration
    #[arg(long)]
    pub i1: Option<usize>,

    /// Assignment convergence threshold
    #[arg(long)]
    pub eps0: Option<f64>,

    /// Sinkhorn convergence threshold
    #[arg(long)]
    pub eps1: Option<f64>,

    /// Stop annealing after this many passes
    #[arg(long)]
    pub max_passes: Option<usize>,

    /// How the relaxed matrix is discretized
    #[arg(long, default_value = "greedy")]
    pub strategy: DiscretizationStrategy,
}

impl AlignArgs {
    /// Resolve parameters: flags override the JSON file, which overrides defaults
    fn annealing_params(&self) -> anyhow::Result<AnnealingParams> {
        let mut params = match &self.params {
            Some(path) => AnnealingParams::load_from_file(path)?,
            None => AnnealingParams::default(),
        };

        if let Some(v) = self.b0 {
            params.b0 = v;
        }
        if let Some(v) = self.bf {
            params.bf = v;
        }
        if let Some(v) = self.br {
            params.br = v;
        }
        if let Some(v) = self.i0 {
            params.i0 = v;
        }
        if let Some(v) = self.i1 {
            params.i1 = v;
        }
        if let Some(v) = self.eps0 {
            params.eps0 = v;
        }
        if let Some(v) = self.eps1 {
            params.eps1 = v;
        }

        params.validate()?;
        Ok(params)
    }

    fn match_config(&self) -> anyhow::Result<MatchConfig> {
        let mut config = MatchConfig::default()
            .with_params(self.annealing_params()?)
            .with_strategy(self.strategy);
        if let Some(max) = self.max_passes {
            config = config.with_max_outer_iterations(max);
        }
        Ok(config)
    }
}

/// Execute the align command
///
/// # Errors
///
/// Returns an error if an input cannot be parsed, the parameters are invalid,
/// or a sequence does not fit its contact map.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: AlignArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = args.match_config()?;

    let graph_a = parse_graph_file(&args.input_a)?;
    let graph_b = parse_graph_file(&args.input_b)?;

    if verbose {
        for graph in [&graph_a, &graph_b] {
            eprintln!(
                "{}: {} residues, {} contacts",
                graph.display_name(),
                graph.node_count(),
                graph.edge_count()
            );
        }
    }

    let engine = MatchEngine::with_config(config);
    let result = if verbose {
        let mut next_report = 10.0;
        let mut report = |percent: f64| {
            if percent >= next_report {
                eprintln!("Annealing: {percent:.0}%");
                while next_report <= percent {
                    next_report += 10.0;
                }
            }
        };
        engine.run_with_progress(&graph_a, &graph_b, &mut report)
    } else {
        engine.run(&graph_a, &graph_b)
    };

    let alignment = if args.alignment {
        Some(result.alignment(
            &graph_a,
            &graph_b,
            args.sequence_a.as_deref(),
            args.sequence_b.as_deref(),
        )?)
    } else {
        None
    };

    match format {
        OutputFormat::Text => print_text_result(&graph_a, &graph_b, &result, alignment.as_ref()),
        OutputFormat::Json => {
            print_json_result(&graph_a, &graph_b, &result, alignment.as_ref())?;
        }
        OutputFormat::Tsv => print_tsv_result(&graph_a, &graph_b, &result),
    }

    Ok(())
}

fn print_text_result(
    graph_a: &ContactGraph,
    graph_b: &ContactGraph,
    result: &MatchResult,
    alignment: Option<&SequenceAlignment>,
) {
    println!("Matching Results");
    println!("{}", "=".repeat(60));

    for (label, graph) in [("A", graph_a), ("B", graph_b)] {
        println!(
            "\nInput {label}: {} ({} residues, {} contacts)",
            graph.display_name(),
            graph.node_count(),
            graph.edge_count()
        );
    }

    println!();
    if result.feasible {
        println!("Score: {:.2}", result.score);
        println!("Common contacts: {}", result.common_contacts);
    } else {
        println!("Score: infeasible");
        if let Some(violation) = result.evaluation.violation() {
            println!(
                "  Contacts at {} and {} have opposite orientation",
                violation.pair, violation.neighbor
            );
        }
    }
    println!(
        "Iterations: {} ({} annealing passes{})",
        result.iterations,
        result.outer_iterations,
        if result.converged { "" } else { ", stopped early" }
    );
    println!("Time: {:.3}s", result.elapsed.as_secs_f64());

    let pairs = result.pairs();
    println!("\nMatched residues ({}):", pairs.len());
    for pair in &pairs {
        println!("  {pair}");
    }

    if let Some(ali) = alignment {
        println!("\nAlignment:");
        println!("  {}", ali.first);
        println!("  {}", ali.second);
    }
}

fn print_json_result(
    graph_a: &ContactGraph,
    graph_b: &ContactGraph,
    result: &MatchResult,
    alignment: Option<&SequenceAlignment>,
) -> anyhow::Result<()> {
    let pairs: Vec<[usize; 2]> = result
        .pairs()
        .into_iter()
        .map(|p| [p.first, p.second])
        .collect();

    let output = serde_json::json!({
        "input_a": graph_summary(graph_a),
        "input_b": graph_summary(graph_b),
        "score": result.score,
        "common_contacts": result.common_contacts,
        "feasible": result.feasible,
        "evaluation": result.evaluation,
        "iterations": result.iterations,
        "outer_iterations": result.outer_iterations,
        "converged": result.converged,
        "elapsed_secs": result.elapsed.as_secs_f64(),
        "matching": pairs,
        "alignment": alignment,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn graph_summary(graph: &ContactGraph) -> serde_json::Value {
    serde_json::json!({
        "name": graph.display_name(),
        "residues": graph.node_count(),
        "contacts": graph.edge_count(),
    })
}

fn print_tsv_result(graph_a: &ContactGraph, graph_b: &ContactGraph, result: &MatchResult) {
    println!("input_a\tinput_b\tscore\tcommon_contacts\tfeasible\titerations\telapsed_secs");
    println!(
        "{}\t{}\t{:.2}\t{}\t{}\t{}\t{:.3}",
        graph_a.display_name(),
        graph_b.display_name(),
        result.score,
        result.common_contacts,
        result.feasible,
        result.iterations,
        result.elapsed.as_secs_f64(),
    );
}
