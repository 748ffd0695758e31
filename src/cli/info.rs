//! Info command - summarize contact map files.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::parsing::contacts::parse_graph_file;

#[derive(Args)]
pub struct InfoArgs {
    /// Contact map files (plain or gzipped)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
}

#[derive(Serialize)]
struct GraphInfo {
    path: String,
    name: String,
    residues: usize,
    contacts: usize,
    max_degree: usize,
}

/// Execute the info command
///
/// # Errors
///
/// Returns an error if any input cannot be parsed.
pub fn run(args: &InfoArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mut infos = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        let graph = parse_graph_file(path)
            .map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))?;
        infos.push(GraphInfo {
            path: path.display().to_string(),
            name: graph.display_name().to_string(),
            residues: graph.node_count(),
            contacts: graph.edge_count(),
            max_degree: graph.max_degree(),
        });
    }

    match format {
        OutputFormat::Text => {
            for info in &infos {
                println!("{}", info.name);
                println!("  Path: {}", info.path);
                println!("  Residues: {}", info.residues);
                println!("  Contacts: {}", info.contacts);
                println!("  Max degree: {}", info.max_degree);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&infos)?);
        }
        OutputFormat::Tsv => {
            println!("name\tresidues\tcontacts\tmax_degree\tpath");
            for info in &infos {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    info.name, info.residues, info.contacts, info.max_degree, info.path
                );
            }
        }
    }

    Ok(())
}
