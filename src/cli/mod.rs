//! Command-line interface for contact-match.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **align**: Match two contact maps and report score and residue mapping
//! - **info**: Summarize one or more contact map files
//!
//! ## Usage
//!
//! ```text
//! # Match two contact maps
//! contact-match align 1abc.cm 2xyz.cm
//!
//! # Show the gapped alignment with residues
//! contact-match align 1abc.cm 2xyz.cm --alignment --sequence-a MKV... --sequence-b MRL...
//!
//! # Custom annealing schedule, JSON output for scripting
//! contact-match align 1abc.cm 2xyz.cm --params schedule.json --bf 20 --format json
//!
//! # Summarize contact maps
//! contact-match info maps/*.cm --format tsv
//! ```

use clap::{Parser, Subcommand};

pub mod align;
pub mod info;

#[derive(Parser)]
#[command(name = "contact-match")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Align protein contact maps by softassign deterministic annealing")]
#[command(
    long_about = "contact-match finds a residue mapping between two protein contact maps that preserves as many contacts as possible.\n\nThe mapping is:\n- Order preserving: matched residues never cross\n- Orientation consistent: a contact keeps the same direction in both maps\n- Scored by preserved contacts relative to the smaller map"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Match two contact maps
    Align(align::AlignArgs),

    /// Summarize contact map files
    Info(info::InfoArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
