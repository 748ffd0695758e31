//! # contact-match
//!
//! Structural alignment of protein contact maps.
//!
//! A contact map records which residues of a protein lie close together in
//! space. Comparing two maps amounts to finding a mapping between residues
//! that preserves as many contacts as possible while keeping sequence order.
//! This crate approximates that problem with softassign deterministic
//! annealing: a continuous assignment matrix is sharpened over a schedule of
//! increasing inverse temperatures, then discretized and made order-preserving.
//!
//! ## Features
//!
//! - **Annealed matching**: Softassign updates with Sinkhorn normalization
//! - **Order preservation**: Output matchings never cross
//! - **Feasibility check**: Contacts must keep their orientation in both maps
//! - **Overlap score**: Preserved contacts relative to the smaller map
//! - **Alignments**: Gapped residue alignments derived from the matching
//!
//! ## Example
//!
//! ```rust,no_run
//! use contact_match::MatchEngine;
//! use contact_match::parsing::contacts::parse_graph_file;
//! use std::path::Path;
//!
//! let a = parse_graph_file(Path::new("1abc.cm")).unwrap();
//! let b = parse_graph_file(Path::new("2xyz.cm")).unwrap();
//!
//! let result = MatchEngine::new().run(&a, &b);
//! println!("{} vs {}: {:.2}", a.display_name(), b.display_name(), result.score);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Contact graphs, match matrices, and node pairs
//! - [`matching`]: Annealing engine, discretization, and scoring
//! - [`parsing`]: Contact map file reader
//! - [`cli`]: Command-line interface implementation
//! - [`utils`]: Limits and parameter validation

pub mod cli;
pub mod core;
pub mod matching;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::graph::ContactGraph;
pub use core::matrix::MatchMatrix;
pub use core::types::*;
pub use matching::engine::{AnnealingParams, MatchConfig, MatchEngine, MatchResult};
