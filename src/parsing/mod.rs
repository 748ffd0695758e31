//! Parsers for contact-map files.
//!
//! ## Format
//!
//! ```text
//! # optional comment lines
//! <n>                 number of nodes
//! <i> <j> <u> <v>     one contact per line, repeated
//! ```
//!
//! `i` and `j` are 0-based node indices mapped directly onto adjacency cells.
//! The weights `u` and `v` are validated and kept on the parsed records, but
//! the matcher only uses the existence of a contact. Files ending in `.gz`
//! are decompressed on the fly.
//!
//! ## Example
//!
//! ```rust,no_run
//! use contact_match::parsing::contacts::{parse_graph_file, parse_graph_text};
//! use std::path::Path;
//!
//! let graph = parse_graph_file(Path::new("1abc.cm")).unwrap();
//! let small = parse_graph_text("3\n0 1 1.0 1.0\n1 2 1.0 1.0\n").unwrap();
//! assert_eq!(small.edge_count(), 2);
//! ```

pub mod contacts;
