use std::collections::HashSet;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use thiserror::Error;
use tracing::warn;

use crate::core::graph::{ContactGraph, GraphError};
use crate::utils::validation::check_node_limit;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid contact file format: {0}")]
    InvalidFormat(String),

    #[error("Line {line}: node {index} is out of range for a graph with {nodes} nodes")]
    NodeOutOfRange {
        line: usize,
        index: usize,
        nodes: usize,
    },

    #[error("Too many nodes: {0} exceeds maximum allowed (10000)")]
    TooManyNodes(usize),
}

impl From<GraphError> for ParseError {
    fn from(err: GraphError) -> Self {
        ParseError::InvalidFormat(err.to_string())
    }
}

/// One contact record: node indices plus the two weights that follow them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactRecord {
    pub i: usize,
    pub j: usize,
    pub weights: Option<(f64, f64)>,
}

/// Parse a contact file, transparently decompressing `.gz` input.
///
/// The graph is named after the file stem (the file name up to its first `.`).
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_graph_file(path: &Path) -> Result<ContactGraph, ParseError> {
    let file = std::fs::File::open(path)?;
    let is_gzipped = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"));

    let mut text = String::new();
    if is_gzipped {
        BufReader::new(GzDecoder::new(file)).read_to_string(&mut text)?;
    } else {
        BufReader::new(file).read_to_string(&mut text)?;
    }

    let graph = parse_graph_text(&text)?;

    match graph_name_from_path(path) {
        Some(name) => Ok(graph.with_name(name)),
        None => Ok(graph),
    }
}

/// Parse contact text into a graph.
///
/// # Errors
///
/// See [`parse_contact_records`].
pub fn parse_graph_text(text: &str) -> Result<ContactGraph, ParseError> {
    let (node_count, records) = parse_contact_records(text)?;
    let edges: Vec<(usize, usize)> = records.iter().map(|r| (r.i, r.j)).collect();
    Ok(ContactGraph::from_edges(node_count, &edges)?)
}

/// Parse contact text into its declared node count and contact records.
///
/// Format: the first data line holds the node count `n`; every following line
/// is `i j [u v]` where `i` and `j` are 0-based node indices and `u`, `v` are
/// weights. Blank lines and lines starting with `#` are skipped. Self-contacts
/// and repeated contacts are dropped with a warning.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` for a missing node count, non-numeric
/// tokens or a wrong number of fields, `ParseError::NodeOutOfRange` if an
/// index is `>= n`, or `ParseError::TooManyNodes` if `n` exceeds the limit.
pub fn parse_contact_records(text: &str) -> Result<(usize, Vec<ContactRecord>), ParseError> {
    let mut node_count: Option<usize> = None;
    let mut records = Vec::new();
    let mut seen: HashSet<(usize, usize)> = HashSet::new();

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Line numbers in errors are 1-based for user friendliness
        let line_num = idx + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();

        let Some(n) = node_count else {
            if fields.len() != 1 {
                return Err(ParseError::InvalidFormat(format!(
                    "Line {line_num}: expected a single node count, found {} fields",
                    fields.len()
                )));
            }
            let n = parse_index(fields[0], line_num, "node count")?;
            if check_node_limit(n).is_some() {
                return Err(ParseError::TooManyNodes(n));
            }
            node_count = Some(n);
            continue;
        };

        if fields.len() != 2 && fields.len() != 4 {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num}: expected 'i j u v', found {} fields",
                fields.len()
            )));
        }

        let i = parse_index(fields[0], line_num, "node index")?;
        let j = parse_index(fields[1], line_num, "node index")?;
        for index in [i, j] {
            if index >= n {
                return Err(ParseError::NodeOutOfRange {
                    line: line_num,
                    index,
                    nodes: n,
                });
            }
        }

        let weights = if fields.len() == 4 {
            Some((
                parse_weight(fields[2], line_num)?,
                parse_weight(fields[3], line_num)?,
            ))
        } else {
            None
        };

        if i == j {
            warn!(line = line_num, node = i, "Self-contact, ignoring");
            continue;
        }
        if !seen.insert((i.min(j), i.max(j))) {
            warn!(line = line_num, i, j, "Repeated contact, ignoring");
            continue;
        }

        records.push(ContactRecord { i, j, weights });
    }

    let Some(n) = node_count else {
        return Err(ParseError::InvalidFormat(
            "No node count found in contact file".to_string(),
        ));
    };

    Ok((n, records))
}

fn parse_index(token: &str, line_num: usize, what: &str) -> Result<usize, ParseError> {
    token.parse().map_err(|_| {
        ParseError::InvalidFormat(format!("Invalid {what} on line {line_num}: '{token}'"))
    })
}

fn parse_weight(token: &str, line_num: usize) -> Result<f64, ParseError> {
    token.parse().map_err(|_| {
        ParseError::InvalidFormat(format!("Invalid weight on line {line_num}: '{token}'"))
    })
}

/// File name up to its first `.`, e.g. `1abc.A.cm.gz` -> `1abc`.
///
/// Leading dots of hidden files are skipped: `.1abc.cm` -> `1abc`.
fn graph_name_from_path(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    file_name
        .trim_start_matches('.')
        .split('.')
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
