use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GraphError {
    #[error("Adjacency matrix is not square: row {row} has {len} entries, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("Contact ({i}, {j}) is out of range for a graph with {nodes} nodes")]
    NodeOutOfRange { i: usize, j: usize, nodes: usize },
}

/// An immutable contact graph over sequence-ordered nodes.
///
/// Nodes are identified by their index `0..node_count`; the index order is the
/// sequence order used by the matcher. The adjacency matrix is always
/// symmetric and the adjacency lists are derived from it in ascending order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactGraph {
    /// Display name, usually the stem of the file the graph was read from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    node_count: usize,

    /// Row-major `node_count x node_count` adjacency matrix
    adjacency: Vec<bool>,

    /// Sorted neighbor indices for each node
    neighbors: Vec<Vec<usize>>,

    edge_count: usize,
}

impl ContactGraph {
    /// Build a graph from a dense adjacency matrix.
    ///
    /// The matrix is symmetrized: a contact present in either `(i, j)` or
    /// `(j, i)` is present in both. Diagonal entries are dropped.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::NotSquare` if any row length differs from the
    /// number of rows.
    pub fn from_adjacency(matrix: &[Vec<bool>]) -> Result<Self, GraphError> {
        let n = matrix.len();
        let mut adjacency = vec![false; n * n];

        for (i, row) in matrix.iter().enumerate() {
            if row.len() != n {
                return Err(GraphError::NotSquare {
                    row: i,
                    len: row.len(),
                    expected: n,
                });
            }
            for (j, &contact) in row.iter().enumerate() {
                if contact && i != j {
                    adjacency[i * n + j] = true;
                    adjacency[j * n + i] = true;
                }
            }
        }

        Ok(Self::from_dense(n, adjacency))
    }

    /// Build a graph with `node_count` nodes from a list of 0-based contacts.
    ///
    /// Duplicate contacts and self-contacts are ignored.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::NodeOutOfRange` if a contact names a node outside
    /// `0..node_count`.
    pub fn from_edges(node_count: usize, edges: &[(usize, usize)]) -> Result<Self, GraphError> {
        let n = node_count;
        let mut adjacency = vec![false; n * n];

        for &(i, j) in edges {
            if i >= n || j >= n {
                return Err(GraphError::NodeOutOfRange { i, j, nodes: n });
            }
            if i != j {
                adjacency[i * n + j] = true;
                adjacency[j * n + i] = true;
            }
        }

        Ok(Self::from_dense(n, adjacency))
    }

    /// Derive neighbor lists and counts from a symmetric, loop-free matrix
    fn from_dense(node_count: usize, adjacency: Vec<bool>) -> Self {
        let neighbors: Vec<Vec<usize>> = (0..node_count)
            .map(|i| {
                let row = &adjacency[i * node_count..(i + 1) * node_count];
                row.iter()
                    .enumerate()
                    .filter_map(|(j, &contact)| contact.then_some(j))
                    .collect()
            })
            .collect();

        let edge_count = neighbors.iter().map(Vec::len).sum::<usize>() / 2;

        Self {
            name: None,
            node_count,
            adjacency,
            neighbors,
            edge_count,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name for display, falling back to a placeholder
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Whether nodes `i` and `j` are in contact. Out-of-range indices are never adjacent.
    pub fn is_adjacent(&self, i: usize, j: usize) -> bool {
        i < self.node_count && j < self.node_count && self.adjacency[i * self.node_count + j]
    }

    /// Neighbors of node `i` in ascending index order
    pub fn neighbors(&self, i: usize) -> &[usize] {
        &self.neighbors[i]
    }

    pub fn degree(&self, i: usize) -> usize {
        self.neighbors[i].len()
    }

    pub fn max_degree(&self) -> usize {
        self.neighbors.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Iterate over each contact once as `(i, j)` with `i < j`
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.neighbors.iter().enumerate().flat_map(|(i, nbrs)| {
            nbrs.iter()
                .copied()
                .filter(move |&j| j > i)
                .map(move |j| (i, j))
        })
    }
}
