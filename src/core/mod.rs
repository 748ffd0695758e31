//! Core data types for contact-map matching.
//!
//! - [`ContactGraph`](graph::ContactGraph): immutable adjacency of one contact map
//! - [`MatchMatrix`](matrix::MatchMatrix): dense row-major match variables
//! - [`NodePair`](types::NodePair), [`Orientation`](types::Orientation): correspondence helpers
//!
//! ## Node Ordering
//!
//! Nodes are sequence positions. Their index order is the only ordering the
//! matcher knows about: a matching is order-preserving when it is monotonic in
//! both indices, and a shared contact is consistent when the neighbor lies on
//! the same side of the node in both graphs.

pub mod graph;
pub mod matrix;
pub mod types;
