//! Contact map matching by softassign deterministic annealing.
//!
//! A run proceeds in stages:
//!
//! 1. [`engine`]: anneals a continuous `(n1 + 1) x (n2 + 1)` match matrix,
//!    alternating [`softassign`] updates with Sinkhorn normalization while the
//!    inverse temperature grows from `b0` to `bf`
//! 2. [`discretize`]: turns the real block into a 0/1 assignment
//! 3. [`noncrossing`]: keeps the heaviest order-preserving subset
//! 4. [`scoring`]: checks contact orientation and computes the overlap score
//!
//! [`alignment`] renders a finished matching as a gapped sequence alignment.
//!
//! ## Example
//!
//! ```rust
//! use contact_match::{ContactGraph, MatchEngine};
//!
//! let a = ContactGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3), (0, 3)]).unwrap();
//! let b = ContactGraph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (0, 4)]).unwrap();
//!
//! let result = MatchEngine::new().run(&a, &b);
//! if result.feasible {
//!     println!("score {:.2}, {} common contacts", result.score, result.common_contacts);
//! }
//! for pair in result.pairs() {
//!     println!("{pair}");
//! }
//! ```

pub mod alignment;
pub mod discretize;
pub mod engine;
pub mod noncrossing;
pub mod scoring;
pub mod softassign;

pub use discretize::DiscretizationStrategy;
pub use engine::{AnnealingParams, MatchConfig, MatchEngine, MatchResult};

// The binary re-declares this module and only implements observers through closures
#[allow(unused_imports)]
pub use engine::ProgressObserver;
