use serde::{Deserialize, Serialize};

use crate::core::graph::ContactGraph;
use crate::core::matrix::MatchMatrix;
use crate::core::types::{NodePair, Orientation};

/// Score reported for an infeasible matching
pub const INFEASIBLE_SCORE: f64 = -1.0;

/// Contact count reported for an infeasible matching
pub const INFEASIBLE_CONTACTS: i64 = -1;

/// Safely convert usize to f64 for score calculations
#[inline]
fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// The first shared contact found whose orientation differs between the graphs.
///
/// `pair` and `neighbor` are both matched; `neighbor.first` is in contact with
/// `pair.first` and `neighbor.second` with `pair.second`, but on opposite sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossingViolation {
    pub pair: NodePair,
    pub neighbor: NodePair,
}

/// Outcome of scoring a discrete matching
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Evaluation {
    Feasible {
        /// Preserved contacts divided by the smaller edge count (unrounded)
        score: f64,
        /// Number of contacts preserved by the matching
        common_contacts: usize,
    },
    Infeasible { violation: CrossingViolation },
}

impl Evaluation {
    pub fn is_feasible(&self) -> bool {
        matches!(self, Self::Feasible { .. })
    }

    /// Unrounded score, or `-1` when infeasible
    pub fn score(&self) -> f64 {
        match self {
            Self::Feasible { score, .. } => *score,
            Self::Infeasible { .. } => INFEASIBLE_SCORE,
        }
    }

    /// Preserved contacts, or `-1` when infeasible
    pub fn common_contacts(&self) -> i64 {
        match self {
            Self::Feasible {
                common_contacts, ..
            } => i64::try_from(*common_contacts).unwrap_or(i64::MAX),
            Self::Infeasible { .. } => INFEASIBLE_CONTACTS,
        }
    }

    pub fn violation(&self) -> Option<CrossingViolation> {
        match self {
            Self::Feasible { .. } => None,
            Self::Infeasible { violation } => Some(*violation),
        }
    }
}

/// Score a discrete matching between `rows` (matrix rows) and `cols` (matrix columns).
///
/// Every contact `(i, k)` of `rows` whose endpoints are matched to a contact
/// `(j, l)` of `cols` is preserved if `k` lies on the same side of `i` as `l`
/// of `j`. A matched contact with opposite orientation makes the whole
/// matching infeasible and stops evaluation immediately.
pub fn evaluate(m: &MatchMatrix, rows: &ContactGraph, cols: &ContactGraph) -> Evaluation {
    // each preserved contact is seen once from each of its endpoints
    let mut preserved_ends = 0usize;

    for (i, j) in m.selected() {
        for &k in rows.neighbors(i) {
            for &l in cols.neighbors(j) {
                if m[(k, l)] <= 0.0 {
                    continue;
                }
                if Orientation::agrees(i, k, j, l) {
                    preserved_ends += 1;
                } else {
                    return Evaluation::Infeasible {
                        violation: CrossingViolation {
                            pair: NodePair::new(i, j),
                            neighbor: NodePair::new(k, l),
                        },
                    };
                }
            }
        }
    }

    let min_edges = rows.edge_count().min(cols.edge_count());
    let score = if min_edges == 0 {
        0.0
    } else {
        count_to_f64(preserved_ends) / (2.0 * count_to_f64(min_edges))
    };

    Evaluation::Feasible {
        score,
        common_contacts: preserved_ends / 2,
    }
}

/// Round a score to two decimal places, half away from zero
pub fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}
