//! Conversion of a continuous match matrix into a discrete assignment.

use munkres::{solve_assignment, WeightMatrix};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::matrix::MatchMatrix;

/// How the relaxed match matrix is turned into a 0/1 assignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DiscretizationStrategy {
    /// Rows in ascending order each take their best still-free column
    #[default]
    Greedy,
    /// Maximum-weight bipartite assignment (Kuhn-Munkres)
    Optimal,
}

/// Discretize the real `n1 x n2` block of `m` into a 0/1 matrix.
///
/// Every row and column of the output holds at most one `1.0`.
pub fn discretize(
    m: &MatchMatrix,
    n1: usize,
    n2: usize,
    strategy: DiscretizationStrategy,
) -> MatchMatrix {
    match strategy {
        DiscretizationStrategy::Greedy => discretize_greedy(m, n1, n2),
        DiscretizationStrategy::Optimal => discretize_optimal(m, n1, n2),
    }
}

/// Greedy per-row selection with column locking.
///
/// Earlier rows take precedence; within a row the lowest column wins ties.
pub fn discretize_greedy(m: &MatchMatrix, n1: usize, n2: usize) -> MatchMatrix {
    let mut out = MatchMatrix::new(n1, n2);
    let mut used = vec![false; n2];

    for i in 0..n1 {
        let mut best: Option<(usize, f64)> = None;
        for (j, &value) in m.row(i)[..n2].iter().enumerate() {
            if used[j] {
                continue;
            }
            if best.map_or(true, |(_, best_value)| value > best_value) {
                best = Some((j, value));
            }
        }
        if let Some((j, _)) = best {
            out[(i, j)] = 1.0;
            used[j] = true;
        }
    }

    out
}

/// Maximum-weight assignment of the real block, padded to a square cost matrix
pub fn discretize_optimal(m: &MatchMatrix, n1: usize, n2: usize) -> MatchMatrix {
    let size = n1.max(n2);
    if size == 0 {
        return MatchMatrix::new(n1, n2);
    }

    let max_weight = (0..n1)
        .flat_map(|i| m.row(i)[..n2].iter().copied())
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);

    // Dummy rows/columns cost nothing; real cells cost their shortfall from the max
    let mut costs = Vec::with_capacity(size * size);
    for i in 0..size {
        for j in 0..size {
            let cost = if i < n1 && j < n2 && m[(i, j)].is_finite() {
                max_weight - m[(i, j)]
            } else if i < n1 && j < n2 {
                max_weight
            } else {
                0.0
            };
            costs.push(cost);
        }
    }

    let mut weights = WeightMatrix::from_row_vec(size, costs);
    match solve_assignment(&mut weights) {
        Ok(positions) => {
            let mut out = MatchMatrix::new(n1, n2);
            for pos in positions {
                if pos.row < n1 && pos.column < n2 {
                    out[(pos.row, pos.column)] = 1.0;
                }
            }
            out
        }
        Err(err) => {
            warn!(error = ?err, "Optimal assignment failed, falling back to greedy");
            discretize_greedy(m, n1, n2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_rows(rows: &[&[f64]]) -> MatchMatrix {
        let mut m = MatchMatrix::new(rows.len(), rows[0].len());
        for (i, row) in rows.iter().enumerate() {
            m.row_mut(i).copy_from_slice(row);
        }
        m
    }

    #[test]
    fn test_greedy_picks_row_maxima() {
        let m = from_rows(&[&[0.1, 0.7, 0.2], &[0.6, 0.3, 0.1], &[0.2, 0.1, 0.9]]);
        let out = discretize_greedy(&m, 3, 3);
        assert_eq!(out.selected(), vec![(0, 1), (1, 0), (2, 2)]);
    }

    #[test]
    fn test_greedy_earlier_rows_steal_columns() {
        let m = from_rows(&[&[0.5, 0.4], &[0.9, 0.1]]);
        let out = discretize_greedy(&m, 2, 2);
        // row 0 takes column 0 even though row 1 wants it more
        assert_eq!(out.selected(), vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn test_greedy_ties_go_to_lowest_column() {
        let m = from_rows(&[&[0.3, 0.3, 0.3]]);
        let out = discretize_greedy(&m, 1, 3);
        assert_eq!(out.selected(), vec![(0, 0)]);
    }

    #[test]
    fn test_greedy_ignores_slack() {
        // last row/column are slack
        let m = from_rows(&[&[0.1, 0.2, 0.9], &[0.3, 0.1, 0.8], &[0.9, 0.9, 0.9]]);
        let out = discretize_greedy(&m, 2, 2);
        assert_eq!((out.rows(), out.cols()), (2, 2));
        assert_eq!(out.selected(), vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn test_greedy_is_partial_permutation() {
        let m = from_rows(&[&[1.0, 1.0, 1.0], &[1.0, 1.0, 1.0]]);
        let out = discretize_greedy(&m, 2, 3);
        assert!(out.is_partial_permutation());
        assert_eq!(out.selected().len(), 2);
    }

    #[test]
    fn test_optimal_beats_greedy() {
        let m = from_rows(&[&[0.5, 0.4], &[0.9, 0.1]]);
        let out = discretize_optimal(&m, 2, 2);
        // 0.4 + 0.9 > 0.5 + 0.1
        assert_eq!(out.selected(), vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn test_optimal_rectangular() {
        let m = from_rows(&[&[0.1, 0.2, 0.8], &[0.7, 0.1, 0.75]]);
        let out = discretize(&m, 2, 3, DiscretizationStrategy::Optimal);
        assert_eq!((out.rows(), out.cols()), (2, 3));
        assert_eq!(out.selected(), vec![(0, 2), (1, 0)]);
        assert!(out.is_partial_permutation());
    }

    #[test]
    fn test_empty() {
        let m = MatchMatrix::new(1, 1);
        assert!(discretize(&m, 0, 0, DiscretizationStrategy::Greedy)
            .selected()
            .is_empty());
        assert!(discretize(&m, 0, 0, DiscretizationStrategy::Optimal)
            .selected()
            .is_empty());
    }
}
