//! Projection of a discrete matching onto an order-preserving (non-crossing) one.
//!
//! Pairs `(i1, j1)` and `(i2, j2)` cross when `i1 < i2` but `j1 > j2`. The
//! projection keeps a heavy subset of the selected cells in which rows and
//! columns increase together.

use crate::core::matrix::MatchMatrix;

/// Tolerance when matching chain scores during traceback
const TRACE_TOLERANCE: f64 = 1e-9;

/// Keep the heaviest non-crossing subset of the selected cells of `m`.
///
/// Forward pass: `S[i][j] = M[i][j] + max(best[0..j])`, where `best[c]` is the
/// best chain score ending at column `c` in any earlier row. Traceback: start
/// from the best chain score over all selected cells, then walk rows from the
/// last to the first; in each row take the rightmost selected cell left of the
/// current column bound whose score still reaches the remaining total, and
/// move the bound to it. Rows with no such cell contribute nothing.
pub fn project_non_crossing(m: &MatchMatrix) -> MatchMatrix {
    let n1 = m.rows();
    let n2 = m.cols();
    let mut out = MatchMatrix::new(n1, n2);
    if n1 == 0 || n2 == 0 {
        return out;
    }

    let chain = chain_scores(m);

    let mut remaining = m
        .selected()
        .into_iter()
        .map(|cell| chain[cell])
        .fold(0.0_f64, f64::max);

    let mut bound = n2;
    for i in (0..n1).rev() {
        if bound == 0 || remaining <= TRACE_TOLERANCE {
            break;
        }
        let tolerance = TRACE_TOLERANCE * remaining.max(1.0);
        let pick = (0..bound)
            .rev()
            .find(|&j| m[(i, j)] > 0.0 && (chain[(i, j)] - remaining).abs() <= tolerance);
        if let Some(j) = pick {
            out[(i, j)] = 1.0;
            remaining -= m[(i, j)];
            bound = j;
        }
    }

    out
}

/// Best score of a non-crossing chain ending at each cell
fn chain_scores(m: &MatchMatrix) -> MatchMatrix {
    let n1 = m.rows();
    let n2 = m.cols();
    let mut s = MatchMatrix::new(n1, n2);
    let mut best = vec![0.0_f64; n2];

    for i in 0..n1 {
        let mut prefix = 0.0_f64;
        s[(i, 0)] = m[(i, 0)];
        for j in 1..n2 {
            prefix = prefix.max(best[j - 1]);
            s[(i, j)] = m[(i, j)] + prefix;
        }
        for (j, b) in best.iter_mut().enumerate() {
            *b = b.max(s[(i, j)]);
        }
    }

    s
}

/// True if no two selected cells of `m` cross
pub fn is_non_crossing(m: &MatchMatrix) -> bool {
    let cells = m.selected();
    cells
        .iter()
        .all(|&(i1, j1)| cells.iter().all(|&(i2, j2)| i1 >= i2 || j1 <= j2))
}
