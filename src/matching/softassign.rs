//! Softassign update and Sinkhorn normalization.
//!
//! These are the two inner steps of the annealing loop. Both operate in place
//! on caller-owned buffers so the engine can reuse its matrices across
//! iterations.

use crate::core::graph::ContactGraph;
use crate::core::matrix::MatchMatrix;
use crate::core::types::Orientation;

/// Largest exponent passed to `exp`; `exp(709)` is still finite in f64
pub const MAX_EXPONENT: f64 = 709.0;

/// Weight of a shared contact given the two sequence separations.
///
/// `scale` stretches separations in the smaller graph to the size of the
/// larger one before comparing.
#[inline]
pub fn separation_weight(scale: f64, d1: usize, d2: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let diff = (scale * d1 as f64 - d2 as f64).abs();
    1.0 / (1.0 + 0.1 * diff)
}

/// Compute compatibility coefficients from `prev` and write `exp(beta * Q)`
/// into the real cells of `m`.
///
/// `q` receives the raw coefficients. Slack cells of `m` are left untouched.
/// Rows index nodes of `rows`, columns nodes of `cols`.
pub fn update_assignment(
    rows: &ContactGraph,
    cols: &ContactGraph,
    scale: f64,
    beta: f64,
    prev: &MatchMatrix,
    q: &mut MatchMatrix,
    m: &mut MatchMatrix,
) {
    for i in 0..rows.node_count() {
        for j in 0..cols.node_count() {
            let coefficient = compatibility(rows, cols, scale, prev, i, j);
            q[(i, j)] = coefficient;
            m[(i, j)] = (beta * coefficient).min(MAX_EXPONENT).exp();
        }
    }
}

/// Compatibility of pairing node `i` of `rows` with node `j` of `cols`
fn compatibility(
    rows: &ContactGraph,
    cols: &ContactGraph,
    scale: f64,
    prev: &MatchMatrix,
    i: usize,
    j: usize,
) -> f64 {
    let mut sum = 0.0;
    for &k in rows.neighbors(i) {
        let d1 = i.abs_diff(k);
        for &l in cols.neighbors(j) {
            if Orientation::agrees(i, k, j, l) {
                let d2 = j.abs_diff(l);
                sum += separation_weight(scale, d1, d2) * prev[(k, l)];
            }
        }
    }
    sum
}

/// Outcome of one Sinkhorn run
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SinkhornOutcome {
    /// Row+column passes performed
    pub iterations: usize,
    /// Change of the full matrix in the last pass
    pub residual: f64,
    /// Rows or columns left unnormalized because their sum was zero or not finite
    pub skipped: usize,
}

/// Alternately normalize rows and columns of `m` (slack included) to sum to one.
///
/// `snapshot` must have the same shape as `m`; it holds the matrix as it was
/// before the current pass. Stops after `max_iterations` passes or once the
/// change of a pass drops below `epsilon`.
pub fn sinkhorn(
    m: &mut MatchMatrix,
    snapshot: &mut MatchMatrix,
    max_iterations: usize,
    epsilon: f64,
) -> SinkhornOutcome {
    let mut outcome = SinkhornOutcome::default();

    for _ in 0..max_iterations {
        snapshot.copy_from(m);
        outcome.iterations += 1;

        for i in 0..m.rows() {
            let sum = m.row_sum(i);
            if is_degenerate(sum) {
                outcome.skipped += 1;
                continue;
            }
            for v in m.row_mut(i) {
                *v /= sum;
            }
        }

        for j in 0..m.cols() {
            let sum = m.col_sum(j);
            if is_degenerate(sum) {
                outcome.skipped += 1;
                continue;
            }
            for i in 0..m.rows() {
                m[(i, j)] /= sum;
            }
        }

        outcome.residual = m.abs_diff_sum(snapshot, m.rows(), m.cols());
        if outcome.residual < epsilon {
            break;
        }
    }

    outcome
}

#[inline]
fn is_degenerate(sum: f64) -> bool {
    sum == 0.0 || !sum.is_finite()
}
