use std::path::Path;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::graph::ContactGraph;
use crate::core::matrix::MatchMatrix;
use crate::core::types::NodePair;
use crate::matching::alignment::{AlignmentError, SequenceAlignment};
use crate::matching::discretize::{discretize, DiscretizationStrategy};
use crate::matching::noncrossing::project_non_crossing;
use crate::matching::scoring::{evaluate, round_score, Evaluation};
use crate::matching::softassign::{sinkhorn, update_assignment};
use crate::utils::validation::{
    require_greater, require_iterations, require_positive, ParamsError,
};

/// Initial value of every cell, slack included, before the first update
const INITIAL_MATCH_VALUE: f64 = 0.1;

/// Tunables of the annealing schedule.
///
/// `b` is the inverse temperature: it starts at `b0` and is multiplied by `br`
/// after every outer pass until it reaches `bf`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnealingParams {
    /// Initial inverse temperature
    pub b0: f64,
    /// Final inverse temperature
    pub bf: f64,
    /// Growth factor of the inverse temperature per outer pass
    pub br: f64,
    /// Maximum assignment iterations per temperature
    pub i0: usize,
    /// Maximum Sinkhorn passes per assignment iteration
    pub i1: usize,
    /// Convergence threshold of the assignment loop
    pub eps0: f64,
    /// Convergence threshold of the Sinkhorn loop
    pub eps1: f64,
}

impl Default for AnnealingParams {
    fn default() -> Self {
        Self {
            b0: 0.5,
            bf: 10.0,
            br: 1.075,
            i0: 4,
            i1: 30,
            eps0: 0.5,
            eps1: 0.05,
        }
    }
}

impl AnnealingParams {
    /// Check that the schedule is well formed and terminates.
    ///
    /// # Errors
    ///
    /// Returns `ParamsError::InvalidValue` naming the first offending parameter.
    pub fn validate(&self) -> Result<(), ParamsError> {
        require_positive("b0", self.b0)?;
        require_greater("bf", self.bf, "b0", self.b0)?;
        require_greater("br", self.br, "1", 1.0)?;
        require_iterations("i0", self.i0)?;
        require_iterations("i1", self.i1)?;
        require_positive("eps0", self.eps0)?;
        require_positive("eps1", self.eps1)?;
        Ok(())
    }

    /// Load parameters from a JSON object; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ParamsError::Io` if the file cannot be read,
    /// `ParamsError::Json` if it is not valid JSON, or
    /// `ParamsError::InvalidValue` if the values fail validation.
    pub fn load_from_file(path: &Path) -> Result<Self, ParamsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse parameters from a JSON string; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ParamsError::Json` for invalid JSON or
    /// `ParamsError::InvalidValue` if the values fail validation.
    pub fn from_json(json: &str) -> Result<Self, ParamsError> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Number of outer passes the schedule performs:
    /// `floor(log10(bf / b0) / log10(br)) + 1`
    pub fn expected_outer_iterations(&self) -> usize {
        let passes = ((self.bf / self.b0).log10() / self.br.log10()).floor();
        if passes.is_finite() && passes >= 0.0 {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let passes = passes as usize;
            passes + 1
        } else {
            1
        }
    }
}

/// Configuration of a matching run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub params: AnnealingParams,
    /// How the relaxed matrix is discretized
    pub strategy: DiscretizationStrategy,
    /// Stop after this many outer passes even if `bf` is not reached
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_outer_iterations: Option<usize>,
}

impl MatchConfig {
    #[must_use]
    pub fn with_params(mut self, params: AnnealingParams) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: DiscretizationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_max_outer_iterations(mut self, max: usize) -> Self {
        self.max_outer_iterations = Some(max);
        self
    }
}

/// Receives progress updates after each outer pass
pub trait ProgressObserver {
    /// `percent` is the share of expected outer passes completed so far
    fn on_progress(&mut self, percent: f64);
}

impl<F: FnMut(f64)> ProgressObserver for F {
    fn on_progress(&mut self, percent: f64) {
        self(percent);
    }
}

/// Transient state of one annealing run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnealingState {
    /// Current inverse temperature
    pub beta: f64,
    /// Completed outer passes
    pub outer_iterations: usize,
    /// Completed assignment iterations across all passes
    pub iterations: usize,
    /// Change of the real block over the last assignment iteration
    pub err0: f64,
    /// Change of the full matrix over the last Sinkhorn pass
    pub err1: f64,
    /// Rows or columns skipped by Sinkhorn because their sum was degenerate
    pub degenerate_normalizations: usize,
    /// False if the run was cut short by `max_outer_iterations`
    pub converged: bool,
}

/// Continuous match matrix after annealing, slack included
#[derive(Debug, Clone)]
pub struct Relaxation {
    pub matrix: MatchMatrix,
    pub state: AnnealingState,
}

/// Result of matching two contact graphs
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// Discrete non-crossing matching; rows are nodes of the smaller graph
    pub matching: MatchMatrix,

    /// Feasibility and unrounded score
    pub evaluation: Evaluation,

    /// Score rounded to two decimals, `-1` when infeasible
    pub score: f64,

    /// Preserved contacts, `-1` when infeasible
    pub common_contacts: i64,

    pub feasible: bool,

    /// Assignment iterations over the whole run
    pub iterations: usize,

    /// Outer (annealing) passes
    pub outer_iterations: usize,

    /// False if the run stopped at `max_outer_iterations`
    pub converged: bool,

    pub elapsed: Duration,

    /// True if matrix rows correspond to the first graph passed to `run`.
    ///
    /// Only the case when the first graph has strictly fewer nodes.
    pub preserved_input_order: bool,
}

impl MatchResult {
    /// Matched node pairs oriented as the graphs were passed to `run`, sorted
    pub fn pairs(&self) -> Vec<NodePair> {
        let mut pairs: Vec<NodePair> = self
            .matching
            .selected()
            .into_iter()
            .map(|(i, j)| {
                let pair = NodePair::new(i, j);
                if self.preserved_input_order {
                    pair
                } else {
                    pair.swapped()
                }
            })
            .collect();
        pairs.sort_unstable();
        pairs
    }

    /// Pseudo sequence alignment of the two graphs, in `run` argument order.
    ///
    /// # Errors
    ///
    /// Returns `AlignmentError::LengthMismatch` if a sequence length differs
    /// from its graph's node count.
    pub fn alignment(
        &self,
        first: &ContactGraph,
        second: &ContactGraph,
        seq_first: Option<&str>,
        seq_second: Option<&str>,
    ) -> Result<SequenceAlignment, AlignmentError> {
        SequenceAlignment::from_pairs(
            &self.pairs(),
            first.node_count(),
            second.node_count(),
            seq_first,
            seq_second,
        )
    }
}

/// Softassign matcher for contact graphs
#[derive(Debug, Clone, Default)]
pub struct MatchEngine {
    config: MatchConfig,
}

impl MatchEngine {
    /// Create an engine with default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with a custom configuration
    pub fn with_config(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Number of outer passes a full run performs
    pub fn expected_outer_iterations(&self) -> usize {
        let expected = self.config.params.expected_outer_iterations();
        match self.config.max_outer_iterations {
            Some(max) => expected.min(max),
            None => expected,
        }
    }

    /// Match two graphs
    pub fn run(&self, first: &ContactGraph, second: &ContactGraph) -> MatchResult {
        self.run_inner(first, second, None)
    }

    /// Match two graphs, reporting progress after each outer pass
    pub fn run_with_progress(
        &self,
        first: &ContactGraph,
        second: &ContactGraph,
        observer: &mut dyn ProgressObserver,
    ) -> MatchResult {
        self.run_inner(first, second, Some(observer))
    }

    fn run_inner(
        &self,
        first: &ContactGraph,
        second: &ContactGraph,
        observer: Option<&mut dyn ProgressObserver>,
    ) -> MatchResult {
        let start = Instant::now();

        // the strictly smaller graph indexes rows; on a tie the second one does
        let preserved_input_order = first.node_count() < second.node_count();
        let (rows, cols) = if preserved_input_order {
            (first, second)
        } else {
            (second, first)
        };
        let n1 = rows.node_count();
        let n2 = cols.node_count();

        let (matching, state) = if n1 == 0 {
            let state = AnnealingState {
                converged: true,
                ..AnnealingState::default()
            };
            (MatchMatrix::new(n1, n2), state)
        } else {
            let relaxation = self.relax_ordered(rows, cols, observer);
            let discrete = discretize(&relaxation.matrix, n1, n2, self.config.strategy);
            (project_non_crossing(&discrete), relaxation.state)
        };

        let evaluation = evaluate(&matching, rows, cols);
        let elapsed = start.elapsed();

        if let Some(violation) = evaluation.violation() {
            debug!(
                pair = %violation.pair,
                neighbor = %violation.neighbor,
                "Matching is infeasible"
            );
        }

        let result = MatchResult {
            matching,
            score: round_score(evaluation.score()),
            common_contacts: evaluation.common_contacts(),
            feasible: evaluation.is_feasible(),
            evaluation,
            iterations: state.iterations,
            outer_iterations: state.outer_iterations,
            converged: state.converged,
            elapsed,
            preserved_input_order,
        };

        info!(
            first = first.display_name(),
            second = second.display_name(),
            n1,
            n2,
            iterations = result.iterations,
            elapsed_secs = elapsed.as_secs_f64(),
            score = result.score,
            feasible = result.feasible,
            "Matching finished"
        );

        result
    }

    /// Run the annealing schedule and return the continuous match matrix.
    ///
    /// Rows of the returned `(n1 + 1) x (n2 + 1)` matrix are nodes of the
    /// smaller graph, as in [`MatchEngine::run`].
    pub fn relax(&self, first: &ContactGraph, second: &ContactGraph) -> Relaxation {
        if first.node_count() < second.node_count() {
            self.relax_ordered(first, second, None)
        } else {
            self.relax_ordered(second, first, None)
        }
    }

    fn relax_ordered(
        &self,
        rows: &ContactGraph,
        cols: &ContactGraph,
        mut observer: Option<&mut dyn ProgressObserver>,
    ) -> Relaxation {
        let params = &self.config.params;
        let n1 = rows.node_count();
        let n2 = cols.node_count();

        let mut m = MatchMatrix::filled(n1 + 1, n2 + 1, INITIAL_MATCH_VALUE);
        let mut m0 = MatchMatrix::new(n1 + 1, n2 + 1);
        let mut m1 = MatchMatrix::new(n1 + 1, n2 + 1);
        let mut q = MatchMatrix::new(n1, n2);

        if n1 == 0 {
            return Relaxation {
                matrix: m,
                state: AnnealingState {
                    beta: params.b0,
                    converged: true,
                    ..AnnealingState::default()
                },
            };
        }

        #[allow(clippy::cast_precision_loss)]
        let scale = n2 as f64 / n1 as f64;
        let expected = self.expected_outer_iterations();

        let mut state = AnnealingState {
            beta: params.b0,
            converged: true,
            ..AnnealingState::default()
        };

        while state.beta < params.bf {
            if let Some(max) = self.config.max_outer_iterations {
                if state.outer_iterations >= max {
                    state.converged = false;
                    break;
                }
            }

            for _ in 0..params.i0 {
                state.iterations += 1;
                m0.copy_from(&m);

                update_assignment(rows, cols, scale, state.beta, &m0, &mut q, &mut m);

                let outcome = sinkhorn(&mut m, &mut m1, params.i1, params.eps1);
                state.err1 = outcome.residual;
                if outcome.skipped > 0 {
                    if state.degenerate_normalizations == 0 {
                        warn!(
                            beta = state.beta,
                            skipped = outcome.skipped,
                            "Zero or non-finite sums during normalization, leaving them unscaled"
                        );
                    }
                    state.degenerate_normalizations += outcome.skipped;
                }

                state.err0 = m.abs_diff_sum(&m0, n1, n2);
                if state.err0 < params.eps0 {
                    break;
                }
            }

            debug!(
                beta = state.beta,
                iterations = state.iterations,
                err0 = state.err0,
                err1 = state.err1,
                "Annealing pass finished"
            );

            state.beta *= params.br;
            state.outer_iterations += 1;

            if let Some(obs) = observer.as_deref_mut() {
                #[allow(clippy::cast_precision_loss)]
                let percent = 100.0 * state.outer_iterations as f64 / expected.max(1) as f64;
                obs.on_progress(percent.min(100.0));
            }
        }

        Relaxation { matrix: m, state }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::noncrossing::is_non_crossing;

    fn path(n: usize) -> ContactGraph {
        let edges: Vec<_> = (1..n).map(|i| (i - 1, i)).collect();
        ContactGraph::from_edges(n, &edges).unwrap()
    }

    /// Path plus a few irregular longer-range contacts
    fn folded(n: usize) -> ContactGraph {
        let mut edges: Vec<_> = (1..n).map(|i| (i - 1, i)).collect();
        let extra = [(0, 4), (1, 8), (3, 7), (5, 11), (6, 10), (9, 13)];
        edges.extend(extra.into_iter().filter(|&(_, j)| j < n));
        ContactGraph::from_edges(n, &edges).unwrap()
    }

    #[test]
    fn test_default_params() {
        let params = AnnealingParams::default();
        assert!((params.b0 - 0.5).abs() < 1e-12);
        assert!((params.bf - 10.0).abs() < 1e-12);
        assert!((params.br - 1.075).abs() < 1e-12);
        assert_eq!(params.i0, 4);
        assert_eq!(params.i1, 30);
        assert!((params.eps0 - 0.5).abs() < 1e-12);
        assert!((params.eps1 - 0.05).abs() < 1e-12);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_schedules() {
        let bad = [
            AnnealingParams { b0: 0.0, ..Default::default() },
            AnnealingParams { bf: 0.4, ..Default::default() },
            AnnealingParams { br: 1.0, ..Default::default() },
            AnnealingParams { i0: 0, ..Default::default() },
            AnnealingParams { i1: 0, ..Default::default() },
            AnnealingParams { eps1: -0.1, ..Default::default() },
        ];
        for params in bad {
            assert!(params.validate().is_err(), "{params:?} should be rejected");
        }
    }

    #[test]
    fn test_params_from_partial_json() {
        let params = AnnealingParams::from_json(r#"{"bf": 5.0, "i0": 2}"#).unwrap();
        assert!((params.bf - 5.0).abs() < 1e-12);
        assert_eq!(params.i0, 2);
        assert_eq!(params.i1, 30);

        assert!(AnnealingParams::from_json(r#"{"br": 0.9}"#).is_err());
        assert!(AnnealingParams::from_json("not json").is_err());
    }

    #[test]
    fn test_expected_outer_iterations() {
        let params = AnnealingParams::default();
        // log(20) / log(1.075) = 41.4...
        assert_eq!(params.expected_outer_iterations(), 42);
    }

    #[test]
    fn test_outer_passes_match_schedule() {
        let g = path(5);
        let engine = MatchEngine::new();
        let relaxation = engine.relax(&g, &g);
        assert_eq!(
            relaxation.state.outer_iterations,
            engine.expected_outer_iterations()
        );
        assert!(relaxation.state.beta >= engine.config().params.bf);
        assert!(relaxation.state.converged);
    }

    #[test]
    fn test_relaxation_columns_are_normalized() {
        let a = folded(8);
        let b = folded(11);
        let engine = MatchEngine::new();
        let relaxation = engine.relax(&a, &b);
        let m = &relaxation.matrix;
        assert_eq!((m.rows(), m.cols()), (9, 12));

        // columns are normalized last
        for j in 0..m.cols() {
            assert!((m.col_sum(j) - 1.0).abs() < 1e-9);
        }
        assert!(m.as_slice().iter().all(|v| (0.0..=1.0 + 1e-9).contains(v)));
    }

    #[test]
    fn test_self_match_is_identity() {
        let g = folded(12);
        let result = MatchEngine::new().run(&g, &g);
        assert!(result.feasible);
        assert!((result.score - 1.0).abs() < 1e-9);
        assert_eq!(result.common_contacts, i64::try_from(g.edge_count()).unwrap());
        let expected: Vec<_> = (0..12).map(|i| NodePair::new(i, i)).collect();
        assert_eq!(result.pairs(), expected);
    }

    #[test]
    fn test_deterministic() {
        let a = folded(9);
        let b = folded(13);
        let engine = MatchEngine::new();
        let r1 = engine.run(&a, &b);
        let r2 = engine.run(&a, &b);
        assert_eq!(r1.matching, r2.matching);
        assert_eq!(r1.score.to_bits(), r2.score.to_bits());
        assert_eq!(r1.common_contacts, r2.common_contacts);
        assert_eq!(r1.iterations, r2.iterations);
    }

    #[test]
    fn test_output_is_non_crossing_partial_permutation() {
        let a = folded(10);
        let b = path(14);
        let result = MatchEngine::new().run(&a, &b);
        assert!(result.matching.is_partial_permutation());
        assert!(is_non_crossing(&result.matching));
        assert!(result.feasible);
        assert!((0.0..=1.0).contains(&result.score));
    }

    #[test]
    fn test_operand_order_is_restored() {
        let small = folded(6);
        let large = folded(9);
        let engine = MatchEngine::new();

        let forward = engine.run(&small, &large);
        let backward = engine.run(&large, &small);
        assert!(forward.preserved_input_order);
        assert!(!backward.preserved_input_order);

        let mut swapped: Vec<_> = forward.pairs().into_iter().map(NodePair::swapped).collect();
        swapped.sort_unstable();
        assert_eq!(backward.pairs(), swapped);
        assert_eq!(backward.score.to_bits(), forward.score.to_bits());
        for pair in backward.pairs() {
            assert!(pair.first < large.node_count());
            assert!(pair.second < small.node_count());
        }
    }

    #[test]
    fn test_equal_sizes_swap_operands() {
        let a = ContactGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]).unwrap();
        let b = ContactGraph::from_edges(4, &[(0, 1), (1, 3), (2, 3)]).unwrap();
        let engine = MatchEngine::new();

        let forward = engine.run(&a, &b);
        let backward = engine.run(&b, &a);
        assert!(!forward.preserved_input_order);
        assert!(!backward.preserved_input_order);

        // rows follow the second argument, pairs follow the caller
        let rows_are_b = engine.relax(&a, &b);
        assert_eq!(rows_are_b.matrix.rows(), 5);
        for pair in forward.pairs() {
            assert!(forward.matching[(pair.second, pair.first)] > 0.0);
        }
        for pair in backward.pairs() {
            assert!(backward.matching[(pair.second, pair.first)] > 0.0);
        }
    }

    #[test]
    fn test_empty_graph() {
        let empty = ContactGraph::from_edges(0, &[]).unwrap();
        let g = path(4);
        let result = MatchEngine::new().run(&empty, &g);
        assert!(result.feasible);
        assert!(result.score.abs() < 1e-12);
        assert_eq!(result.common_contacts, 0);
        assert!(result.pairs().is_empty());
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn test_edgeless_graph_scores_zero() {
        let isolated = ContactGraph::from_edges(4, &[]).unwrap();
        let g = folded(6);
        let result = MatchEngine::new().run(&isolated, &g);
        assert!(result.feasible);
        assert!(result.score.abs() < 1e-12);
        assert_eq!(result.common_contacts, 0);
    }

    #[test]
    fn test_progress_reaches_hundred() {
        let g = path(4);
        let mut reports = Vec::new();
        let mut observer = |percent: f64| reports.push(percent);
        let engine = MatchEngine::new();
        engine.run_with_progress(&g, &g, &mut observer);

        assert_eq!(reports.len(), engine.expected_outer_iterations());
        assert!(reports.windows(2).all(|w| w[0] < w[1]));
        assert!((reports.last().copied().unwrap_or_default() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_outer_iteration_cap() {
        let g = folded(7);
        let engine = MatchEngine::with_config(MatchConfig::default().with_max_outer_iterations(3));
        let result = engine.run(&g, &g);
        assert_eq!(result.outer_iterations, 3);
        assert!(!result.converged);
        assert!(result.iterations <= 3 * engine.config().params.i0);
        assert!(result.matching.is_partial_permutation());
    }

    #[test]
    fn test_optimal_strategy_runs() {
        let a = folded(8);
        let b = folded(10);
        let config = MatchConfig::default().with_strategy(DiscretizationStrategy::Optimal);
        let result = MatchEngine::with_config(config).run(&a, &b);
        assert!(result.feasible);
        assert!(is_non_crossing(&result.matching));
    }

    #[test]
    fn test_alignment_in_caller_order() {
        let a = path(3);
        let b = path(3);
        let result = MatchEngine::new().run(&a, &b);
        let ali = result.alignment(&a, &b, Some("ACD"), Some("EFG")).unwrap();
        assert_eq!(ali.first, "ACD");
        assert_eq!(ali.second, "EFG");
    }
}
