//! End-to-end properties of the matching pipeline.

use contact_match::matching::discretize::{discretize, DiscretizationStrategy};
use contact_match::matching::noncrossing::{is_non_crossing, project_non_crossing};
use contact_match::matching::scoring::evaluate;
use contact_match::parsing::contacts::parse_graph_text;
use contact_match::{AnnealingParams, ContactGraph, MatchConfig, MatchEngine, MatchMatrix};

/// Deterministic pseudo-random contact map with a backbone and scattered
/// long-range contacts
fn contact_map(n: usize, seed: u64) -> ContactGraph {
    let mut edges: Vec<(usize, usize)> = (1..n).map(|i| (i - 1, i)).collect();
    let mut state = seed;
    for _ in 0..n {
        state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
        let i = usize::try_from(state >> 33).unwrap() % n;
        state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
        let j = usize::try_from(state >> 33).unwrap() % n;
        if i.abs_diff(j) > 2 {
            edges.push((i.min(j), i.max(j)));
        }
    }
    ContactGraph::from_edges(n, &edges).unwrap()
}

#[test]
fn test_self_match_preserves_every_contact() {
    let graph = contact_map(15, 7);
    let result = MatchEngine::new().run(&graph, &graph);

    assert!(result.feasible);
    assert!((result.score - 1.0).abs() < 1e-9);
    assert_eq!(
        result.common_contacts,
        i64::try_from(graph.edge_count()).unwrap()
    );
}

#[test]
fn test_edgeless_graph() {
    let edgeless = ContactGraph::from_edges(5, &[]).unwrap();
    let other = contact_map(9, 3);

    for (a, b) in [(&edgeless, &other), (&other, &edgeless)] {
        let result = MatchEngine::new().run(a, b);
        assert!(result.feasible);
        assert!(result.score.abs() < 1e-12);
        assert_eq!(result.common_contacts, 0);
    }
}

#[test]
fn test_runs_are_bit_identical() {
    let a = contact_map(12, 11);
    let b = contact_map(17, 23);
    let engine = MatchEngine::new();

    let first = engine.run(&a, &b);
    let second = engine.run(&a, &b);
    assert_eq!(first.matching, second.matching);
    assert_eq!(first.score.to_bits(), second.score.to_bits());
    assert_eq!(first.common_contacts, second.common_contacts);

    let r1 = engine.relax(&a, &b);
    let r2 = engine.relax(&a, &b);
    let bits = |m: &MatchMatrix| m.as_slice().iter().map(|v| v.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&r1.matrix), bits(&r2.matrix));
}

#[test]
fn test_square_relaxation_is_balanced() {
    let graph = contact_map(10, 5);
    let engine = MatchEngine::new();
    let eps1 = engine.config().params.eps1;
    let relaxation = engine.relax(&graph, &graph);
    let m = &relaxation.matrix;

    // a square matrix with slack can be balanced in both directions
    assert!(relaxation.state.err1 < eps1);
    for j in 0..m.cols() {
        assert!((m.col_sum(j) - 1.0).abs() < 1e-9, "column {j}");
    }
    for i in 0..m.rows() {
        assert!((m.row_sum(i) - 1.0).abs() < eps1, "row {i}");
    }
}

#[test]
fn test_annealing_pass_bound() {
    let params = AnnealingParams {
        b0: 1.0,
        bf: 4.0,
        br: 1.5,
        ..AnnealingParams::default()
    };
    let bound = ((params.bf / params.b0).ln() / params.br.ln()).ceil();
    let engine = MatchEngine::with_config(MatchConfig::default().with_params(params.clone()));

    let graph = contact_map(6, 1);
    let relaxation = engine.relax(&graph, &graph);
    #[allow(clippy::cast_precision_loss)]
    let passes = relaxation.state.outer_iterations as f64;
    assert!(passes <= bound);
    // 1.0, 1.5, 2.25, 3.375 then 5.06 stops the schedule
    assert_eq!(relaxation.state.outer_iterations, 4);
    assert!(relaxation.state.beta >= params.bf);
    assert!(relaxation.state.iterations <= 4 * params.i0);
}

#[test]
fn test_discretization_is_partial_permutation() {
    let a = contact_map(8, 2);
    let b = contact_map(13, 9);
    let relaxation = MatchEngine::new().relax(&a, &b);

    for strategy in [DiscretizationStrategy::Greedy, DiscretizationStrategy::Optimal] {
        let discrete = discretize(&relaxation.matrix, 8, 13, strategy);
        assert_eq!((discrete.rows(), discrete.cols()), (8, 13));
        assert!(discrete.is_partial_permutation());
        // the smaller side is fully assigned
        assert_eq!(discrete.selected().len(), 8);
    }
}

#[test]
fn test_projection_removes_crossing() {
    // contacts 0-1 and 1-2 in the first map, 0-2 and 1-2 in the second
    let a = parse_graph_text("3\n0 1\n1 2\n").unwrap();
    let b = parse_graph_text("3\n0 2\n1 2\n").unwrap();

    let mut crossing = MatchMatrix::new(3, 3);
    crossing[(0, 1)] = 1.0;
    crossing[(1, 0)] = 1.0;
    crossing[(2, 2)] = 1.0;
    assert!(!is_non_crossing(&crossing));

    let projected = project_non_crossing(&crossing);
    assert!(is_non_crossing(&projected));
    assert_eq!(projected.selected(), vec![(1, 0), (2, 2)]);
    assert!(evaluate(&projected, &a, &b).is_feasible());

    let result = MatchEngine::new().run(&a, &b);
    assert!(result.feasible);
    assert!(is_non_crossing(&result.matching));
}

#[test]
fn test_feasible_scores_are_bounded() {
    for seed in 0..6 {
        let a = contact_map(9 + seed, seed as u64);
        let b = contact_map(14, seed as u64 + 100);
        let result = MatchEngine::new().run(&a, &b);

        assert!(is_non_crossing(&result.matching));
        assert!(result.feasible, "seed {seed}");
        assert!((0.0..=1.0).contains(&result.score), "seed {seed}");
        assert!(result.common_contacts >= 0);
    }
}

#[test]
fn test_parsed_graph_is_symmetric() {
    let graph = parse_graph_text("# toy map\n5\n0 3\n4 1 0.5 0.5\n2 2\n3 0\n").unwrap();
    assert_eq!(graph.edge_count(), 2);
    for i in 0..5 {
        for j in 0..5 {
            assert_eq!(graph.is_adjacent(i, j), graph.is_adjacent(j, i));
        }
    }
}
