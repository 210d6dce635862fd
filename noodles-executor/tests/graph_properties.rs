//! Integration tests for ordering, levels, graph mutation and dirty cascade.
//!
//! Tests verify that:
//! - Sorting respects every edge and reports cycles
//! - Levels place every dependency in an earlier level
//! - Edges that would close a cycle are rejected without side effects
//! - Dirty marks cascade downstream
//! - The cached order is reused until the shape changes

mod common;

use common::{engine, id, ids, store_of};
use noodles_core::error::NoodlesError;
use noodles_core::flow::Edge;
use noodles_core::traits::Operator;
use noodles_executor::config::EngineConfig;
use noodles_executor::engine::OperatorEngine;
use noodles_executor::scheduler::{compute_levels, topological_sort};
use noodles_executor::testing::StubOperator;
use std::collections::HashMap;
use std::sync::Arc;

/// Deterministic pseudo-random DAGs: edges only go from lower to higher
/// rank, and nodes are listed in a scrambled order.
fn random_dags() -> Vec<(Vec<u32>, Vec<(u32, u32)>)> {
    let mut seed: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut next = move || {
        seed = seed
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (seed >> 33) as u32
    };

    (0..25)
        .map(|_| {
            let n = 2 + next() % 14;
            let mut nodes: Vec<u32> = (0..n).collect();
            for i in (1..nodes.len()).rev() {
                let j = next() as usize % (i + 1);
                nodes.swap(i, j);
            }
            let mut edges = Vec::new();
            for s in 0..n {
                for t in (s + 1)..n {
                    if next() % 3 == 0 {
                        edges.push((s, t));
                    }
                }
            }
            (nodes, edges)
        })
        .collect()
}

fn stub_engine(names: &[&str]) -> Arc<OperatorEngine> {
    let ops: Vec<Arc<dyn Operator>> = names
        .iter()
        .map(|n| StubOperator::transform(*n) as Arc<dyn Operator>)
        .collect();
    let (engine, _) = engine(store_of(&ops), EngineConfig::default());
    engine.build_from_edges(&[]);
    engine
}

fn diamond() -> Arc<OperatorEngine> {
    let engine = stub_engine(&["A", "B", "C"]);
    engine.add_edge(&id("A"), &id("B")).unwrap();
    engine.add_edge(&id("A"), &id("C")).unwrap();
    engine.add_edge(&id("B"), &id("C")).unwrap();
    engine
}

#[test]
fn acyclic_sort_respects_every_edge() {
    for (nodes, edges) in random_dags() {
        let outcome = topological_sort(&nodes, &edges);
        assert!(outcome.is_acyclic());
        assert_eq!(outcome.sorted.len(), nodes.len());

        let position: HashMap<u32, usize> = outcome
            .sorted
            .iter()
            .enumerate()
            .map(|(i, n)| (*n, i))
            .collect();
        for (s, t) in &edges {
            assert!(position[s] < position[t], "edge {s}->{t} out of order");
        }
    }
}

#[test]
fn three_cycle_is_detected() {
    let nodes = ["A", "B", "C"];
    let edges = [("A", "B"), ("B", "C"), ("C", "A")];
    let outcome = topological_sort(&nodes, &edges);

    assert!(outcome.sorted.len() < 3);
    let rotations = [["A", "B", "C"], ["B", "C", "A"], ["C", "A", "B"]];
    assert!(
        outcome
            .cycles
            .iter()
            .any(|c| rotations.iter().any(|r| c.as_slice() == r)),
        "cycles: {:?}",
        outcome.cycles
    );
}

#[test]
fn levels_place_dependencies_earlier() {
    for (nodes, edges) in random_dags() {
        let sorted = topological_sort(&nodes, &edges).sorted;
        let levels = compute_levels(&sorted, &edges);

        let level_of: HashMap<u32, usize> = levels
            .iter()
            .enumerate()
            .flat_map(|(depth, level)| level.iter().map(move |n| (*n, depth)))
            .collect();
        assert_eq!(level_of.len(), nodes.len());
        for (s, t) in &edges {
            assert!(level_of[s] < level_of[t]);
        }
    }
}

#[test]
fn add_edge_rejects_back_edge_without_mutation() {
    let engine = stub_engine(&["A", "B"]);
    engine.add_edge(&id("A"), &id("B")).unwrap();
    let before = engine.stats().edge_count;

    let err = engine.add_edge(&id("B"), &id("A")).unwrap_err();
    assert!(matches!(err, NoodlesError::Cycle { .. }));
    let path = err.cycle_path().unwrap();
    assert!(path.contains(&id("A")) && path.contains(&id("B")));

    assert_eq!(engine.stats().edge_count, before);
    assert_eq!(engine.downstream(&id("B")), Vec::<noodles_core::types::OperatorId>::new());
}

#[test]
fn would_create_cycle_matches_add_edge() {
    let engine = diamond();
    let pairs = [("C", "A"), ("C", "B"), ("B", "A"), ("A", "C"), ("C", "C")];

    for (s, t) in pairs {
        let predicted = engine.would_create_cycle(&id(s), &id(t)).unwrap();
        let rejected = matches!(
            engine.add_edge(&id(s), &id(t)),
            Err(NoodlesError::Cycle { .. })
        );
        assert_eq!(predicted, rejected, "{s}->{t}");
        if !rejected {
            engine.remove_edge(&id(s), &id(t)).unwrap();
        }
    }
}

#[test]
fn edges_to_unregistered_operators_are_rejected() {
    let engine = stub_engine(&["A"]);

    let err = engine.add_edge(&id("A"), &id("ghost")).unwrap_err();
    assert!(matches!(err, NoodlesError::UnknownOperator { .. }));
    assert_eq!(err.code(), "E102");
    assert!(engine.add_edge(&id("ghost"), &id("A")).is_err());
    assert!(engine.would_create_cycle(&id("ghost"), &id("A")).is_err());
    assert_eq!(engine.stats().edge_count, 0);

    engine.add_node(StubOperator::transform("ghost"));
    engine.add_edge(&id("A"), &id("ghost")).unwrap();
    assert!(matches!(
        engine.add_edge(&id("ghost"), &id("A")),
        Err(NoodlesError::Cycle { .. })
    ));
    assert_eq!(engine.execution_order(), ids(&["A", "ghost"]));
}

#[test]
fn immediate_dirty_cascades_down_the_chain() {
    let ops: Vec<Arc<StubOperator>> = ["A", "B", "C"]
        .iter()
        .map(|n| StubOperator::transform(*n))
        .collect();
    let (engine, _) = engine(
        store_of(
            &ops.iter()
                .map(|op| op.clone() as Arc<dyn Operator>)
                .collect::<Vec<_>>(),
        ),
        EngineConfig::default(),
    );
    engine.build_from_edges(&[Edge::between("A", "B"), Edge::between("B", "C")]);

    assert_eq!(engine.mark_dirty(&[id("A")]), 3);
    assert!(ops.iter().all(|op| op.is_dirty()));
    assert!(engine.is_marked_dirty(&id("C")));
}

#[test]
fn execution_order_is_cached_until_shape_changes() {
    let engine = diamond();

    let first = engine.execution_order();
    let passes = engine.sort_passes();
    let second = engine.execution_order();
    assert_eq!(first, second);
    assert_eq!(engine.sort_passes(), passes);

    engine.remove_edge(&id("A"), &id("C")).unwrap();
    engine.execution_order();
    assert_eq!(engine.sort_passes(), passes + 1);
}

#[test]
fn diamond_order_and_levels() {
    let engine = diamond();
    assert_eq!(engine.execution_order(), ids(&["A", "B", "C"]));
    assert_eq!(
        engine.execution_levels(),
        vec![ids(&["A"]), ids(&["B"]), ids(&["C"])]
    );
}

#[test]
fn removing_the_middle_of_the_diamond() {
    let engine = diamond();
    engine.remove_node(&id("B"));

    assert_eq!(engine.execution_order(), ids(&["A", "C"]));
    assert_eq!(engine.downstream(&id("A")), ids(&["C"]));
    assert_eq!(engine.upstream(&id("C")), ids(&["A"]));
    assert_eq!(engine.stats().edge_count, 1);
}

#[test]
fn bulk_sync_cycles_are_skipped_not_fatal() {
    let engine = stub_engine(&["A", "B", "C"]);
    engine.build_from_edges(&[
        Edge::between("A", "B"),
        Edge::between("B", "A"),
        Edge::between("A", "C"),
    ]);

    // C sits behind the cycle and is left out with it.
    assert!(engine.execution_order().is_empty());
    assert_eq!(engine.stats().cycle_count, 1);
}
