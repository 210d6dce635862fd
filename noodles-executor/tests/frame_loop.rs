//! Integration tests for the frame-paced execution loop.
//!
//! Tests verify that:
//! - A failing root does not affect sibling roots
//! - Overlapping frames are dropped, not queued
//! - The node set follows the operator store
//! - Batched dirty marks cascade at the flush boundary
//! - The background ticker executes frames

mod common;

use common::{engine, id, store_of};
use noodles_core::flow::Edge;
use noodles_core::testing::{ClockProvider, MockClock};
use noodles_core::traits::{MemoryStore, Operator, OperatorRole};
use noodles_core::value::Value;
use noodles_executor::config::EngineConfig;
use noodles_executor::engine::{OperatorEngine, Tick};
use noodles_executor::metrics::EngineMetrics;
use noodles_executor::testing::StubOperator;
use noodles_operators::{FailingOp, FieldOperator, NumberOp, ViewerOp, connect};
use std::sync::Arc;
use std::time::Duration;

fn isolation_engine(config: EngineConfig) -> Arc<OperatorEngine> {
    let bad = Arc::new(
        FailingOp::new("/bad", "tile server unreachable").with_role(OperatorRole::Output),
    );
    let good = Arc::new(ViewerOp::new("/good"));
    good.core().set_input("in", 5).unwrap();

    let (engine, _) = engine(store_of(&[bad, good]), config);
    engine
}

#[tokio::test]
async fn failing_root_does_not_affect_siblings() {
    let engine = isolation_engine(EngineConfig::default());
    let results = engine.execute_frame().await;

    assert_eq!(results.len(), 2);
    let bad = results.error(&id("/bad")).expect("failure recorded");
    assert!(bad.to_string().contains("tile server unreachable"));
    assert!(results.value(&id("/bad")).is_none());

    assert_eq!(results.value(&id("/good")), Some(&Value::int(5)));
    assert!(results.error(&id("/good")).is_none());
    assert_eq!(results.errors().count(), 1);
    assert_eq!(engine.metrics().root_errors, 1);
}

#[tokio::test]
async fn sequential_mode_isolates_failures_too() {
    let engine = isolation_engine(EngineConfig::default().with_parallel(false));
    let results = engine.execute_frame().await;

    assert!(results.error(&id("/bad")).is_some());
    assert_eq!(results.value(&id("/good")), Some(&Value::int(5)));
}

#[tokio::test]
async fn roots_pull_their_upstream_chain() {
    let number = Arc::new(NumberOp::new("/n", 3));
    let viewer = Arc::new(ViewerOp::new("/v"));
    let edge = connect(&number, "out", &*viewer, "in").unwrap();

    let (engine, _) = engine(
        store_of(&[number.clone(), viewer.clone()]),
        EngineConfig::default(),
    );
    engine.build_from_edges(&[edge]);

    let results = engine.execute_frame().await;
    assert_eq!(results.len(), 1);
    assert_eq!(results.value(&id("/v")), Some(&Value::int(3)));
    assert!(results.get(&id("/v")).unwrap().changed);

    number.set_value(4);
    engine.mark_dirty(&[id("/n")]);
    assert!(viewer.is_dirty());

    let results = engine.execute_frame().await;
    assert_eq!(results.value(&id("/v")), Some(&Value::int(4)));
    assert_eq!(viewer.render_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn overlapping_frame_is_skipped() {
    let slow = Arc::new(
        StubOperator::new("slow", OperatorRole::Viewer)
            .with_value(1)
            .with_delay(Duration::from_millis(50)),
    );
    let (engine, _) = engine(store_of(&[slow.clone()]), EngineConfig::default());

    let first = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move { engine.execute_frame().await }
    });
    // Let the first frame reach the delayed pull.
    tokio::task::yield_now().await;
    assert!(engine.is_pulling());

    let second = engine.execute_frame().await;
    assert!(second.skipped);
    assert!(second.is_empty());

    let first = first.await.unwrap();
    assert!(!first.skipped);
    assert_eq!(first.frame, 1);
    assert!(!engine.is_pulling());
    assert_eq!(slow.pull_count(), 1);
    assert_eq!(engine.metrics().frames_skipped, 1);
}

#[tokio::test]
async fn tick_drops_frames_while_one_is_in_flight() {
    let viewer = StubOperator::sink("v");
    let (engine, clock) = engine(
        store_of(&[viewer]),
        EngineConfig::default().with_target_fps(50),
    );

    clock.advance(Duration::from_millis(20));
    let Tick::Started(handle) = engine.tick() else {
        panic!("frame should start");
    };

    // The spawned frame has not been polled yet, so the guard is still held.
    clock.advance(Duration::from_millis(20));
    assert!(matches!(engine.tick(), Tick::Skipped));

    handle.await.unwrap();
    assert!(matches!(engine.tick(), Tick::Started(_)));
}

#[tokio::test]
async fn node_set_follows_the_store() {
    let store = Arc::new(MemoryStore::new());
    store.insert(StubOperator::sink("a"));
    let (engine, _) = engine(store.clone(), EngineConfig::default());

    engine.execute_frame().await;
    assert_eq!(engine.stats().node_count, 1);

    store.insert(Arc::new(StubOperator::new("b", OperatorRole::Console).dirty()));
    let results = engine.execute_frame().await;
    assert_eq!(engine.stats().node_count, 2);
    assert!(results.get(&id("b")).is_some());

    store.remove(&id("a"));
    let results = engine.execute_frame().await;
    assert_eq!(engine.stats().node_count, 1);
    assert!(results.get(&id("a")).is_none());
}

fn batched_chain() -> (Arc<OperatorEngine>, Arc<MockClock>, Vec<Arc<StubOperator>>) {
    let ops: Vec<Arc<StubOperator>> = ["a", "b", "c"]
        .iter()
        .map(|n| StubOperator::transform(*n))
        .collect();
    let (engine, clock) = engine(
        store_of(
            &ops.iter()
                .map(|op| op.clone() as Arc<dyn Operator>)
                .collect::<Vec<_>>(),
        ),
        EngineConfig::default().with_batch_delay(Duration::from_millis(10)),
    );
    engine.build_from_edges(&[Edge::between("a", "b"), Edge::between("b", "c")]);
    (engine, clock, ops)
}

#[tokio::test]
async fn batched_marks_cascade_when_the_deadline_passes() {
    let (engine, clock, ops) = batched_chain();

    engine.mark_dirty(&[id("a")]);
    assert!(ops[0].is_dirty());
    assert!(!ops[1].is_dirty());

    clock.advance(Duration::from_millis(5));
    assert!(matches!(engine.tick(), Tick::Waiting));
    assert!(!ops[1].is_dirty());

    clock.advance(Duration::from_millis(5));
    assert!(matches!(engine.tick(), Tick::Waiting));
    assert!(ops[1].is_dirty() && ops[2].is_dirty());
}

#[tokio::test]
async fn batched_marks_cascade_at_frame_start() {
    let (engine, _, ops) = batched_chain();

    engine.mark_dirty(&[id("a")]);
    engine.execute_frame().await;

    // b is not a root, so it stays dirty after the frame.
    assert!(ops[1].is_dirty());
    assert!(engine.is_marked_dirty(&id("b")));
    // c is the implicit sink and was pulled.
    assert!(!ops[2].is_dirty());
}

#[tokio::test]
async fn stop_drops_the_batch_deadline() {
    let (engine, clock, ops) = batched_chain();

    engine.mark_dirty(&[id("a")]);
    engine.stop();
    clock.advance(Duration::from_millis(12));
    engine.tick();

    assert!(!ops[1].is_dirty());
}

#[tokio::test]
async fn prometheus_mirrors_frame_metrics() {
    let store = store_of(&[StubOperator::sink("v")]);
    let metrics = EngineMetrics::shared().unwrap();
    let engine = OperatorEngine::new(store, EngineConfig::default()).with_metrics(metrics.clone());

    engine.execute_frame().await;
    engine.execute_frame().await;

    assert_eq!(metrics.frames.get(), 2);
    assert_eq!(metrics.operators.get(), 1);
    assert_eq!(engine.metrics().frames_executed, 2);
    assert!(engine.metrics().last_frame_at.is_some());
    assert!(metrics.export_text().unwrap().contains("noodles_frame_duration_seconds"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn background_ticker_executes_frames() {
    let viewer = StubOperator::sink("v");
    let store = store_of(&[viewer.clone()]);
    let engine = Arc::new(OperatorEngine::new(
        store,
        EngineConfig::default()
            .with_target_fps(200)
            .with_tick_interval(Duration::from_millis(1)),
    ));

    engine.start();
    tokio::time::sleep(Duration::from_millis(150)).await;
    engine.stop();

    assert!(!engine.is_running());
    assert!(engine.metrics().frames_executed >= 1);
    assert!(viewer.pull_count() >= 1);
}
