//! Common test utilities for integration tests.

#![allow(dead_code)]

use noodles_core::flow::Edge;
use noodles_core::testing::MockClock;
use noodles_core::traits::{MemoryStore, Operator};
use noodles_core::types::OperatorId;
use noodles_executor::config::EngineConfig;
use noodles_executor::engine::OperatorEngine;
use noodles_operators::{
    AddOp, CollectionOp, ForLoopBeginOp, ForLoopEndOp, ForLoopMetaOp, ViewerOp, connect,
    connect_loop,
};
use std::sync::Arc;

pub fn id(s: &str) -> OperatorId {
    OperatorId::new(s)
}

pub fn ids(names: &[&str]) -> Vec<OperatorId> {
    names.iter().map(|s| id(s)).collect()
}

/// Store holding the given operators.
pub fn store_of(ops: &[Arc<dyn Operator>]) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for op in ops {
        store.insert(Arc::clone(op));
    }
    store
}

/// Engine over `store` driven by a mock clock.
pub fn engine(store: Arc<MemoryStore>, config: EngineConfig) -> (Arc<OperatorEngine>, Arc<MockClock>) {
    let clock = Arc::new(MockClock::new());
    let engine = OperatorEngine::new(store, config).with_clock(clock.clone());
    (Arc::new(engine), clock)
}

/// A running-sum loop over a collection:
///
/// ```text
/// list -> begin.data
/// begin.d -> add.a
/// meta.accumulator -> add.b
/// add.out -> end.item
/// add.out ~> meta.currentValue   (loop carry)
/// end.data -> viewer.in
/// ```
pub struct RunningSum {
    pub list: Arc<CollectionOp>,
    pub begin: Arc<ForLoopBeginOp>,
    pub meta: Arc<ForLoopMetaOp>,
    pub add: Arc<AddOp>,
    pub end: Arc<ForLoopEndOp>,
    pub viewer: Arc<ViewerOp>,
    pub edges: Vec<Edge>,
}

impl RunningSum {
    pub fn new(values: &[i64]) -> Self {
        let list = Arc::new(CollectionOp::new("/list", values.iter().copied()));
        let begin = Arc::new(ForLoopBeginOp::new("/begin"));
        let meta = Arc::new(ForLoopMetaOp::new("/meta", 0));
        let add = Arc::new(AddOp::new("/add"));
        let end = Arc::new(ForLoopEndOp::new("/end"));
        let viewer = Arc::new(ViewerOp::new("/viewer"));

        let edges = vec![
            connect(&list, "out", &*begin, "data").unwrap(),
            connect(&begin, "d", &*add, "a").unwrap(),
            connect(&meta, "accumulator", &*add, "b").unwrap(),
            connect(&add, "out", &*end, "item").unwrap(),
            connect_loop(&add, "out", &*meta, "currentValue").unwrap(),
            connect(&end, "data", &*viewer, "in").unwrap(),
        ];

        Self {
            list,
            begin,
            meta,
            add,
            end,
            viewer,
            edges,
        }
    }

    pub fn operators(&self) -> Vec<Arc<dyn Operator>> {
        let ops: [Arc<dyn Operator>; 6] = [
            self.list.clone(),
            self.begin.clone(),
            self.meta.clone(),
            self.add.clone(),
            self.end.clone(),
            self.viewer.clone(),
        ];
        Vec::from(ops)
    }

    /// Engine with every operator registered and edges built.
    pub fn engine(&self, config: EngineConfig) -> Arc<OperatorEngine> {
        let (engine, _) = engine(store_of(&self.operators()), config);
        engine.build_from_edges(&self.edges);
        engine
    }
}
