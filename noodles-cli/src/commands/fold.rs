//! Fold command - running sum through a for-loop scope.

use anyhow::{Context, Result};
use noodles_core::traits::{MemoryStore, Operator};
use noodles_core::value::Value;
use noodles_executor::config::EngineConfig;
use noodles_executor::engine::OperatorEngine;
use noodles_operators::{
    AddOp, CollectionOp, ForLoopBeginOp, ForLoopEndOp, ForLoopMetaOp, connect, connect_loop,
};
use std::sync::Arc;

/// Fold `values` into running sums starting from `initial`.
pub async fn run(values: &[f64], initial: f64) -> Result<()> {
    let list = Arc::new(CollectionOp::new(
        "/values",
        values.iter().map(|v| Value::number(*v)),
    ));
    let begin = Arc::new(ForLoopBeginOp::new("/begin"));
    let meta = Arc::new(ForLoopMetaOp::new("/meta", Value::number(initial)));
    let add = Arc::new(AddOp::new("/add"));
    let end = Arc::new(ForLoopEndOp::new("/end"));

    let edges = vec![
        connect(&list, "out", &*begin, "data")?,
        connect(&begin, "d", &*add, "a")?,
        connect(&meta, "accumulator", &*add, "b")?,
        connect(&add, "out", &*end, "item")?,
        connect_loop(&add, "out", &*meta, "currentValue")?,
    ];

    let store = Arc::new(MemoryStore::new());
    let ops: [Arc<dyn Operator>; 5] = [list, begin, meta, add, end];
    for op in ops {
        store.insert(op);
    }

    let engine = OperatorEngine::new(store, EngineConfig::try_from_env()?);
    engine.build_from_edges(&edges);

    let scope = engine
        .find_for_loop_scopes()
        .into_iter()
        .next()
        .context("Demo graph has no for-loop scope")?;
    let outcome = engine.execute_for_loop_scope(&scope).await?;

    println!("Results:     {}", Value::array(outcome.results));
    println!("Accumulator: {}", outcome.accumulator);
    for error in &outcome.errors {
        println!(
            "Iteration {} failed at {}: {}",
            error.iteration, error.operator_id, error.error
        );
    }

    Ok(())
}
