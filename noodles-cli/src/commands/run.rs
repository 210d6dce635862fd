//! Run command - drive a demo graph through the frame loop.

use anyhow::{Context, Result};
use noodles_core::traits::{MemoryStore, Operator, OperatorRole};
use noodles_core::types::OperatorId;
use noodles_executor::config::EngineConfig;
use noodles_executor::engine::OperatorEngine;
use noodles_executor::metrics::EngineMetrics;
use noodles_operators::{
    AddOp, ConsoleOp, FailingOp, MultiplyOp, NumberOp, RendererOp, ViewerOp, connect,
};
use std::sync::Arc;

/// The demo graph and the handles the frame loop drives.
struct Demo {
    engine: OperatorEngine,
    x: Arc<NumberOp>,
    renderer: Arc<RendererOp>,
    metrics: Arc<EngineMetrics>,
}

/// Build the demo graph.
///
/// ```text
/// x ─┬─> sum ─> viewer
/// y ─┘    └──> scaled ─> renderer
/// x ─────> console
/// broken (output sink, always fails)
/// ```
fn build_demo(config: EngineConfig) -> Result<Demo> {
    let x = Arc::new(NumberOp::new("/x", 1));
    let y = Arc::new(NumberOp::new("/y", 2));
    let sum = Arc::new(AddOp::new("/sum"));
    let scaled = Arc::new(MultiplyOp::new("/scaled").with_operands(0, 10));
    let viewer = Arc::new(ViewerOp::new("/viewer"));
    let renderer = Arc::new(RendererOp::new("/renderer"));
    let console = Arc::new(ConsoleOp::new("/console"));
    let broken = Arc::new(FailingOp::new("/broken", "demo failure").with_role(OperatorRole::Output));

    let edges = vec![
        connect(&x, "out", &*sum, "a")?,
        connect(&y, "out", &*sum, "b")?,
        connect(&sum, "out", &*viewer, "in")?,
        connect(&sum, "out", &*scaled, "a")?,
        connect(&scaled, "out", &*renderer, "in")?,
        connect(&x, "out", &*console, "in")?,
    ];

    let store = Arc::new(MemoryStore::new());
    let ops: [Arc<dyn Operator>; 8] = [
        x.clone(),
        y,
        sum,
        scaled,
        viewer,
        renderer.clone(),
        console,
        broken,
    ];
    for op in ops {
        store.insert(op);
    }

    let metrics = EngineMetrics::shared().context("Failed to create metrics registry")?;
    let engine = OperatorEngine::new(store, config).with_metrics(metrics.clone());
    engine.build_from_edges(&edges);

    Ok(Demo {
        engine,
        x,
        renderer,
        metrics,
    })
}

/// Run the demo graph for `frames` frames.
pub async fn run(frames: u64, fps: u32, sequential: bool, print_metrics: bool) -> Result<()> {
    tracing::info!(frames, fps, sequential, "Running demo graph");

    let config = EngineConfig::try_from_env()?
        .with_target_fps(fps)
        .with_parallel(!sequential);
    let interval = config.frame_interval();
    let Demo {
        engine,
        x,
        renderer,
        metrics,
    } = build_demo(config)?;

    println!("Execution levels:");
    for (depth, level) in engine.execution_levels().iter().enumerate() {
        let names: Vec<&str> = level.iter().map(OperatorId::as_str).collect();
        println!("  {}: {}", depth, names.join(", "));
    }
    println!();

    let mut ticker = tokio::time::interval(interval);
    for frame in 0..frames {
        ticker.tick().await;
        if frame > 0 && frame % 3 == 0 {
            x.set_value(frame as i64);
            engine.mark_dirty(&[x.id().clone()]);
        }

        let results = engine.execute_frame().await;
        let mut roots: Vec<_> = results.roots.iter().collect();
        roots.sort_by(|a, b| a.0.cmp(b.0));

        println!("Frame {} ({:?})", results.frame, results.elapsed);
        for (id, outcome) in roots {
            match (&outcome.value, &outcome.error) {
                (_, Some(error)) => println!("  {:<10} error: {}", id.as_str(), error),
                (Some(value), None) => println!(
                    "  {:<10} {}{}",
                    id.as_str(),
                    value,
                    if outcome.changed { " (changed)" } else { "" }
                ),
                (None, None) => println!("  {:<10} -", id.as_str()),
            }
        }
    }

    println!();
    println!("Renderer recomputed {} times", renderer.render_count());
    println!("Performance:");
    println!(
        "{}",
        serde_json::to_string_pretty(&engine.metrics()).context("Failed to encode metrics")?
    );
    println!("Graph:");
    println!(
        "{}",
        serde_json::to_string_pretty(&engine.stats()).context("Failed to encode stats")?
    );

    if print_metrics {
        println!();
        print!("{}", metrics.export_text().context("Failed to encode metrics")?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use noodles_core::value::Value;

    #[tokio::test]
    async fn broken_sink_reports_its_failure_every_frame() {
        let demo = build_demo(EngineConfig::default()).unwrap();
        let broken = OperatorId::new("/broken");

        let results = demo.engine.execute_frame().await;
        assert_eq!(results.len(), 4);
        assert!(results.error(&broken).is_some());
        assert_eq!(results.value(&OperatorId::new("/viewer")), Some(&Value::from(3)));
        assert_eq!(results.value(&OperatorId::new("/renderer")), Some(&Value::from(30)));
        assert_eq!(demo.renderer.render_count(), 1);

        demo.x.set_value(5);
        demo.engine.mark_dirty(&[demo.x.id().clone()]);
        let results = demo.engine.execute_frame().await;
        assert!(results.error(&broken).is_some());
        assert_eq!(results.value(&OperatorId::new("/viewer")), Some(&Value::from(7)));
        assert_eq!(demo.renderer.render_count(), 2);
    }
}
