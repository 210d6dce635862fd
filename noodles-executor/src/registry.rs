//! Optional process-wide engine handle.
//!
//! Library code should pass an `Arc<OperatorEngine>` around explicitly.
//! This registry exists for top-level hosts that need one shared engine
//! reachable from free functions.
//!
//! # Example
//!
//! ```ignore
//! use noodles_executor::registry;
//!
//! registry::initialize(store, EngineConfig::from_env());
//! registry::update_graph(&edges)?;
//! registry::start()?;
//! ```

use crate::config::EngineConfig;
use crate::engine::OperatorEngine;
use crate::metrics::PerformanceMetrics;
use noodles_core::error::{NoodlesError, Result};
use noodles_core::flow::Edge;
use noodles_core::traits::OperatorStore;
use noodles_core::types::OperatorId;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::sync::Arc;

static ENGINE: OnceCell<RwLock<Option<Arc<OperatorEngine>>>> = OnceCell::new();

fn slot() -> &'static RwLock<Option<Arc<OperatorEngine>>> {
    ENGINE.get_or_init(|| RwLock::new(None))
}

/// Create the shared engine, or return the existing one.
///
/// Only the first call's `store` and `config` are used.
pub fn initialize(store: Arc<dyn OperatorStore>, config: EngineConfig) -> Arc<OperatorEngine> {
    let mut slot = slot().write();
    if let Some(engine) = slot.as_ref() {
        tracing::debug!("Engine already initialized");
        return Arc::clone(engine);
    }
    let engine = Arc::new(OperatorEngine::new(store, config));
    *slot = Some(Arc::clone(&engine));
    tracing::info!("Engine registry initialized");
    engine
}

/// The shared engine, if initialized.
pub fn get() -> Option<Arc<OperatorEngine>> {
    slot().read().clone()
}

fn require() -> Result<Arc<OperatorEngine>> {
    get().ok_or(NoodlesError::NotInitialized)
}

/// Start the shared engine's frame loop. Requires a tokio runtime.
pub fn start() -> Result<()> {
    require()?.start();
    Ok(())
}

/// Stop the shared engine's frame loop.
pub fn stop() -> Result<()> {
    require()?.stop();
    Ok(())
}

/// Replace the shared engine's edges after re-syncing operators.
pub fn update_graph(edges: &[Edge]) -> Result<()> {
    require()?.build_from_edges(edges);
    Ok(())
}

/// Mark every operator in the shared engine dirty.
pub fn force_update() -> Result<usize> {
    Ok(require()?.force_update())
}

/// Frame-loop metrics of the shared engine.
pub fn performance_metrics() -> Option<PerformanceMetrics> {
    get().map(|engine| engine.metrics())
}

/// Whether adding `source -> target` to the shared engine would close a
/// cycle.
///
/// False when no engine is initialized or either endpoint is unregistered.
pub fn would_create_cycle(source: &OperatorId, target: &OperatorId) -> bool {
    get().is_some_and(|engine| {
        engine
            .would_create_cycle(source, target)
            .unwrap_or(false)
    })
}

/// Execution order of the shared engine. Empty when no engine is initialized.
pub fn execution_order() -> Vec<OperatorId> {
    get().map(|engine| engine.execution_order()).unwrap_or_default()
}

#[cfg(test)]
pub(crate) fn reset() {
    if let Some(engine) = slot().write().take() {
        engine.stop();
    }
}
