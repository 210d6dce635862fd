//! Engine metrics.
//!
//! [`PerformanceMetrics`] and [`GraphStats`] are plain snapshots returned by
//! the engine. [`EngineMetrics`] mirrors the same numbers into a Prometheus
//! registry for scraping.
//!
//! # Prometheus metrics
//!
//! ## Counters
//! - `noodles_frames_total` - Frames executed
//! - `noodles_frames_skipped_total` - Ticks dropped because a frame was still in flight
//! - `noodles_root_errors_total` - Root pulls that failed
//!
//! ## Histograms
//! - `noodles_frame_duration_seconds` - Frame execution time
//!
//! ## Gauges
//! - `noodles_operators` - Operators in the execution graph
//! - `noodles_dirty_operators` - Operators flagged dirty after the last frame

use prometheus::{Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Histogram buckets for frame durations (in seconds).
const FRAME_DURATION_BUCKETS: &[f64] = &[
    0.0005, 0.001, 0.002, 0.004, 0.008, 0.016, 0.033, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Snapshot of frame-loop performance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    /// Duration of the most recent frame.
    pub frame_time: Duration,
    /// Root results produced by the most recent frame.
    pub results: usize,
    /// Operators still flagged dirty after the most recent frame.
    pub dirty_count: usize,
    /// Operators in the execution graph.
    pub operator_count: usize,
    /// Frames executed since the engine was created.
    pub frames_executed: u64,
    /// Ticks dropped because a frame was still in flight.
    pub frames_skipped: u64,
    /// Root pulls that failed since the engine was created.
    pub root_errors: u64,
    /// Wall-clock time of the last frame, in milliseconds since UNIX epoch.
    pub last_frame_at: Option<u64>,
}

/// Snapshot of the execution graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    /// Operators in the graph.
    pub node_count: usize,
    /// Edges in the graph (all kinds).
    pub edge_count: usize,
    /// Dependency levels in the cached schedule.
    pub level_count: usize,
    /// Operators in the dirty set.
    pub dirty_count: usize,
    /// Whether the frame loop is running.
    pub running: bool,
    /// Length of the cached execution order.
    pub order_len: usize,
    /// Cycles found by the last sort.
    pub cycle_count: usize,
}

/// Prometheus metrics for one engine.
pub struct EngineMetrics {
    registry: Registry,

    /// Frames executed.
    pub frames: IntCounter,
    /// Ticks dropped by the re-entrancy guard.
    pub frames_skipped: IntCounter,
    /// Failed root pulls.
    pub root_errors: IntCounter,
    /// Frame execution time.
    pub frame_duration: Histogram,
    /// Operators in the graph.
    pub operators: IntGauge,
    /// Dirty operators after the last frame.
    pub dirty_operators: IntGauge,
}

impl EngineMetrics {
    /// Create a registry with all engine metrics.
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let frames = IntCounter::with_opts(
            Opts::new("noodles_frames_total", "Frames executed").const_label("service", "engine"),
        )?;
        let frames_skipped = IntCounter::with_opts(
            Opts::new(
                "noodles_frames_skipped_total",
                "Ticks dropped because a frame was still in flight",
            )
            .const_label("service", "engine"),
        )?;
        let root_errors = IntCounter::with_opts(
            Opts::new("noodles_root_errors_total", "Failed root operator pulls")
                .const_label("service", "engine"),
        )?;
        let frame_duration = Histogram::with_opts(
            HistogramOpts::new(
                "noodles_frame_duration_seconds",
                "Duration of frame executions in seconds",
            )
            .const_label("service", "engine")
            .buckets(FRAME_DURATION_BUCKETS.to_vec()),
        )?;
        let operators = IntGauge::with_opts(
            Opts::new("noodles_operators", "Operators in the execution graph")
                .const_label("service", "engine"),
        )?;
        let dirty_operators = IntGauge::with_opts(
            Opts::new(
                "noodles_dirty_operators",
                "Operators flagged dirty after the last frame",
            )
            .const_label("service", "engine"),
        )?;

        registry.register(Box::new(frames.clone()))?;
        registry.register(Box::new(frames_skipped.clone()))?;
        registry.register(Box::new(root_errors.clone()))?;
        registry.register(Box::new(frame_duration.clone()))?;
        registry.register(Box::new(operators.clone()))?;
        registry.register(Box::new(dirty_operators.clone()))?;

        Ok(Self {
            registry,
            frames,
            frames_skipped,
            root_errors,
            frame_duration,
            operators,
            dirty_operators,
        })
    }

    /// Create shared metrics.
    pub fn shared() -> prometheus::Result<Arc<Self>> {
        Self::new().map(Arc::new)
    }

    /// Get the Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record a finished frame.
    pub fn record_frame(&self, frame_time: Duration, errors: usize, operators: usize, dirty: usize) {
        self.frames.inc();
        self.root_errors.inc_by(errors as u64);
        self.frame_duration.observe(frame_time.as_secs_f64());
        self.operators.set(operators as i64);
        self.dirty_operators.set(dirty as i64);
    }

    /// Record a tick dropped by the re-entrancy guard.
    pub fn record_skipped(&self) {
        self.frames_skipped.inc();
    }

    /// Encode all metrics in the Prometheus text exposition format.
    pub fn export_text(&self) -> prometheus::Result<String> {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl std::fmt::Debug for EngineMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineMetrics")
            .field("frames", &self.frames.get())
            .field("frames_skipped", &self.frames_skipped.get())
            .field("root_errors", &self.root_errors.get())
            .finish()
    }
}
