//! Logging setup for engine hosts.
//!
//! The engine itself only emits `tracing` events and spans; binaries call
//! [`init_tracing`] once at startup to install a subscriber.
//!
//! # Configuration
//!
//! Logging format is controlled via `NOODLES_LOG_FORMAT`:
//! - `json` - Structured JSON output
//! - `pretty` - Human-readable colored output (default for TTY)
//! - `compact` - Compact single-line format
//!
//! The filter comes from `NOODLES_LOG_LEVEL` or `RUST_LOG` (default `info`).
//!
//! # Example
//!
//! ```ignore
//! use noodles_executor::observability::{LogFormat, TracingConfig, init_tracing};
//!
//! let _guard = init_tracing(TracingConfig::from_env())?;
//!
//! let config = TracingConfig::builder()
//!     .log_format(LogFormat::Json)
//!     .log_filter("debug,noodles_executor=trace")
//!     .build();
//! ```

mod config;
mod tracing_setup;

pub use config::{LogFormat, TracingConfig, TracingConfigBuilder};
pub use tracing_setup::{TracingGuard, init_tracing};

/// Span for one operator pull, carrying the operator ID and role.
#[macro_export]
macro_rules! instrument_operator {
    ($operator_id:expr, $role:expr) => {
        tracing::debug_span!(
            "operator_pull",
            operator_id = %$operator_id,
            role = $role,
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = TracingConfig::default();
        assert_eq!(config.log_filter(), "info");
        assert_eq!(config.log_format(), LogFormat::Compact);
        assert!(config.include_target());
    }

    #[test]
    fn config_builder() {
        let config = TracingConfig::builder()
            .log_format(LogFormat::Json)
            .log_filter("debug")
            .include_location(true)
            .build();

        assert_eq!(config.log_format(), LogFormat::Json);
        assert_eq!(config.log_filter(), "debug");
        assert!(config.include_location());
        assert!(!config.include_thread_ids());
    }

    #[test]
    fn log_format_parsing_falls_back_to_compact() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("weird".parse::<LogFormat>().unwrap(), LogFormat::Compact);
    }
}
