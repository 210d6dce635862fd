//! Engine configuration.

use noodles_core::error::{NoodlesError, Result};
use std::str::FromStr;
use std::time::Duration;

/// Configuration for the [`OperatorEngine`](crate::engine::OperatorEngine).
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Target frames per second. The frame interval is `1000 / target_fps` ms.
    pub target_fps: u32,
    /// Pull root operators concurrently.
    ///
    /// Set to false for strictly sequential pulls (debugging).
    pub parallel: bool,
    /// Dirty batching window. Zero selects immediate propagation.
    pub batch_delay: Duration,
    /// Cadence of the host tick that checks whether a frame is due.
    pub tick_interval: Duration,
    /// Run dirty for-loop scopes before pulling roots.
    pub run_scopes: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            parallel: true,
            batch_delay: Duration::ZERO,
            tick_interval: Duration::from_millis(4),
            run_scopes: true,
        }
    }
}

impl EngineConfig {
    /// Create configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `NOODLES_TARGET_FPS`: Target frame rate
    /// - `NOODLES_PARALLEL`: Pull roots concurrently (`true`/`false`)
    /// - `NOODLES_BATCH_DELAY_MS`: Dirty batching window in milliseconds
    /// - `NOODLES_TICK_MS`: Host tick cadence in milliseconds
    /// - `NOODLES_RUN_SCOPES`: Run for-loop scopes inside frames
    ///
    /// Unset or unparsable variables fall back to the defaults.
    ///
    /// # Example
    ///
    /// ```bash
    /// export NOODLES_TARGET_FPS=30
    /// export NOODLES_BATCH_DELAY_MS=16
    /// ```
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            target_fps: lenient(env_value("NOODLES_TARGET_FPS")).unwrap_or(defaults.target_fps),
            parallel: lenient(env_flag("NOODLES_PARALLEL")).unwrap_or(defaults.parallel),
            batch_delay: lenient(env_value("NOODLES_BATCH_DELAY_MS"))
                .map(Duration::from_millis)
                .unwrap_or(defaults.batch_delay),
            tick_interval: lenient(env_value("NOODLES_TICK_MS"))
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(defaults.tick_interval),
            run_scopes: lenient(env_flag("NOODLES_RUN_SCOPES")).unwrap_or(defaults.run_scopes),
        }
    }

    /// Like [`EngineConfig::from_env`], but a variable that is set to an
    /// unparsable or out-of-range value fails with [`NoodlesError::Config`].
    pub fn try_from_env() -> Result<Self> {
        let defaults = Self::default();

        let target_fps = env_value("NOODLES_TARGET_FPS")?.unwrap_or(defaults.target_fps);
        if target_fps == 0 {
            return Err(NoodlesError::Config(
                "NOODLES_TARGET_FPS must be at least 1".to_string(),
            ));
        }
        let tick_interval = match env_value::<u64>("NOODLES_TICK_MS")? {
            Some(0) => {
                return Err(NoodlesError::Config(
                    "NOODLES_TICK_MS must be at least 1".to_string(),
                ));
            }
            Some(ms) => Duration::from_millis(ms),
            None => defaults.tick_interval,
        };

        Ok(Self {
            target_fps,
            parallel: env_flag("NOODLES_PARALLEL")?.unwrap_or(defaults.parallel),
            batch_delay: env_value("NOODLES_BATCH_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.batch_delay),
            tick_interval,
            run_scopes: env_flag("NOODLES_RUN_SCOPES")?.unwrap_or(defaults.run_scopes),
        })
    }

    /// Set the target frame rate (at least 1).
    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps.max(1);
        self
    }

    /// Enable or disable concurrent root pulls.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the dirty batching window.
    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }

    /// Set the host tick cadence (at least 1ms).
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Enable or disable for-loop scope execution inside frames.
    pub fn with_run_scopes(mut self, run_scopes: bool) -> Self {
        self.run_scopes = run_scopes;
        self
    }

    /// Minimum time between two frames.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.target_fps.max(1)))
    }
}

fn lenient<T>(value: Result<Option<T>>) -> Option<T> {
    value.ok().flatten()
}

fn env_value<T: FromStr>(key: &str) -> Result<Option<T>> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| NoodlesError::Config(format!("{key}: cannot parse '{raw}'")))
}

fn env_flag(key: &str) -> Result<Option<bool>> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(None);
    };
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(NoodlesError::Config(format!(
            "{key}: expected a boolean, got '{raw}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.target_fps, 60);
        assert!(config.parallel);
        assert!(config.batch_delay.is_zero());
        assert!(config.run_scopes);
    }

    #[test]
    fn frame_interval_from_fps() {
        let config = EngineConfig::default().with_target_fps(50);
        assert_eq!(config.frame_interval(), Duration::from_millis(20));

        let config = EngineConfig::default().with_target_fps(0);
        assert_eq!(config.target_fps, 1);
        assert_eq!(config.frame_interval(), Duration::from_secs(1));
    }

    #[test]
    fn malformed_variables_are_config_errors() {
        // Keys unique to this test; nothing else reads them.
        unsafe {
            std::env::set_var("NOODLES_TEST_CONFIG_NUMBER", "sixty");
            std::env::set_var("NOODLES_TEST_CONFIG_FLAG", "maybe");
            std::env::set_var("NOODLES_TEST_CONFIG_VALID", " 30 ");
        }

        let err = env_value::<u32>("NOODLES_TEST_CONFIG_NUMBER").unwrap_err();
        assert_eq!(err.code(), "E402");
        assert!(err.to_string().contains("NOODLES_TEST_CONFIG_NUMBER"));
        assert!(matches!(
            env_flag("NOODLES_TEST_CONFIG_FLAG"),
            Err(NoodlesError::Config(_))
        ));
        assert_eq!(env_value::<u32>("NOODLES_TEST_CONFIG_VALID").unwrap(), Some(30));
        assert_eq!(env_value::<u32>("NOODLES_TEST_CONFIG_UNSET").unwrap(), None);
        assert_eq!(lenient(env_value::<u32>("NOODLES_TEST_CONFIG_NUMBER")), None);
    }

    #[test]
    fn builder_methods() {
        let config = EngineConfig::default()
            .with_parallel(false)
            .with_batch_delay(Duration::from_millis(16))
            .with_tick_interval(Duration::ZERO)
            .with_run_scopes(false);

        assert!(!config.parallel);
        assert_eq!(config.batch_delay, Duration::from_millis(16));
        assert_eq!(config.tick_interval, Duration::from_millis(1));
        assert!(!config.run_scopes);
    }
}
