use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::light::{EngineConfig, EngineError, PhaseDurations, WatchdogMode};

pub const DEFAULT_CONFIG_FILE: &str = "traffic-light.toml";

/// Main configuration structure for the traffic light
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TrafficLightConfig {
    /// Phase durations in seconds
    pub phases: PhaseDurations,
    /// Frame and watchdog loop settings
    pub scheduling: SchedulingConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SchedulingConfig {
    /// Period of the display-rate loop
    pub frame_interval_ms: u64,
    /// Period of the watchdog loop
    pub watchdog_interval_ms: u64,
    /// What the watchdog does when it fires
    pub watchdog_mode: WatchdogMode,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16, // ~60 Hz
            watchdog_interval_ms: 100,
            watchdog_mode: WatchdogMode::Expiry,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level, overridden by RUST_LOG
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl TrafficLightConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. traffic-light.toml in the working directory
    /// 3. Environment variables (TRAFFIC_LIGHT__PHASES__RED=3, ...)
    pub fn load() -> Result<Self, EngineError> {
        let file = Path::new(DEFAULT_CONFIG_FILE);
        Self::build(file.exists().then_some(file))
    }

    /// Like `load`, but reads the given file instead of the default one.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        Self::build(Some(path.as_ref()))
    }

    fn build(file: Option<&Path>) -> Result<Self, EngineError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("TRAFFIC_LIGHT")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: TrafficLightConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.engine_config().validate()
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            durations: self.phases,
            frame_interval: Duration::from_millis(self.scheduling.frame_interval_ms),
            watchdog_interval: Duration::from_millis(self.scheduling.watchdog_interval_ms),
            watchdog_mode: self.scheduling.watchdog_mode,
        }
    }

    pub fn to_toml(&self) -> Result<String, EngineError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), EngineError> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() {
        if Path::new(".env").exists() {
            match dotenvy::dotenv() {
                Ok(_) => tracing::debug!("Loaded environment variables from .env file"),
                Err(e) => tracing::warn!("Failed to read .env file: {}", e),
            }
        }
    }
}
