// Traffic Light Library - three-phase cyclic timer engine
// This exposes the core components for testing and integration

pub mod config;
pub mod light;
pub mod observability;
pub mod shutdown;
pub mod telemetry;

// Re-export key types for easy access
pub use config::{TrafficLightConfig, DEFAULT_CONFIG_FILE};
pub use light::{
    Color, EngineConfig, EngineError, LightState, PhaseDurations, Snapshot, TickOutcome,
    TrafficLightEngine, WatchdogMode,
};
pub use observability::{EngineMetrics, EngineStats};
pub use shutdown::{ShutdownCoordinator, ShutdownReason};
pub use telemetry::{create_engine_span, init_telemetry};
