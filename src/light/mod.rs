// Traffic light engine
//
// Pure countdown bookkeeping lives in `state_machine`; `engine` owns it and
// drives it from a frame loop and a coarser watchdog loop.

pub mod engine;
pub mod errors;
pub mod state_machine;
pub mod types;


pub use engine::TrafficLightEngine;
pub use errors::EngineError;
pub use state_machine::{LightState, TickOutcome};
pub use types::{
    display_seconds, Color, EngineConfig, PhaseDurations, Snapshot, TickSource, WatchdogMode,
};
