use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use super::errors::EngineError;
use super::state_machine::{LightState, TickOutcome};
use super::types::{EngineConfig, Snapshot, TickSource, WatchdogMode};
use crate::observability::EngineMetrics;
use crate::telemetry::create_engine_span;

/// State shared between the engine handle and its two background loops.
struct Shared {
    engine_id: Uuid,
    state: Mutex<LightState>,
    snapshots: watch::Sender<Snapshot>,
    metrics: EngineMetrics,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, LightState> {
        // Every mutation leaves LightState consistent, so a poisoned lock is still usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Must be called with the state lock held so snapshots are published in mutation order.
    fn publish(&self, state: &LightState) {
        let snapshot = state.snapshot();
        let sent = self.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
        if sent {
            self.metrics.record_snapshot_published();
        }
    }

    /// Full delta-based tick. Returns whether the light is still playing.
    fn tick(&self, source: TickSource) -> bool {
        let mut state = self.lock();
        let outcome = state.tick(Instant::now());
        self.publish(&state);

        if outcome != TickOutcome::Idle {
            self.metrics.record_tick(source);
        }
        match outcome {
            TickOutcome::Switched { from, to } => {
                self.metrics.record_phase_switch(source);
                info!(
                    engine_id = %self.engine_id,
                    from = %from,
                    color = %to,
                    seconds_left = state.snapshot().seconds_left,
                    source = %source,
                    "Phase switched"
                );
            }
            TickOutcome::ClockRegressed => {
                self.metrics.record_clock_regression();
                warn!(engine_id = %self.engine_id, source = %source, "Clock moved backwards, ignoring delta");
            }
            _ => {}
        }

        state.is_playing()
    }

    /// Watchdog check in `Expiry` mode. Never integrates elapsed time itself.
    fn finish_expired_phase(&self) -> bool {
        let mut state = self.lock();
        if let Some((from, to)) = state.force_switch_if_expired() {
            self.publish(&state);
            self.metrics.record_phase_switch(TickSource::Watchdog);
            warn!(
                engine_id = %self.engine_id,
                from = %from,
                color = %to,
                "Watchdog forced a stalled phase switch"
            );
        }
        state.is_playing()
    }
}

async fn frame_loop(shared: Arc<Shared>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        if !shared.tick(TickSource::Frame) {
            break;
        }
    }
    debug!(engine_id = %shared.engine_id, "Frame loop stopped");
}

async fn watchdog_loop(shared: Arc<Shared>, period: Duration, mode: WatchdogMode) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        let playing = match mode {
            WatchdogMode::Expiry => shared.finish_expired_phase(),
            WatchdogMode::Advance => shared.tick(TickSource::Watchdog),
        };
        if !playing {
            break;
        }
    }
    debug!(engine_id = %shared.engine_id, "Watchdog loop stopped");
}

/// Three-phase traffic light driven by a frame loop and a watchdog loop.
///
/// Controls are synchronous. `start` spawns the loops with `tokio::spawn`, so it
/// has to run inside a tokio runtime. `pause`, `reset` and `dispose` abort both
/// loops before returning.
pub struct TrafficLightEngine {
    config: EngineConfig,
    shared: Arc<Shared>,
    frame_handle: Option<JoinHandle<()>>,
    watchdog_handle: Option<JoinHandle<()>>,
}

impl TrafficLightEngine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;

        let state = LightState::new(config.durations);
        let (snapshots, _) = watch::channel(state.snapshot());
        let engine_id = Uuid::new_v4();

        debug!(
            engine_id = %engine_id,
            red = config.durations.red,
            green = config.durations.green,
            yellow = config.durations.yellow,
            frame_interval = ?config.frame_interval,
            watchdog_interval = ?config.watchdog_interval,
            watchdog_mode = ?config.watchdog_mode,
            "Traffic light engine created"
        );

        Ok(Self {
            config,
            shared: Arc::new(Shared {
                engine_id,
                state: Mutex::new(state),
                snapshots,
                metrics: EngineMetrics::new(),
            }),
            frame_handle: None,
            watchdog_handle: None,
        })
    }

    pub fn with_defaults() -> Result<Self, EngineError> {
        Self::new(EngineConfig::default())
    }

    /// Begin counting down and spawn both loops. No-op while already playing.
    pub fn start(&mut self) {
        {
            let mut state = self.shared.lock();
            if !state.start(Instant::now()) {
                return;
            }
            self.shared.publish(&state);
        }

        // Leftover handles belong to loops that already exited.
        self.cancel_loops();

        let span = create_engine_span(&self.shared.engine_id);
        self.frame_handle = Some(tokio::spawn(
            frame_loop(Arc::clone(&self.shared), self.config.frame_interval).instrument(span.clone()),
        ));
        self.watchdog_handle = Some(tokio::spawn(
            watchdog_loop(
                Arc::clone(&self.shared),
                self.config.watchdog_interval,
                self.config.watchdog_mode,
            )
            .instrument(span),
        ));

        debug!(engine_id = %self.shared.engine_id, "Traffic light started");
    }

    /// Stop counting and abort both loops. No-op while already paused.
    pub fn pause(&mut self) {
        let was_playing = {
            let mut state = self.shared.lock();
            let was_playing = state.pause();
            self.shared.publish(&state);
            was_playing
        };
        self.cancel_loops();

        if was_playing {
            debug!(engine_id = %self.shared.engine_id, "Traffic light paused");
        }
    }

    /// Pause when playing, start otherwise.
    pub fn toggle(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Stop both loops and return to paused red with the full red duration.
    pub fn reset(&mut self) {
        {
            // One publish: observers never see the paused pre-reset phase.
            let mut state = self.shared.lock();
            state.reset();
            self.shared.publish(&state);
        }
        self.cancel_loops();
        debug!(engine_id = %self.shared.engine_id, "Traffic light reset");
    }

    /// Stops both loops. Safe to call any number of times.
    pub fn dispose(&mut self) {
        let had_loops = self.frame_handle.is_some() || self.watchdog_handle.is_some();
        self.pause();
        if had_loops {
            debug!(engine_id = %self.shared.engine_id, "Traffic light disposed");
        }
    }

    fn cancel_loops(&mut self) {
        if let Some(handle) = self.frame_handle.take() {
            handle.abort();
        }
        if let Some(handle) = self.watchdog_handle.take() {
            handle.abort();
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.shared.lock().snapshot()
    }

    /// Receiver that sees a new value whenever the snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.shared.snapshots.subscribe()
    }

    pub fn is_playing(&self) -> bool {
        self.shared.lock().is_playing()
    }

    /// Unrounded remaining time of the current phase.
    pub fn seconds_remaining(&self) -> f64 {
        self.shared.lock().seconds_remaining()
    }

    /// True while at least one background loop is alive.
    pub fn is_scheduled(&self) -> bool {
        [&self.frame_handle, &self.watchdog_handle]
            .into_iter()
            .flatten()
            .any(|handle| !handle.is_finished())
    }

    pub fn engine_id(&self) -> Uuid {
        self.shared.engine_id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn metrics(&self) -> &EngineMetrics {
        &self.shared.metrics
    }
}

impl Drop for TrafficLightEngine {
    fn drop(&mut self) {
        self.cancel_loops();
    }
}
