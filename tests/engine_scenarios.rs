//! End-to-end engine scenarios through the public API.
//!
//! These run on tokio's paused clock, so eleven seconds of light cycling
//! finish instantly and deterministically.

use std::time::Duration;
use tokio::time::sleep;
use traffic_light::{
    Color, EngineConfig, PhaseDurations, Snapshot, TrafficLightConfig, TrafficLightEngine,
    WatchdogMode,
};

fn fast_frames() -> EngineConfig {
    EngineConfig {
        frame_interval: Duration::from_millis(4),
        ..EngineConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_overshoot_lands_in_next_phase_only() {
    let mut light = TrafficLightEngine::new(fast_frames()).unwrap();
    light.start();

    sleep(Duration::from_millis(5_200)).await;
    let snapshot = light.snapshot();
    assert_eq!(snapshot.color, Color::Green);
    assert_eq!(snapshot.seconds_left, 4);
    let remaining = light.seconds_remaining();
    assert!(remaining > 3.75 && remaining < 3.85, "remaining was {remaining}");
}

#[tokio::test(start_paused = true)]
async fn test_start_pause_wait_resume() {
    let mut light = TrafficLightEngine::new(fast_frames()).unwrap();
    light.start();
    light.pause();
    let at_pause = light.seconds_remaining();

    sleep(Duration::from_secs(100)).await;
    light.toggle();

    assert!(light.snapshot().is_playing);
    assert_eq!(light.seconds_remaining(), at_pause);
}

#[tokio::test(start_paused = true)]
async fn test_toggle_and_reset_round_trip() {
    let mut light = TrafficLightEngine::new(fast_frames()).unwrap();
    light.toggle();
    sleep(Duration::from_millis(9_500)).await;
    assert_eq!(light.snapshot().color, Color::Yellow);

    light.toggle();
    assert!(!light.is_playing());
    assert_eq!(light.snapshot().color, Color::Yellow);

    light.reset();
    assert_eq!(
        light.snapshot(),
        Snapshot { color: Color::Red, seconds_left: 5, is_playing: false }
    );
}

#[tokio::test(start_paused = true)]
async fn test_engine_from_loaded_config() {
    let mut config = TrafficLightConfig::default();
    config.phases = PhaseDurations { red: 2.0, green: 2.0, yellow: 1.0 };
    config.scheduling.frame_interval_ms = 5;
    config.scheduling.watchdog_mode = WatchdogMode::Advance;

    let mut light = TrafficLightEngine::new(config.engine_config()).unwrap();
    assert_eq!(light.snapshot().seconds_left, 2);
    light.start();

    sleep(Duration::from_millis(2_100)).await;
    assert_eq!(light.snapshot().color, Color::Green);
    assert_eq!(light.snapshot().seconds_left, 2);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_engine_stops_background_work() {
    let mut light = TrafficLightEngine::new(fast_frames()).unwrap();
    let mut rx = light.subscribe();
    light.start();
    sleep(Duration::from_millis(100)).await;
    drop(light);

    // Once the aborted loops are gone the last sender is dropped with them.
    let closed = tokio::time::timeout(Duration::from_secs(1), async {
        while rx.changed().await.is_ok() {}
    })
    .await;
    assert!(closed.is_ok());
}
