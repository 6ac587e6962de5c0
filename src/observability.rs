use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

use crate::light::TickSource;

/// Tick and phase-switch counters for one engine
#[derive(Debug, Default)]
pub struct EngineMetrics {
    pub frame_ticks: AtomicU64,
    pub watchdog_ticks: AtomicU64,
    pub phase_switches: AtomicU64,
    pub watchdog_switches: AtomicU64,
    pub clock_regressions: AtomicU64,
    pub snapshots_published: AtomicU64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_tick(&self, source: TickSource) {
        match source {
            TickSource::Frame => self.frame_ticks.fetch_add(1, Ordering::Relaxed),
            TickSource::Watchdog => self.watchdog_ticks.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn record_phase_switch(&self, source: TickSource) {
        self.phase_switches.fetch_add(1, Ordering::Relaxed);
        if source == TickSource::Watchdog {
            self.watchdog_switches.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_clock_regression(&self) {
        self.clock_regressions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_snapshot_published(&self) {
        self.snapshots_published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> EngineStats {
        EngineStats {
            frame_ticks: self.frame_ticks.load(Ordering::Relaxed),
            watchdog_ticks: self.watchdog_ticks.load(Ordering::Relaxed),
            phase_switches: self.phase_switches.load(Ordering::Relaxed),
            watchdog_switches: self.watchdog_switches.load(Ordering::Relaxed),
            clock_regressions: self.clock_regressions.load(Ordering::Relaxed),
            snapshots_published: self.snapshots_published.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Engine metrics: frame_ticks={}, watchdog_ticks={}, phase_switches={}, watchdog_switches={}, clock_regressions={}, snapshots_published={}",
            stats.frame_ticks,
            stats.watchdog_ticks,
            stats.phase_switches,
            stats.watchdog_switches,
            stats.clock_regressions,
            stats.snapshots_published
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineStats {
    pub frame_ticks: u64,
    pub watchdog_ticks: u64,
    pub phase_switches: u64,
    pub watchdog_switches: u64,
    pub clock_regressions: u64,
    pub snapshots_published: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_by_source() {
        let metrics = EngineMetrics::new();
        metrics.record_tick(TickSource::Frame);
        metrics.record_tick(TickSource::Frame);
        metrics.record_tick(TickSource::Watchdog);
        metrics.record_phase_switch(TickSource::Frame);
        metrics.record_phase_switch(TickSource::Watchdog);
        metrics.record_clock_regression();
        metrics.record_snapshot_published();

        let stats = metrics.get_stats();
        assert_eq!(stats.frame_ticks, 2);
        assert_eq!(stats.watchdog_ticks, 1);
        assert_eq!(stats.phase_switches, 2);
        assert_eq!(stats.watchdog_switches, 1);
        assert_eq!(stats.clock_regressions, 1);
        assert_eq!(stats.snapshots_published, 1);
    }
}
