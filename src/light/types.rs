use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::errors::EngineError;

/// One phase of the light. The cycle is fixed: red, green, yellow, red.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Color {
    Red,
    Green,
    Yellow,
}

impl Color {
    pub const ALL: [Color; 3] = [Color::Red, Color::Green, Color::Yellow];

    /// Cyclic successor of this phase.
    pub fn next(self) -> Color {
        match self {
            Color::Red => Color::Green,
            Color::Green => Color::Yellow,
            Color::Yellow => Color::Red,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Red => "RED",
            Color::Green => "GREEN",
            Color::Yellow => "YELLOW",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-phase durations in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseDurations {
    #[serde(alias = "RED")]
    pub red: f64,
    #[serde(alias = "GREEN")]
    pub green: f64,
    #[serde(alias = "YELLOW")]
    pub yellow: f64,
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            red: 5.0,
            green: 4.0,
            yellow: 2.0,
        }
    }
}

impl PhaseDurations {
    pub fn get(&self, color: Color) -> f64 {
        match color {
            Color::Red => self.red,
            Color::Green => self.green,
            Color::Yellow => self.yellow,
        }
    }

    /// Nominal length of one full red-green-yellow cycle.
    pub fn cycle_length(&self) -> f64 {
        Color::ALL.iter().map(|c| self.get(*c)).sum()
    }

    /// Rejects zero, negative and non-finite entries.
    pub fn validate(&self) -> Result<(), EngineError> {
        for color in Color::ALL {
            let seconds = self.get(color);
            if !seconds.is_finite() || seconds <= 0.0 {
                return Err(EngineError::InvalidConfiguration {
                    key: format!("phases.{}", color.as_str().to_lowercase()),
                    reason: format!("duration must be a positive number of seconds, got {seconds}"),
                });
            }
        }
        Ok(())
    }
}

/// How the coarse watchdog loop behaves when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchdogMode {
    /// Only finish a phase switch the frame loop already made due.
    #[default]
    Expiry,
    /// Run a full delta-based tick, keeping the countdown alive when frames stall.
    Advance,
}

impl std::str::FromStr for WatchdogMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "expiry" => Ok(WatchdogMode::Expiry),
            "advance" => Ok(WatchdogMode::Advance),
            other => Err(EngineError::InvalidConfiguration {
                key: "scheduling.watchdog_mode".to_string(),
                reason: format!("unknown mode '{other}', expected 'expiry' or 'advance'"),
            }),
        }
    }
}

/// Which loop produced a tick. Used for logging and metrics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickSource {
    Frame,
    Watchdog,
}

impl fmt::Display for TickSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TickSource::Frame => f.write_str("frame"),
            TickSource::Watchdog => f.write_str("watchdog"),
        }
    }
}

/// Everything the engine needs at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub durations: PhaseDurations,
    pub frame_interval: Duration,
    pub watchdog_interval: Duration,
    pub watchdog_mode: WatchdogMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            durations: PhaseDurations::default(),
            frame_interval: Duration::from_millis(16),
            watchdog_interval: Duration::from_millis(100),
            watchdog_mode: WatchdogMode::Expiry,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        self.durations.validate()?;
        if self.frame_interval.is_zero() {
            return Err(EngineError::InvalidConfiguration {
                key: "scheduling.frame_interval_ms".to_string(),
                reason: "frame interval must be greater than zero".to_string(),
            });
        }
        if self.watchdog_interval.is_zero() {
            return Err(EngineError::InvalidConfiguration {
                key: "scheduling.watchdog_interval_ms".to_string(),
                reason: "watchdog interval must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// The externally observable triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub color: Color,
    /// Remaining time rounded up to whole seconds.
    pub seconds_left: u32,
    pub is_playing: bool,
}

/// Round remaining time up for display, so a phase never shows 0 while time remains.
pub fn display_seconds(seconds_remaining: f64) -> u32 {
    seconds_remaining.max(0.0).ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_durations_are_positive() {
        let durations = PhaseDurations::default();
        for color in Color::ALL {
            assert!(durations.get(color) > 0.0, "{color} must have a positive duration");
        }
        assert_eq!(durations.cycle_length(), 11.0);
    }

    #[test]
    fn test_successor_order() {
        assert_eq!(Color::Red.next(), Color::Green);
        assert_eq!(Color::Green.next(), Color::Yellow);
        assert_eq!(Color::Yellow.next(), Color::Red);
    }

    #[test]
    fn test_validate_rejects_non_positive_durations() {
        let zero = PhaseDurations { green: 0.0, ..Default::default() };
        match zero.validate() {
            Err(EngineError::InvalidConfiguration { key, .. }) => assert_eq!(key, "phases.green"),
            other => panic!("expected InvalidConfiguration, got {other:?}"),
        }

        let negative = PhaseDurations { yellow: -1.0, ..Default::default() };
        assert!(negative.validate().is_err());

        let nan = PhaseDurations { red: f64::NAN, ..Default::default() };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_engine_config_rejects_zero_intervals() {
        let config = EngineConfig {
            watchdog_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_display_seconds_rounds_up() {
        assert_eq!(display_seconds(5.0), 5);
        assert_eq!(display_seconds(4.01), 5);
        assert_eq!(display_seconds(0.2), 1);
        assert_eq!(display_seconds(0.0), 0);
        assert_eq!(display_seconds(-0.5), 0);
    }

    #[test]
    fn test_watchdog_mode_parsing() {
        assert_eq!("expiry".parse::<WatchdogMode>().unwrap(), WatchdogMode::Expiry);
        assert_eq!("ADVANCE".parse::<WatchdogMode>().unwrap(), WatchdogMode::Advance);
        assert!("sometimes".parse::<WatchdogMode>().is_err());
    }

    #[test]
    fn test_color_serializes_uppercase() {
        let json = serde_json::to_string(&Color::Yellow).unwrap();
        assert_eq!(json, "\"YELLOW\"");
    }

    fn arb_color() -> impl Strategy<Value = Color> {
        prop_oneof![Just(Color::Red), Just(Color::Green), Just(Color::Yellow)]
    }

    proptest! {
        #[test]
        fn test_successor_is_a_three_cycle(color in arb_color()) {
            prop_assert_eq!(color.next().next().next(), color);
            prop_assert_ne!(color.next(), color);
        }
    }
}
