// Countdown bookkeeping for the light.
//
// Nothing here reads a clock: every operation that needs the time takes `now`,
// so the engine loops and the tests drive it the same way.

use tokio::time::Instant;

use super::types::{display_seconds, Color, PhaseDurations, Snapshot};

/// What a single tick did to the state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Not playing; nothing changed.
    Idle,
    /// First tick after becoming active. The clock was anchored, no time counted.
    Anchored,
    /// Time was counted down by `delta` seconds.
    Counted { delta: f64 },
    /// `now` was earlier than the previous tick. Treated as zero elapsed time.
    ClockRegressed,
    /// The phase expired during this tick and the light moved on.
    Switched { from: Color, to: Color },
}

#[derive(Debug, Clone)]
pub struct LightState {
    durations: PhaseDurations,
    color: Color,
    seconds_remaining: f64,
    is_playing: bool,
    last_tick: Option<Instant>,
}

impl LightState {
    /// Durations must already be validated.
    pub fn new(durations: PhaseDurations) -> Self {
        Self {
            durations,
            color: Color::Red,
            seconds_remaining: durations.get(Color::Red),
            is_playing: false,
            last_tick: None,
        }
    }

    /// Returns false when already playing, in which case nothing changes.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.is_playing {
            return false;
        }
        self.is_playing = true;
        self.last_tick = Some(now);
        true
    }

    /// Returns true when the light was playing.
    pub fn pause(&mut self) -> bool {
        let was_playing = self.is_playing;
        self.is_playing = false;
        self.last_tick = None;
        was_playing
    }

    pub fn reset(&mut self) {
        self.pause();
        self.color = Color::Red;
        self.seconds_remaining = self.durations.get(Color::Red);
        self.last_tick = None;
    }

    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        if !self.is_playing {
            return TickOutcome::Idle;
        }

        let anchored = self.last_tick.is_none();
        let (delta, regressed) = match self.last_tick {
            Some(last) => match now.checked_duration_since(last) {
                Some(elapsed) => (elapsed.as_secs_f64(), false),
                None => (0.0, true),
            },
            None => (0.0, false),
        };
        self.last_tick = Some(now);
        self.seconds_remaining = (self.seconds_remaining - delta).max(0.0);

        if self.seconds_remaining <= 0.0 {
            let (from, to) = self.switch_phase();
            return TickOutcome::Switched { from, to };
        }

        if regressed {
            TickOutcome::ClockRegressed
        } else if anchored {
            TickOutcome::Anchored
        } else {
            TickOutcome::Counted { delta }
        }
    }

    /// Watchdog check. Switches only if the phase already ran out while playing.
    pub fn force_switch_if_expired(&mut self) -> Option<(Color, Color)> {
        if self.is_playing && self.seconds_remaining <= 0.0 {
            Some(self.switch_phase())
        } else {
            None
        }
    }

    fn switch_phase(&mut self) -> (Color, Color) {
        let from = self.color;
        self.color = from.next();
        self.seconds_remaining = self.durations.get(self.color);
        // Re-anchor on the next tick instead of applying a stale delta.
        self.last_tick = None;
        (from, self.color)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            color: self.color,
            seconds_left: display_seconds(self.seconds_remaining),
            is_playing: self.is_playing,
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn seconds_remaining(&self) -> f64 {
        self.seconds_remaining
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn last_tick(&self) -> Option<Instant> {
        self.last_tick
    }

    pub fn durations(&self) -> &PhaseDurations {
        &self.durations
    }
}
