use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

use traffic_light::{
    ShutdownCoordinator, Snapshot, TrafficLightConfig, TrafficLightEngine, WatchdogMode,
};

/// Keyboard controls accepted on stdin, one per line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKey {
    Toggle,
    Start,
    Pause,
    Reset,
    Quit,
}

impl ControlKey {
    pub fn parse(line: &str) -> Option<Self> {
        if line == " " {
            return Some(ControlKey::Toggle);
        }
        match line.trim().to_ascii_lowercase().as_str() {
            "p" | "toggle" => Some(ControlKey::Toggle),
            "s" | "start" => Some(ControlKey::Start),
            "x" | "pause" => Some(ControlKey::Pause),
            "r" | "reset" => Some(ControlKey::Reset),
            "q" | "quit" | "exit" => Some(ControlKey::Quit),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct SnapshotLine {
    at: DateTime<Utc>,
    #[serde(flatten)]
    snapshot: Snapshot,
}

pub struct RunCommand {
    pub seconds: Option<f64>,
    pub json: bool,
    pub watchdog_mode: Option<WatchdogMode>,
    pub paused: bool,
}

impl RunCommand {
    pub async fn execute(&self, config: &TrafficLightConfig) -> Result<()> {
        let mut engine_config = config.engine_config();
        if let Some(mode) = self.watchdog_mode {
            engine_config.watchdog_mode = mode;
        }
        let deadline = self.seconds.map(run_deadline).transpose()?;

        let mut engine = TrafficLightEngine::new(engine_config)?;
        let mut snapshots = engine.subscribe();
        let mut keys = spawn_key_reader();

        let shutdown = ShutdownCoordinator::new().with_deadline(deadline);
        let wait = shutdown.wait_for_shutdown();
        tokio::pin!(wait);

        info!(engine_id = %engine.engine_id(), "Traffic light ready");
        let initial = *snapshots.borrow_and_update();
        self.print_snapshot(&initial)?;
        if !self.paused {
            engine.start();
        }

        loop {
            tokio::select! {
                reason = &mut wait => {
                    debug!(?reason, "Stopping run loop");
                    break;
                }
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = *snapshots.borrow_and_update();
                    self.print_snapshot(&snapshot)?;
                }
                Some(key) = keys.recv() => {
                    debug!(?key, "Control key received");
                    match key {
                        ControlKey::Toggle => engine.toggle(),
                        ControlKey::Start => engine.start(),
                        ControlKey::Pause => engine.pause(),
                        ControlKey::Reset => engine.reset(),
                        ControlKey::Quit => break,
                    }
                }
            }
        }

        ShutdownCoordinator::shutdown_engine(&mut engine);
        Ok(())
    }

    fn print_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        if self.json {
            let line = SnapshotLine {
                at: Utc::now(),
                snapshot: *snapshot,
            };
            writeln!(stdout, "{}", serde_json::to_string(&line)?)?;
        } else {
            writeln!(stdout, "{}", format_snapshot(&Local::now(), snapshot))?;
        }
        stdout.flush()?;
        Ok(())
    }
}

/// Converts `--seconds` into a deadline, rejecting values `Duration` cannot hold.
fn run_deadline(seconds: f64) -> Result<Duration> {
    match Duration::try_from_secs_f64(seconds) {
        Ok(deadline) => Ok(deadline),
        Err(e) => anyhow::bail!("--seconds must be a non-negative number of seconds, got {seconds}: {e}"),
    }
}

/// Human-readable line: `14:03:07 🔴 RED    5s playing`
pub fn format_snapshot(at: &DateTime<Local>, snapshot: &Snapshot) -> String {
    let lamp = match snapshot.color {
        traffic_light::Color::Red => "🔴",
        traffic_light::Color::Green => "🟢",
        traffic_light::Color::Yellow => "🟡",
    };
    format!(
        "{} {} {:<6} {}s {}",
        at.format("%H:%M:%S"),
        lamp,
        snapshot.color.as_str(),
        snapshot.seconds_left,
        if snapshot.is_playing { "playing" } else { "paused" }
    )
}

/// Read control keys from stdin. EOF only ends the reader, not the run.
fn spawn_key_reader() -> mpsc::Receiver<ControlKey> {
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match ControlKey::parse(&line) {
                Some(key) => {
                    if tx.send(key).await.is_err() {
                        break;
                    }
                }
                None => debug!(input = %line, "Ignoring unknown control key"),
            }
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use traffic_light::Color;

    #[test]
    fn test_parse_control_keys() {
        assert_eq!(ControlKey::parse("p"), Some(ControlKey::Toggle));
        assert_eq!(ControlKey::parse(" "), Some(ControlKey::Toggle));
        assert_eq!(ControlKey::parse("S\n"), Some(ControlKey::Start));
        assert_eq!(ControlKey::parse("x"), Some(ControlKey::Pause));
        assert_eq!(ControlKey::parse("reset"), Some(ControlKey::Reset));
        assert_eq!(ControlKey::parse("q"), Some(ControlKey::Quit));
        assert_eq!(ControlKey::parse("z"), None);
    }

    #[test]
    fn test_run_deadline_bounds() {
        assert_eq!(run_deadline(0.0).unwrap(), Duration::ZERO);
        assert_eq!(run_deadline(1.5).unwrap(), Duration::from_millis(1_500));
        assert!(run_deadline(-1.0).is_err());
        assert!(run_deadline(f64::NAN).is_err());
        assert!(run_deadline(f64::INFINITY).is_err());
        assert!(run_deadline(1e20).is_err());
    }

    #[test]
    fn test_format_snapshot() {
        let at = Local.with_ymd_and_hms(2024, 5, 1, 14, 3, 7).unwrap();
        let line = format_snapshot(
            &at,
            &Snapshot { color: Color::Green, seconds_left: 4, is_playing: true },
        );
        assert_eq!(line, "14:03:07 🟢 GREEN  4s playing");
    }

    #[test]
    fn test_json_line_flattens_snapshot() {
        let line = SnapshotLine {
            at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            snapshot: Snapshot { color: Color::Red, seconds_left: 5, is_playing: false },
        };
        let value: serde_json::Value = serde_json::to_value(&line).unwrap();
        assert_eq!(value["color"], "RED");
        assert_eq!(value["seconds_left"], 5);
        assert_eq!(value["is_playing"], false);
    }
}
