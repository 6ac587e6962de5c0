use clap::{Parser, Subcommand};
use std::path::PathBuf;

use traffic_light::WatchdogMode;

pub mod commands;

#[derive(Parser)]
#[command(name = "traffic-light")]
#[command(about = "Three-phase traffic light timer with a live countdown")]
#[command(long_about = "Runs a red/green/yellow traffic light that counts down each phase in real time. \
                       Start it with 'traffic-light run' and control it from the keyboard.")]
pub struct Cli {
    /// Configuration file to read instead of ./traffic-light.toml
    #[arg(long, global = true, help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the light and print every change of color or countdown
    Run {
        /// Stop after this many seconds (runs until Ctrl-C or 'q' otherwise)
        #[arg(long, help = "Stop automatically after this many seconds")]
        seconds: Option<f64>,
        /// Print one JSON object per change instead of a text line
        #[arg(long, help = "Emit snapshots as JSON lines")]
        json: bool,
        /// Override the configured watchdog behaviour
        #[arg(long, help = "Watchdog mode: expiry or advance")]
        watchdog_mode: Option<WatchdogMode>,
        /// Do not start counting until toggled
        #[arg(long, help = "Begin paused; press 'p' to start")]
        paused: bool,
    },
    /// Show the phase durations and cycle order
    Phases,
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Write a default configuration file
    Init {
        /// Where to write the file
        #[arg(long, help = "Output path (default: ./traffic-light.toml)")]
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long, help = "Overwrite an existing configuration file")]
        force: bool,
    },
}
