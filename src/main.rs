use anyhow::Result;
use clap::Parser;
use std::time::Duration;

mod cli;

use cli::commands::config::{ConfigInitCommand, ConfigShowCommand};
use cli::commands::phases::PhasesCommand;
use cli::commands::run::RunCommand;
use cli::commands::show_how_to_run;
use cli::{Cli, Commands, ConfigAction};
use traffic_light::{init_telemetry, TrafficLightConfig};

fn load_config(cli: &Cli) -> Result<TrafficLightConfig> {
    TrafficLightConfig::load_env_file();
    let config = match &cli.config {
        Some(path) => TrafficLightConfig::load_from(path)?,
        None => TrafficLightConfig::load()?,
    };
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        // Default behavior: no subcommand - explain how to run the light
        None => {
            show_how_to_run();
            Ok(())
        }
        Some(Commands::Run {
            seconds,
            json,
            watchdog_mode,
            paused,
        }) => {
            let config = load_config(&cli)?;
            init_telemetry(
                &config.observability.log_level,
                config.observability.json_logs,
            )?;

            let command = RunCommand {
                seconds: *seconds,
                json: *json,
                watchdog_mode: *watchdog_mode,
                paused: *paused,
            };
            let runtime = tokio::runtime::Runtime::new()?;
            let result = runtime.block_on(async { command.execute(&config).await });
            // The stdin reader may still be parked in a blocking read.
            runtime.shutdown_timeout(Duration::from_millis(100));
            result
        }
        Some(Commands::Phases) => {
            let config = load_config(&cli)?;
            PhasesCommand.execute(&config);
            Ok(())
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Show => {
                let config = load_config(&cli)?;
                ConfigShowCommand.execute(&config)
            }
            ConfigAction::Init { path, force } => ConfigInitCommand {
                path: path.clone(),
                force: *force,
            }
            .execute(),
        },
    }
}
