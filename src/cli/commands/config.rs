use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};

use traffic_light::{TrafficLightConfig, DEFAULT_CONFIG_FILE};

pub struct ConfigShowCommand;

impl ConfigShowCommand {
    pub fn execute(&self, config: &TrafficLightConfig) -> Result<()> {
        print!("{}", config.to_toml()?);
        Ok(())
    }
}

pub struct ConfigInitCommand {
    pub path: Option<PathBuf>,
    pub force: bool,
}

impl ConfigInitCommand {
    pub fn execute(&self) -> Result<()> {
        let path = self
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        if Path::new(&path).exists() && !self.force {
            return Err(anyhow!(
                "Configuration file {} already exists. Use --force to overwrite.",
                path.display()
            ));
        }

        TrafficLightConfig::default().save_to_file(&path)?;
        println!("✅ Wrote {}", path.display());
        Ok(())
    }
}
