use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration for '{key}': {reason}")]
    InvalidConfiguration { key: String, reason: String },
    #[error("Failed to load configuration: {0}")]
    ConfigLoad(#[from] config::ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}
