use thiserror::Error;

#[derive(Error, Debug)]
pub enum DominionError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Engine unavailable: {0}")]
    Engine(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, DominionError>;
