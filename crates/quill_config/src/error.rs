use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Read(#[from] config::ConfigError),

    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: &'static str, message: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
