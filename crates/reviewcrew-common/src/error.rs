use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transient infrastructure error: {0}")]
    Transient(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReviewError {
    /// Only infrastructure failures are worth another attempt; bad
    /// configuration or input fails the same way every time.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ReviewError::Transient(_) | ReviewError::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, ReviewError>;
