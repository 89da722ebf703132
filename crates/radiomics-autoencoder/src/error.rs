use radiomics_common::ProcessingError;
use thiserror::Error;

/// Errors raised while training or querying an autoencoder
#[derive(Error, Debug)]
pub enum AutoencoderError {
    #[error(transparent)]
    Processing(#[from] ProcessingError),

    /// Failure reported by the trainer implementation
    #[error("Trainer error: {0}")]
    Trainer(String),

    /// Trainer output does not have the shape the pipeline requires
    #[error("Invalid trainer output shape: expected {expected}, got {actual:?}")]
    OutputShape { expected: String, actual: Vec<usize> },

    #[error("Invalid training configuration: {0}")]
    InvalidConfig(String),
}

impl AutoencoderError {
    pub fn trainer(message: impl Into<String>) -> Self {
        Self::Trainer(message.into())
    }
}

impl From<AutoencoderError> for ProcessingError {
    fn from(err: AutoencoderError) -> Self {
        match err {
            AutoencoderError::Processing(inner) => inner,
            AutoencoderError::InvalidConfig(message) => ProcessingError::ConfigError(message),
            other => ProcessingError::Other(other.to_string()),
        }
    }
}

impl From<serde_yaml::Error> for AutoencoderError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Processing(err.into())
    }
}

impl From<std::io::Error> for AutoencoderError {
    fn from(err: std::io::Error) -> Self {
        Self::Processing(err.into())
    }
}

/// Result type for autoencoder operations
pub type Result<T> = std::result::Result<T, AutoencoderError>;
