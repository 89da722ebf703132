/// Common error types shared by the preprocessing and autoencoder crates
use thiserror::Error;

/// Processing errors
///
/// Every preprocessing and reshaping step is a pure function, so none of these
/// are transient: a returned error means the caller passed a bad configuration
/// or a badly shaped array.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// Settings are missing a required field or hold an out-of-range value
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// An array does not have the shape the operation expects
    #[error("Shape mismatch in {context}: expected {expected}, got {actual:?}")]
    ShapeMismatch {
        context: &'static str,
        expected: String,
        actual: Vec<usize>,
    },

    #[error("Tensor shape error: {0}")]
    Tensor(#[from] ndarray::ShapeError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl ProcessingError {
    /// Shorthand for a [`ProcessingError::ConfigError`]
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Shorthand for a [`ProcessingError::ShapeMismatch`]
    pub fn shape(context: &'static str, expected: impl Into<String>, actual: &[usize]) -> Self {
        Self::ShapeMismatch {
            context,
            expected: expected.into(),
            actual: actual.to_vec(),
        }
    }

    /// True for errors caused by configuration rather than array shape
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError(_) | Self::Yaml(_) | Self::Json(_))
    }

    /// True for errors caused by a badly shaped array
    #[must_use]
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(
            self,
            Self::ShapeMismatch { .. } | Self::Tensor(_)
        )
    }
}

/// Result type for processing operations
pub type Result<T> = std::result::Result<T, ProcessingError>;
