//! Training configuration, model kinds and training reports

use crate::error::{AutoencoderError, Result};
use radiomics_preprocess::ConvolutionMode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Autoencoder architecture family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Dense layers over flattened images
    #[default]
    Vanilla,
    /// Convolutional layers over `(w, h, 1)` images
    Convolutional,
}

impl ModelKind {
    /// Tensor layout this kind of model consumes
    #[must_use]
    pub const fn layout(self) -> ConvolutionMode {
        match self {
            Self::Vanilla => ConvolutionMode::Flat,
            Self::Convolutional => ConvolutionMode::Convolutional,
        }
    }
}

impl From<ModelKind> for ConvolutionMode {
    fn from(kind: ModelKind) -> Self {
        kind.layout()
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vanilla => write!(f, "vanilla"),
            Self::Convolutional => write!(f, "convolutional"),
        }
    }
}

/// Hyperparameters handed to [`crate::AutoencoderTrainer::fit`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Maximum number of passes over the data
    pub epochs: usize,
    pub batch_size: usize,
    /// Fraction of samples held out for validation, in `[0, 1)`
    pub validation_split: f32,
    /// Stop after this many epochs without validation improvement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub early_stopping_patience: Option<usize>,
    /// Latent vector size
    pub encoding_dim: usize,
    pub learning_rate: f32,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 50,
            batch_size: 32,
            validation_split: 0.1,
            early_stopping_patience: Some(5),
            encoding_dim: 32,
            learning_rate: 1e-3,
        }
    }
}

impl TrainingConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Check every field is in range
    ///
    /// # Errors
    ///
    /// [`AutoencoderError::InvalidConfig`] naming the first offending field
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| Err(AutoencoderError::InvalidConfig(message.to_string()));

        if self.epochs == 0 {
            return invalid("epochs must be positive");
        }
        if self.batch_size == 0 {
            return invalid("batch_size must be positive");
        }
        if !(0.0..1.0).contains(&self.validation_split) {
            return invalid("validation_split must be in [0, 1)");
        }
        if self.encoding_dim == 0 {
            return invalid("encoding_dim must be positive");
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return invalid("learning_rate must be positive and finite");
        }

        debug!(
            "Training config valid: {} epochs, batch {}, latent {}",
            self.epochs, self.batch_size, self.encoding_dim
        );
        Ok(())
    }
}

/// Summary returned by a completed training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub epochs_run: usize,
    pub final_loss: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_loss: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        TrainingConfig::default().validate().unwrap();
    }

    #[test]
    fn test_model_kind_layout() {
        assert_eq!(ModelKind::Vanilla.layout(), ConvolutionMode::Flat);
        assert_eq!(
            ConvolutionMode::from(ModelKind::Convolutional),
            ConvolutionMode::Convolutional
        );
    }

    #[test]
    fn test_yaml_partial_uses_defaults() {
        let config = TrainingConfig::from_yaml_str("epochs: 3\nencoding_dim: 8\n").unwrap();
        assert_eq!(config.epochs, 3);
        assert_eq!(config.encoding_dim, 8);
        assert_eq!(config.batch_size, 32);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let cases = [
            TrainingConfig {
                epochs: 0,
                ..TrainingConfig::default()
            },
            TrainingConfig {
                batch_size: 0,
                ..TrainingConfig::default()
            },
            TrainingConfig {
                validation_split: 1.0,
                ..TrainingConfig::default()
            },
            TrainingConfig {
                validation_split: -0.1,
                ..TrainingConfig::default()
            },
            TrainingConfig {
                encoding_dim: 0,
                ..TrainingConfig::default()
            },
            TrainingConfig {
                learning_rate: 0.0,
                ..TrainingConfig::default()
            },
            TrainingConfig {
                learning_rate: f32::NAN,
                ..TrainingConfig::default()
            },
        ];
        for config in cases {
            let err = config.validate().unwrap_err();
            assert!(matches!(err, AutoencoderError::InvalidConfig(_)), "{config:?}");
        }
    }

    #[test]
    fn test_invalid_yaml_is_rejected() {
        let err = TrainingConfig::from_yaml_str("epochs: 0\n").unwrap_err();
        assert!(matches!(err, AutoencoderError::InvalidConfig(_)));

        let err = TrainingConfig::from_yaml_str("epochs: [1, 2]\n").unwrap_err();
        assert!(matches!(err, AutoencoderError::Processing(_)));
    }

    #[test]
    fn test_report_serializes_without_validation_loss() {
        let report = TrainingReport {
            epochs_run: 4,
            final_loss: 0.25,
            validation_loss: None,
        };
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(json, r#"{"epochs_run":4,"final_loss":0.25}"#);
    }

    #[test]
    fn test_model_kind_serde() {
        let kind: ModelKind = serde_yaml::from_str("convolutional").unwrap();
        assert_eq!(kind, ModelKind::Convolutional);
        assert_eq!(kind.to_string(), "convolutional");
    }
}
