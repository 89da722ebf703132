//! # Autoencoder feature extraction
//!
//! Connects the preprocessing core in [`radiomics_preprocess`] to an
//! external autoencoder backend. The backend implements
//! [`AutoencoderTrainer`]; [`FeatureExtractionPipeline`] feeds it melted
//! tensors in the layout its [`ModelKind`] asks for and maps predictions
//! back to per-image arrays at the original intensity scale.
//!
//! Network architectures and the training loop itself live in the backend.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod trainer;

pub use config::{ModelKind, TrainingConfig, TrainingReport};
pub use error::{AutoencoderError, Result};
pub use pipeline::FeatureExtractionPipeline;
pub use trainer::AutoencoderTrainer;
