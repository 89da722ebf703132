//! End-to-end feature extraction: preprocess, melt, train or query, and map back
//!
//! ```text
//! images ─[preprocess_batch]─[melt]─> tensor ─┬─[fit]────> TrainingReport
//!                                              ├─[encode]─> (N, latent)
//!                                              └─[predict]─> tensor
//!
//! tensor ─[reconstruct]─[reverse]─> images at original scale
//! ```

use crate::config::{TrainingConfig, TrainingReport};
use crate::error::{AutoencoderError, Result};
use crate::trainer::AutoencoderTrainer;
use ndarray::{Array2, ArrayBase, ArrayD, Data, Dimension};
use radiomics_preprocess::{
    melt, preprocess_batch, reconstruct, reverse_array, split_samples, ConvolutionMode,
    ImageSettings,
};
use std::time::Instant;
use tracing::{debug, info};

/// Preprocessing settings bound to one trainer
pub struct FeatureExtractionPipeline<T> {
    settings: ImageSettings,
    trainer: T,
}

impl<T: AutoencoderTrainer> FeatureExtractionPipeline<T> {
    /// Create a pipeline
    ///
    /// # Errors
    ///
    /// [`radiomics_preprocess::ProcessingError::ConfigError`] (wrapped) if
    /// the settings have no `index_dim`, since every operation here melts
    pub fn new(settings: ImageSettings, trainer: T) -> Result<Self> {
        settings.require_index_dim("feature extraction")?;
        info!(
            "Feature extraction pipeline: {} model, {:?} input",
            trainer.kind(),
            settings.output_shape()
        );
        Ok(Self { settings, trainer })
    }

    pub fn settings(&self) -> &ImageSettings {
        &self.settings
    }

    pub fn trainer(&self) -> &T {
        &self.trainer
    }

    pub fn trainer_mut(&mut self) -> &mut T {
        &mut self.trainer
    }

    pub fn into_trainer(self) -> T {
        self.trainer
    }

    /// Layout the trainer consumes
    pub fn mode(&self) -> ConvolutionMode {
        self.trainer.kind().layout()
    }

    /// Preprocess raw images and melt them into the trainer's layout
    pub fn prepare<S, D>(&self, images: &[ArrayBase<S, D>]) -> Result<ArrayD<f32>>
    where
        S: Data<Elem = f32> + Sync,
        D: Dimension,
    {
        let start = Instant::now();
        let processed = preprocess_batch(images, &self.settings)?;
        let tensor = melt(&processed, &self.settings, self.mode())?;
        info!(
            "Prepared {} images into {:?} in {:.2}ms",
            images.len(),
            tensor.shape(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(tensor)
    }

    /// Train the model on raw images
    pub fn train<S, D>(
        &mut self,
        images: &[ArrayBase<S, D>],
        config: &TrainingConfig,
    ) -> Result<TrainingReport>
    where
        S: Data<Elem = f32> + Sync,
        D: Dimension,
    {
        config.validate()?;
        let tensor = self.prepare(images)?;

        let start = Instant::now();
        let report = self.trainer.fit(tensor.view(), config)?;
        info!(
            "Training finished after {} epochs (loss {:.6}) in {:.2}s",
            report.epochs_run,
            report.final_loss,
            start.elapsed().as_secs_f64()
        );
        Ok(report)
    }

    /// Latent features, one row per input image
    ///
    /// # Errors
    ///
    /// [`AutoencoderError::OutputShape`] if the trainer does not return one
    /// row per sample
    pub fn extract_features<S, D>(&self, images: &[ArrayBase<S, D>]) -> Result<Array2<f32>>
    where
        S: Data<Elem = f32> + Sync,
        D: Dimension,
    {
        let tensor = self.prepare(images)?;

        let start = Instant::now();
        let features = self.trainer.encode(tensor.view())?;
        if features.nrows() != images.len() {
            return Err(AutoencoderError::OutputShape {
                expected: format!("{} rows", images.len()),
                actual: features.shape().to_vec(),
            });
        }
        info!(
            "Encoded {} images into {} features each in {:.2}ms",
            features.nrows(),
            features.ncols(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(features)
    }

    /// Run images through the autoencoder and return them at the original
    /// intensity scale, each of shape `(w, h)`
    ///
    /// # Errors
    ///
    /// [`AutoencoderError::OutputShape`] if the prediction's shape differs
    /// from the melted input
    pub fn reconstruct<S, D>(&self, images: &[ArrayBase<S, D>]) -> Result<Vec<Array2<f32>>>
    where
        S: Data<Elem = f32> + Sync,
        D: Dimension,
    {
        let tensor = self.prepare(images)?;

        let start = Instant::now();
        let predicted = self.trainer.predict(tensor.view())?;
        if predicted.shape() != tensor.shape() {
            return Err(AutoencoderError::OutputShape {
                expected: format!("{:?}", tensor.shape()),
                actual: predicted.shape().to_vec(),
            });
        }
        debug!("Prediction took {:.2}ms", start.elapsed().as_secs_f64() * 1000.0);

        let samples = reconstruct(&predicted, &self.settings, self.mode())?;
        let restored = reverse_array(&samples, &self.settings);
        Ok(split_samples(&restored))
    }
}
