use crate::config::{ModelKind, TrainingConfig, TrainingReport};
use crate::error::Result;
use ndarray::{Array2, ArrayD, ArrayViewD};

/// Contract implemented by an external autoencoder backend
///
/// Tensors arrive in the layout of [`ModelKind::layout`] with the sample axis
/// placed according to the settings' `index_dim`.
pub trait AutoencoderTrainer {
    /// Which tensor layout the model consumes
    fn kind(&self) -> ModelKind;

    /// Train on a melted tensor
    ///
    /// # Errors
    ///
    /// [`crate::AutoencoderError::Trainer`] when the backend fails
    fn fit(&mut self, tensor: ArrayViewD<'_, f32>, config: &TrainingConfig)
        -> Result<TrainingReport>;

    /// Reconstruct the input; the output must have the same shape
    fn predict(&self, tensor: ArrayViewD<'_, f32>) -> Result<ArrayD<f32>>;

    /// Latent representation, one row per sample
    fn encode(&self, tensor: ArrayViewD<'_, f32>) -> Result<Array2<f32>>;
}

impl<T: AutoencoderTrainer + ?Sized> AutoencoderTrainer for Box<T> {
    fn kind(&self) -> ModelKind {
        (**self).kind()
    }

    fn fit(
        &mut self,
        tensor: ArrayViewD<'_, f32>,
        config: &TrainingConfig,
    ) -> Result<TrainingReport> {
        (**self).fit(tensor, config)
    }

    fn predict(&self, tensor: ArrayViewD<'_, f32>) -> Result<ArrayD<f32>> {
        (**self).predict(tensor)
    }

    fn encode(&self, tensor: ArrayViewD<'_, f32>) -> Result<Array2<f32>> {
        (**self).encode(tensor)
    }
}
