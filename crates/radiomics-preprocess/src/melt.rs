//! Stack preprocessed images into one trainer tensor
//!
//! Flat layout: each image is flattened column-major (width index fastest)
//! into one column of a `(features, N)` matrix, which is transposed to
//! `(N, features)` when the sample axis comes first.
//!
//! Convolutional layout: images are stacked to `(w, h, N)`, reordered by
//! [`stack_permutation`], then given a trailing channel axis of size 1.

use crate::layout::{flat_sample_axis, stack_permutation, ConvolutionMode};
use crate::settings::ImageSettings;
use ndarray::{stack, Array2, ArrayBase, ArrayD, ArrayView2, Axis, Data, Ix2};
use radiomics_common::{ProcessingError, Result};
use tracing::debug;

/// Melt preprocessed images into a single tensor
///
/// Element `i` along the sample axis is `images[i]`.
///
/// # Errors
///
/// * [`ProcessingError::ConfigError`] if `index_dim` is unset
/// * [`ProcessingError::ShapeMismatch`] if `images` is empty or an image's
///   shape differs from [`ImageSettings::output_shape`]
pub fn melt<S>(
    images: &[ArrayBase<S, Ix2>],
    settings: &ImageSettings,
    mode: ConvolutionMode,
) -> Result<ArrayD<f32>>
where
    S: Data<Elem = f32>,
{
    let index_dim = settings.require_index_dim("melting")?;
    let (w, h) = settings.output_shape();

    if images.is_empty() {
        return Err(ProcessingError::shape("melt", "at least one image", &[0]));
    }
    for (i, image) in images.iter().enumerate() {
        if image.dim() != (w, h) {
            return Err(ProcessingError::shape(
                "melt",
                format!("({w}, {h}) for image {i}"),
                image.shape(),
            ));
        }
    }

    let views: Vec<ArrayView2<'_, f32>> = images.iter().map(|image| image.view()).collect();
    let tensor = match mode {
        ConvolutionMode::Flat => melt_flat(&views, w * h, flat_sample_axis(index_dim)),
        ConvolutionMode::Convolutional => {
            let stacked = stack(Axis(2), &views)?;
            stacked
                .permuted_axes(stack_permutation(index_dim))
                .as_standard_layout()
                .into_owned()
                .insert_axis(Axis(3))
                .into_dyn()
        }
    };

    debug!(
        "Melted {} images into {} tensor {:?}",
        images.len(),
        mode,
        tensor.shape()
    );

    Ok(tensor)
}

fn melt_flat(views: &[ArrayView2<'_, f32>], features: usize, sample_axis: Axis) -> ArrayD<f32> {
    let mut columns = Array2::<f32>::zeros((features, views.len()));
    for (mut column, image) in columns.columns_mut().into_iter().zip(views) {
        // `t()` iterates the width index fastest: column-major order
        for (dst, &src) in column.iter_mut().zip(image.t().iter()) {
            *dst = src;
        }
    }

    if sample_axis == Axis(0) {
        columns.t().as_standard_layout().into_owned().into_dyn()
    } else {
        columns.into_dyn()
    }
}
