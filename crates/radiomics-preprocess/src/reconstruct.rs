//! Structural inverse of [`melt`](crate::melt::melt)
//!
//! Both layouts come back as a sample-major `(N, w, h)` array. Values are not
//! touched; see [`reverse`](crate::reverse) for undoing normalization.

use crate::layout::{sample_first_permutation, ConvolutionMode};
use crate::settings::{ImageSettings, IndexDim};
use ndarray::{Array2, Array3, ArrayBase, Axis, Data, Dimension, Ix2, Ix4};
use radiomics_common::{ProcessingError, Result};
use tracing::debug;

/// Restore per-sample images from a melted (or trainer-produced) tensor
///
/// # Errors
///
/// * [`ProcessingError::ConfigError`] if `index_dim` is unset
/// * [`ProcessingError::ShapeMismatch`] if the element count is not a
///   multiple of [`ImageSettings::feature_count`], or if the tensor's axes do
///   not fit the layout (convolutional input must be rank 4 with a trailing
///   channel of 1 and spatial axes matching the ROI; a sample-last flat
///   tensor must be `(features, N)`)
pub fn reconstruct<S, D>(
    tensor: &ArrayBase<S, D>,
    settings: &ImageSettings,
    mode: ConvolutionMode,
) -> Result<Array3<f32>>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    let index_dim = settings.require_index_dim("reconstruction")?;
    let (w, h) = settings.output_shape();
    let features = settings.feature_count();

    let total = tensor.len();
    if total % features != 0 {
        return Err(ProcessingError::shape(
            "reconstruct",
            format!("an element count divisible by {features} features per sample"),
            tensor.shape(),
        ));
    }
    let samples = total / features;

    let restored = match mode {
        ConvolutionMode::Convolutional => {
            reconstruct_convolutional(tensor, index_dim, (samples, w, h))?
        }
        ConvolutionMode::Flat => reconstruct_flat(tensor, index_dim, (samples, w, h))?,
    };

    debug!(
        "Reconstructed {} tensor {:?} -> {:?}",
        mode,
        tensor.shape(),
        restored.shape()
    );

    Ok(restored)
}

fn reconstruct_convolutional<S, D>(
    tensor: &ArrayBase<S, D>,
    index_dim: IndexDim,
    expected: (usize, usize, usize),
) -> Result<Array3<f32>>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    if tensor.ndim() != 4 || tensor.shape()[3] != 1 {
        return Err(ProcessingError::shape(
            "reconstruct",
            "a rank 4 tensor with a trailing channel axis of size 1",
            tensor.shape(),
        ));
    }

    let spatial = tensor
        .view()
        .into_dimensionality::<Ix4>()?
        .index_axis_move(Axis(3), 0)
        .permuted_axes(sample_first_permutation(index_dim));

    if spatial.dim() != expected {
        let (n, w, h) = expected;
        return Err(ProcessingError::shape(
            "reconstruct",
            format!("({n}, {w}, {h}) after moving the sample axis first"),
            spatial.shape(),
        ));
    }

    Ok(spatial.as_standard_layout().into_owned())
}

fn reconstruct_flat<S, D>(
    tensor: &ArrayBase<S, D>,
    index_dim: IndexDim,
    (samples, w, h): (usize, usize, usize),
) -> Result<Array3<f32>>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    // Collect every sample's features contiguously, in sample order
    let values: Vec<f32> = match index_dim {
        IndexDim::First => tensor.iter().copied().collect(),
        IndexDim::Last => {
            if tensor.ndim() != 2 || tensor.shape()[0] != w * h {
                return Err(ProcessingError::shape(
                    "reconstruct",
                    format!("a ({}, N) tensor with samples along the last axis", w * h),
                    tensor.shape(),
                ));
            }
            tensor
                .view()
                .into_dimensionality::<Ix2>()?
                .reversed_axes()
                .iter()
                .copied()
                .collect()
        }
    };

    // Features were flattened column-major, so each row-major (h, w) block is
    // one image transposed
    let blocks = Array3::from_shape_vec((samples, h, w), values)?;
    Ok(blocks
        .permuted_axes([0, 2, 1])
        .as_standard_layout()
        .into_owned())
}

/// Split a sample-major `(N, w, h)` array into owned per-sample images
#[must_use]
pub fn split_samples(samples: &Array3<f32>) -> Vec<Array2<f32>> {
    samples.outer_iter().map(|view| view.to_owned()).collect()
}
