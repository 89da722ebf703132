//! Forward preprocessing of a single image
//!
//! Pipeline, in this order:
//! 1. Resize to `(width, height)`
//! 2. Crop to the region of interest
//! 3. Replace missing (NaN) values with 0
//! 4. Clamp values above `max_limit`
//! 5. Clamp values below `min_limit`
//! 6. Min-max normalize onto `[0, 1]` (when selected)
//!
//! Clipping and normalization always see the resized, cropped and sanitized
//! array. Each step is also exported on its own.

use crate::resize::resize;
use crate::settings::{ImageSettings, Normalization};
use ndarray::{Array2, ArrayBase, ArrayView2, Axis, Data, DataMut, Dimension, Ix2};
use radiomics_common::{ProcessingError, Result};
use rayon::prelude::*;
use tracing::{debug, info};

/// Preprocess one image into a `(roi_width.len(), roi_height.len())` array
///
/// # Errors
///
/// * [`ProcessingError::ShapeMismatch`] if the image is not 2-dimensional
///   (with `channel_dim` the image plus its implicit channel must be rank 3)
///   or has a zero-length axis
/// * [`ProcessingError::ConfigError`] if min-max normalization is selected
///   without both limits
pub fn preprocess<S, D>(image: &ArrayBase<S, D>, settings: &ImageSettings) -> Result<Array2<f32>>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    let channel = usize::from(settings.channel_dim());
    let expected_rank = 2 + channel;
    if image.ndim() + channel != expected_rank {
        return Err(ProcessingError::shape(
            "preprocess",
            if settings.channel_dim() {
                "a 2D image (rank 3 with the implicit channel)"
            } else {
                "a 2D image"
            },
            image.shape(),
        ));
    }

    let image = image.view().into_dimensionality::<Ix2>()?;
    if image.is_empty() {
        return Err(ProcessingError::shape(
            "preprocess",
            "a non-empty 2D image",
            image.shape(),
        ));
    }

    let resized = resize(
        image,
        settings.width(),
        settings.height(),
        settings.resize_filter(),
    );
    let mut processed = crop_to_roi(resized, settings);
    sanitize_missing(&mut processed);
    clip(&mut processed, settings.min_limit(), settings.max_limit());
    normalize(&mut processed, settings)?;

    debug!(
        "Preprocessed image {:?} -> {:?}",
        image.dim(),
        processed.dim()
    );

    Ok(processed)
}

/// Preprocess a batch of images in parallel
///
/// Output order matches input order. The first failure aborts the batch.
pub fn preprocess_batch<S, D>(
    images: &[ArrayBase<S, D>],
    settings: &ImageSettings,
) -> Result<Vec<Array2<f32>>>
where
    S: Data<Elem = f32> + Sync,
    D: Dimension,
{
    info!(
        "Preprocessing batch of {} images to {:?}",
        images.len(),
        settings.output_shape()
    );

    images
        .par_iter()
        .map(|image| preprocess(image, settings))
        .collect()
}

/// Keep only the ROI rows/columns of a resized image, in ROI order
#[must_use = "returns the cropped image"]
pub fn crop_to_roi(resized: Array2<f32>, settings: &ImageSettings) -> Array2<f32> {
    if resized.dim() == (settings.width(), settings.height()) && settings.roi_is_full() {
        return resized;
    }
    select_roi(resized.view(), settings.roi_width(), settings.roi_height())
}

fn select_roi(
    image: ArrayView2<'_, f32>,
    roi_width: &[usize],
    roi_height: &[usize],
) -> Array2<f32> {
    image.select(Axis(0), roi_width).select(Axis(1), roi_height)
}

/// Replace NaN entries with 0
pub fn sanitize_missing<S, D>(image: &mut ArrayBase<S, D>)
where
    S: DataMut<Elem = f32>,
    D: Dimension,
{
    image.mapv_inplace(|v| if v.is_nan() { 0.0 } else { v });
}

/// Clamp values to the given limits (upper limit first, then lower)
pub fn clip<S, D>(image: &mut ArrayBase<S, D>, min_limit: Option<f32>, max_limit: Option<f32>)
where
    S: DataMut<Elem = f32>,
    D: Dimension,
{
    if let Some(hi) = max_limit {
        image.mapv_inplace(|v| if v > hi { hi } else { v });
    }
    if let Some(lo) = min_limit {
        image.mapv_inplace(|v| if v < lo { lo } else { v });
    }
}

/// Linear map of `[lo, hi]` onto `[0, 1]`
#[inline]
#[must_use]
pub fn min_max_scale(value: f32, lo: f32, hi: f32) -> f32 {
    (value - lo) / (hi - lo)
}

/// Apply the configured normalization in place
///
/// # Errors
///
/// [`ProcessingError::ConfigError`] if min-max normalization is selected and
/// either limit is unset.
pub fn normalize<S, D>(image: &mut ArrayBase<S, D>, settings: &ImageSettings) -> Result<()>
where
    S: DataMut<Elem = f32>,
    D: Dimension,
{
    match settings.normalization() {
        Normalization::None => Ok(()),
        Normalization::MinMax => match (settings.min_limit(), settings.max_limit()) {
            (Some(lo), Some(hi)) => {
                image.mapv_inplace(|v| min_max_scale(v, lo, hi));
                Ok(())
            }
            _ => Err(ProcessingError::config(
                "min-max normalization needs both min_limit and max_limit",
            )),
        },
    }
}
