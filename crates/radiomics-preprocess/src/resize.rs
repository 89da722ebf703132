// Intentional conversions: pixel coordinates, image dimensions, interpolation
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

//! Separable resampling of single-channel `f32` images
//!
//! Resampling runs as two passes, one per axis, each with precomputed tap
//! weights. The bilinear filter widens its support when downsampling
//! (`filterscale = max(in / out, 1)`), so every input pixel contributes to
//! the result instead of being skipped.
//!
//! An axis whose extent already matches the target is left untouched, which
//! keeps NaN positions exact for images that are already the right size.

use crate::settings::ResizeFilter;
use ndarray::{Array2, ArrayView2, Axis};

/// Triangle kernel: `max(0, 1 - |x|)`
#[inline]
fn bilinear_filter(x: f32) -> f32 {
    let abs_x = x.abs();
    if abs_x < 1.0 {
        1.0 - abs_x
    } else {
        0.0
    }
}

/// Input taps and normalized weights for one output sample
#[derive(Debug, Clone, PartialEq)]
struct Taps {
    indices: Vec<usize>,
    weights: Vec<f32>,
}

fn compute_taps(in_len: usize, out_len: usize, filter: ResizeFilter) -> Vec<Taps> {
    let scale = in_len as f32 / out_len as f32;

    (0..out_len)
        .map(|out| {
            let center = (out as f32 + 0.5) * scale;
            match filter {
                ResizeFilter::Nearest => {
                    let idx = (center.floor() as usize).min(in_len - 1);
                    Taps {
                        indices: vec![idx],
                        weights: vec![1.0],
                    }
                }
                ResizeFilter::Bilinear => {
                    let filterscale = scale.max(1.0);
                    let support = filterscale;
                    let min = ((center - support + 0.5).floor() as i64).max(0) as usize;
                    let max = ((center + support + 0.5).floor() as i64).min(in_len as i64) as usize;

                    let mut indices = Vec::with_capacity(max.saturating_sub(min));
                    let mut weights = Vec::with_capacity(max.saturating_sub(min));
                    for x in min..max {
                        let weight = bilinear_filter((x as f32 + 0.5 - center) / filterscale);
                        // Zero-weight taps are dropped so NaN neighbours cannot leak in
                        if weight > 0.0 {
                            indices.push(x);
                            weights.push(weight);
                        }
                    }

                    let total: f32 = weights.iter().sum();
                    if total > 0.0 {
                        weights.iter_mut().for_each(|w| *w /= total);
                    } else {
                        let idx = (center.floor() as usize).min(in_len - 1);
                        indices = vec![idx];
                        weights = vec![1.0];
                    }

                    Taps { indices, weights }
                }
            }
        })
        .collect()
}

fn resample_axis(
    input: ArrayView2<'_, f32>,
    axis: Axis,
    out_len: usize,
    filter: ResizeFilter,
) -> Array2<f32> {
    let taps = compute_taps(input.len_of(axis), out_len, filter);

    let mut shape = [input.nrows(), input.ncols()];
    shape[axis.index()] = out_len;
    let mut output = Array2::<f32>::zeros(shape);

    for (in_lane, mut out_lane) in input.lanes(axis).into_iter().zip(output.lanes_mut(axis)) {
        for (value, tap) in out_lane.iter_mut().zip(&taps) {
            *value = tap
                .indices
                .iter()
                .zip(&tap.weights)
                .map(|(&idx, &w)| in_lane[idx] * w)
                .sum();
        }
    }

    output
}

/// Resize a single-channel image to `(width, height)`
///
/// # Arguments
/// * `image` - Input image, axis 0 = width, axis 1 = height
/// * `width` - Target extent of axis 0
/// * `height` - Target extent of axis 1
/// * `filter` - Interpolation kernel
///
/// # Returns
/// Resized image of shape `(width, height)`. An image with a zero-length
/// axis has nothing to sample and yields zeros.
#[must_use = "returns the resized image array"]
pub fn resize(
    image: ArrayView2<'_, f32>,
    width: usize,
    height: usize,
    filter: ResizeFilter,
) -> Array2<f32> {
    let (in_width, in_height) = image.dim();
    if image.is_empty() {
        return Array2::zeros((width, height));
    }

    let horizontal = if in_width == width {
        image.to_owned()
    } else {
        resample_axis(image, Axis(0), width, filter)
    };

    if in_height == height {
        horizontal
    } else {
        resample_axis(horizontal.view(), Axis(1), height, filter)
    }
}
