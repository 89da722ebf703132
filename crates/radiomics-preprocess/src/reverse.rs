//! Undo min-max normalization
//!
//! Only the value scaling is reversible. Resize, crop and clipping discard
//! information, so a reversed image is on the original intensity scale but is
//! not the pre-resize original.

use crate::settings::{ImageSettings, Normalization};
use ndarray::{Array, ArrayBase, Data, Dimension};

/// Inverse of [`min_max_scale`](crate::forward::min_max_scale)
#[inline]
#[must_use]
pub fn min_max_unscale(value: f32, lo: f32, hi: f32) -> f32 {
    value * (hi - lo) + lo
}

/// Map one normalized value back to the original intensity scale
///
/// Identity unless min-max normalization is configured.
#[must_use]
pub fn reverse(value: f32, settings: &ImageSettings) -> f32 {
    match (
        settings.normalization(),
        settings.min_limit(),
        settings.max_limit(),
    ) {
        (Normalization::MinMax, Some(lo), Some(hi)) => min_max_unscale(value, lo, hi),
        _ => value,
    }
}

/// Elementwise [`reverse`] over an array of any rank
#[must_use]
pub fn reverse_array<S, D>(values: &ArrayBase<S, D>, settings: &ImageSettings) -> Array<f32, D>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    values.mapv(|v| reverse(v, settings))
}
