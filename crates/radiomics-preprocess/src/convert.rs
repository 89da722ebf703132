// Intentional conversions: image dimensions
#![allow(clippy::cast_possible_truncation)]

//! Bridges between `image` buffers and the `(width, height)` arrays used here

use image::{ImageBuffer, Luma, Pixel};
use ndarray::{Array2, ArrayView2};
use radiomics_common::{ProcessingError, Result};

/// Copy a grayscale image buffer (8-bit, 16-bit or float) into an `f32` array
///
/// Axis 0 of the result is the image x coordinate, axis 1 the y coordinate.
#[must_use = "returns the image as an array"]
pub fn array_from_luma<P>(image: &ImageBuffer<Luma<P>, Vec<P>>) -> Array2<f32>
where
    Luma<P>: Pixel<Subpixel = P>,
    P: Into<f32> + Copy,
{
    let (width, height) = image.dimensions();
    Array2::from_shape_fn((width as usize, height as usize), |(x, y)| {
        image.get_pixel(x as u32, y as u32).0[0].into()
    })
}

/// Copy a `(width, height)` array into a 32-bit float grayscale buffer
pub fn luma_from_array(array: ArrayView2<'_, f32>) -> Result<ImageBuffer<Luma<f32>, Vec<f32>>> {
    let (width, height) = array.dim();
    let too_large =
        || ProcessingError::shape("luma_from_array", "extents below 2^32", &[width, height]);
    let w = u32::try_from(width).map_err(|_| too_large())?;
    let h = u32::try_from(height).map_err(|_| too_large())?;

    Ok(ImageBuffer::from_fn(w, h, |x, y| Luma([array[[x as usize, y as usize]]])))
}
