//! # Radiology image preprocessing for autoencoder training
//!
//! Turns raw single-channel 2D images of any size and intensity range into a
//! fixed-shape, normalized tensor for a dense or convolutional autoencoder,
//! and maps trainer output back again.
//!
//! ```text
//! raw images ─[preprocess]×N─> ─[melt]─> tensor ─> trainer ─> tensor
//!                                                               │
//!     approx. original scale <─[reverse]─ per-sample <─[reconstruct]
//! ```
//!
//! ## Modules
//!
//! - [`settings`]: validated, immutable [`ImageSettings`]
//! - [`forward`]: resize, ROI crop, NaN sanitize, clip, min-max normalize
//! - [`resize`]: separable bilinear / nearest resampling
//! - [`layout`]: sample-axis mapping shared by melt and reconstruct
//! - [`melt`]: stack images into a flat `(N, features)` / `(features, N)` or
//!   convolutional `(N, w, h, 1)` / `(w, h, N, 1)` tensor
//! - [`reconstruct`]: back to `(N, w, h)`
//! - [`reverse`]: undo min-max scaling
//! - [`convert`]: `image` crate buffers to and from arrays
//!
//! ## Example
//!
//! ```
//! use ndarray::Array2;
//! use radiomics_preprocess::{
//!     melt, preprocess_batch, reconstruct, reverse_array, ConvolutionMode, ImageSettings,
//!     IndexDim, Normalization,
//! };
//!
//! # fn main() -> radiomics_preprocess::Result<()> {
//! let settings = ImageSettings::builder()
//!     .width(4)
//!     .height(4)
//!     .normalization(Normalization::MinMax)
//!     .min_limit(0.0)
//!     .max_limit(10.0)
//!     .index_dim(IndexDim::First)
//!     .build()?;
//!
//! let raw = vec![Array2::from_elem((8, 8), 5.0f32), Array2::from_elem((6, 6), 10.0f32)];
//! let processed = preprocess_batch(&raw, &settings)?;
//! let tensor = melt(&processed, &settings, ConvolutionMode::Convolutional)?;
//! assert_eq!(tensor.shape(), &[2, 4, 4, 1]);
//!
//! let restored = reconstruct(&tensor, &settings, ConvolutionMode::Convolutional)?;
//! let original_scale = reverse_array(&restored, &settings);
//! assert!((original_scale[[1, 0, 0]] - 10.0).abs() < 1e-4);
//! # Ok(())
//! # }
//! ```

pub mod convert;
pub mod forward;
pub mod layout;
pub mod melt;
pub mod reconstruct;
pub mod resize;
pub mod reverse;
pub mod settings;

pub use convert::{array_from_luma, luma_from_array};
pub use forward::{preprocess, preprocess_batch};
pub use layout::ConvolutionMode;
pub use melt::melt;
pub use radiomics_common::{ProcessingError, Result};
pub use reconstruct::{reconstruct, split_samples};
pub use reverse::{reverse, reverse_array};
pub use settings::{ImageSettings, ImageSettingsBuilder, IndexDim, Normalization, ResizeFilter};
