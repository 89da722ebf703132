//! Image processing settings
//!
//! [`ImageSettings`] is the single configuration value handed to every
//! preprocessing and reshaping call. It is validated once, when it is built
//! (through [`ImageSettingsBuilder`] or by deserializing YAML/JSON), and never
//! changes afterwards.

use radiomics_common::{ProcessingError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Intensity normalization scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Normalization {
    /// Keep clipped values in their original range
    #[default]
    None,
    /// Rescale `[min_limit, max_limit]` linearly onto `[0, 1]`
    #[serde(alias = "minmax", alias = "min_max")]
    MinMax,
}

impl std::fmt::Display for Normalization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::MinMax => write!(f, "min-max"),
        }
    }
}

impl std::str::FromStr for Normalization {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "min-max" | "minmax" | "min_max" => Ok(Self::MinMax),
            other => Err(ProcessingError::config(format!(
                "Unknown normalization '{other}'. Expected: none or min-max"
            ))),
        }
    }
}

/// Position of the sample axis in a melted tensor
///
/// Configuration files may give it as the axis number (`1` or `2`) or by name
/// (`first` / `last`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "IndexDimRepr", into = "usize")]
pub enum IndexDim {
    /// Samples along the first axis (sample-major)
    First,
    /// Samples along the last spatial/feature axis
    Last,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IndexDimRepr {
    Position(usize),
    Name(String),
}

impl TryFrom<IndexDimRepr> for IndexDim {
    type Error = ProcessingError;

    fn try_from(repr: IndexDimRepr) -> Result<Self> {
        match repr {
            IndexDimRepr::Position(position) => Self::try_from(position),
            IndexDimRepr::Name(name) => match name.trim().to_lowercase().as_str() {
                "first" => Ok(Self::First),
                "last" => Ok(Self::Last),
                other => other
                    .parse::<usize>()
                    .map_err(|_| {
                        ProcessingError::config(format!(
                            "Unknown index_dim '{other}'. Expected: 1, 2, first or last"
                        ))
                    })
                    .and_then(Self::try_from),
            },
        }
    }
}

impl TryFrom<usize> for IndexDim {
    type Error = ProcessingError;

    fn try_from(position: usize) -> Result<Self> {
        match position {
            1 => Ok(Self::First),
            2 => Ok(Self::Last),
            other => Err(ProcessingError::config(format!(
                "index_dim must be 1 (first) or 2 (last), got {other}"
            ))),
        }
    }
}

impl From<IndexDim> for usize {
    fn from(dim: IndexDim) -> Self {
        match dim {
            IndexDim::First => 1,
            IndexDim::Last => 2,
        }
    }
}

/// Interpolation used when resizing to the target extent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    /// Separable triangle filter, widened when downsampling
    #[default]
    Bilinear,
    /// Nearest neighbour (pixel centre sampling)
    Nearest,
}

/// Validated, immutable preprocessing configuration
///
/// Axis 0 of every image is the width axis and axis 1 the height axis, so a
/// preprocessed image has shape `(roi_width.len(), roi_height.len())`.
/// Region-of-interest indices are 0-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SettingsDocument", into = "SettingsDocument")]
pub struct ImageSettings {
    normalization: Normalization,
    max_limit: Option<f32>,
    min_limit: Option<f32>,
    width: usize,
    height: usize,
    roi_width: Vec<usize>,
    roi_height: Vec<usize>,
    channel_dim: bool,
    index_dim: Option<IndexDim>,
    resize_filter: ResizeFilter,
}

impl ImageSettings {
    /// Start building settings
    #[must_use = "returns a new builder"]
    pub fn builder() -> ImageSettingsBuilder {
        ImageSettingsBuilder::new()
    }

    /// Builder pre-filled with these settings, for deriving a variant
    #[must_use = "returns a builder seeded with these settings"]
    pub fn to_builder(&self) -> ImageSettingsBuilder {
        ImageSettingsBuilder {
            normalization: self.normalization,
            max_limit: self.max_limit,
            min_limit: self.min_limit,
            width: Some(self.width),
            height: Some(self.height),
            roi_width: Some(self.roi_width.clone()),
            roi_height: Some(self.roi_height.clone()),
            channel_dim: self.channel_dim,
            index_dim: self.index_dim,
            resize_filter: self.resize_filter,
        }
    }

    /// Parse settings from a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load settings from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading image settings from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parse settings from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to YAML
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    #[must_use]
    pub const fn normalization(&self) -> Normalization {
        self.normalization
    }

    #[must_use]
    pub const fn max_limit(&self) -> Option<f32> {
        self.max_limit
    }

    #[must_use]
    pub const fn min_limit(&self) -> Option<f32> {
        self.min_limit
    }

    /// Target extent of the width axis (axis 0) after resizing
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Target extent of the height axis (axis 1) after resizing
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn roi_width(&self) -> &[usize] {
        &self.roi_width
    }

    #[must_use]
    pub fn roi_height(&self) -> &[usize] {
        &self.roi_height
    }

    /// Whether images carry an implicit trailing channel axis
    #[must_use]
    pub const fn channel_dim(&self) -> bool {
        self.channel_dim
    }

    #[must_use]
    pub const fn index_dim(&self) -> Option<IndexDim> {
        self.index_dim
    }

    /// Sample axis position, or a configuration error when it was never set
    pub fn require_index_dim(&self, operation: &str) -> Result<IndexDim> {
        self.index_dim.ok_or_else(|| {
            ProcessingError::config(format!("index_dim must be set before {operation}"))
        })
    }

    #[must_use]
    pub const fn resize_filter(&self) -> ResizeFilter {
        self.resize_filter
    }

    /// Shape of a preprocessed image: `(roi_width.len(), roi_height.len())`
    #[must_use]
    pub fn output_shape(&self) -> (usize, usize) {
        (self.roi_width.len(), self.roi_height.len())
    }

    /// Number of pixels in a preprocessed image
    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.roi_width.len() * self.roi_height.len()
    }

    /// True when the ROI keeps the whole resized image in natural order
    #[must_use]
    pub fn roi_is_full(&self) -> bool {
        is_identity_range(&self.roi_width, self.width)
            && is_identity_range(&self.roi_height, self.height)
    }
}

fn is_identity_range(indices: &[usize], extent: usize) -> bool {
    indices.len() == extent && indices.iter().enumerate().all(|(i, &idx)| i == idx)
}

/// Builder for [`ImageSettings`]
///
/// `width` and `height` are required. Everything else defaults to no
/// normalization, no clipping, a full-extent ROI, no channel axis, no sample
/// axis and bilinear resizing.
///
/// ```
/// use radiomics_preprocess::{ImageSettings, IndexDim, Normalization};
///
/// # fn main() -> radiomics_preprocess::Result<()> {
/// let settings = ImageSettings::builder()
///     .width(64)
///     .height(64)
///     .normalization(Normalization::MinMax)
///     .min_limit(-1000.0)
///     .max_limit(400.0)
///     .index_dim(IndexDim::First)
///     .build()?;
/// assert_eq!(settings.output_shape(), (64, 64));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageSettingsBuilder {
    normalization: Normalization,
    max_limit: Option<f32>,
    min_limit: Option<f32>,
    width: Option<usize>,
    height: Option<usize>,
    roi_width: Option<Vec<usize>>,
    roi_height: Option<Vec<usize>>,
    channel_dim: bool,
    index_dim: Option<IndexDim>,
    resize_filter: ResizeFilter,
}

impl ImageSettingsBuilder {
    #[inline]
    #[must_use = "returns a new builder with default settings"]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use = "returns the builder with normalization configured"]
    pub const fn normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    #[inline]
    #[must_use = "returns the builder with the upper clip limit configured"]
    pub const fn max_limit(mut self, limit: f32) -> Self {
        self.max_limit = Some(limit);
        self
    }

    #[inline]
    #[must_use = "returns the builder with the lower clip limit configured"]
    pub const fn min_limit(mut self, limit: f32) -> Self {
        self.min_limit = Some(limit);
        self
    }

    #[inline]
    #[must_use = "returns the builder with the target width configured"]
    pub const fn width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    #[inline]
    #[must_use = "returns the builder with the target height configured"]
    pub const fn height(mut self, height: usize) -> Self {
        self.height = Some(height);
        self
    }

    /// Width-axis indices kept after resizing (0-based, in output order)
    #[must_use = "returns the builder with the width ROI configured"]
    pub fn roi_width(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.roi_width = Some(indices.into_iter().collect());
        self
    }

    /// Height-axis indices kept after resizing (0-based, in output order)
    #[must_use = "returns the builder with the height ROI configured"]
    pub fn roi_height(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.roi_height = Some(indices.into_iter().collect());
        self
    }

    #[inline]
    #[must_use = "returns the builder with the channel axis flag configured"]
    pub const fn channel_dim(mut self, enabled: bool) -> Self {
        self.channel_dim = enabled;
        self
    }

    #[inline]
    #[must_use = "returns the builder with the sample axis configured"]
    pub const fn index_dim(mut self, dim: IndexDim) -> Self {
        self.index_dim = Some(dim);
        self
    }

    #[inline]
    #[must_use = "returns the builder with the resize filter configured"]
    pub const fn resize_filter(mut self, filter: ResizeFilter) -> Self {
        self.resize_filter = filter;
        self
    }

    /// Validate and freeze the settings
    ///
    /// # Errors
    ///
    /// Returns [`ProcessingError::ConfigError`] if:
    /// * `width` or `height` is missing or zero
    /// * a clip limit is not finite
    /// * min-max normalization is selected without both limits, or with
    ///   `max_limit <= min_limit`
    /// * both limits are set and `max_limit < min_limit`
    /// * a ROI is empty or indexes past the resized extent
    pub fn build(self) -> Result<ImageSettings> {
        let width = self
            .width
            .ok_or_else(|| ProcessingError::config("width is required"))?;
        let height = self
            .height
            .ok_or_else(|| ProcessingError::config("height is required"))?;

        ImageSettings::try_from(SettingsDocument {
            normalization: self.normalization,
            max_limit: self.max_limit,
            min_limit: self.min_limit,
            width,
            height,
            roi_width: self.roi_width,
            roi_height: self.roi_height,
            channel_dim: self.channel_dim,
            index_dim: self.index_dim,
            resize_filter: self.resize_filter,
        })
    }
}

/// Serialized form of [`ImageSettings`]; every path into `ImageSettings`
/// goes through its `TryFrom` impl.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsDocument {
    #[serde(default)]
    normalization: Normalization,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_limit: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_limit: Option<f32>,
    width: usize,
    height: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    roi_width: Option<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    roi_height: Option<Vec<usize>>,
    #[serde(default)]
    channel_dim: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    index_dim: Option<IndexDim>,
    #[serde(default)]
    resize_filter: ResizeFilter,
}

impl From<ImageSettings> for SettingsDocument {
    fn from(settings: ImageSettings) -> Self {
        Self {
            normalization: settings.normalization,
            max_limit: settings.max_limit,
            min_limit: settings.min_limit,
            width: settings.width,
            height: settings.height,
            roi_width: Some(settings.roi_width),
            roi_height: Some(settings.roi_height),
            channel_dim: settings.channel_dim,
            index_dim: settings.index_dim,
            resize_filter: settings.resize_filter,
        }
    }
}

impl TryFrom<SettingsDocument> for ImageSettings {
    type Error = ProcessingError;

    fn try_from(doc: SettingsDocument) -> Result<Self> {
        if doc.width == 0 {
            return Err(ProcessingError::config("width must be greater than 0"));
        }
        if doc.height == 0 {
            return Err(ProcessingError::config("height must be greater than 0"));
        }

        for (name, limit) in [("min_limit", doc.min_limit), ("max_limit", doc.max_limit)] {
            if let Some(value) = limit {
                if !value.is_finite() {
                    return Err(ProcessingError::config(format!(
                        "{name} must be finite, got {value}"
                    )));
                }
            }
        }

        match (doc.normalization, doc.min_limit, doc.max_limit) {
            (Normalization::MinMax, None, _) => {
                return Err(ProcessingError::config(
                    "min_limit is required for min-max normalization",
                ));
            }
            (Normalization::MinMax, _, None) => {
                return Err(ProcessingError::config(
                    "max_limit is required for min-max normalization",
                ));
            }
            (Normalization::MinMax, Some(lo), Some(hi)) if hi <= lo => {
                return Err(ProcessingError::config(format!(
                    "max_limit ({hi}) must be greater than min_limit ({lo}) for min-max \
                     normalization"
                )));
            }
            (Normalization::MinMax, Some(lo), Some(hi)) if !(hi - lo).is_finite() => {
                return Err(ProcessingError::config(format!(
                    "limit span max_limit - min_limit overflows f32 ({hi} - {lo})"
                )));
            }
            (_, Some(lo), Some(hi)) if hi < lo => {
                return Err(ProcessingError::config(format!(
                    "max_limit ({hi}) must not be below min_limit ({lo})"
                )));
            }
            _ => {}
        }

        let roi_width = resolve_roi("roi_width", doc.roi_width, doc.width)?;
        let roi_height = resolve_roi("roi_height", doc.roi_height, doc.height)?;

        let settings = Self {
            normalization: doc.normalization,
            max_limit: doc.max_limit,
            min_limit: doc.min_limit,
            width: doc.width,
            height: doc.height,
            roi_width,
            roi_height,
            channel_dim: doc.channel_dim,
            index_dim: doc.index_dim,
            resize_filter: doc.resize_filter,
        };

        debug!(
            "Validated image settings: {}x{} -> ROI {:?}, normalization={}",
            settings.width,
            settings.height,
            settings.output_shape(),
            settings.normalization
        );

        Ok(settings)
    }
}

fn resolve_roi(name: &str, roi: Option<Vec<usize>>, extent: usize) -> Result<Vec<usize>> {
    let Some(indices) = roi else {
        return Ok((0..extent).collect());
    };

    if indices.is_empty() {
        return Err(ProcessingError::config(format!("{name} must not be empty")));
    }

    if let Some(&bad) = indices.iter().find(|&&idx| idx >= extent) {
        return Err(ProcessingError::config(format!(
            "{name} index {bad} lies outside the resized extent [0, {extent})"
        )));
    }

    Ok(indices)
}
