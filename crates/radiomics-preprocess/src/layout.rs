//! Axis bookkeeping shared by the melter and the reconstructor
//!
//! Images are stacked as `(w, h, N)` first. [`stack_permutation`] says how
//! that stack is reordered for a given [`IndexDim`]; the reconstructor undoes
//! it through [`sample_first_permutation`], which is derived from the same
//! table rather than restated.

use crate::settings::IndexDim;
use ndarray::Axis;
use serde::{Deserialize, Serialize};

/// Tensor layout handed to the trainer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConvolutionMode {
    /// Rank 2: one flattened feature vector per sample (dense models)
    #[default]
    Flat,
    /// Rank 4: spatial axes plus a trailing channel of size 1 (convolutional models)
    Convolutional,
}

impl ConvolutionMode {
    #[must_use]
    pub const fn is_convolutional(self) -> bool {
        matches!(self, Self::Convolutional)
    }
}

impl From<bool> for ConvolutionMode {
    fn from(convolutional: bool) -> Self {
        if convolutional {
            Self::Convolutional
        } else {
            Self::Flat
        }
    }
}

impl std::fmt::Display for ConvolutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flat => write!(f, "flat"),
            Self::Convolutional => write!(f, "convolutional"),
        }
    }
}

/// Axis order applied to the `(w, h, N)` stack: new axis `i` is old axis `p[i]`
#[must_use]
pub const fn stack_permutation(index_dim: IndexDim) -> [usize; 3] {
    match index_dim {
        IndexDim::First => [2, 0, 1],
        IndexDim::Last => [0, 1, 2],
    }
}

/// Permutation taking a melted stack back to `(N, w, h)`
#[must_use]
pub fn sample_first_permutation(index_dim: IndexDim) -> [usize; 3] {
    let forward = stack_permutation(index_dim);
    let mut inverse = [0; 3];
    for (new_axis, &old_axis) in forward.iter().enumerate() {
        inverse[old_axis] = new_axis;
    }
    // `inverse` restores (w, h, N); reorder that to (N, w, h)
    [inverse[2], inverse[0], inverse[1]]
}

/// Sample axis of a flat `(features, N)` / `(N, features)` tensor
#[must_use]
pub const fn flat_sample_axis(index_dim: IndexDim) -> Axis {
    match index_dim {
        IndexDim::First => Axis(0),
        IndexDim::Last => Axis(1),
    }
}
