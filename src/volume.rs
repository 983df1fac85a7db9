//! Volumetric data, region masks and masked feature matrices
//!
//! [`FrameData`] holds a 4-D acquisition frame-major: frame `t` occupies one
//! contiguous block of `x * y * z` values in C order. Applying a [`Mask`]
//! keeps the in-mask voxels of each frame, in flat voxel order, producing a
//! [`FeatureMatrix`] with one row per frame.

use crate::{Error, Result};

/// Spatial grid dimensions `(x, y, z)`.
pub type Shape3 = [usize; 3];

fn voxel_count(shape: Shape3) -> usize {
    shape.iter().product()
}

/// Row-major `samples x features` matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    data: Vec<f32>,
    n_samples: usize,
    n_features: usize,
}

impl FeatureMatrix {
    /// Wrap row-major values.
    ///
    /// # Errors
    /// Returns `ShapeMismatch` if `data.len() != n_samples * n_features`
    pub fn new(data: Vec<f32>, n_samples: usize, n_features: usize) -> Result<Self> {
        if data.len() != n_samples * n_features {
            return Err(Error::shape(
                "feature matrix",
                n_samples * n_features,
                data.len(),
            ));
        }
        Ok(Self {
            data,
            n_samples,
            n_features,
        })
    }

    /// Build from equally sized rows.
    ///
    /// # Errors
    /// Returns `ShapeMismatch` if any row length differs from the first
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let n_features = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * n_features);
        for row in rows {
            if row.len() != n_features {
                return Err(Error::shape("feature row", n_features, row.len()));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            data,
            n_samples: rows.len(),
            n_features,
        })
    }

    /// Number of rows.
    #[must_use]
    pub const fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Number of columns.
    #[must_use]
    pub const fn n_features(&self) -> usize {
        self.n_features
    }

    /// True if there are no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.n_samples == 0
    }

    /// Row `i`. Panics if out of bounds, like slice indexing.
    #[must_use]
    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.n_features..(i + 1) * self.n_features]
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f32]> + '_ {
        (0..self.n_samples).map(move |i| self.row(i))
    }

    /// Mutable row-major storage.
    pub(crate) fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Copy the rows at `indices`, in the given order.
    ///
    /// # Errors
    /// Returns `InvalidInput` if an index is out of bounds
    pub fn select_rows(&self, indices: &[usize]) -> Result<Self> {
        let mut data = Vec::with_capacity(indices.len() * self.n_features);
        for &i in indices {
            if i >= self.n_samples {
                return Err(Error::InvalidInput(format!(
                    "Row index {i} out of bounds ({} rows)",
                    self.n_samples
                )));
            }
            data.extend_from_slice(self.row(i));
        }
        Ok(Self {
            data,
            n_samples: indices.len(),
            n_features: self.n_features,
        })
    }
}

/// Boolean region-of-interest indicator over a spatial grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    shape: Shape3,
    voxels: Vec<bool>,
}

impl Mask {
    /// Wrap flat C-order voxel flags.
    ///
    /// # Errors
    /// Returns `ShapeMismatch` if `voxels.len()` does not match `shape`
    pub fn new(shape: Shape3, voxels: Vec<bool>) -> Result<Self> {
        if voxels.len() != voxel_count(shape) {
            return Err(Error::shape("mask voxels", voxel_count(shape), voxels.len()));
        }
        Ok(Self { shape, voxels })
    }

    /// Mask covering the whole grid.
    #[must_use]
    pub fn full(shape: Shape3) -> Self {
        Self {
            shape,
            voxels: vec![true; voxel_count(shape)],
        }
    }

    /// Mask from numeric values: voxels with a non-zero, non-NaN value are in.
    ///
    /// Region images are usually stored as integer or float volumes.
    ///
    /// # Errors
    /// Returns `ShapeMismatch` if `values.len()` does not match `shape`
    pub fn from_nonzero(shape: Shape3, values: &[f32]) -> Result<Self> {
        Self::new(
            shape,
            values.iter().map(|v| *v != 0.0 && !v.is_nan()).collect(),
        )
    }

    /// Spatial grid dimensions.
    #[must_use]
    pub const fn shape(&self) -> Shape3 {
        self.shape
    }

    /// Number of in-mask voxels.
    #[must_use]
    pub fn count(&self) -> usize {
        self.voxels.iter().filter(|&&v| v).count()
    }

    /// True if no voxel is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.voxels.iter().any(|&v| v)
    }

    /// Whether the voxel at flat index `i` is in the mask.
    #[must_use]
    pub fn contains(&self, i: usize) -> bool {
        self.voxels.get(i).copied().unwrap_or(false)
    }

    /// Flat indices of in-mask voxels, ascending.
    #[must_use]
    pub fn indices(&self) -> Vec<usize> {
        self.voxels
            .iter()
            .enumerate()
            .filter_map(|(i, &v)| v.then_some(i))
            .collect()
    }

    /// Voxels in both masks.
    ///
    /// # Errors
    /// Returns `ShapeMismatch` if the grids differ
    pub fn intersect(&self, other: &Self) -> Result<Self> {
        self.combine(other, |a, b| a && b)
    }

    /// Voxels in either mask.
    ///
    /// # Errors
    /// Returns `ShapeMismatch` if the grids differ
    pub fn union(&self, other: &Self) -> Result<Self> {
        self.combine(other, |a, b| a || b)
    }

    fn combine(&self, other: &Self, op: impl Fn(bool, bool) -> bool) -> Result<Self> {
        if self.shape != other.shape {
            return Err(Error::shape("mask combination", self.shape, other.shape));
        }
        Ok(Self {
            shape: self.shape,
            voxels: self
                .voxels
                .iter()
                .zip(&other.voxels)
                .map(|(&a, &b)| op(a, b))
                .collect(),
        })
    }
}

/// Frame-major 4-D volumetric data.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameData {
    shape: Shape3,
    n_frames: usize,
    data: Vec<f32>,
}

impl FrameData {
    /// Wrap frame-major values.
    ///
    /// # Errors
    /// Returns `ShapeMismatch` if `data.len() != n_frames * x * y * z`
    pub fn new(shape: Shape3, n_frames: usize, data: Vec<f32>) -> Result<Self> {
        let expected = n_frames * voxel_count(shape);
        if data.len() != expected {
            return Err(Error::shape("frame data", expected, data.len()));
        }
        Ok(Self {
            shape,
            n_frames,
            data,
        })
    }

    /// Spatial grid dimensions.
    #[must_use]
    pub const fn shape(&self) -> Shape3 {
        self.shape
    }

    /// Number of frames.
    #[must_use]
    pub const fn n_frames(&self) -> usize {
        self.n_frames
    }

    /// Voxel values of frame `t`.
    ///
    /// # Errors
    /// Returns `InvalidInput` if `t` is out of bounds
    pub fn frame(&self, t: usize) -> Result<&[f32]> {
        if t >= self.n_frames {
            return Err(Error::InvalidInput(format!(
                "Frame {t} out of bounds ({} frames)",
                self.n_frames
            )));
        }
        let size = voxel_count(self.shape);
        Ok(&self.data[t * size..(t + 1) * size])
    }

    /// Masked features of every frame.
    ///
    /// # Errors
    /// Returns `ShapeMismatch` if the mask grid differs from the data grid
    pub fn apply_mask(&self, mask: &Mask) -> Result<FeatureMatrix> {
        let all: Vec<usize> = (0..self.n_frames).collect();
        self.masked_frames(mask, &all)
    }

    /// Masked features of the frames at `frames`, in the given order.
    ///
    /// # Errors
    /// Returns `ShapeMismatch` if the mask grid differs from the data grid,
    /// or `InvalidInput` if a frame index is out of bounds
    pub fn masked_frames(&self, mask: &Mask, frames: &[usize]) -> Result<FeatureMatrix> {
        if mask.shape() != self.shape {
            return Err(Error::shape("mask vs data", self.shape, mask.shape()));
        }

        let voxels = mask.indices();
        let mut data = Vec::with_capacity(frames.len() * voxels.len());
        for &t in frames {
            let frame = self.frame(t)?;
            data.extend(voxels.iter().map(|&v| frame[v]));
        }
        FeatureMatrix::new(data, frames.len(), voxels.len())
    }
}
