//! SIMD reductions via `trueno`
//!
//! Thin wrappers that fall back to scalar loops when trueno rejects the
//! input (empty slices, length mismatch), so classifier code stays infallible.

use trueno::Vector;

/// Dot product of two equally sized slices.
#[must_use]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    if a.is_empty() {
        return 0.0;
    }
    Vector::from_slice(a)
        .dot(&Vector::from_slice(b))
        .unwrap_or_else(|_| a.iter().zip(b).map(|(x, y)| x * y).sum())
}

/// Sum of a slice.
#[must_use]
pub fn sum(a: &[f32]) -> f32 {
    if a.is_empty() {
        return 0.0;
    }
    Vector::from_slice(a)
        .sum()
        .unwrap_or_else(|_| a.iter().sum())
}

/// In-place `y += alpha * x`. Scalar loop, no trueno dispatch.
pub fn axpy(alpha: f32, x: &[f32], y: &mut [f32]) {
    debug_assert_eq!(x.len(), y.len());
    for (yi, xi) in y.iter_mut().zip(x) {
        *yi += alpha * xi;
    }
}

/// Pearson correlation; zero if either input has no variance.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn pearson(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    if a.is_empty() {
        return 0.0;
    }
    let n = a.len() as f32;
    let mean_a = sum(a) / n;
    let mean_b = sum(b) / n;
    let da: Vec<f32> = a.iter().map(|x| x - mean_a).collect();
    let db: Vec<f32> = b.iter().map(|x| x - mean_b).collect();
    let denom = (dot(&da, &da) * dot(&db, &db)).sqrt();
    if denom <= f32::EPSILON {
        0.0
    } else {
        dot(&da, &db) / denom
    }
}
