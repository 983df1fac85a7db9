//! Thresholding of statistical maps
//!
//! Helpers for summarizing a z-score map inside a region: the one-sided
//! threshold for a given alpha (optionally Bonferroni corrected) and the
//! fraction of in-mask voxels that exceed it.

use crate::volume::Mask;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Multiple-comparisons correction for [`z_threshold`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Correction {
    /// Per-voxel alpha
    Uncorrected,
    /// Family-wise alpha over `n_tests` voxels
    Bonferroni {
        /// Number of simultaneous tests
        n_tests: usize,
    },
}

/// One-sided z threshold for `alpha`.
///
/// ```rust
/// use trueno_decode::significance::{z_threshold, Correction};
///
/// let z = z_threshold(0.001, Correction::Uncorrected)?;
/// assert!((z - 3.0902).abs() < 1e-3);
/// # Ok::<(), trueno_decode::Error>(())
/// ```
///
/// # Errors
/// Returns `InvalidInput` if `alpha` is outside (0, 1) or `n_tests` is zero
#[allow(clippy::cast_precision_loss)]
pub fn z_threshold(alpha: f64, correction: Correction) -> Result<f64> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(Error::InvalidInput(format!(
            "alpha must lie in (0, 1), got {alpha}"
        )));
    }
    let alpha = match correction {
        Correction::Uncorrected => alpha,
        Correction::Bonferroni { n_tests: 0 } => {
            return Err(Error::InvalidInput(
                "Bonferroni correction requires n_tests >= 1".to_string(),
            ))
        }
        Correction::Bonferroni { n_tests } => alpha / n_tests as f64,
    };
    Ok(inverse_normal_cdf(1.0 - alpha))
}

/// Fraction of in-mask voxels with `z > threshold`; NaN voxels are ignored.
///
/// # Errors
/// Returns `ShapeMismatch` if `z_map` does not cover the mask grid, or
/// `InvalidInput` if no in-mask voxel has a finite value
#[allow(clippy::cast_precision_loss)]
pub fn proportion_significant(z_map: &[f32], mask: &Mask, threshold: f64) -> Result<f64> {
    let [x, y, z] = mask.shape();
    if z_map.len() != x * y * z {
        return Err(Error::shape("z map vs mask", x * y * z, z_map.len()));
    }

    let (mut tested, mut above) = (0usize, 0usize);
    for i in mask.indices() {
        let v = z_map[i];
        if v.is_nan() {
            continue;
        }
        tested += 1;
        if f64::from(v) > threshold {
            above += 1;
        }
    }

    if tested == 0 {
        return Err(Error::InvalidInput(
            "No finite z values inside the mask".to_string(),
        ));
    }
    Ok(above as f64 / tested as f64)
}

/// Inverse standard normal CDF (Acklam's rational approximation,
/// relative error below 1.2e-9).
fn inverse_normal_cdf(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969_683_028_665_376e1,
        2.209_460_984_245_205e2,
        -2.759_285_104_469_687e2,
        1.383_577_518_672_69e2,
        -3.066_479_806_614_716e1,
        2.506_628_277_459_239,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e1,
        1.615_858_368_580_409e2,
        -1.556_989_798_598_866e2,
        6.680_131_188_771_972e1,
        -1.328_068_155_288_572e1,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-3,
        -3.223_964_580_411_365e-1,
        -2.400_758_277_161_838,
        -2.549_732_539_343_734,
        4.374_664_141_464_968,
        2.938_163_982_698_783,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-3,
        3.224_671_290_700_398e-1,
        2.445_134_137_142_996,
        3.754_408_661_907_416,
    ];
    const P_LOW: f64 = 0.024_25;

    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    }
}
