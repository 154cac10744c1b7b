//! Intensity-field construction: `I(x[,y[,z]], t)`.
//!
//! Each function here is a pure element-wise map; the ARC transmission
//! factor `tau` and the phase offset `phi(t)` are folded in by the caller
//! (the grid sweeper) rather than recomputed per sample.

use crate::error::Warning;
use crate::interp::interp_one;
use crate::params::{CustomIntensitySamples, OriginalUnit, OutsideRangeMode};

/// `I(x) = I_avg * tau * (1 + V * cos(K*x + phi))`.
pub fn sinusoidal_1d(x: &[f64], i_avg: f64, v: f64, k: f64, phi: f64, tau: f64) -> Vec<f64> {
    x.iter()
        .map(|&xi| i_avg * tau * (1.0 + v * (k * xi + phi).cos()))
        .collect()
}

/// `I(x,y) = I_avg * tau * (1 + V * cos(Kx*x + Ky*y + phi))`.
///
/// Returned row-major with `x` the slower-varying axis: `out[i*ny + j]`
/// corresponds to `(x[i], y[j])`.
pub fn sinusoidal_2d(
    x: &[f64],
    y: &[f64],
    i_avg: f64,
    v: f64,
    kx: f64,
    ky: f64,
    phi: f64,
    tau: f64,
) -> Vec<f64> {
    let mut out = Vec::with_capacity(x.len() * y.len());
    for &xi in x {
        for &yj in y {
            out.push(i_avg * tau * (1.0 + v * (kx * xi + ky * yj + phi).cos()));
        }
    }
    out
}

/// `I(x,y,z) = I_avg * tau * (1 + V * cos(Kx*x + Ky*y + Kz*z + phi))`.
///
/// Row-major with `x` slowest, `z` fastest: `out[(i*ny + j)*nz + k]`.
#[allow(clippy::too_many_arguments)]
pub fn sinusoidal_3d(
    x: &[f64],
    y: &[f64],
    z: &[f64],
    i_avg: f64,
    v: f64,
    kx: f64,
    ky: f64,
    kz: f64,
    phi: f64,
    tau: f64,
) -> Vec<f64> {
    let mut out = Vec::with_capacity(x.len() * y.len() * z.len());
    for &xi in x {
        for &yj in y {
            for &zk in z {
                out.push(i_avg * tau * (1.0 + v * (kx * xi + ky * yj + kz * zk + phi).cos()));
            }
        }
    }
    out
}

/// Ideal-exposure 1D: as `sinusoidal_1d` but with an extra contrast factor
/// folded in, and `K` already derived from the period by the caller.
pub fn ideal_exposure_1d(
    x: &[f64],
    i_avg: f64,
    v: f64,
    k: f64,
    phi: f64,
    tau: f64,
    contrast: Option<f64>,
) -> Vec<f64> {
    let extra = contrast.unwrap_or(1.0);
    x.iter()
        .map(|&xi| i_avg * tau * extra * (1.0 + v * (k * xi + phi).cos()))
        .collect()
}

/// Convert a custom sample's declared/inferred unit into a µm multiplier,
/// along with a warning if the declared and span-inferred units disagree.
fn unit_scale_factor(samples: &CustomIntensitySamples) -> (f64, Option<Warning>) {
    if let Some(scale) = samples.unit_scale {
        return (scale, None);
    }

    let span = samples
        .x
        .iter()
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max)
        - samples.x.iter().cloned().fold(f64::INFINITY, f64::min);
    let inferred = if span < 10.0 {
        OriginalUnit::Millimeters
    } else {
        OriginalUnit::Micrometers
    };

    match samples.original_unit {
        OriginalUnit::Pixels => (1.0, None),
        OriginalUnit::Unspecified => (
            if inferred == OriginalUnit::Millimeters {
                1000.0
            } else {
                1.0
            },
            None,
        ),
        declared if declared == inferred => (
            if declared == OriginalUnit::Millimeters {
                1000.0
            } else {
                1.0
            },
            None,
        ),
        declared => {
            let warning = Warning::UnitMismatch(format!(
                "declared unit {declared:?} disagrees with span-inferred unit {inferred:?}"
            ));
            let factor = match declared {
                OriginalUnit::Millimeters => 1000.0,
                OriginalUnit::Micrometers => 1.0,
                _ => 1.0,
            };
            (factor, Some(warning))
        }
    }
}

/// Piecewise-linear interpolation of user `(x, I)` samples onto `target`,
/// scaled by `I_avg * tau`. Implements the unit-inference and
/// outside-range cascade from the design notes.
pub fn custom_sampled(
    target: &[f64],
    samples: &CustomIntensitySamples,
    i_avg: f64,
    tau: f64,
) -> (Vec<f64>, Vec<Warning>) {
    let mut warnings = Vec::new();
    let (scale, warn) = unit_scale_factor(samples);
    if let Some(w) = warn {
        warnings.push(w);
    }

    let mut pairs: Vec<(f64, f64)> = samples
        .x
        .iter()
        .zip(samples.i.iter())
        .map(|(&xj, &ij)| (xj * scale, ij))
        .collect();
    pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
    let xp: Vec<f64> = pairs.iter().map(|p| p.0).collect();
    let fp: Vec<f64> = pairs.iter().map(|p| p.1).collect();

    let out = target
        .iter()
        .map(|&x| {
            let raw = if x < xp[0] || x > xp[xp.len() - 1] {
                match samples.outside_range_mode {
                    OutsideRangeMode::Zero => 0.0,
                    OutsideRangeMode::Boundary => interp_one(x, &xp, &fp),
                    OutsideRangeMode::Custom(v) => v,
                }
            } else {
                interp_one(x, &xp, &fp)
            };
            (raw * i_avg * tau).max(0.0)
        })
        .collect();

    (out, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn sinusoidal_1d_mean_and_peaks() {
        let k = 2.0 * PI;
        let x = vec![0.0, 0.25, 0.5];
        let out = sinusoidal_1d(&x, 1.0, 0.8, k, 0.0, 1.0);
        assert!((out[0] - 1.8).abs() < 1e-12);
        assert!((out[2] - 0.2).abs() < 1e-12);
    }

    #[test]
    fn sinusoidal_2d_shape() {
        let x = vec![0.0, 1.0];
        let y = vec![0.0, 1.0, 2.0];
        let out = sinusoidal_2d(&x, &y, 1.0, 0.5, 1.0, 1.0, 0.0, 1.0);
        assert_eq!(out.len(), 6);
    }

    #[test]
    fn custom_sample_unit_inference_mm() {
        let samples = CustomIntensitySamples {
            x: vec![0.0, 0.0005, 0.001],
            i: vec![0.0, 0.5, 1.0],
            original_unit: OriginalUnit::Millimeters,
            unit_scale: None,
            outside_range_mode: OutsideRangeMode::Boundary,
        };
        let (out, warnings) = custom_sampled(&[0.0, 1.0], &samples, 1.0, 1.0);
        assert!(warnings.is_empty());
        assert!((out[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn custom_sample_outside_range_zero() {
        let samples = CustomIntensitySamples {
            x: vec![0.0, 1.0],
            i: vec![1.0, 1.0],
            original_unit: OriginalUnit::Micrometers,
            unit_scale: None,
            outside_range_mode: OutsideRangeMode::Zero,
        };
        let (out, _) = custom_sampled(&[-1.0, 0.5, 2.0], &samples, 1.0, 1.0);
        assert_eq!(out[0], 0.0);
        assert_eq!(out[2], 0.0);
        assert!(out[1] > 0.0);
    }

    #[test]
    fn custom_sample_clamped_nonnegative() {
        let samples = CustomIntensitySamples {
            x: vec![0.0, 1.0],
            i: vec![-5.0, -5.0],
            original_unit: OriginalUnit::Micrometers,
            unit_scale: None,
            outside_range_mode: OutsideRangeMode::Boundary,
        };
        let (out, _) = custom_sampled(&[0.5], &samples, 1.0, 1.0);
        assert_eq!(out[0], 0.0);
    }
}
