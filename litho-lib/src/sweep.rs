//! The grid sweeper: turns validated parameters into dense result arrays.
//!
//! Dispatches on the illumination mode's dimensionality, builds coordinates,
//! and runs each call through intensity -> dose -> response in sequence.
//! Single-threaded and deterministic; two calls with equal parameters
//! produce bit-identical arrays.

use crate::constants::{
    CALIBRATION_FRACTION_LOW_COVERAGE, CALIBRATION_FRACTION_TOO_HIGH,
    CALIBRATION_FRACTION_TOO_LOW, CALIBRATION_MIN_COVERAGE, DEFAULT_1D_HALF_WIDTH_UM,
    DEFAULT_1D_POINTS, DEFAULT_3D_POINTS_PER_AXIS, IDEAL_THRESHOLD_POINTS,
};
use crate::error::{LithoError, Result, Warning};
use crate::expr::eval_phi;
use crate::logging::{Level, NoopSink, Sink};
use crate::params::{ExposureMode, IlluminationMode, ResponseModel, SimParams};
use crate::{arc, dose, intensity, response};
use std::f64::consts::PI;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Result1D {
    pub x_coords: Vec<f64>,
    pub intensity: Vec<f64>,
    pub exposure_dose: Vec<f64>,
    pub thickness: Vec<f64>,
    pub etch_depth: Vec<f64>,
    pub warnings: Vec<Warning>,
}

/// Row-major: `exposure_dose[i * y_coords.len() + j]` is `(x[i], y[j])`.
/// `intensity` is the separable x-only profile (length `x_coords.len()`),
/// not the broadcast field, since the 2D path is built from it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Result2D {
    pub x_coords: Vec<f64>,
    pub y_coords: Vec<f64>,
    pub intensity: Vec<f64>,
    pub exposure_dose: Vec<f64>,
    pub thickness: Vec<f64>,
    pub etch_depth: Vec<f64>,
    pub warnings: Vec<Warning>,
}

/// Row-major, `z` fastest: `field[(i * ny + j) * nz + k]`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Result3D {
    pub x_coords: Vec<f64>,
    pub y_coords: Vec<f64>,
    pub z_coords: Vec<f64>,
    pub intensity: Vec<f64>,
    pub exposure_dose: Vec<f64>,
    pub thickness: Vec<f64>,
    pub etch_depth: Vec<f64>,
    pub warnings: Vec<Warning>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum SimResult {
    D1(Result1D),
    D2(Result2D),
    D3(Result3D),
}

/// A single materialized frame of a `simulate_frames` animation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub t: f64,
    pub result: SimResult,
}

fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![lo];
    }
    (0..n)
        .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
        .collect()
}

fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

fn phase_at(params: &SimParams, t: f64) -> f64 {
    params
        .phase_expr
        .as_deref()
        .map(|expr| eval_phi(expr, t))
        .unwrap_or(0.0)
}

fn transmission_factor(params: &SimParams) -> f64 {
    params
        .arc
        .as_ref()
        .map(|spec| arc::arc_parameters(&spec.substrate, &spec.arc, spec.wavelength_nm).transmission_factor)
        .unwrap_or(1.0)
}

fn default_point_count(params: &SimParams) -> usize {
    params.sweep.points.unwrap_or(match params.response {
        ResponseModel::IdealThreshold => IDEAL_THRESHOLD_POINTS,
        _ => DEFAULT_1D_POINTS,
    })
}

/// `K = 2*pi/period` for the illumination mode's primary axis, when one
/// applies (used for the default window and for the fitter).
pub(crate) fn effective_period_um(illumination: &IlluminationMode) -> Option<f64> {
    match illumination {
        IlluminationMode::Sinusoidal1D { k } => Some(2.0 * PI / k),
        IlluminationMode::IdealExposure1D { period_um, .. } => Some(*period_um),
        _ => None,
    }
}

fn build_x_1d(params: &SimParams, n: usize) -> Vec<f64> {
    match &params.illumination {
        IlluminationMode::IdealExposure1D { period_um, .. } => {
            let half = params.sweep.dynamic_range_periods * period_um;
            linspace(-half, half, n)
        }
        IlluminationMode::CustomSampled(samples) => {
            let lo = samples.x.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = samples.x.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            linspace(lo, hi, n)
        }
        _ => linspace(-DEFAULT_1D_HALF_WIDTH_UM, DEFAULT_1D_HALF_WIDTH_UM, n),
    }
}

fn apply_response(dose: &[f64], params: &SimParams) -> Vec<f64> {
    let mut thickness = match params.response {
        ResponseModel::Dill => response::dill(dose, params.c),
        ResponseModel::IdealThreshold => {
            response::ideal_threshold(dose, params.c, params.cd.unwrap_or(0.0))
        }
        ResponseModel::SigmoidThreshold => response::sigmoid_threshold(dose, params.contrast_v),
    };
    response::sanitize(&mut thickness);
    thickness
}

/// The 1D path: component C -> D -> E in sequence, with degenerate and
/// non-finite recovery folded into `warnings`.
pub(crate) fn simulate_1d(params: &SimParams, t: f64) -> Result<Result1D> {
    let n = default_point_count(params);
    let x = build_x_1d(params, n);
    let tau = transmission_factor(params);
    let phi = phase_at(params, t);
    let mut warnings = Vec::new();

    let intensity_vals = match &params.illumination {
        IlluminationMode::Sinusoidal1D { k } => {
            intensity::sinusoidal_1d(&x, params.i_avg, params.contrast_v, *k, phi, tau)
        }
        IlluminationMode::IdealExposure1D {
            period_um,
            contrast,
        } => {
            let k = 2.0 * PI / period_um;
            intensity::ideal_exposure_1d(&x, params.i_avg, params.contrast_v, k, phi, tau, *contrast)
        }
        IlluminationMode::CustomSampled(samples) => {
            let (vals, mut w) = intensity::custom_sampled(&x, samples, params.i_avg, tau);
            warnings.append(&mut w);
            vals
        }
        _ => {
            return Err(LithoError::InvalidParameter(
                "1D path requires a 1D illumination mode".to_string(),
            ))
        }
    };

    if population_std(&intensity_vals) < 1e-10 {
        warnings.push(Warning::Degenerate);
    }

    let (mut dose_vals, reported_intensity) = match &params.exposure_mode {
        ExposureMode::SingleShot => (
            dose::single_shot(&intensity_vals, params.t_exp),
            intensity_vals,
        ),
        ExposureMode::Cumulative { segment_scales } => {
            let (d, display) = dose::cumulative(&intensity_vals, params.t_exp, segment_scales);
            (d, display)
        }
    };
    if let Some(w) = dose::sanitize(&mut dose_vals) {
        warnings.push(w);
    }

    let thickness = apply_response(&dose_vals, params);
    let etch_depth = thickness.iter().map(|&m| 1.0 - m).collect();

    Ok(Result1D {
        x_coords: x,
        intensity: reported_intensity,
        exposure_dose: dose_vals,
        thickness,
        etch_depth,
        warnings,
    })
}

/// The 2D "latent image" path: a separable x-only profile, broadcast over
/// y, symmetrized by transpose-add. This is the canonical 2D construction;
/// it is not the same as evaluating a genuine 2D interference formula.
fn simulate_2d(params: &SimParams, t: f64) -> Result<Result2D> {
    let (kx, ky) = match params.illumination {
        IlluminationMode::Sinusoidal2D { kx, ky } => (kx, ky),
        _ => {
            return Err(LithoError::InvalidParameter(
                "2D path requires Sinusoidal2D illumination".to_string(),
            ))
        }
    };
    let n = default_point_count(params);
    let half = DEFAULT_1D_HALF_WIDTH_UM;
    let x = linspace(-half, half, n);
    let y = x.clone();
    let tau = transmission_factor(params);
    let phi = phase_at(params, t);
    let mut warnings = Vec::new();

    let profile = intensity::sinusoidal_1d(&x, params.i_avg, params.contrast_v, kx, phi, tau);
    if population_std(&profile) < 1e-10 {
        warnings.push(Warning::Degenerate);
    }

    let d0: Vec<f64> = profile.iter().flat_map(|&ix| vec![ix * params.t_exp; n]).collect();
    let mut dose_grid = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..n {
            dose_grid[i * n + j] = d0[i * n + j] + d0[j * n + i];
        }
    }

    let dose_min = dose_grid.iter().cloned().fold(f64::INFINITY, f64::min);
    let dose_max = dose_grid.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = (dose_max - dose_min).max(f64::EPSILON);

    let declared_cd = params.cd.unwrap_or(dose_min + 0.5 * range);
    let coverage = dose_grid.iter().filter(|&&d| d >= declared_cd).count() as f64
        / dose_grid.len() as f64;

    let cd_effective = if declared_cd > 2.0 * dose_max {
        warnings.push(Warning::CalibrationAdjusted(
            "threshold above twice the dose max; shifted to 40% of range".to_string(),
        ));
        dose_min + CALIBRATION_FRACTION_TOO_HIGH * range
    } else if declared_cd < dose_min {
        warnings.push(Warning::CalibrationAdjusted(
            "threshold below the dose min; shifted to 60% of range".to_string(),
        ));
        dose_min + CALIBRATION_FRACTION_TOO_LOW * range
    } else if coverage < CALIBRATION_MIN_COVERAGE {
        warnings.push(Warning::CalibrationAdjusted(
            "threshold coverage below 10%; shifted to 30% of range".to_string(),
        ));
        dose_min + CALIBRATION_FRACTION_LOW_COVERAGE * range
    } else {
        declared_cd
    };

    let mut thickness = response::ideal_threshold(&dose_grid, params.c, cd_effective);
    response::sanitize(&mut thickness);
    let etch_depth = thickness.iter().map(|&m| 1.0 - m).collect();

    let period = 2.0 * PI / kx;
    let step = x[1] - x[0];
    let span = x[x.len() - 1] - x[0];
    if period < 2.0 * step || period > span / 3.0 {
        warnings.push(Warning::Nyquist(format!(
            "period {period:.3} um is poorly sampled by step {step:.3} um over span {span:.3} um"
        )));
    }
    let _ = ky; // y-invariant by construction; Ky plays no role in the latent image

    Ok(Result2D {
        x_coords: x,
        y_coords: y,
        intensity: profile,
        exposure_dose: dose_grid,
        thickness,
        etch_depth,
        warnings,
    })
}

/// 3D static path: tensor-product intensity, dose = I*t_exp, and a fixed
/// Dill response regardless of the declared response model.
fn simulate_3d(params: &SimParams, t: f64) -> Result<Result3D> {
    let (kx, ky, kz) = match params.illumination {
        IlluminationMode::Sinusoidal3D { kx, ky, kz } => (kx, ky, kz),
        _ => {
            return Err(LithoError::InvalidParameter(
                "3D path requires Sinusoidal3D illumination".to_string(),
            ))
        }
    };
    let n = params.sweep.points.unwrap_or(DEFAULT_3D_POINTS_PER_AXIS);
    let half = DEFAULT_1D_HALF_WIDTH_UM;
    let x = linspace(-half, half, n);
    let y = linspace(-half, half, n);
    let z = linspace(-half, half, n);
    let tau = transmission_factor(params);
    let phi = phase_at(params, t);

    let intensity_vals =
        intensity::sinusoidal_3d(&x, &y, &z, params.i_avg, params.contrast_v, kx, ky, kz, phi, tau);
    let mut warnings = Vec::new();
    if population_std(&intensity_vals) < 1e-10 {
        warnings.push(Warning::Degenerate);
    }

    let dose_vals: Vec<f64> = intensity_vals.iter().map(|&i| i * params.t_exp).collect();
    let mut thickness: Vec<f64> = dose_vals.iter().map(|&d| (-params.c * d).exp()).collect();
    response::sanitize(&mut thickness);
    let etch_depth = thickness.iter().map(|&m| 1.0 - m).collect();

    Ok(Result3D {
        x_coords: x,
        y_coords: y,
        z_coords: z,
        intensity: intensity_vals,
        exposure_dose: dose_vals,
        thickness,
        etch_depth,
        warnings,
    })
}

fn warnings_of(result: &SimResult) -> &[Warning] {
    match result {
        SimResult::D1(r) => &r.warnings,
        SimResult::D2(r) => &r.warnings,
        SimResult::D3(r) => &r.warnings,
    }
}

fn simulate_at(params: &SimParams, t: f64, sink: &dyn Sink) -> Result<SimResult> {
    sink.log(Level::Info, "ValidateParams", "validating simulation parameters");
    params.validate()?;

    sink.log(Level::Info, "BuildField", "building intensity field and accumulating dose");
    let result = match &params.illumination {
        IlluminationMode::Sinusoidal1D { .. }
        | IlluminationMode::IdealExposure1D { .. }
        | IlluminationMode::CustomSampled(_) => simulate_1d(params, t).map(SimResult::D1),
        IlluminationMode::Sinusoidal2D { .. } => simulate_2d(params, t).map(SimResult::D2),
        IlluminationMode::Sinusoidal3D { .. } => simulate_3d(params, t).map(SimResult::D3),
    }?;

    for warning in warnings_of(&result) {
        sink.log(Level::Warn, "ApplyResponse", &warning.to_string());
    }
    Ok(result)
}

/// Run one call with `t = 0`, discarding log output.
pub fn simulate(params: &SimParams) -> Result<SimResult> {
    simulate_at(params, 0.0, &NoopSink)
}

/// As [`simulate`], but forwarding stage and warning messages to `sink`.
pub fn simulate_with_sink(params: &SimParams, sink: &dyn Sink) -> Result<SimResult> {
    simulate_at(params, 0.0, sink)
}

/// A finite, lazily materialized sequence of frames over `times`. Each
/// `Frame` is computed only when the iterator is advanced.
pub fn simulate_frames<'a>(
    params: &'a SimParams,
    times: &'a [f64],
) -> impl Iterator<Item = Result<Frame>> + 'a {
    times.iter().map(move |&t| {
        simulate_at(params, t, &NoopSink).map(|result| Frame { t, result })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ExposureMode, ResponseModel, SweepOptions};

    fn dill_1d_default() -> SimParams {
        SimParams {
            illumination: IlluminationMode::Sinusoidal1D {
                k: 2.0 * PI / 1.0,
            },
            i_avg: 1.0,
            contrast_v: 0.8,
            t_exp: 1.0,
            exposure_mode: ExposureMode::SingleShot,
            c: 0.022,
            cd: None,
            response: ResponseModel::Dill,
            phase_expr: None,
            arc: None,
            target: None,
            sweep: SweepOptions {
                points: Some(1000),
                ..SweepOptions::default()
            },
        }
    }

    #[test]
    fn scenario_1_matches_worked_values() {
        let params = dill_1d_default();
        let r = match simulate(&params).unwrap() {
            SimResult::D1(r) => r,
            _ => panic!("expected 1D result"),
        };
        let zero_idx = r.x_coords.iter().position(|&x| x.abs() < 1e-9).unwrap();
        assert!((r.intensity[zero_idx] - 1.8).abs() < 1e-9);
        assert!((r.thickness[zero_idx] - (-0.0396_f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn cumulative_equals_single_shot_for_uniform_segments() {
        let mut single = dill_1d_default();
        single.t_exp = 1.0;

        let mut cum = dill_1d_default();
        cum.exposure_mode = ExposureMode::Cumulative {
            segment_scales: vec![1.0; 5],
        };
        cum.t_exp = 1.0;

        let r_single = match simulate(&single).unwrap() {
            SimResult::D1(r) => r,
            _ => unreachable!(),
        };
        let r_cum = match simulate(&cum).unwrap() {
            SimResult::D1(r) => r,
            _ => unreachable!(),
        };
        for (a, b) in r_single.exposure_dose.iter().zip(r_cum.exposure_dose.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn cumulative_intensity_reflects_segment_scales() {
        let mut cum = dill_1d_default();
        cum.exposure_mode = ExposureMode::Cumulative {
            segment_scales: vec![2.0, 2.0],
        };
        cum.t_exp = 1.0;

        let plain = match simulate(&dill_1d_default()).unwrap() {
            SimResult::D1(r) => r,
            _ => unreachable!(),
        };
        let r_cum = match simulate(&cum).unwrap() {
            SimResult::D1(r) => r,
            _ => unreachable!(),
        };
        for (scaled, base) in r_cum.intensity.iter().zip(plain.intensity.iter()) {
            assert!((scaled - 2.0 * base).abs() < 1e-9);
        }
    }

    #[test]
    fn two_dimensional_result_is_symmetric() {
        let params = SimParams {
            illumination: IlluminationMode::Sinusoidal2D {
                kx: 2.0 * PI / 100.0,
                ky: 2.0 * PI / 100.0,
            },
            i_avg: 0.5,
            contrast_v: 0.9,
            t_exp: 100.0,
            exposure_mode: ExposureMode::SingleShot,
            c: 0.022,
            cd: Some(25.0),
            response: ResponseModel::IdealThreshold,
            phase_expr: None,
            arc: None,
            target: None,
            sweep: SweepOptions {
                points: Some(41),
                ..SweepOptions::default()
            },
        };
        let r = match simulate(&params).unwrap() {
            SimResult::D2(r) => r,
            _ => panic!("expected 2D result"),
        };
        let n = r.x_coords.len();
        for i in 0..n {
            for j in 0..n {
                assert!((r.exposure_dose[i * n + j] - r.exposure_dose[j * n + i]).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn arc_none_none_matches_bare_run() {
        let mut with_arc = dill_1d_default();
        with_arc.arc = Some(crate::params::ArcSpec {
            substrate: "none".to_string(),
            arc: "none".to_string(),
            wavelength_nm: 405.0,
        });
        let bare = dill_1d_default();

        let r_arc = match simulate(&with_arc).unwrap() {
            SimResult::D1(r) => r,
            _ => unreachable!(),
        };
        let r_bare = match simulate(&bare).unwrap() {
            SimResult::D1(r) => r,
            _ => unreachable!(),
        };
        assert_eq!(r_arc.intensity, r_bare.intensity);
    }

    #[test]
    fn simulate_frames_is_lazy_and_finite() {
        let params = dill_1d_default();
        let times = vec![0.0, 0.5, 1.0];
        let frames: Vec<_> = simulate_frames(&params, &times).collect();
        assert_eq!(frames.len(), 3);
    }
}
