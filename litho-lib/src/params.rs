//! The simulation parameter value object and its validation.
//!
//! `SimParams` is the single entry point: every optional configuration is
//! an explicit `Option`, and `validate()` rejects ambiguous combinations
//! (e.g. cumulative exposure without per-segment scales) before any numeric
//! work starts.

use crate::error::{LithoError, Result};

/// Selects how the intensity field varies with the coordinate axes.
#[derive(Debug, Clone, PartialEq)]
pub enum IlluminationMode {
    Sinusoidal1D {
        k: f64,
    },
    Sinusoidal2D {
        kx: f64,
        ky: f64,
    },
    Sinusoidal3D {
        kx: f64,
        ky: f64,
        kz: f64,
    },
    /// 1D mode parameterized by a period distance rather than a raw `K`;
    /// `K = 2*pi/period_um`. An optional extra contrast multiplier is
    /// applied on top of `V`.
    IdealExposure1D {
        period_um: f64,
        contrast: Option<f64>,
    },
    /// Piecewise-linear interpolation from user-supplied samples.
    CustomSampled(CustomIntensitySamples),
}

impl IlluminationMode {
    pub fn period_um(&self) -> Option<f64> {
        match self {
            IlluminationMode::IdealExposure1D { period_um, .. } => Some(*period_um),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginalUnit {
    Pixels,
    Millimeters,
    Micrometers,
    /// Not declared by the caller; infer from the sample span.
    Unspecified,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutsideRangeMode {
    Zero,
    Boundary,
    Custom(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomIntensitySamples {
    pub x: Vec<f64>,
    pub i: Vec<f64>,
    pub original_unit: OriginalUnit,
    /// Explicit caller-supplied multiplicative conversion; overrides the
    /// inferred mm/um/nm factor when present.
    pub unit_scale: Option<f64>,
    pub outside_range_mode: OutsideRangeMode,
}

/// Per-segment cumulative exposure, or a single shot.
#[derive(Debug, Clone, PartialEq)]
pub enum ExposureMode {
    SingleShot,
    /// `N` equal-duration segments (`dt = t_exp / N`) with per-segment
    /// intensity scale `segment_scales[i]`.
    Cumulative { segment_scales: Vec<f64> },
}

/// Resist response law.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseModel {
    /// `M(D) = exp(-C*D)`.
    Dill,
    /// `M = 1` if `D < cd` else `exp(-C*(D-cd))`; requires `cd`.
    IdealThreshold,
    /// Smooth contrast-threshold alternative to `IdealThreshold`.
    SigmoidThreshold,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArcSpec {
    pub substrate: String,
    pub arc: String,
    pub wavelength_nm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetWidths {
    pub top_nm: f64,
    pub bottom_nm: f64,
    /// Fractional tolerance, e.g. `0.05` for 5%.
    pub tolerance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepOptions {
    /// Number of points along the primary axis; defaults depend on the
    /// response model (1000, or ~2000 for ideal-threshold) when `None`.
    pub points: Option<usize>,
    /// Override of the calc window, in periods, when a period is given.
    pub dynamic_range_periods: f64,
}

impl Default for SweepOptions {
    fn default() -> Self {
        SweepOptions {
            points: None,
            dynamic_range_periods: crate::constants::DEFAULT_DYNAMIC_RANGE_PERIODS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimParams {
    pub illumination: IlluminationMode,
    pub i_avg: f64,
    pub contrast_v: f64,
    pub t_exp: f64,
    pub exposure_mode: ExposureMode,
    pub c: f64,
    pub cd: Option<f64>,
    pub response: ResponseModel,
    pub phase_expr: Option<String>,
    pub arc: Option<ArcSpec>,
    pub target: Option<TargetWidths>,
    pub sweep: SweepOptions,
}

impl SimParams {
    /// Validate range, sign, and combination invariants. Fatal: the only
    /// error kind the kernel ever returns as `Err`.
    pub fn validate(&self) -> Result<()> {
        if !(self.i_avg > 0.0 && self.i_avg <= 1e4) {
            return Err(LithoError::InvalidParameter(format!(
                "I_avg must be in (0, 1e4], got {}",
                self.i_avg
            )));
        }
        if !(0.0..=1.0).contains(&self.contrast_v) {
            return Err(LithoError::InvalidParameter(format!(
                "V must be in [0, 1], got {}",
                self.contrast_v
            )));
        }
        if !(self.t_exp > 0.0 && self.t_exp <= 1e4) {
            return Err(LithoError::InvalidParameter(format!(
                "t_exp must be in (0, 1e4], got {}",
                self.t_exp
            )));
        }
        if !(self.c > 0.0 && self.c <= 100.0) {
            return Err(LithoError::InvalidParameter(format!(
                "C must be in (0, 100], got {}",
                self.c
            )));
        }
        if let Some(cd) = self.cd {
            if !(cd > 0.0 && cd <= 1000.0) {
                return Err(LithoError::InvalidParameter(format!(
                    "cd must be in (0, 1000], got {cd}"
                )));
            }
        }
        if self.response == ResponseModel::IdealThreshold && self.cd.is_none() {
            return Err(LithoError::InvalidParameter(
                "IdealThreshold response requires cd".to_string(),
            ));
        }

        match &self.illumination {
            IlluminationMode::Sinusoidal1D { k } => self.validate_k("K", *k)?,
            IlluminationMode::Sinusoidal2D { kx, ky } => {
                self.validate_k("Kx", *kx)?;
                self.validate_k("Ky", *ky)?;
            }
            IlluminationMode::Sinusoidal3D { kx, ky, kz } => {
                self.validate_k("Kx", *kx)?;
                self.validate_k("Ky", *ky)?;
                self.validate_k("Kz", *kz)?;
            }
            IlluminationMode::IdealExposure1D { period_um, .. } => {
                if !(*period_um > 0.0) {
                    return Err(LithoError::InvalidParameter(format!(
                        "period must be positive, got {period_um}"
                    )));
                }
            }
            IlluminationMode::CustomSampled(samples) => {
                if samples.x.len() != samples.i.len() {
                    return Err(LithoError::InvalidParameter(
                        "custom intensity samples: x and I must have equal length".to_string(),
                    ));
                }
                if samples.x.len() < 2 {
                    return Err(LithoError::InvalidParameter(
                        "custom intensity samples: need at least 2 points".to_string(),
                    ));
                }
            }
        }

        if let ExposureMode::Cumulative { segment_scales } = &self.exposure_mode {
            if segment_scales.is_empty() {
                return Err(LithoError::InvalidParameter(
                    "cumulative mode requires at least 1 segment scale".to_string(),
                ));
            }
        }

        Ok(())
    }

    fn validate_k(&self, name: &str, k: f64) -> Result<()> {
        if !(k > 0.0 && k <= 100.0) {
            return Err(LithoError::InvalidParameter(format!(
                "{name} must be in (0, 100], got {k}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_1d() -> SimParams {
        SimParams {
            illumination: IlluminationMode::Sinusoidal1D {
                k: 2.0 * std::f64::consts::PI,
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
            sweep: SweepOptions::default(),
        }
    }

    #[test]
    fn valid_params_pass() {
        assert!(base_1d().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_visibility() {
        let mut p = base_1d();
        p.contrast_v = 1.5;
        assert!(p.validate().is_err());
    }

    #[test]
    fn ideal_threshold_requires_cd() {
        let mut p = base_1d();
        p.response = ResponseModel::IdealThreshold;
        assert!(p.validate().is_err());
        p.cd = Some(20.0);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn cumulative_requires_segment_scales() {
        let mut p = base_1d();
        p.exposure_mode = ExposureMode::Cumulative {
            segment_scales: vec![],
        };
        assert!(p.validate().is_err());
    }
}
