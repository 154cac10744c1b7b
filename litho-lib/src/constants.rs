/// Default point count for a 1D sweep.
pub const DEFAULT_1D_POINTS: usize = 1000;

/// Point count used for the ideal-threshold 1D path.
pub const IDEAL_THRESHOLD_POINTS: usize = 2000;

/// Default override of the calc window, in periods, when `P` is given.
pub const DEFAULT_DYNAMIC_RANGE_PERIODS: f64 = 4.0;

/// Assumed resist refractive index used to derive ARC reflectance.
pub const N_RESIST: f64 = 1.7;

/// ARC-type efficiencies (dimensionless, 0..1), as documented in the
/// original source. No physical derivation is recorded for these values;
/// `ArcKind::efficiency_override` exists for callers who have better data.
pub const ARC_EFFICIENCY_INTERFERENCE: f64 = 0.90;
pub const ARC_EFFICIENCY_ABSORBING: f64 = 0.70;
pub const ARC_EFFICIENCY_HYBRID: f64 = 0.95;

/// Tabulated wavelengths (nm) in the optical database; lookups for other
/// wavelengths fall back to the nearest of these.
pub const TABULATED_WAVELENGTHS_NM: [f64; 3] = [193.0, 248.0, 405.0];

/// Default half-width (µm) of the 1D calc window when no period is given.
pub const DEFAULT_1D_HALF_WIDTH_UM: f64 = 5.0;

/// Per-axis point count for the 3D static path; a full-resolution 1D grid
/// per axis would be gigabytes for a tensor product.
pub const DEFAULT_3D_POINTS_PER_AXIS: usize = 40;

/// 2D latent-image self-calibration fractions of the dose range, applied
/// when the declared threshold falls outside a usable band.
pub const CALIBRATION_FRACTION_TOO_HIGH: f64 = 0.40;
pub const CALIBRATION_FRACTION_TOO_LOW: f64 = 0.60;
pub const CALIBRATION_FRACTION_LOW_COVERAGE: f64 = 0.30;
pub const CALIBRATION_MIN_COVERAGE: f64 = 0.10;

/// Box constraints for the parameter fitter's (C, cd) search space.
pub const FIT_C_BOUNDS: (f64, f64) = (1e-3, 1.0);
pub const FIT_CD_BOUNDS: (f64, f64) = (0.1, 200.0);

/// Sentinel error value for a candidate whose simulate/measure step failed.
pub const FIT_SENTINEL_ERROR: f64 = 1000.0;

/// Weights for the fitter's triple-objective variant: distance (width)
/// error vs. sidewall-angle error.
pub const FIT_DISTANCE_WEIGHT: f64 = 0.9;
pub const FIT_ANGLE_WEIGHT: f64 = 0.1;

/// Physical resist thickness (nm) assumed when converting the
/// dimensionless [0,1] etch-depth fraction into the same nm units as the
/// width metrics, so a target sidewall angle can be derived from target
/// widths and measured depth. The kernel never declares a physical resist
/// thickness elsewhere, so this is a fixed modeling convention rather than
/// a caller-tunable parameter.
pub const RESIST_THICKNESS_NM: f64 = 1000.0;
