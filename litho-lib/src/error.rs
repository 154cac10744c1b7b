use std::fmt;

/// Fatal errors: validation failures only.
///
/// Recoverable conditions (`Degenerate`, `Interpolation`, `CalibrationAdjusted`
/// in the design docs) never appear here — they are pushed onto a result's
/// `warnings` list instead, since the caller still gets arrays back. Fitter
/// non-convergence is likewise not an error: `fit()` always returns a
/// `FitReport` with the best candidate found and a `converged` flag, never
/// an `Err`.
#[derive(Debug, Clone, PartialEq)]
pub enum LithoError {
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, LithoError>;

impl fmt::Display for LithoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
        }
    }
}

impl std::error::Error for LithoError {}

/// Recoverable annotations attached to a result rather than returned as `Err`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// Input produces no spatial variation (std below 1e-10).
    Degenerate,
    /// Custom-intensity interpolation failed; fell back to the formula mode.
    Interpolation(String),
    /// The 2D threshold or the period was auto-adjusted to fit the dose range.
    CalibrationAdjusted(String),
    /// Custom-sample declared unit disagreed with the inferred unit.
    UnitMismatch(String),
    /// Non-finite samples were replaced with a safe default.
    NonFinite(String),
    /// Nyquist-type spacing warning for the 2D path.
    Nyquist(String),
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Degenerate => write!(f, "degenerate: input produces no spatial variation"),
            Self::Interpolation(msg) => write!(f, "interpolation fallback: {msg}"),
            Self::CalibrationAdjusted(msg) => write!(f, "calibration adjusted: {msg}"),
            Self::UnitMismatch(msg) => write!(f, "unit mismatch: {msg}"),
            Self::NonFinite(msg) => write!(f, "non-finite output replaced: {msg}"),
            Self::Nyquist(msg) => write!(f, "sampling warning: {msg}"),
        }
    }
}
