//! Photolithography exposure and resist-response simulation kernel.
//!
//! The crate is I/O-free and holds no mutable global state: `simulate`
//! and `fit` are pure functions of their parameters, and the material
//! database is a process-wide read-only table. See [`sweep::simulate`]
//! for the main entry point.

pub mod arc;
pub mod constants;
pub mod dose;
pub mod error;
pub mod expr;
pub mod fit;
pub mod intensity;
pub mod interp;
pub mod logging;
pub mod materials_db;
pub mod morphology;
pub mod params;
pub mod response;
pub mod sweep;

pub use error::{LithoError, Result, Warning};
pub use fit::{fit as fit_params, CancellationToken, FitBudget, FitReport};
pub use logging::{Level, NoopSink, Sink};
pub use materials_db::material_db;
pub use morphology::{measure, Metrics, MorphologyError};
pub use params::{
    ArcSpec, CustomIntensitySamples, ExposureMode, IlluminationMode, OriginalUnit,
    OutsideRangeMode, ResponseModel, SimParams, SweepOptions, TargetWidths,
};
pub use sweep::{
    simulate, simulate_frames, simulate_with_sink, Frame, Result1D, Result2D, Result3D, SimResult,
};
