//! Parameter fitter: recovers `(C, cd)` from target top/bottom CD widths.
//!
//! Differential evolution over the declared box constraints, a bounded
//! local pattern-search refinement from the DE optimum, repeated from
//! several seeds, with a final validation pass at the best point found.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::constants::{
    FIT_ANGLE_WEIGHT, FIT_CD_BOUNDS, FIT_C_BOUNDS, FIT_DISTANCE_WEIGHT, FIT_SENTINEL_ERROR,
    RESIST_THICKNESS_NM,
};
use crate::morphology::{self, Metrics};
use crate::params::{ResponseModel, SimParams, TargetWidths};
use crate::sweep::{self, SimResult};

/// Cooperative cancellation signal checked between DE iterations and
/// between multi-start runs. Cloning shares the same underlying flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FitBudget {
    /// Iterations per differential-evolution run.
    pub max_iterations: u32,
    /// Population size is `population_multiplier * dim` (dim = 2 here).
    pub population_multiplier: usize,
    /// Number of independent multi-start repeats, `K >= 3`.
    pub starts: usize,
    pub seed: u64,
}

impl Default for FitBudget {
    fn default() -> Self {
        FitBudget {
            max_iterations: 50,
            population_multiplier: 15,
            starts: 3,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FitReport {
    pub best_c: f64,
    pub best_cd: f64,
    pub measured: Option<Metrics>,
    pub error_top: f64,
    pub error_bottom: f64,
    /// Sidewall-angle error against [`target_sidewall_angle_deg`], folded
    /// into `error_total` at the triple-objective's 0.1 weight.
    pub error_angle: f64,
    /// The ideal sidewall angle derived from the target widths and the
    /// measured etch depth (§4.H's triple-objective variant).
    pub target_angle_deg: Option<f64>,
    pub error_total: f64,
    pub pass_top: bool,
    pub pass_bottom: bool,
    pub iterations: u32,
    pub converged: bool,
}

/// Ideal sidewall angle implied by the target top/bottom widths and a
/// measured etch depth, via `atan((bottom - top) / 2 / depth)` converted
/// to the 90-offset convention used by [`Metrics::sidewall_angle_mean_deg`]
/// (90 deg = vertical wall, 0 deg = flat).
///
/// `etch_depth_nm` is the dimensionless `[0,1]` etch-depth fraction scaled
/// by [`RESIST_THICKNESS_NM`], since the kernel never declares a physical
/// resist thickness of its own.
fn target_sidewall_angle_deg(targets: &TargetWidths, etch_depth_nm: f64) -> f64 {
    if etch_depth_nm <= 0.0 {
        return 90.0;
    }
    let run = (targets.bottom_nm - targets.top_nm).abs() / 2.0;
    90.0 - (run / etch_depth_nm).atan().to_degrees()
}

/// Deepest point of the etch, as a `[0,1]` fraction of full resist
/// clearance (`1 - min(thickness)`).
fn measured_etch_depth_fraction(thickness: &[f64]) -> f64 {
    let min_thickness = thickness.iter().cloned().fold(f64::INFINITY, f64::min);
    1.0 - min_thickness
}

const DIM: usize = 2;

fn clamp_to_bounds(candidate: &mut [f64; DIM]) {
    candidate[0] = candidate[0].clamp(FIT_C_BOUNDS.0, FIT_C_BOUNDS.1);
    candidate[1] = candidate[1].clamp(FIT_CD_BOUNDS.0, FIT_CD_BOUNDS.1);
}

/// The fitter's full triple-objective evaluation of one candidate: the
/// weighted width-distance error, the sidewall-angle error against
/// [`target_sidewall_angle_deg`], and their `(0.9, 0.1)`-weighted total.
struct EvalOutcome {
    error: f64,
    metrics: Option<Metrics>,
    error_top: f64,
    error_bottom: f64,
    error_angle: f64,
    target_angle_deg: Option<f64>,
}

impl EvalOutcome {
    fn sentinel() -> Self {
        EvalOutcome {
            error: FIT_SENTINEL_ERROR,
            metrics: None,
            error_top: f64::INFINITY,
            error_bottom: f64::INFINITY,
            error_angle: f64::INFINITY,
            target_angle_deg: None,
        }
    }
}

/// Evaluates a candidate `(C, cd)` against `targets`, or the sentinel
/// error on any simulate/measure failure (§4.F or §4.G).
fn evaluate(base: &SimParams, candidate: [f64; DIM], targets: &TargetWidths) -> EvalOutcome {
    let mut params = base.clone();
    params.c = candidate[0];
    params.cd = Some(candidate[1]);
    params.response = ResponseModel::IdealThreshold;

    let period = match sweep::effective_period_um(&params.illumination) {
        Some(p) => p,
        None => return EvalOutcome::sentinel(),
    };

    let result = match sweep::simulate(&params) {
        Ok(SimResult::D1(r)) => r,
        _ => return EvalOutcome::sentinel(),
    };

    let metrics = match morphology::measure(&result.x_coords, &result.thickness, period) {
        Ok(m) => m,
        Err(_) => return EvalOutcome::sentinel(),
    };

    let e_top = (metrics.top_width_nm - targets.top_nm).abs() / targets.top_nm;
    let e_bot = (metrics.bottom_width_nm - targets.bottom_nm).abs() / targets.bottom_nm;
    let (w_top, w_bot) = if e_top > 2.0 * e_bot {
        (0.75, 0.25)
    } else if e_bot > 2.0 * e_top {
        (0.25, 0.75)
    } else {
        (0.5, 0.5)
    };
    let distance_error = w_top * e_top + w_bot * e_bot;

    let etch_depth_nm = measured_etch_depth_fraction(&result.thickness) * RESIST_THICKNESS_NM;
    let target_angle = target_sidewall_angle_deg(targets, etch_depth_nm);
    let e_angle = (metrics.sidewall_angle_mean_deg - target_angle).abs() / 90.0;

    EvalOutcome {
        error: FIT_DISTANCE_WEIGHT * distance_error + FIT_ANGLE_WEIGHT * e_angle,
        metrics: Some(metrics),
        error_top: e_top,
        error_bottom: e_bot,
        error_angle: e_angle,
        target_angle_deg: Some(target_angle),
    }
}

/// One differential-evolution run (DE/rand/1/bin), bounds-respecting.
fn differential_evolution(
    base: &SimParams,
    targets: &TargetWidths,
    budget: &FitBudget,
    seed: u64,
    cancel: &CancellationToken,
) -> ([f64; DIM], f64, u32) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let pop_size = budget.population_multiplier * DIM;

    let mut pop: Vec<[f64; DIM]> = (0..pop_size)
        .map(|_| {
            [
                rng.gen_range(FIT_C_BOUNDS.0..=FIT_C_BOUNDS.1),
                rng.gen_range(FIT_CD_BOUNDS.0..=FIT_CD_BOUNDS.1),
            ]
        })
        .collect();
    let mut fitness: Vec<f64> = pop.iter().map(|&c| evaluate(base, c, targets).error).collect();

    const F: f64 = 0.8;
    const CR: f64 = 0.9;
    let mut iterations_run = 0u32;

    for _ in 0..budget.max_iterations {
        if cancel.is_cancelled() {
            break;
        }
        for i in 0..pop_size {
            let mut idxs: Vec<usize> = (0..pop_size).filter(|&j| j != i).collect();
            let (mut r1, mut r2, mut r3) = (0, 0, 0);
            for slot in [&mut r1, &mut r2, &mut r3] {
                let pick = rng.gen_range(0..idxs.len());
                *slot = idxs.remove(pick);
            }

            let mut trial = pop[i];
            let force_dim = rng.gen_range(0..DIM);
            for d in 0..DIM {
                if d == force_dim || rng.gen_bool(CR) {
                    trial[d] = pop[r1][d] + F * (pop[r2][d] - pop[r3][d]);
                }
            }
            clamp_to_bounds(&mut trial);

            let trial_fit = evaluate(base, trial, targets).error;
            if trial_fit <= fitness[i] {
                pop[i] = trial;
                fitness[i] = trial_fit;
            }
        }
        iterations_run += 1;
    }

    let (best_idx, &best_fit) = fitness
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.partial_cmp(b.1).unwrap())
        .unwrap();
    (pop[best_idx], best_fit, iterations_run)
}

/// Bounded coordinate pattern search, the hand-rolled stand-in for a
/// quasi-Newton refine step (no local solver is pulled in for two
/// dimensions).
fn local_refine(
    base: &SimParams,
    targets: &TargetWidths,
    start: [f64; DIM],
    start_fit: f64,
) -> ([f64; DIM], f64) {
    let mut point = start;
    let mut fit = start_fit;
    let mut step = [
        (FIT_C_BOUNDS.1 - FIT_C_BOUNDS.0) * 0.05,
        (FIT_CD_BOUNDS.1 - FIT_CD_BOUNDS.0) * 0.05,
    ];

    for _ in 0..30 {
        let mut improved = false;
        for d in 0..DIM {
            for &sign in &[1.0, -1.0] {
                let mut candidate = point;
                candidate[d] += sign * step[d];
                clamp_to_bounds(&mut candidate);
                let candidate_fit = evaluate(base, candidate, targets).error;
                if candidate_fit < fit {
                    point = candidate;
                    fit = candidate_fit;
                    improved = true;
                }
            }
        }
        if !improved {
            step[0] /= 2.0;
            step[1] /= 2.0;
        }
        if step[0] < 1e-6 && step[1] < 1e-4 {
            break;
        }
    }

    (point, fit)
}

/// Recover `(C, cd)` from `targets` via differential evolution, local
/// refinement, and multi-start, honouring `cancel` between runs.
pub fn fit(
    base: &SimParams,
    targets: &TargetWidths,
    budget: &FitBudget,
    cancel: &CancellationToken,
) -> FitReport {
    let mut best_point = [
        (FIT_C_BOUNDS.0 + FIT_C_BOUNDS.1) / 2.0,
        (FIT_CD_BOUNDS.0 + FIT_CD_BOUNDS.1) / 2.0,
    ];
    let mut best_fit = f64::INFINITY;
    let mut total_iterations = 0u32;

    for start in 0..budget.starts.max(3) {
        if cancel.is_cancelled() {
            break;
        }
        let seed = budget.seed.wrapping_add(start as u64);
        let (de_point, de_fit, iters) = differential_evolution(base, targets, budget, seed, cancel);
        total_iterations += iters;
        let (refined_point, refined_fit) = local_refine(base, targets, de_point, de_fit);

        if refined_fit < best_fit {
            best_fit = refined_fit;
            best_point = refined_point;
        }
    }

    let outcome = evaluate(base, best_point, targets);

    FitReport {
        best_c: best_point[0],
        best_cd: best_point[1],
        pass_top: outcome.error_top <= targets.tolerance,
        pass_bottom: outcome.error_bottom <= targets.tolerance,
        measured: outcome.metrics,
        error_top: outcome.error_top,
        error_bottom: outcome.error_bottom,
        error_angle: outcome.error_angle,
        target_angle_deg: outcome.target_angle_deg,
        error_total: best_fit,
        iterations: total_iterations,
        converged: best_fit < FIT_SENTINEL_ERROR
            && outcome.error_top <= targets.tolerance
            && outcome.error_bottom <= targets.tolerance,
    }
}
