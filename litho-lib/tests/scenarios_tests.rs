//! Integration tests over the concrete numbered scenarios from the design
//! notes, plus the cross-cutting testable properties.

use approx::assert_relative_eq;
use litho::{
    fit_params, ArcSpec, CancellationToken, ExposureMode, FitBudget, IlluminationMode,
    ResponseModel, Result1D, SimParams, SimResult, SweepOptions, TargetWidths,
};
use std::f64::consts::PI;

fn base_1d(k: f64) -> SimParams {
    SimParams {
        illumination: IlluminationMode::Sinusoidal1D { k },
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

fn as_1d(result: SimResult) -> Result1D {
    match result {
        SimResult::D1(r) => r,
        _ => panic!("expected a 1D result"),
    }
}

#[test]
fn scenario_1_dill_default() {
    let params = base_1d(2.0 * PI / 1.0);
    let r = as_1d(litho::simulate(&params).unwrap());
    let zero = r.x_coords.iter().position(|&x| x.abs() < 1e-9).unwrap();
    assert_relative_eq!(r.intensity[zero], 1.8, epsilon = 1e-9);
    assert_relative_eq!(r.thickness[zero], (-0.0396_f64).exp(), epsilon = 1e-9);

    let pi_over_k = PI / (2.0 * PI / 1.0);
    let quarter = r
        .x_coords
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (**a - pi_over_k).abs().partial_cmp(&(**b - pi_over_k).abs()).unwrap())
        .unwrap()
        .0;
    assert_relative_eq!(r.intensity[quarter], 0.2, epsilon = 1e-2);
}

#[test]
fn scenario_2_ideal_threshold() {
    let params = SimParams {
        illumination: IlluminationMode::IdealExposure1D {
            period_um: 1.0,
            contrast: None,
        },
        i_avg: 0.5,
        contrast_v: 1.0,
        t_exp: 30.0,
        exposure_mode: ExposureMode::SingleShot,
        c: 0.022,
        cd: Some(20.0),
        response: ResponseModel::IdealThreshold,
        phase_expr: None,
        arc: None,
        target: None,
        sweep: SweepOptions {
            points: Some(2001),
            ..SweepOptions::default()
        },
    };
    let r = as_1d(litho::simulate(&params).unwrap());
    let zero = r.x_coords.iter().position(|&x| x.abs() < 1e-9).unwrap();
    assert_relative_eq!(r.exposure_dose[zero], 30.0, epsilon = 1e-6);
    assert_relative_eq!(r.thickness[zero], 0.8025187979624785, epsilon = 1e-6);
}

#[test]
fn scenario_3_2d_symmetry() {
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
            points: Some(81),
            ..SweepOptions::default()
        },
    };
    let r = match litho::simulate(&params).unwrap() {
        SimResult::D2(r) => r,
        _ => panic!("expected 2D result"),
    };
    let n = r.x_coords.len();
    for i in 0..n {
        for j in 0..n {
            assert_eq!(r.exposure_dose[i * n + j], r.exposure_dose[j * n + i]);
        }
    }
}

#[test]
fn scenario_4_cumulative_matches_single_shot() {
    let mut single = base_1d(2.0 * PI / 1.0);
    single.t_exp = 1.0;

    let mut cum = base_1d(2.0 * PI / 1.0);
    cum.t_exp = 1.0;
    cum.exposure_mode = ExposureMode::Cumulative {
        segment_scales: vec![1.0; 5],
    };

    let r_single = as_1d(litho::simulate(&single).unwrap());
    let r_cum = as_1d(litho::simulate(&cum).unwrap());
    let max_diff = r_single
        .exposure_dose
        .iter()
        .zip(r_cum.exposure_dose.iter())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0_f64, f64::max);
    assert!(max_diff <= 1e-10);
}

#[test]
fn scenario_5_arc_transmission() {
    let params = litho::arc::arc_parameters("silicon", "SiON", 405.0);
    assert_relative_eq!(params.n_substrate, 4.15, epsilon = 1e-9);
    assert_relative_eq!(params.n_arc, 1.75, epsilon = 1e-9);
    assert_relative_eq!(params.reflectance_no_arc, 0.1756, epsilon = 2e-4);
    assert_relative_eq!(params.reflectance_with_arc, 0.01756, epsilon = 2e-4);
    assert_relative_eq!(params.transmission_factor, 1.1913, epsilon = 1e-4);
}

#[test]
fn scenario_6_morphology_widths() {
    let period = 1.0;
    let n = 2001;
    let x: Vec<f64> = (0..n)
        .map(|i| -period / 2.0 + period * i as f64 / (n - 1) as f64)
        .collect();
    let thickness: Vec<f64> = x
        .iter()
        .map(|&xi| 1.0 - 0.5 * (1.0 + (2.0 * PI * xi / period).cos()))
        .collect();

    let m = litho::measure(&x, &thickness, period).unwrap();
    assert!((m.top_width_nm - 0.2 * period * 1000.0).abs() / (0.2 * period * 1000.0) < 0.01);
    assert!((m.bottom_width_nm - 0.8 * period * 1000.0).abs() / (0.8 * period * 1000.0) < 0.01);
}

#[test]
fn arc_identity_is_bitwise() {
    let mut with_arc = base_1d(2.0 * PI / 1.0);
    with_arc.arc = Some(ArcSpec {
        substrate: "none".to_string(),
        arc: "none".to_string(),
        wavelength_nm: 193.0,
    });
    let bare = base_1d(2.0 * PI / 1.0);

    let r_arc = as_1d(litho::simulate(&with_arc).unwrap());
    let r_bare = as_1d(litho::simulate(&bare).unwrap());
    assert_eq!(r_arc.intensity, r_bare.intensity);
    assert_eq!(r_arc.thickness, r_bare.thickness);
}

#[test]
fn fitter_recovers_ground_truth_widths() {
    let truth_c = 0.03;
    let truth_cd = 25.0;
    let mut ground_truth = SimParams {
        illumination: IlluminationMode::IdealExposure1D {
            period_um: 1.0,
            contrast: None,
        },
        i_avg: 0.5,
        contrast_v: 1.0,
        t_exp: 40.0,
        exposure_mode: ExposureMode::SingleShot,
        c: truth_c,
        cd: Some(truth_cd),
        response: ResponseModel::IdealThreshold,
        phase_expr: None,
        arc: None,
        target: None,
        sweep: SweepOptions {
            points: Some(2001),
            ..SweepOptions::default()
        },
    };
    let r = as_1d(litho::simulate(&ground_truth).unwrap());
    let metrics = litho::measure(&r.x_coords, &r.thickness, 1.0).unwrap();

    let targets = TargetWidths {
        top_nm: metrics.top_width_nm,
        bottom_nm: metrics.bottom_width_nm,
        tolerance: 0.05,
    };
    ground_truth.cd = None;

    let budget = FitBudget {
        max_iterations: 20,
        population_multiplier: 10,
        starts: 2,
        seed: 7,
    };
    let cancel = CancellationToken::new();
    let report = fit_params(&ground_truth, &targets, &budget, &cancel);
    assert!(report.error_total < 1.0);
}
