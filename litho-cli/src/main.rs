use std::f64::consts::PI;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use litho::{
    material_db, CancellationToken, ExposureMode, FitBudget, IlluminationMode, ResponseModel,
    SimParams, SimResult, SweepOptions, TargetWidths,
};

#[derive(Parser)]
#[command(name = "litho", about = "Photolithography exposure simulation kernel", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a 1D sweep and print a summary (or JSON with --json).
    Simulate {
        #[arg(long, default_value_t = 1.0)]
        i_avg: f64,
        #[arg(long, default_value_t = 0.8)]
        v: f64,
        /// Period in micrometers; K = 2*pi/period.
        #[arg(long, default_value_t = 1.0)]
        period_um: f64,
        #[arg(long, default_value_t = 1.0)]
        t_exp: f64,
        #[arg(long, default_value_t = 0.022)]
        c: f64,
        #[arg(long)]
        cd: Option<f64>,
        #[arg(long, value_enum, default_value = "dill")]
        response: ResponseArg,
        #[arg(long)]
        points: Option<usize>,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Sweep then measure top/bottom critical widths and sidewall angle.
    Measure {
        #[arg(long, default_value_t = 0.5)]
        i_avg: f64,
        #[arg(long, default_value_t = 1.0)]
        v: f64,
        #[arg(long, default_value_t = 1.0)]
        period_um: f64,
        #[arg(long, default_value_t = 30.0)]
        t_exp: f64,
        #[arg(long, default_value_t = 0.022)]
        c: f64,
        #[arg(long, default_value_t = 20.0)]
        cd: f64,
    },
    /// Search for (C, cd) that hit target top/bottom widths.
    Fit {
        #[arg(long, default_value_t = 0.5)]
        i_avg: f64,
        #[arg(long, default_value_t = 1.0)]
        period_um: f64,
        #[arg(long, default_value_t = 30.0)]
        t_exp: f64,
        #[arg(long)]
        target_top_nm: f64,
        #[arg(long)]
        target_bottom_nm: f64,
        #[arg(long, default_value_t = 0.05)]
        tolerance: f64,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// List the substrates and ARC materials in the embedded optical database.
    Materials,
}

#[derive(Clone, clap::ValueEnum)]
enum ResponseArg {
    Dill,
    IdealThreshold,
    Sigmoid,
}

fn ideal_threshold_params(i_avg: f64, v: f64, period_um: f64, t_exp: f64, c: f64, cd: f64) -> SimParams {
    SimParams {
        illumination: IlluminationMode::IdealExposure1D {
            period_um,
            contrast: None,
        },
        i_avg,
        contrast_v: v,
        t_exp,
        exposure_mode: ExposureMode::SingleShot,
        c,
        cd: Some(cd),
        response: ResponseModel::IdealThreshold,
        phase_expr: None,
        arc: None,
        target: None,
        sweep: SweepOptions {
            points: Some(2001),
            ..SweepOptions::default()
        },
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Command::Simulate {
            i_avg,
            v,
            period_um,
            t_exp,
            c,
            cd,
            response,
            points,
            json,
        } => {
            let params = SimParams {
                illumination: IlluminationMode::Sinusoidal1D {
                    k: 2.0 * PI / period_um,
                },
                i_avg,
                contrast_v: v,
                t_exp,
                exposure_mode: ExposureMode::SingleShot,
                c,
                cd,
                response: match response {
                    ResponseArg::Dill => ResponseModel::Dill,
                    ResponseArg::IdealThreshold => ResponseModel::IdealThreshold,
                    ResponseArg::Sigmoid => ResponseModel::SigmoidThreshold,
                },
                phase_expr: None,
                arc: None,
                target: None,
                sweep: SweepOptions {
                    points,
                    ..SweepOptions::default()
                },
            };

            match litho::simulate(&params) {
                Ok(SimResult::D1(result)) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&result).unwrap());
                    } else {
                        let n = result.x_coords.len();
                        let mid = n / 2;
                        println!("points: {n}");
                        println!("x[mid] = {:.4} um", result.x_coords[mid]);
                        println!("dose[mid] = {:.4}", result.exposure_dose[mid]);
                        println!("thickness[mid] = {:.4}", result.thickness[mid]);
                        for w in &result.warnings {
                            println!("warning: {w}");
                        }
                    }
                    ExitCode::SUCCESS
                }
                Ok(_) => unreachable!("Sinusoidal1D always produces a 1D result"),
                Err(e) => {
                    eprintln!("error: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        Command::Measure {
            i_avg,
            v,
            period_um,
            t_exp,
            c,
            cd,
        } => {
            let params = ideal_threshold_params(i_avg, v, period_um, t_exp, c, cd);
            let result = match litho::simulate(&params) {
                Ok(SimResult::D1(r)) => r,
                Ok(_) => unreachable!("Sinusoidal1D always produces a 1D result"),
                Err(e) => {
                    eprintln!("error: {e}");
                    return ExitCode::FAILURE;
                }
            };
            match litho::measure(&result.x_coords, &result.thickness, period_um) {
                Ok(m) => {
                    println!("top width: {:.2} nm", m.top_width_nm);
                    println!("bottom width: {:.2} nm", m.bottom_width_nm);
                    println!("sidewall angle (mean): {:.2} deg", m.sidewall_angle_mean_deg);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("error: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        Command::Fit {
            i_avg,
            period_um,
            t_exp,
            target_top_nm,
            target_bottom_nm,
            tolerance,
            seed,
        } => {
            let base = ideal_threshold_params(i_avg, 1.0, period_um, t_exp, 0.022, 20.0);
            let targets = TargetWidths {
                top_nm: target_top_nm,
                bottom_nm: target_bottom_nm,
                tolerance,
            };
            let budget = FitBudget {
                seed,
                ..Default::default()
            };
            let cancel = CancellationToken::new();
            let report = litho::fit_params(&base, &targets, &budget, &cancel);
            println!("C = {:.5}", report.best_c);
            println!("cd = {:.3}", report.best_cd);
            println!("error_total = {:.4}", report.error_total);
            println!(
                "pass: top={} bottom={}",
                report.pass_top, report.pass_bottom
            );
            ExitCode::SUCCESS
        }
        Command::Materials => {
            let db = material_db();
            println!("substrates: {:?}", db.substrate_names());
            println!("arc materials: {:?}", db.arc_names());
            ExitCode::SUCCESS
        }
    }
}
