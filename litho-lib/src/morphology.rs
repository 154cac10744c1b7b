//! Sidewall width and angle metrics from a 1D thickness profile.

use std::fmt;

/// Metrics computed over one isolated period of a thickness profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub top_width_nm: f64,
    pub bottom_width_nm: f64,
    pub sidewall_angle_left_deg: f64,
    pub sidewall_angle_right_deg: f64,
    pub sidewall_angle_mean_deg: f64,
}

/// Measurement cannot proceed on this profile; the fitter (§4.H) treats
/// either variant as a sentinel-large error rather than propagating it.
#[derive(Debug, Clone, PartialEq)]
pub enum MorphologyError {
    /// `y_max - y_min < 1e-10`: no usable contrast in the isolated window.
    Degenerate,
    /// Fewer than 3 rising-edge samples on one side of the peak.
    InsufficientSamples { side: &'static str, found: usize },
}

impl fmt::Display for MorphologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Degenerate => write!(f, "degenerate profile: no measurable contrast"),
            Self::InsufficientSamples { side, found } => write!(
                f,
                "insufficient rising-edge samples on {side} side: found {found}, need >= 3"
            ),
        }
    }
}

impl std::error::Error for MorphologyError {}

const DEDUP_EPS: f64 = 1e-10;

/// Isolate one period of `(x, thickness)` centered on `x = 0` if that lies
/// within range, or on the array's geometric center otherwise.
fn isolate_period<'a>(x: &'a [f64], y: &'a [f64], period_um: f64) -> (Vec<f64>, Vec<f64>) {
    let center = if x.first().copied().unwrap_or(0.0) <= 0.0 && x.last().copied().unwrap_or(0.0) >= 0.0
    {
        0.0
    } else {
        x[x.len() / 2]
    };
    let half = period_um / 2.0;
    let lo = center - half;
    let hi = center + half;

    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        if xi >= lo && xi <= hi {
            xs.push(xi);
            ys.push(yi);
        }
    }
    (xs, ys)
}

fn crossings(x: &[f64], y: &[f64], level: f64) -> Vec<f64> {
    let mut out = Vec::new();
    for w in 0..x.len().saturating_sub(1) {
        let (y0, y1) = (y[w] - level, y[w + 1] - level);
        if y0 == 0.0 {
            out.push(x[w]);
        } else if y0.signum() != y1.signum() {
            let t = y0 / (y0 - y1);
            out.push(x[w] + t * (x[w + 1] - x[w]));
        }
    }
    if let Some(&last_y) = y.last() {
        if last_y - level == 0.0 {
            out.push(*x.last().unwrap());
        }
    }
    out.sort_by(|a, b| a.partial_cmp(b).unwrap());
    out.dedup_by(|a, b| (*a - *b).abs() < DEDUP_EPS);
    out
}

fn width_at_level_nm(x: &[f64], y: &[f64], level: f64) -> Option<f64> {
    let xs = crossings(x, y, level);
    let (first, last) = (*xs.first()?, *xs.last()?);
    Some((last - first) * 1000.0)
}

fn linear_fit(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    let n = xs.len() as f64;
    if xs.len() < 2 {
        return None;
    }
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var = 0.0;
    for (&xi, &yi) in xs.iter().zip(ys.iter()) {
        cov += (xi - mean_x) * (yi - mean_y);
        var += (xi - mean_x).powi(2);
    }
    if var <= 0.0 {
        return None;
    }
    let m = cov / var;
    let b = mean_y - m * mean_x;
    Some((m, b))
}

/// Measure top/bottom widths and sidewall angle over one period of a
/// thickness profile. `x` is in micrometers; widths are reported in nm.
pub fn measure(
    x: &[f64],
    thickness: &[f64],
    period_um: f64,
) -> Result<Metrics, MorphologyError> {
    let (xs, ys) = isolate_period(x, thickness, period_um);

    let y_max = ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let y_min = ys.iter().cloned().fold(f64::INFINITY, f64::min);
    let delta = y_max - y_min;
    if !(delta >= 1e-10) {
        return Err(MorphologyError::Degenerate);
    }

    let top_level = y_max - 0.1 * delta;
    let bottom_level = y_min + 0.1 * delta;

    let top_width_nm = width_at_level_nm(&xs, &ys, top_level).unwrap_or(0.0);
    let bottom_width_nm = width_at_level_nm(&xs, &ys, bottom_level).unwrap_or(0.0);

    let peak_idx = ys
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
        .map(|(i, _)| i)
        .unwrap_or(0);

    let lo = y_min + 0.1 * delta;
    let hi = y_min + 0.9 * delta;

    let left: Vec<(f64, f64)> = xs[..=peak_idx]
        .iter()
        .zip(ys[..=peak_idx].iter())
        .filter(|&(_, &yi)| yi >= lo && yi <= hi)
        .map(|(&xi, &yi)| (xi, yi))
        .collect();
    let right: Vec<(f64, f64)> = xs[peak_idx..]
        .iter()
        .zip(ys[peak_idx..].iter())
        .filter(|&(_, &yi)| yi >= lo && yi <= hi)
        .map(|(&xi, &yi)| (xi, yi))
        .collect();

    if left.len() < 3 {
        return Err(MorphologyError::InsufficientSamples {
            side: "left",
            found: left.len(),
        });
    }
    if right.len() < 3 {
        return Err(MorphologyError::InsufficientSamples {
            side: "right",
            found: right.len(),
        });
    }

    let (left_x, left_y): (Vec<f64>, Vec<f64>) = left.into_iter().unzip();
    let (right_x, right_y): (Vec<f64>, Vec<f64>) = right.into_iter().unzip();

    let (m_left, _) = linear_fit(&left_x, &left_y).ok_or(MorphologyError::InsufficientSamples {
        side: "left",
        found: left_x.len(),
    })?;
    let (m_right, _) = linear_fit(&right_x, &right_y).ok_or(MorphologyError::InsufficientSamples {
        side: "right",
        found: right_x.len(),
    })?;

    let angle_left = (1.0 / m_left.abs()).atan().to_degrees();
    let angle_right = (1.0 / m_right.abs()).atan().to_degrees();
    let angle_mean = (angle_left + angle_right) / 2.0;

    Ok(Metrics {
        top_width_nm,
        bottom_width_nm,
        sidewall_angle_left_deg: angle_left,
        sidewall_angle_right_deg: angle_right,
        sidewall_angle_mean_deg: angle_mean,
    })
}
