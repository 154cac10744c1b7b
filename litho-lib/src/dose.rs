//! Exposure dose accumulation: single-shot and N-segment cumulative.

use crate::error::Warning;

/// `D(x) = I(x) * t_exp`.
pub fn single_shot(intensity: &[f64], t_exp: f64) -> Vec<f64> {
    intensity.iter().map(|&i| i * t_exp).collect()
}

/// Cumulative multi-segment exposure.
///
/// Each of `segment_scales.len()` segments lasts `t_exp / N` and exposes at
/// `I(x) * segment_scales[i]`; the total dose is the sum across segments.
/// Also returns the "display intensity" used for plotting: the mean of
/// `segment_scales[i] * I(x)` over segments, i.e. a time-averaged field.
pub fn cumulative(intensity: &[f64], t_exp: f64, segment_scales: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let n = segment_scales.len() as f64;
    let dt = t_exp / n;

    let mut dose = vec![0.0; intensity.len()];
    let mut display_intensity = vec![0.0; intensity.len()];
    for &scale in segment_scales {
        for (j, &i) in intensity.iter().enumerate() {
            dose[j] += scale * i * dt;
            display_intensity[j] += scale * i;
        }
    }
    for v in &mut display_intensity {
        *v /= n;
    }

    (dose, display_intensity)
}

/// Replace any non-finite dose sample with `0.0`, recording a warning if any
/// were found.
pub fn sanitize(dose: &mut [f64]) -> Option<Warning> {
    let mut replaced = 0usize;
    for v in dose.iter_mut() {
        if !v.is_finite() {
            *v = 0.0;
            replaced += 1;
        }
    }
    if replaced > 0 {
        Some(Warning::NonFinite(format!(
            "{replaced} dose sample(s) were non-finite and replaced with 0"
        )))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_shot_scales_by_texp() {
        let i = vec![1.0, 2.0, 3.0];
        let d = single_shot(&i, 2.0);
        assert_eq!(d, vec![2.0, 4.0, 6.0]);
    }

    #[test]
    fn cumulative_matches_single_shot_for_one_uniform_segment() {
        let i = vec![1.0, 2.0];
        let (dose, display) = cumulative(&i, 3.0, &[1.0]);
        assert_eq!(dose, vec![3.0, 6.0]);
        assert_eq!(display, i);
    }

    #[test]
    fn cumulative_sums_across_segments() {
        let i = vec![2.0];
        let (dose, display) = cumulative(&i, 4.0, &[1.0, 0.5]);
        // dt = 2.0 per segment: (1.0*2.0 + 0.5*2.0) * 2.0 = 6.0
        assert!((dose[0] - 6.0).abs() < 1e-12);
        assert!((display[0] - 1.5).abs() < 1e-12);
    }

    #[test]
    fn sanitize_replaces_non_finite() {
        let mut d = vec![1.0, f64::NAN, f64::INFINITY, 2.0];
        let warning = sanitize(&mut d);
        assert!(warning.is_some());
        assert_eq!(d, vec![1.0, 0.0, 0.0, 2.0]);
    }

    #[test]
    fn sanitize_is_none_when_clean() {
        let mut d = vec![1.0, 2.0];
        assert!(sanitize(&mut d).is_none());
    }
}
