//! Resist response laws: dose `D` to normalized thickness `M`.
//!
//! All three map element-wise, `R^shape(D) -> R^shape(D)`, with a single
//! output allocation and no intermediate buffers.

/// `M(D) = exp(-C*D)`. Strictly decreasing in `D` for `C > 0`.
pub fn dill(dose: &[f64], c: f64) -> Vec<f64> {
    dose.iter().map(|&d| (-c * d).exp()).collect()
}

/// `M = 1` if `D < cd`, else `exp(-C*(D - cd))`. Continuous at `D = cd`
/// since both branches equal `1` there.
pub fn ideal_threshold(dose: &[f64], c: f64, cd: f64) -> Vec<f64> {
    dose.iter()
        .map(|&d| if d < cd { 1.0 } else { (-c * (d - cd)).exp() })
        .collect()
}

/// `M = 1 / (1 + exp(s*(D - mean(D))))` with `s = max(0.1, (V - 0.5) * 10)`.
///
/// A smooth alternative to [`ideal_threshold`] that stays monotonic as `V`
/// approaches `1`; `cd` is unused (the threshold is the dose mean), kept
/// in the signature so callers can dispatch on `ResponseModel` uniformly.
pub fn sigmoid_threshold(dose: &[f64], contrast_v: f64) -> Vec<f64> {
    let mean = if dose.is_empty() {
        0.0
    } else {
        dose.iter().sum::<f64>() / dose.len() as f64
    };
    let s = ((contrast_v - 0.5) * 10.0).max(0.1);
    dose.iter()
        .map(|&d| 1.0 / (1.0 + (s * (d - mean)).exp()))
        .collect()
}

/// Replace any non-finite thickness sample with `1.0` (fully unexposed),
/// returning how many were replaced.
pub fn sanitize(thickness: &mut [f64]) -> usize {
    let mut replaced = 0;
    for v in thickness.iter_mut() {
        if !v.is_finite() {
            *v = 1.0;
            replaced += 1;
        }
    }
    replaced
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dill_is_monotonically_decreasing() {
        let dose: Vec<f64> = (0..20).map(|i| i as f64 * 0.5).collect();
        let m = dill(&dose, 0.05);
        for w in m.windows(2) {
            assert!(w[1] <= w[0]);
        }
    }

    #[test]
    fn dill_zero_dose_is_full_thickness() {
        let m = dill(&[0.0], 0.5);
        assert!((m[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ideal_threshold_continuous_at_cd() {
        let cd = 10.0;
        let just_below = ideal_threshold(&[cd - 1e-9], 0.1, cd);
        let at = ideal_threshold(&[cd], 0.1, cd);
        assert!((just_below[0] - at[0]).abs() < 1e-6);
        assert!((at[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn ideal_threshold_decays_past_cd() {
        let m = ideal_threshold(&[20.0], 0.2, 10.0);
        assert!(m[0] < 1.0);
    }

    #[test]
    fn sigmoid_threshold_monotonic_and_bounded() {
        let dose: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let m = sigmoid_threshold(&dose, 0.9);
        for w in m.windows(2) {
            assert!(w[1] <= w[0] + 1e-12);
        }
        assert!(m.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn sanitize_replaces_with_one() {
        let mut m = vec![0.5, f64::NAN, f64::NEG_INFINITY];
        let n = sanitize(&mut m);
        assert_eq!(n, 2);
        assert_eq!(m, vec![0.5, 1.0, 1.0]);
    }
}
