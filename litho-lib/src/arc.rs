//! Optical-database lookup and ARC (anti-reflective coating) derivation.
//!
//! `arc_parameters` always returns a record — there is no error path here,
//! per the design's "always returns a record; unknown names degrade to a
//! special 'none' entry" contract. The transmission factor it derives is
//! floored at a small epsilon (never zero or negative) and multiplies the
//! nominal intensity in the field builder; suppressing the reflected wave
//! can push it above 1, so it is not capped there.

use crate::constants::{
    ARC_EFFICIENCY_ABSORBING, ARC_EFFICIENCY_HYBRID, ARC_EFFICIENCY_INTERFERENCE, N_RESIST,
};
use crate::materials_db::{lookup_arc, lookup_substrate};

/// ARC type tag controlling the nominal reflection-suppression efficiency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcKind {
    Interference,
    Absorbing,
    Hybrid,
    /// Unknown or absent ARC: efficiency 0.
    None,
}

impl ArcKind {
    /// Documented, hard-coded efficiency for this ARC type. No physical
    /// derivation is recorded for these constants (see `spec.md` §9); use
    /// [`ArcKind::efficiency_override`] to supply better data per material.
    pub fn efficiency(self) -> f64 {
        match self {
            ArcKind::Interference => ARC_EFFICIENCY_INTERFERENCE,
            ArcKind::Absorbing => ARC_EFFICIENCY_ABSORBING,
            ArcKind::Hybrid => ARC_EFFICIENCY_HYBRID,
            ArcKind::None => 0.0,
        }
    }

    /// Override hook for callers with measured per-material efficiency,
    /// clamped to `[0, 1]`.
    pub fn efficiency_override(self, measured: f64) -> f64 {
        measured.clamp(0.0, 1.0)
    }
}

/// Derived ARC parameters for a (substrate, ARC, wavelength) triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcParameters {
    pub n_resist: f64,
    pub n_substrate: f64,
    pub n_arc: f64,
    pub k_arc: f64,
    pub reflectance_no_arc: f64,
    pub reflectance_with_arc: f64,
    /// Multiplies the nominal intensity field. Floored above 0; ARC
    /// suppression of the reflected wave can push it above 1.
    pub transmission_factor: f64,
}

/// Derive ARC parameters for `substrate`/`arc` at `wavelength_nm`.
///
/// `substrate == "none"` or `arc == "none"` (case-insensitive) short
/// circuits to a transmission factor of exactly `1.0`.
pub fn arc_parameters(substrate: &str, arc: &str, wavelength_nm: f64) -> ArcParameters {
    let n_resist = N_RESIST;
    let sub = lookup_substrate(substrate, wavelength_nm);
    let (arc_rec, kind) = lookup_arc(arc, wavelength_nm);

    let reflectance_no_arc = {
        let num = n_resist - sub.n;
        let den = n_resist + sub.n;
        (num / den).powi(2)
    };

    let no_arc_requested =
        substrate.eq_ignore_ascii_case("none") || arc.eq_ignore_ascii_case("none");

    let eta = kind.efficiency();
    let reflectance_with_arc = reflectance_no_arc * (1.0 - eta);

    // An effective ARC lowers reflectance below the bare-substrate baseline,
    // so this ratio can legitimately exceed 1.0 (see the worked example in
    // the design notes); only the lower bound is enforced here, floored
    // just above zero rather than at the nominal 1.0 ceiling.
    let transmission_factor = if no_arc_requested || reflectance_no_arc <= 0.0 {
        1.0
    } else {
        ((1.0 - reflectance_with_arc) / (1.0 - reflectance_no_arc)).max(f64::EPSILON)
    };

    ArcParameters {
        n_resist,
        n_substrate: sub.n,
        n_arc: arc_rec.n,
        k_arc: arc_rec.k,
        reflectance_no_arc,
        reflectance_with_arc,
        transmission_factor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_none_is_identity() {
        let p = arc_parameters("none", "none", 405.0);
        assert_eq!(p.transmission_factor, 1.0);
    }

    #[test]
    fn silicon_sion_at_405_matches_worked_example() {
        let p = arc_parameters("silicon", "SiON", 405.0);
        assert!((p.n_substrate - 4.15).abs() < 1e-9);
        assert!((p.reflectance_no_arc - 0.1756).abs() < 2e-4);
        assert!((p.transmission_factor - 1.1913).abs() < 1e-3);
    }

    #[test]
    fn transmission_factor_is_positive() {
        for (sub, arc) in [
            ("silicon", "SiON"),
            ("silicon dioxide", "organic BARC"),
            ("tungsten", "DUV30"),
            ("unknown", "unknown"),
        ] {
            let p = arc_parameters(sub, arc, 248.0);
            assert!(p.transmission_factor > 0.0, "{sub}/{arc}");
        }
    }
}
