//! Embedded optical database: per-wavelength (n, k) for substrates and ARC
//! materials.
//!
//! Unlike a generated/compressed dataset, this table is small and
//! hand-curated, so it is embedded directly as a `const` slice — the same
//! idiom as a short curated lookup table, just specialized to three
//! documented wavelengths instead of one row per material.

use crate::arc::ArcKind;

/// Measured (n, k) pair at a single tabulated wavelength.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpticalRecord {
    pub n: f64,
    pub k: f64,
}

/// substrate name, wavelength (nm), n, k
const SUBSTRATES: &[(&str, f64, f64, f64)] = &[
    ("silicon", 193.0, 0.883, 2.778),
    ("silicon", 248.0, 1.570, 3.565),
    ("silicon", 405.0, 4.150, 0.098),
    ("silicon dioxide", 193.0, 1.563, 0.0),
    ("silicon dioxide", 248.0, 1.508, 0.0),
    ("silicon dioxide", 405.0, 1.470, 0.0),
    ("silicon nitride", 193.0, 2.648, 0.0),
    ("silicon nitride", 248.0, 2.250, 0.0),
    ("silicon nitride", 405.0, 2.053, 0.0),
    ("aluminum", 193.0, 0.120, 2.277),
    ("aluminum", 248.0, 0.240, 2.763),
    ("aluminum", 405.0, 0.490, 4.450),
    ("tungsten", 193.0, 1.260, 1.780),
    ("tungsten", 248.0, 1.500, 1.950),
    ("tungsten", 405.0, 2.780, 2.670),
];

/// arc name, kind, wavelength (nm), n, k
const ARC_MATERIALS: &[(&str, ArcKind, f64, f64, f64)] = &[
    ("SiON", ArcKind::Interference, 193.0, 1.900, 0.450),
    ("SiON", ArcKind::Interference, 248.0, 1.800, 0.350),
    ("SiON", ArcKind::Interference, 405.0, 1.750, 0.020),
    ("organic BARC", ArcKind::Absorbing, 193.0, 1.500, 0.400),
    ("organic BARC", ArcKind::Absorbing, 248.0, 1.600, 0.300),
    ("organic BARC", ArcKind::Absorbing, 405.0, 1.620, 0.120),
    ("DUV30", ArcKind::Hybrid, 193.0, 1.680, 0.300),
    ("DUV30", ArcKind::Hybrid, 248.0, 1.700, 0.220),
    ("DUV30", ArcKind::Hybrid, 405.0, 1.710, 0.050),
];

/// Tabulated wavelengths lookups fall back to; see [`crate::constants::TABULATED_WAVELENGTHS_NM`].
fn nearest_tabulated_wavelength(wavelength_nm: f64) -> f64 {
    crate::constants::TABULATED_WAVELENGTHS_NM
        .iter()
        .copied()
        .min_by(|a, b| {
            (a - wavelength_nm)
                .abs()
                .partial_cmp(&(b - wavelength_nm).abs())
                .unwrap()
        })
        .unwrap()
}

/// Look up a substrate's (n, k) at the nearest tabulated wavelength.
///
/// Unknown names, and the literal name `"none"`, degrade to `n=1, k=0`.
pub fn lookup_substrate(name: &str, wavelength_nm: f64) -> OpticalRecord {
    if name.eq_ignore_ascii_case("none") {
        return OpticalRecord { n: 1.0, k: 0.0 };
    }
    let target = nearest_tabulated_wavelength(wavelength_nm);
    SUBSTRATES
        .iter()
        .find(|&&(n, w, _, _)| n.eq_ignore_ascii_case(name) && w == target)
        .map(|&(_, _, n, k)| OpticalRecord { n, k })
        .unwrap_or(OpticalRecord { n: 1.0, k: 0.0 })
}

/// Look up an ARC material's (n, k, kind) at the nearest tabulated wavelength.
///
/// Unknown names, and the literal name `"none"`, degrade to `n=1, k=0` with
/// [`ArcKind::None`] (efficiency 0).
pub fn lookup_arc(name: &str, wavelength_nm: f64) -> (OpticalRecord, ArcKind) {
    if name.eq_ignore_ascii_case("none") {
        return (OpticalRecord { n: 1.0, k: 0.0 }, ArcKind::None);
    }
    let target = nearest_tabulated_wavelength(wavelength_nm);
    ARC_MATERIALS
        .iter()
        .find(|&&(n, _, w, _, _)| n.eq_ignore_ascii_case(name) && w == target)
        .map(|&(_, kind, _, n, k)| (OpticalRecord { n, k }, kind))
        .unwrap_or((OpticalRecord { n: 1.0, k: 0.0 }, ArcKind::None))
}

/// Read-only handle onto the embedded optical database.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialDb;

impl MaterialDb {
    pub fn lookup_substrate(&self, name: &str, wavelength_nm: f64) -> OpticalRecord {
        lookup_substrate(name, wavelength_nm)
    }

    pub fn lookup_arc(&self, name: &str, wavelength_nm: f64) -> (OpticalRecord, ArcKind) {
        lookup_arc(name, wavelength_nm)
    }

    pub fn substrate_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = SUBSTRATES.iter().map(|&(n, ..)| n).collect();
        names.dedup();
        names
    }

    pub fn arc_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = ARC_MATERIALS.iter().map(|&(n, ..)| n).collect();
        names.dedup();
        names
    }
}

/// Process-wide, read-only access to the optical table (§6).
pub fn material_db() -> MaterialDb {
    MaterialDb
}
