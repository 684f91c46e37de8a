use crate::core::math::{basis_from_direction, spherical_to_cartesian};
use nalgebra::Vector3;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::{SQRT_2, TAU};

/// Width (rad) of the multiple-scattering angle distribution of an ion with
/// kinetic `energy` (MeV) and charge `z` after `thickness` (mg/cm²) of an
/// absorber with radiation length `radiation_length` (mg/cm²), from the
/// Highland formula. Zero whenever an input is non-positive.
pub fn straggle_sigma(energy: f64, z: f64, thickness: f64, radiation_length: f64) -> f64 {
    if !(energy > 0.0 && z > 0.0 && thickness > 0.0 && radiation_length > 0.0) {
        return 0.0;
    }
    let ratio = thickness / radiation_length;
    let theta = 13.6 / (2.0 * energy) * z * ratio.sqrt() * (1.0 + 0.038 * ratio.ln());
    (theta * SQRT_2).max(0.0)
}

/// Deflects `direction` by a Gaussian polar angle of width `sigma` and a
/// uniform azimuth. Returns a unit vector.
pub fn straggle_direction(direction: &Vector3<f64>, sigma: f64, rng: &mut impl Rng) -> Vector3<f64> {
    let unit = direction.try_normalize(0.0).unwrap_or_else(Vector3::z);
    let polar = match Normal::new(0.0, sigma) {
        Ok(normal) if sigma > 0.0 => normal.sample(rng),
        _ => return unit,
    };
    let azimuth = rng.gen_range(0.0..TAU);
    let local = spherical_to_cartesian(1.0, polar, azimuth);
    (basis_from_direction(&unit) * local).normalize()
}
