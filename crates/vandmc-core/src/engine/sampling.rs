use nalgebra::Vector3;
use rand::{distributions::WeightedIndex, prelude::*};
use rand_distr::Normal;
use std::f64::consts::TAU;
use thiserror::Error;
use tracing::instrument;

/// Ratio of a Gaussian's FWHM to its standard deviation, `2√(2 ln 2)`.
pub const FWHM_TO_SIGMA: f64 = 2.354_820_045_030_949;

#[derive(Debug, Error)]
pub enum SamplingError {
    #[error("No channels to select from")]
    EmptyWeights,
    #[error("Failed to create weighted distribution: {source}")]
    DistributionError {
        #[from]
        source: rand::distributions::WeightedError,
    },
}

/// Isotropic unit vector.
pub fn unit_sphere(rng: &mut impl Rng) -> Vector3<f64> {
    let u = 2.0 * rng.r#gen::<f64>() - 1.0;
    let azimuth = TAU * rng.r#gen::<f64>();
    let s = (1.0 - u * u).sqrt();
    Vector3::new(s * azimuth.cos(), s * azimuth.sin(), u)
}

/// Isotropic `(theta, phi)` pair.
pub fn unit_sphere_angles(rng: &mut impl Rng) -> (f64, f64) {
    let phi = TAU * rng.r#gen::<f64>();
    let theta = (2.0 * rng.r#gen::<f64>() - 1.0).acos();
    (theta, phi)
}

/// Uniform point on a disk of `radius`, as `(x, y)`.
pub fn circle_spot(radius: f64, rng: &mut impl Rng) -> (f64, f64) {
    let r = rng.r#gen::<f64>().sqrt() * radius;
    let angle = TAU * rng.r#gen::<f64>();
    (r * angle.cos(), r * angle.sin())
}

/// Uniform point on the perimeter of a circle of `radius`.
pub fn halo(radius: f64, rng: &mut impl Rng) -> (f64, f64) {
    let angle = TAU * rng.r#gen::<f64>();
    (radius * angle.cos(), radius * angle.sin())
}

/// Zero-centered Gaussian deviate of full width at half maximum `fwhm`. Zero
/// for a non-positive width.
pub fn gaussian_fwhm(fwhm: f64, rng: &mut impl Rng) -> f64 {
    match Normal::new(0.0, fwhm / FWHM_TO_SIGMA) {
        Ok(normal) if fwhm > 0.0 => normal.sample(rng),
        _ => 0.0,
    }
}

/// Picks an index with probability proportional to its weight.
#[instrument(level = "trace", skip_all, fields(channels = weights.len()))]
pub fn select_channel(weights: &[f64], rng: &mut impl Rng) -> Result<usize, SamplingError> {
    match weights.len() {
        0 => Err(SamplingError::EmptyWeights),
        1 => Ok(0),
        _ => {
            let dist = WeightedIndex::new(weights)?;
            Ok(dist.sample(rng))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;

    #[test]
    fn unit_sphere_is_normalized_and_centered() {
        let mut rng = StdRng::seed_from_u64(1);
        let n = 20_000;
        let mut sum = Vector3::zeros();
        for _ in 0..n {
            let v = unit_sphere(&mut rng);
            assert!((v.norm() - 1.0).abs() < 1e-12);
            sum += v;
        }
        assert!((sum / n as f64).norm() < 0.03);
    }

    #[test]
    fn unit_sphere_angles_have_uniform_cosine() {
        let mut rng = StdRng::seed_from_u64(2);
        let n = 20_000;
        let forward = (0..n)
            .map(|_| unit_sphere_angles(&mut rng))
            .inspect(|(theta, phi)| {
                assert!((0.0..=std::f64::consts::PI).contains(theta));
                assert!((0.0..TAU).contains(phi));
            })
            .filter(|(theta, _)| theta.cos() > 0.5)
            .count();
        let fraction = forward as f64 / n as f64;
        assert!((fraction - 0.25).abs() < 0.015, "fraction {fraction}");
    }

    #[test]
    fn circle_spot_fills_the_disk_uniformly() {
        let mut rng = StdRng::seed_from_u64(3);
        let n = 20_000;
        let inner = (0..n)
            .map(|_| circle_spot(2.0, &mut rng))
            .inspect(|(x, y)| assert!(x.hypot(*y) <= 2.0 + 1e-12))
            .filter(|(x, y)| x.hypot(*y) < 1.0)
            .count();
        let fraction = inner as f64 / n as f64;
        assert!((fraction - 0.25).abs() < 0.015, "fraction {fraction}");
    }

    #[test]
    fn halo_points_lie_on_the_circle() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..100 {
            let (x, y) = halo(0.5, &mut rng);
            assert!((x.hypot(y) - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn gaussian_fwhm_has_expected_width() {
        let mut rng = StdRng::seed_from_u64(5);
        let n = 50_000;
        let samples: Vec<f64> = (0..n).map(|_| gaussian_fwhm(2.0, &mut rng)).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.02);
        assert!((var.sqrt() - 2.0 / FWHM_TO_SIGMA).abs() < 0.02);
        assert_eq!(gaussian_fwhm(0.0, &mut rng), 0.0);
        assert_eq!(gaussian_fwhm(-1.0, &mut rng), 0.0);
    }

    #[test]
    fn select_channel_follows_weights() {
        let mut rng = StdRng::seed_from_u64(6);
        let weights = [1.0, 0.0, 3.0];
        let mut counts = [0usize; 3];
        for _ in 0..20_000 {
            counts[select_channel(&weights, &mut rng).unwrap()] += 1;
        }
        assert_eq!(counts[1], 0);
        let ratio = counts[2] as f64 / counts[0] as f64;
        assert!((ratio - 3.0).abs() < 0.2, "ratio {ratio}");
    }

    #[test]
    fn select_channel_rejects_empty_or_zero_weights() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(matches!(
            select_channel(&[], &mut rng),
            Err(SamplingError::EmptyWeights)
        ));
        assert!(matches!(
            select_channel(&[0.0, 0.0], &mut rng),
            Err(SamplingError::DistributionError { .. })
        ));
        assert_eq!(select_channel(&[5.0], &mut rng).unwrap(), 0);
    }
}
