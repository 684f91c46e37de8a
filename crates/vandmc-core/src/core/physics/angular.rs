use super::target::Target;
use crate::core::io::{Columns, LoadError, ParseError, TextFormat};
use crate::core::materials::constants::MILLIBARN_TO_CM2;
use rand::Rng;
use std::f64::consts::{PI, TAU};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AngularDistError {
    #[error("Angular distribution has already been initialized")]
    AlreadyInitialized,
    #[error("An angular distribution needs at least 2 points, got {0}")]
    TooFewPoints(usize),
    #[error("Angle and cross-section columns differ in length ({angles} vs {values})")]
    LengthMismatch { angles: usize, values: usize },
    #[error("Angle at point {index} does not increase strictly")]
    NotIncreasing { index: usize },
    #[error("Angle at point {index} lies outside 0-180 degrees")]
    AngleOutOfRange { index: usize },
    #[error("Differential cross-section at point {index} is negative")]
    NegativeCrossSection { index: usize },
    #[error("Total cross-section must be positive, got {0} mb")]
    InvalidTotal(f64),
}

/// Beam and target parameters that turn a cross-section into a reaction rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateParams {
    /// Beam particles per second.
    pub beam_intensity: f64,
    /// Target nuclei per cm².
    pub areal_density: f64,
}

impl RateParams {
    pub fn new(beam_intensity: f64, target: &Target) -> Self {
        Self {
            beam_intensity,
            areal_density: target.areal_number_density(),
        }
    }

    /// Reactions per second for a cross-section in mb.
    pub fn rate(&self, cross_section_mb: f64) -> f64 {
        cross_section_mb * MILLIBARN_TO_CM2 * self.beam_intensity * self.areal_density
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Mode {
    #[default]
    Uninitialized,
    Tabulated,
    Isotropic,
}

/// Center-of-mass angular distribution sampled by inverse transform of the
/// cumulative `2π ∫ dσ/dΩ sinθ dθ`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AngularDist {
    mode: Mode,
    angles: Vec<f64>,
    dsigma_domega: Vec<f64>,
    integral: Vec<f64>,
    total: f64,
    rate: f64,
}

impl AngularDist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tabulated distribution from CoM angles in degrees and dσ/dΩ in mb/sr.
    pub fn tabulated(
        angles_deg: &[f64],
        dsigma_domega: &[f64],
        rate: Option<RateParams>,
    ) -> Result<Self, AngularDistError> {
        let mut dist = Self::new();
        dist.initialize(angles_deg, dsigma_domega, rate)?;
        Ok(dist)
    }

    pub fn isotropic(total: f64) -> Result<Self, AngularDistError> {
        let mut dist = Self::new();
        dist.initialize_isotropic(total)?;
        Ok(dist)
    }

    /// Reads the two-column `angle(deg) dσ/dΩ(mb/sr)` format.
    pub fn from_file(path: &Path, rate: Option<RateParams>) -> Result<Self, LoadError> {
        let columns = Columns::read_from_path(path)?;
        Self::tabulated(&columns.x, &columns.y, rate).map_err(|e| LoadError::Parse {
            path: path.to_string_lossy().to_string(),
            source: ParseError::AngularDist(e),
        })
    }

    pub fn initialize(
        &mut self,
        angles_deg: &[f64],
        dsigma_domega: &[f64],
        rate: Option<RateParams>,
    ) -> Result<(), AngularDistError> {
        if self.mode != Mode::Uninitialized {
            return Err(AngularDistError::AlreadyInitialized);
        }
        if angles_deg.len() != dsigma_domega.len() {
            return Err(AngularDistError::LengthMismatch {
                angles: angles_deg.len(),
                values: dsigma_domega.len(),
            });
        }
        if angles_deg.len() < 2 {
            return Err(AngularDistError::TooFewPoints(angles_deg.len()));
        }
        if let Some(index) = angles_deg.windows(2).position(|w| !(w[1] > w[0])) {
            return Err(AngularDistError::NotIncreasing { index: index + 1 });
        }
        if let Some(index) = angles_deg
            .iter()
            .position(|a| !(0.0..=180.0).contains(a))
        {
            return Err(AngularDistError::AngleOutOfRange { index });
        }
        if let Some(index) = dsigma_domega.iter().position(|&v| !(v >= 0.0)) {
            return Err(AngularDistError::NegativeCrossSection { index });
        }

        let angles: Vec<f64> = angles_deg.iter().map(|a| a.to_radians()).collect();
        let mut integral = Vec::with_capacity(angles.len());
        integral.push(0.0);
        let mut total = 0.0;
        for i in 0..angles.len() - 1 {
            let (x1, x2) = (angles[i], angles[i + 1]);
            let y1 = dsigma_domega[i] * x1.sin();
            let y2 = dsigma_domega[i + 1] * x2.sin();
            total += 0.5 * (x2 - x1) * (y1 + y2) * TAU;
            integral.push(total);
        }
        if !(total > 0.0) {
            return Err(AngularDistError::InvalidTotal(total));
        }

        self.angles = angles;
        self.dsigma_domega = dsigma_domega.to_vec();
        self.integral = integral;
        self.total = total;
        self.rate = rate.map_or(0.0, |r| r.rate(total));
        self.mode = Mode::Tabulated;
        Ok(())
    }

    pub fn initialize_isotropic(&mut self, total: f64) -> Result<(), AngularDistError> {
        if self.mode != Mode::Uninitialized {
            return Err(AngularDistError::AlreadyInitialized);
        }
        if !(total > 0.0) {
            return Err(AngularDistError::InvalidTotal(total));
        }
        self.total = total;
        self.rate = 0.0;
        self.mode = Mode::Isotropic;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.mode != Mode::Uninitialized
    }

    pub fn is_isotropic(&self) -> bool {
        self.mode == Mode::Isotropic
    }

    /// Total reaction cross-section (mb).
    pub fn total_cross_section(&self) -> f64 {
        self.total
    }

    /// Reactions per second, zero unless rate parameters were supplied.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn len(&self) -> usize {
        self.angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    /// Tabulated angles (rad).
    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    pub fn dsigma_domega(&self) -> &[f64] {
        &self.dsigma_domega
    }

    /// Cumulative cross-section at each tabulated angle (mb).
    pub fn integral(&self) -> &[f64] {
        &self.integral
    }

    /// Draws a CoM angle (rad), or -1 if the distribution is not initialized.
    pub fn sample(&self, rng: &mut impl Rng) -> f64 {
        match self.mode {
            Mode::Uninitialized => -1.0,
            Mode::Isotropic => rng.r#gen::<f64>() * PI,
            Mode::Tabulated => {
                let target = rng.r#gen::<f64>() * self.total;
                self.integral
                    .windows(2)
                    .zip(self.angles.windows(2))
                    .find(|(cum, _)| cum[1] > cum[0] && cum[0] <= target && target <= cum[1])
                    .map_or(-1.0, |(cum, theta)| {
                        theta[0] + (target - cum[0]) * (theta[1] - theta[0]) / (cum[1] - cum[0])
                    })
            }
        }
    }
}
