use super::material::Material;
use itertools::Itertools;
use thiserror::Error;
use tracing::{instrument, trace};

#[derive(Debug, Error, PartialEq)]
pub enum RangeTableError {
    #[error("A range table needs at least 2 entries, got {0}")]
    TooFewEntries(usize),
    #[error("Invalid energy bounds: min {min} MeV, max {max} MeV")]
    InvalidEnergyBounds { min: f64, max: f64 },
    #[error("Energy loss is disabled for material '{0}'")]
    EnergyLossDisabled(String),
    #[error("Material '{0}' has not been calculated")]
    MaterialNotCalculated(String),
    #[error("Energy and range columns differ in length ({energies} vs {ranges})")]
    LengthMismatch { energies: usize, ranges: usize },
    #[error("Entry {index} is not positive")]
    NonPositive { index: usize },
    #[error("Entry {index} does not increase strictly")]
    NotIncreasing { index: usize },
}

/// Outcome of moving a particle through a slab.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Traversal {
    /// Remaining kinetic energy (MeV), zero if the particle stopped.
    pub energy: f64,
    /// Distance actually traveled (m).
    pub distance: f64,
}

impl Traversal {
    pub fn is_stopped(&self) -> bool {
        self.energy <= 0.0
    }
}

/// Tabulated range-energy relation for one particle species in one material.
///
/// Both columns increase strictly. Lookups interpolate linearly, treat the
/// origin `(0, 0)` as an implicit first point and return `None` above the last
/// entry.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeTable {
    energies: Vec<f64>,
    ranges: Vec<f64>,
}

impl RangeTable {
    /// Evaluates `material.range` at `entries` linearly spaced energies.
    #[instrument(level = "debug", skip(material), fields(material = material.name()))]
    pub fn build(
        entries: usize,
        e_min: f64,
        e_max: f64,
        z: f64,
        mass: f64,
        material: &Material,
    ) -> Result<Self, RangeTableError> {
        if entries < 2 {
            return Err(RangeTableError::TooFewEntries(entries));
        }
        if !(e_min > 0.0) || !(e_max > e_min) {
            return Err(RangeTableError::InvalidEnergyBounds {
                min: e_min,
                max: e_max,
            });
        }
        if !material.use_eloss() {
            return Err(RangeTableError::EnergyLossDisabled(material.name().to_string()));
        }
        if !material.is_calculated() {
            return Err(RangeTableError::MaterialNotCalculated(
                material.name().to_string(),
            ));
        }

        let step = (e_max - e_min) / (entries - 1) as f64;
        let energies: Vec<f64> = (0..entries).map(|i| e_min + i as f64 * step).collect();
        let ranges: Vec<f64> = energies
            .iter()
            .map(|&e| material.range(e, z, mass))
            .collect();
        trace!(max_range = ranges.last().copied(), "Range table evaluated");
        Self::from_points(energies, ranges)
    }

    /// Table from explicit points, such as an SRIM export.
    pub fn from_points(energies: Vec<f64>, ranges: Vec<f64>) -> Result<Self, RangeTableError> {
        if energies.len() != ranges.len() {
            return Err(RangeTableError::LengthMismatch {
                energies: energies.len(),
                ranges: ranges.len(),
            });
        }
        if energies.len() < 2 {
            return Err(RangeTableError::TooFewEntries(energies.len()));
        }
        for column in [&energies, &ranges] {
            if let Some(index) = column.iter().position(|&v| !(v > 0.0)) {
                return Err(RangeTableError::NonPositive { index });
            }
            if let Some((index, _)) = column
                .iter()
                .tuple_windows()
                .find_position(|(a, b)| !(b > a))
            {
                return Err(RangeTableError::NotIncreasing { index: index + 1 });
            }
        }
        Ok(Self { energies, ranges })
    }

    pub fn len(&self) -> usize {
        self.energies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energies.is_empty()
    }

    /// `(energy, range)` of entry `index`.
    pub fn entry(&self, index: usize) -> Option<(f64, f64)> {
        Some((*self.energies.get(index)?, *self.ranges.get(index)?))
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.energies.iter().copied().zip(self.ranges.iter().copied())
    }

    pub fn energies(&self) -> &[f64] {
        &self.energies
    }

    pub fn ranges(&self) -> &[f64] {
        &self.ranges
    }

    pub fn max_energy(&self) -> f64 {
        self.energies.last().copied().unwrap_or(0.0)
    }

    pub fn max_range(&self) -> f64 {
        self.ranges.last().copied().unwrap_or(0.0)
    }

    /// Range (m) of a particle with kinetic `energy` (MeV).
    pub fn range(&self, energy: f64) -> Option<f64> {
        lookup(energy, &self.energies, &self.ranges)
    }

    /// Kinetic energy (MeV) of a particle whose residual range is `range` (m).
    pub fn energy(&self, range: f64) -> Option<f64> {
        lookup(range, &self.ranges, &self.energies)
    }

    /// Energy after traveling `distance` (m). A particle whose range does not
    /// exceed the distance stops after traveling its full range.
    pub fn new_energy(&self, energy: f64, distance: f64) -> Option<Traversal> {
        let range = self.range(energy)?;
        let distance = distance.max(0.0);
        if distance >= range {
            return Some(Traversal {
                energy: 0.0,
                distance: range,
            });
        }
        Some(Traversal {
            energy: self.energy(range - distance)?,
            distance,
        })
    }
}

fn lookup(x: f64, xs: &[f64], ys: &[f64]) -> Option<f64> {
    let (&x_first, &x_last) = (xs.first()?, xs.last()?);
    if !(x >= 0.0) || x > x_last {
        return None;
    }
    if x < x_first {
        return Some(ys[0] * x / x_first);
    }
    let upper = xs.partition_point(|&v| v < x);
    if upper == 0 {
        return Some(ys[0]);
    }
    let lower = upper - 1;
    let fraction = (x - xs[lower]) / (xs[upper] - xs[lower]);
    Some(ys[lower] + fraction * (ys[upper] - ys[lower]))
}

/// Anything that carries a range table for energy-loss lookups.
pub trait EnergyLossProfile {
    fn range_table(&self) -> Option<&RangeTable>;

    fn table_range(&self, energy: f64) -> Option<f64> {
        self.range_table()?.range(energy)
    }

    fn table_energy(&self, range: f64) -> Option<f64> {
        self.range_table()?.energy(range)
    }

    fn table_new_energy(&self, energy: f64, distance: f64) -> Option<Traversal> {
        self.range_table()?.new_energy(energy, distance)
    }
}

impl EnergyLossProfile for RangeTable {
    fn range_table(&self) -> Option<&RangeTable> {
        Some(self)
    }
}
