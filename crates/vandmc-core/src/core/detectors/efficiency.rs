use super::primitive::SizeClass;
use crate::core::math::interpolate_table;
use itertools::Itertools;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum EfficiencyError {
    #[error("An efficiency curve needs at least 2 points, got {0}")]
    TooFewPoints(usize),
    #[error("Energy and efficiency columns differ in length ({energies} vs {values})")]
    LengthMismatch { energies: usize, values: usize },
    #[error("Energy at point {index} does not increase strictly")]
    NotIncreasing { index: usize },
    #[error("Efficiency {value} at point {index} is outside [0, 1]")]
    OutOfRange { index: usize, value: f64 },
}

/// Intrinsic efficiency versus energy. The first and last points double as the
/// underflow and overflow values.
#[derive(Debug, Clone, PartialEq)]
pub struct EfficiencyCurve {
    energies: Vec<f64>,
    values: Vec<f64>,
}

impl EfficiencyCurve {
    pub fn new(energies: Vec<f64>, values: Vec<f64>) -> Result<Self, EfficiencyError> {
        if energies.len() != values.len() {
            return Err(EfficiencyError::LengthMismatch {
                energies: energies.len(),
                values: values.len(),
            });
        }
        if energies.len() < 2 {
            return Err(EfficiencyError::TooFewPoints(energies.len()));
        }
        if let Some((index, _)) = energies
            .iter()
            .tuple_windows()
            .find_position(|(a, b)| !(b > a))
        {
            return Err(EfficiencyError::NotIncreasing { index: index + 1 });
        }
        if let Some(index) = values.iter().position(|v| !(0.0..=1.0).contains(v)) {
            return Err(EfficiencyError::OutOfRange {
                index,
                value: values[index],
            });
        }
        Ok(Self { energies, values })
    }

    pub fn len(&self) -> usize {
        self.energies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energies.is_empty()
    }

    pub fn underflow(&self) -> f64 {
        self.values.first().copied().unwrap_or(1.0)
    }

    pub fn overflow(&self) -> f64 {
        self.values.last().copied().unwrap_or(1.0)
    }

    pub fn efficiency(&self, energy: f64) -> f64 {
        match (self.energies.first(), self.energies.last()) {
            (Some(&first), _) if energy < first => self.underflow(),
            (_, Some(&last)) if energy >= last => self.overflow(),
            _ => interpolate_table(energy, &self.energies, &self.values).unwrap_or(0.0),
        }
    }
}

/// Efficiency curves per standard bar size. Sizes without a curve, and
/// detectors of non-standard size, are treated as perfect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Efficiency {
    small: Option<EfficiencyCurve>,
    medium: Option<EfficiencyCurve>,
    large: Option<EfficiencyCurve>,
}

impl Efficiency {
    pub fn perfect() -> Self {
        Self::default()
    }

    pub fn is_perfect(&self) -> bool {
        self.small.is_none() && self.medium.is_none() && self.large.is_none()
    }

    pub fn set_curve(&mut self, class: SizeClass, curve: EfficiencyCurve) {
        *self.slot_mut(class) = Some(curve);
    }

    pub fn curve(&self, class: SizeClass) -> Option<&EfficiencyCurve> {
        match class {
            SizeClass::Small => self.small.as_ref(),
            SizeClass::Medium => self.medium.as_ref(),
            SizeClass::Large => self.large.as_ref(),
        }
    }

    fn slot_mut(&mut self, class: SizeClass) -> &mut Option<EfficiencyCurve> {
        match class {
            SizeClass::Small => &mut self.small,
            SizeClass::Medium => &mut self.medium,
            SizeClass::Large => &mut self.large,
        }
    }

    pub fn efficiency(&self, class: Option<SizeClass>, energy: f64) -> f64 {
        class
            .and_then(|class| self.curve(class))
            .map_or(1.0, |curve| curve.efficiency(energy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve() -> EfficiencyCurve {
        EfficiencyCurve::new(vec![1.0, 2.0, 4.0], vec![0.2, 0.6, 0.4]).unwrap()
    }

    #[test]
    fn new_validates_points() {
        assert_eq!(
            EfficiencyCurve::new(vec![1.0], vec![0.5]),
            Err(EfficiencyError::TooFewPoints(1))
        );
        assert_eq!(
            EfficiencyCurve::new(vec![1.0, 1.0], vec![0.5, 0.5]),
            Err(EfficiencyError::NotIncreasing { index: 1 })
        );
        assert_eq!(
            EfficiencyCurve::new(vec![1.0, 2.0], vec![0.5, 1.5]),
            Err(EfficiencyError::OutOfRange {
                index: 1,
                value: 1.5
            })
        );
    }

    #[test]
    fn curve_interpolates_inside_and_clamps_outside() {
        let curve = curve();
        assert!((curve.efficiency(1.5) - 0.4).abs() < 1e-12);
        assert!((curve.efficiency(3.0) - 0.5).abs() < 1e-12);
        assert_eq!(curve.efficiency(0.5), 0.2);
        assert_eq!(curve.efficiency(4.0), 0.4);
        assert_eq!(curve.efficiency(10.0), 0.4);
    }

    #[test]
    fn missing_curves_and_custom_sizes_are_perfect() {
        let mut efficiency = Efficiency::perfect();
        assert!(efficiency.is_perfect());
        efficiency.set_curve(SizeClass::Medium, curve());
        assert!(!efficiency.is_perfect());
        assert_eq!(efficiency.efficiency(Some(SizeClass::Small), 3.0), 1.0);
        assert_eq!(efficiency.efficiency(None, 3.0), 1.0);
        assert!((efficiency.efficiency(Some(SizeClass::Medium), 3.0) - 0.5).abs() < 1e-12);
    }
}
