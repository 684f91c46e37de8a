use super::particle::Particle;
use super::straggling::{straggle_direction, straggle_sigma};
use crate::core::detectors::{GeometryError, Primitive};
use crate::core::materials::constants::AVOGADRO;
use crate::core::materials::{EnergyLossProfile, Material, RangeTable, RangeTableError};
use nalgebra::Vector3;
use rand::Rng;
use thiserror::Error;
use tracing::debug;

/// Transverse extent (m) of the target foil.
const FOIL_SIZE: f64 = 0.1;

#[derive(Debug, Error)]
pub enum TargetError {
    #[error("Target thickness must be positive, got {0} mg/cm2")]
    InvalidThickness(f64),
    #[error("Target material '{0}' has not been calculated")]
    MaterialNotCalculated(String),
    #[error("Radiation length must be positive, got {0} mg/cm2")]
    InvalidRadiationLength(f64),
    #[error("Target geometry error: {0}")]
    Geometry(#[from] GeometryError),
}

/// Where a beam ray enters the foil and where it reacts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionPoint {
    /// Entry point on the upstream surface.
    pub surface: Vector3<f64>,
    pub interaction: Vector3<f64>,
    /// Distance (m) traveled inside the foil before the reaction.
    pub depth: f64,
}

/// A tilted foil of one material. The target nucleus carries the beam's range
/// table in that material.
#[derive(Debug, Clone)]
pub struct Target {
    nucleus: Particle,
    material: Material,
    thickness: f64,
    angle: f64,
    radiation_length: Option<f64>,
    primitive: Primitive,
}

impl Target {
    /// `thickness` in mg/cm², `angle` the tilt (rad) about the y axis.
    pub fn new(
        nucleus: Particle,
        material: Material,
        thickness: f64,
        angle: f64,
    ) -> Result<Self, TargetError> {
        if !material.is_calculated() {
            return Err(TargetError::MaterialNotCalculated(material.name().to_string()));
        }
        if !(thickness > 0.0) {
            return Err(TargetError::InvalidThickness(thickness));
        }
        let real = thickness / (material.density() * 1e5);
        let mut primitive = Primitive::new(FOIL_SIZE, FOIL_SIZE, real)?;
        primitive.set_rotation(angle, 0.0, 0.0);
        Ok(Self {
            nucleus,
            material,
            thickness,
            angle,
            radiation_length: None,
            primitive,
        })
    }

    pub fn nucleus(&self) -> &Particle {
        &self.nucleus
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn primitive(&self) -> &Primitive {
        &self.primitive
    }

    /// Areal thickness (mg/cm²).
    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn density(&self) -> f64 {
        self.material.density()
    }

    /// Areal thickness seen along the beam axis (mg/cm²).
    pub fn z_thickness(&self) -> f64 {
        self.thickness / self.angle.cos().abs()
    }

    /// Physical thickness (m).
    pub fn real_thickness(&self) -> f64 {
        self.thickness / (self.material.density() * 1e5)
    }

    /// Physical thickness along the beam axis (m).
    pub fn real_z_thickness(&self) -> f64 {
        self.real_thickness() / self.angle.cos().abs()
    }

    /// Radiation length (mg/cm²), the material's unless overridden.
    pub fn radiation_length(&self) -> f64 {
        self.radiation_length
            .unwrap_or_else(|| self.material.radiation_length())
    }

    pub fn set_radiation_length(&mut self, radiation_length: f64) -> Result<(), TargetError> {
        if !(radiation_length > 0.0) {
            return Err(TargetError::InvalidRadiationLength(radiation_length));
        }
        self.radiation_length = Some(radiation_length);
        Ok(())
    }

    pub fn set_thickness(&mut self, thickness: f64) -> Result<(), TargetError> {
        if !(thickness > 0.0) {
            return Err(TargetError::InvalidThickness(thickness));
        }
        let real = thickness / (self.material.density() * 1e5);
        self.primitive.set_size(FOIL_SIZE, FOIL_SIZE, real)?;
        self.thickness = thickness;
        Ok(())
    }

    pub fn set_angle(&mut self, angle: f64) {
        self.angle = angle;
        self.primitive.set_rotation(angle, 0.0, 0.0);
    }

    /// Target atoms per cm².
    pub fn areal_number_density(&self) -> f64 {
        let molar_mass = self.material.molar_mass();
        if !(molar_mass > 0.0) {
            return 0.0;
        }
        self.thickness * 1e-3 / molar_mass
            * AVOGADRO
            * f64::from(self.material.total_elements())
    }

    /// Tabulates the range of `beam` in the target material up to
    /// `energy + 2·spread` and stores it on the target nucleus.
    pub fn set_beam_table(
        &mut self,
        beam: &Particle,
        energy: f64,
        spread: f64,
    ) -> Result<(), RangeTableError> {
        let table = RangeTable::build(
            100,
            0.1,
            energy + 2.0 * spread,
            beam.z(),
            beam.mass(),
            &self.material,
        )?;
        debug!(
            beam = beam.name(),
            target = self.material.name(),
            max_range = table.max_range(),
            "Built beam range table for target"
        );
        self.nucleus.set_table(table);
        Ok(())
    }

    /// Samples the reaction point uniformly along the chord the beam ray cuts
    /// through the foil. `None` when the ray misses the foil or only grazes it.
    pub fn interaction_depth(
        &self,
        origin: &Vector3<f64>,
        direction: &Vector3<f64>,
        rng: &mut impl Rng,
    ) -> Option<InteractionPoint> {
        let hit = self.primitive.intersect(origin, direction)?;
        let exit = hit.exit?;
        let surface = hit.entry.point;
        let chord = exit.point - surface;
        let fraction = rng.r#gen::<f64>();
        Some(InteractionPoint {
            surface,
            interaction: surface + chord * fraction,
            depth: chord.norm() * fraction,
        })
    }

    /// Multiple-scattering deflection after `depth` (m) of target material.
    pub fn straggle(
        &self,
        direction: &Vector3<f64>,
        energy: f64,
        z: f64,
        depth: f64,
        rng: &mut impl Rng,
    ) -> Vector3<f64> {
        let areal = depth * self.material.density() * 1e5;
        let sigma = straggle_sigma(energy, z, areal, self.radiation_length());
        straggle_direction(direction, sigma, rng)
    }
}

impl EnergyLossProfile for Target {
    fn range_table(&self) -> Option<&RangeTable> {
        self.nucleus.range_table()
    }
}
