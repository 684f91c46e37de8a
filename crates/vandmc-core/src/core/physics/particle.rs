use crate::core::materials::constants::{AMU_TO_MEV, NEUTRON_RME, PROTON_RME, SPEED_OF_LIGHT};
use crate::core::materials::{EnergyLossProfile, Material, RangeTable, RangeTableError};
use tracing::debug;

const TABLE_ENTRIES: usize = 100;
const TABLE_MIN_ENERGY: f64 = 0.1; // MeV

/// A nuclear species with an optional range table for one absorber.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    name: String,
    z: f64,
    a: f64,
    mass: f64,
    max_energy: f64,
    table: Option<RangeTable>,
}

impl Particle {
    /// Mass from the constituent nucleons less `binding_per_nucleon` (MeV) per
    /// nucleon.
    pub fn new(name: &str, z: f64, a: f64, binding_per_nucleon: f64) -> Self {
        Self {
            name: name.to_string(),
            z,
            a,
            mass: z * PROTON_RME + (a - z) * NEUTRON_RME - binding_per_nucleon * a,
            max_energy: 0.0,
            table: None,
        }
    }

    /// Mass given in atomic mass units.
    pub fn with_mass_amu(name: &str, z: f64, a: f64, mass_amu: f64) -> Self {
        let mut particle = Self::new(name, z, a, 0.0);
        particle.set_mass_amu(mass_amu);
        particle
    }

    pub fn set_mass_mev(&mut self, mass: f64) {
        self.mass = mass;
    }

    pub fn set_mass_amu(&mut self, mass: f64) {
        self.mass = mass * AMU_TO_MEV;
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn z(&self) -> f64 {
        self.z
    }
    pub fn a(&self) -> f64 {
        self.a
    }
    pub fn n(&self) -> f64 {
        self.a - self.z
    }
    /// Rest mass (MeV/c²).
    pub fn mass(&self) -> f64 {
        self.mass
    }
    pub fn mass_amu(&self) -> f64 {
        self.mass / AMU_TO_MEV
    }
    /// Upper energy of the range table (MeV), zero without one.
    pub fn max_energy(&self) -> f64 {
        self.max_energy
    }
    pub fn is_charged(&self) -> bool {
        self.z > 0.0
    }

    /// Builds the range table in `material` covering energies up to
    /// `energy + 2·spread`.
    pub fn set_material(
        &mut self,
        material: &Material,
        energy: f64,
        spread: f64,
    ) -> Result<(), RangeTableError> {
        let max_energy = energy + 2.0 * spread;
        let table = RangeTable::build(
            TABLE_ENTRIES,
            TABLE_MIN_ENERGY,
            max_energy,
            self.z,
            self.mass,
            material,
        )?;
        debug!(
            particle = %self.name,
            material = material.name(),
            max_energy,
            max_range = table.max_range(),
            "Built range table"
        );
        self.max_energy = max_energy;
        self.table = Some(table);
        Ok(())
    }

    pub fn set_table(&mut self, table: RangeTable) {
        self.max_energy = table.max_energy();
        self.table = Some(table);
    }

    pub fn gamma_from_velocity(&self, velocity: f64) -> f64 {
        let beta = velocity / SPEED_OF_LIGHT;
        1.0 / (1.0 - beta * beta).sqrt()
    }

    pub fn gamma_from_ke(&self, energy: f64) -> f64 {
        1.0 + energy / self.mass
    }

    pub fn ke_from_te(&self, energy: f64) -> f64 {
        energy - self.mass
    }

    pub fn te_from_ke(&self, energy: f64) -> f64 {
        energy + self.mass
    }

    pub fn ke_from_velocity(&self, velocity: f64) -> f64 {
        self.mass * (self.gamma_from_velocity(velocity) - 1.0)
    }

    pub fn te_from_velocity(&self, velocity: f64) -> f64 {
        self.mass * self.gamma_from_velocity(velocity)
    }

    /// Momentum (MeV/c) from total energy.
    pub fn momentum_from_te(&self, energy: f64) -> f64 {
        (energy * energy - self.mass * self.mass).max(0.0).sqrt()
    }

    pub fn momentum_from_ke(&self, energy: f64) -> f64 {
        self.momentum_from_te(energy + self.mass)
    }

    pub fn momentum_from_velocity(&self, velocity: f64) -> f64 {
        self.gamma_from_velocity(velocity) * self.mass * velocity / SPEED_OF_LIGHT
    }

    /// Velocity (m/s) from kinetic energy.
    pub fn velocity_from_ke(&self, energy: f64) -> f64 {
        let inverse_gamma = 1.0 / (1.0 + energy / self.mass);
        SPEED_OF_LIGHT * (1.0 - inverse_gamma * inverse_gamma).sqrt()
    }

    pub fn velocity_from_te(&self, energy: f64) -> f64 {
        self.velocity_from_ke(energy - self.mass)
    }
}

impl EnergyLossProfile for Particle {
    fn range_table(&self) -> Option<&RangeTable> {
        self.table.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::materials::Element;

    fn proton() -> Particle {
        Particle::new("p", 1.0, 1.0, 0.0)
    }

    #[test]
    fn mass_is_built_from_nucleons_and_binding() {
        let alpha = Particle::new("4He", 2.0, 4.0, 7.073915);
        let expected = 2.0 * PROTON_RME + 2.0 * NEUTRON_RME - 4.0 * 7.073915;
        assert!((alpha.mass() - expected).abs() < 1e-9);
        assert_eq!(alpha.n(), 2.0);
    }

    #[test]
    fn mass_in_amu_converts_to_mev() {
        let carbon = Particle::with_mass_amu("12C", 6.0, 12.0, 12.0);
        assert!((carbon.mass() - 12.0 * AMU_TO_MEV).abs() < 1e-9);
        assert!((carbon.mass_amu() - 12.0).abs() < 1e-12);
    }

    #[test]
    fn kinematic_conversions_are_consistent() {
        let p = proton();
        let ke = 50.0;
        let v = p.velocity_from_ke(ke);
        assert!(v < SPEED_OF_LIGHT);
        assert!((p.ke_from_velocity(v) - ke).abs() < 1e-6);
        assert!((p.te_from_velocity(v) - p.te_from_ke(ke)).abs() < 1e-6);
        assert!((p.momentum_from_velocity(v) - p.momentum_from_ke(ke)).abs() < 1e-6);
        assert!((p.velocity_from_te(p.te_from_ke(ke)) - v).abs() < 1e-3);
        assert!((p.ke_from_te(p.te_from_ke(ke)) - ke).abs() < 1e-9);
        assert!((p.gamma_from_ke(ke) - p.gamma_from_velocity(v)).abs() < 1e-12);
    }

    #[test]
    fn particle_without_table_has_no_profile() {
        let p = proton();
        assert!(p.range_table().is_none());
        assert!(p.table_range(1.0).is_none());
    }

    #[test]
    fn set_material_builds_table_up_to_twice_the_spread() {
        let silicon =
            Material::with_elements("Si", 2.329, &[Element::new(14.0, 28.085, 1)]).unwrap();
        let mut p = proton();
        p.set_material(&silicon, 10.0, 0.5).unwrap();
        assert_eq!(p.max_energy(), 11.0);
        let table = p.range_table().unwrap();
        assert_eq!(table.len(), 100);
        assert!((table.max_energy() - 11.0).abs() < 1e-12);
        assert!(p.table_range(5.0).unwrap() > 0.0);
    }
}
