use super::config::SimulationConfig;
use super::error::EngineError;
use super::progress::ProgressReporter;
use crate::core::physics::{Particle, Target};
use nalgebra::Vector3;
use tracing::{debug, info, instrument};

/// Distance (m) upstream of the target at which parallel beam rays start.
pub const BEAM_START_DISTANCE: f64 = 1.0;

/// Per-run state derived once from a [`SimulationConfig`] and shared read-only
/// by every event.
pub struct SimulationContext<'a> {
    pub config: &'a SimulationConfig,
    pub reporter: &'a ProgressReporter<'a>,
    /// The configured target, carrying the beam's range table when energy loss
    /// is enabled.
    pub target: Target,
    /// Ejectile species with its range table in the target material.
    pub ejectile: Particle,
    /// Recoil species at its ground-state mass, with its range table.
    pub recoil: Particle,
    /// Origin of all beam rays for a convergent beam.
    pub focus: Option<Vector3<f64>>,
    /// Total cross-section of each recoil state.
    pub weights: Vec<f64>,
}

impl<'a> SimulationContext<'a> {
    #[instrument(level = "debug", skip_all)]
    pub fn new(
        config: &'a SimulationConfig,
        reporter: &'a ProgressReporter<'a>,
    ) -> Result<Self, EngineError> {
        let kinematics = &config.kinematics;
        let mut target = config.target.clone();
        let mut ejectile = kinematics.ejectile().clone();
        let mut recoil = kinematics.recoil().clone();
        recoil.set_mass_mev(kinematics.recoil_mass(0));

        let energy = config.beam.energy;
        let spread = config.beam.energy_spread;
        if config.transport.energy_loss && target.material().use_eloss() {
            let beam = kinematics.beam();
            if beam.is_charged() {
                target
                    .set_beam_table(beam, energy, spread)
                    .map_err(|source| EngineError::RangeTable {
                        particle: beam.name().to_string(),
                        source,
                    })?;
            }
            let product_energy = energy + kinematics.q_value().max(0.0);
            for particle in [&mut ejectile, &mut recoil] {
                if particle.is_charged() {
                    particle
                        .set_material(target.material(), product_energy, spread)
                        .map_err(|source| EngineError::RangeTable {
                            particle: particle.name().to_string(),
                            source,
                        })?;
                }
            }
            debug!("Range tables built for beam and reaction products");
        }

        let radius = config.beam.spot.radius();
        let divergence = config.beam.divergence;
        let focus = (divergence > 0.0 && radius > 0.0).then(|| {
            let distance = radius / divergence.tan() + target.real_z_thickness() / 2.0;
            Vector3::new(0.0, 0.0, -distance)
        });
        if let Some(focus) = focus {
            info!(focus_z = focus.z, "Beam converges from a focal point");
        }

        Ok(Self {
            config,
            reporter,
            target,
            ejectile,
            recoil,
            focus,
            weights: kinematics.state_weights(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::materials::EnergyLossProfile;
    use crate::engine::config::BeamSpot;
    use crate::engine::config::tests::builder;

    #[test]
    fn context_builds_tables_for_charged_particles_only() {
        let config = builder().build().unwrap();
        let reporter = ProgressReporter::new();
        let context = SimulationContext::new(&config, &reporter).unwrap();
        assert!(context.target.range_table().is_some());
        assert!(context.ejectile.range_table().is_none());
        assert!(context.recoil.range_table().is_some());
        assert_eq!(context.weights, vec![10.0]);
        assert!(context.focus.is_none());
    }

    #[test]
    fn context_skips_tables_without_energy_loss() {
        let config = builder().energy_loss(false).build().unwrap();
        let reporter = ProgressReporter::new();
        let context = SimulationContext::new(&config, &reporter).unwrap();
        assert!(context.target.range_table().is_none());
        assert!(context.recoil.range_table().is_none());
    }

    #[test]
    fn recoil_mass_comes_from_the_q_value() {
        let config = builder().build().unwrap();
        let reporter = ProgressReporter::new();
        let context = SimulationContext::new(&config, &reporter).unwrap();
        assert_eq!(context.recoil.mass(), config.kinematics.recoil_mass(0));
    }

    #[test]
    fn divergent_beam_has_an_upstream_focus() {
        let config = builder()
            .beam_spot(BeamSpot::Circle { diameter: 0.002 })
            .divergence(0.01)
            .build()
            .unwrap();
        let reporter = ProgressReporter::new();
        let context = SimulationContext::new(&config, &reporter).unwrap();
        let focus = context.focus.unwrap();
        assert!(focus.z < -0.09 && focus.z > -0.11, "focus {focus}");
    }
}
