use super::context::{BEAM_START_DISTANCE, SimulationContext};
use super::error::EngineError;
use super::sampling::{circle_spot, gaussian_fwhm, halo, select_channel};
use crate::core::detectors::{Detector, DetectorRole, Face, Intersection};
use crate::core::materials::constants::SPEED_OF_LIGHT;
use crate::core::materials::{EnergyLossProfile, Material};
use crate::core::math::{basis_from_direction, cartesian_to_spherical};
use crate::engine::config::BeamSpot;
use nalgebra::Vector3;
use rand::Rng;
use std::f64::consts::TAU;
use tracing::instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Product {
    Ejectile,
    Recoil,
}

impl Product {
    pub fn name(self) -> &'static str {
        match self {
            Product::Ejectile => "ejectile",
            Product::Recoil => "recoil",
        }
    }

    fn seen_by(self, role: DetectorRole) -> bool {
        match self {
            Product::Ejectile => role.detects_ejectiles(),
            Product::Recoil => role.detects_recoils(),
        }
    }
}

/// A reaction product registered by a detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub product: Product,
    /// Detector index in array order.
    pub detector: usize,
    /// Face through which the product entered.
    pub face: Face,
    /// Interaction point inside the detector (m).
    pub position: Vector3<f64>,
    /// Entry point in detector-local coordinates (m).
    pub local: Vector3<f64>,
    /// Polar angle (rad) of the interaction point.
    pub theta: f64,
    /// Azimuth (rad) of the interaction point.
    pub phi: f64,
    /// Kinetic energy (MeV) on leaving the target.
    pub energy: f64,
    /// Energy deposited (MeV).
    pub qdc: f64,
    /// Time of flight (ns).
    pub tof: f64,
}

/// Everything recorded about one reaction.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionRecord {
    pub state: usize,
    /// Beam kinetic energy (MeV) at the reaction point.
    pub beam_energy: f64,
    pub interaction: Vector3<f64>,
    /// Beam direction at the reaction point, after straggling.
    pub beam_direction: Vector3<f64>,
    pub com_angle: f64,
    pub ejectile_stopped: bool,
    pub recoil_stopped: bool,
    /// Product trajectories crossing a detector, before efficiency and QDC
    /// cuts.
    pub geometric_hits: u32,
    pub hits: Vec<Hit>,
    pub detected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// The beam ray never crossed the target.
    BeamMissed,
    /// The beam stopped in the target before reacting.
    BeamStopped,
    /// The beam reached the reaction point below threshold.
    BelowThreshold,
    Reaction(ReactionRecord),
}

struct Emission {
    product: Product,
    direction: Vector3<f64>,
    energy: f64,
    mass: f64,
    stopped: bool,
}

/// Follows one beam particle from the beam spot to the detectors.
#[instrument(level = "trace", skip_all)]
pub fn process_event(
    context: &SimulationContext,
    rng: &mut impl Rng,
) -> Result<EventOutcome, EngineError> {
    let config = context.config;
    let kinematics = &config.kinematics;
    let beam = kinematics.beam();
    let target = &context.target;
    let slow_beam = config.transport.energy_loss && beam.is_charged();

    let (origin, direction) = beam_ray(context, rng);
    let Some(point) = target.interaction_depth(&origin, &direction, rng) else {
        return Ok(EventOutcome::BeamMissed);
    };

    let energy = config.beam.energy + gaussian_fwhm(config.beam.energy_spread, rng);
    if energy <= 0.0 {
        return Ok(EventOutcome::BeamStopped);
    }
    let beam_energy = if slow_beam {
        match slow_down(target, target.material(), energy, beam.z(), beam.mass(), point.depth) {
            Some(remaining) => remaining,
            None => return Ok(EventOutcome::BeamStopped),
        }
    } else {
        energy
    };

    let beam_direction = if config.transport.straggling && beam.is_charged() {
        target.straggle(&direction, energy, beam.z(), point.depth, rng)
    } else {
        direction.normalize()
    };

    let state = select_channel(&context.weights, rng)?;
    let com_angle = kinematics.sample_com_angle(state, rng);
    let phi = TAU * rng.r#gen::<f64>();
    let Some(products) = kinematics.products(beam_energy, state, com_angle, phi) else {
        return Ok(EventOutcome::BelowThreshold);
    };

    let frame = basis_from_direction(&beam_direction);
    let mut emissions = [
        Emission {
            product: Product::Ejectile,
            direction: frame * products.ejectile.direction,
            energy: products.ejectile.energy,
            mass: context.ejectile.mass(),
            stopped: false,
        },
        Emission {
            product: Product::Recoil,
            direction: frame * products.recoil.direction,
            energy: products.recoil.energy,
            mass: kinematics.recoil_mass(state),
            stopped: false,
        },
    ];

    if config.transport.energy_loss {
        for emission in emissions.iter_mut() {
            let particle = match emission.product {
                Product::Ejectile => &context.ejectile,
                Product::Recoil => &context.recoil,
            };
            if !particle.is_charged() || particle.range_table().is_none() {
                continue;
            }
            let path = target
                .primitive()
                .intersect(&point.interaction, &emission.direction)
                .map_or(0.0, |hit| hit.exit.unwrap_or(hit.entry).t);
            match slow_down(
                particle,
                target.material(),
                emission.energy,
                particle.z(),
                emission.mass,
                path,
            ) {
                Some(remaining) => emission.energy = remaining,
                None => {
                    emission.energy = 0.0;
                    emission.stopped = true;
                }
            }
        }
    }

    let mut geometric_hits = 0;
    let mut hits = Vec::new();
    for (index, (_, detector)) in config.detectors.iter().enumerate() {
        for emission in &emissions {
            if emission.stopped || !emission.product.seen_by(detector.role) {
                continue;
            }
            let Some(intersection) = detector
                .primitive
                .intersect(&point.interaction, &emission.direction)
            else {
                continue;
            };
            geometric_hits += 1;
            if let Some(hit) = register(context, index, detector, emission, &intersection, rng) {
                hits.push(hit);
            }
        }
    }

    let has = |product: Product| hits.iter().any(|h| h.product == product);
    let detected = if config.detection.require_coincidence {
        has(Product::Ejectile) && has(Product::Recoil)
    } else {
        !hits.is_empty()
    };

    Ok(EventOutcome::Reaction(ReactionRecord {
        state,
        beam_energy,
        interaction: point.interaction,
        beam_direction,
        com_angle,
        ejectile_stopped: emissions[0].stopped,
        recoil_stopped: emissions[1].stopped,
        geometric_hits,
        hits,
        detected,
    }))
}

/// Start point and direction of a beam ray aimed at the target.
fn beam_ray(context: &SimulationContext, rng: &mut impl Rng) -> (Vector3<f64>, Vector3<f64>) {
    let (x, y) = match context.config.beam.spot {
        BeamSpot::Point => (0.0, 0.0),
        BeamSpot::Circle { diameter } => circle_spot(diameter / 2.0, rng),
        BeamSpot::Gaussian { fwhm } => (gaussian_fwhm(fwhm, rng), gaussian_fwhm(fwhm, rng)),
        BeamSpot::Halo { diameter } => halo(diameter / 2.0, rng),
    };
    match context.focus {
        Some(focus) => (focus, Vector3::new(x, y, 0.0) - focus),
        None => (Vector3::new(x, y, -BEAM_START_DISTANCE), Vector3::z()),
    }
}

/// Energy after `distance` (m) of material, or `None` if the particle stops.
/// Energies above the tabulated range fall back to a thin-layer estimate.
fn slow_down(
    profile: &impl EnergyLossProfile,
    material: &Material,
    energy: f64,
    z: f64,
    mass: f64,
    distance: f64,
) -> Option<f64> {
    match profile.table_new_energy(energy, distance) {
        Some(traversal) if traversal.is_stopped() => None,
        Some(traversal) => Some(traversal.energy),
        None => {
            let remaining = energy - material.stopping_power(energy, z, mass) * distance;
            (remaining > 0.0).then_some(remaining)
        }
    }
}

/// Time (ns) to cover `distance` (m) at kinetic energy `energy`.
pub fn time_of_flight(distance: f64, energy: f64, mass: f64) -> f64 {
    let gamma = 1.0 + energy / mass;
    let beta = (1.0 - 1.0 / (gamma * gamma)).sqrt();
    distance / (beta * SPEED_OF_LIGHT) * 1e9
}

/// Applies efficiency, penetration depth, timing and the QDC window to a
/// geometric hit.
fn register(
    context: &SimulationContext,
    index: usize,
    detector: &Detector,
    emission: &Emission,
    intersection: &Intersection,
    rng: &mut impl Rng,
) -> Option<Hit> {
    let detection = &context.config.detection;
    if emission.energy <= 0.0 {
        return None;
    }
    let efficiency = detection
        .efficiency
        .efficiency(detector.primitive.size_class(), emission.energy);
    if rng.r#gen::<f64>() > efficiency {
        return None;
    }

    let entry = intersection.entry;
    let far = intersection.exit.unwrap_or(entry);
    let chord = far.point - entry.point;
    let penetration = rng.r#gen::<f64>();
    let position = entry.point + chord * penetration;
    let flight = entry.t + chord.norm() * penetration;

    let tof = time_of_flight(flight, emission.energy, emission.mass)
        + gaussian_fwhm(detection.time_resolution, rng);
    let qdc = emission.energy * rng.r#gen::<f64>();
    let (min, max) = detection.qdc_window;
    if !(min..=max).contains(&qdc) {
        return None;
    }

    let (_, theta, phi) = cartesian_to_spherical(&position);
    Some(Hit {
        product: emission.product,
        detector: index,
        face: entry.face,
        position,
        local: intersection.local,
        theta,
        phi,
        energy: emission.energy,
        qdc,
        tof,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::detectors::{Detector, DetectorArray, Primitive};
    use crate::engine::config::tests::builder;
    use crate::engine::progress::ProgressReporter;
    use rand::{SeedableRng, rngs::StdRng};

    fn run_events(
        config: &crate::engine::config::SimulationConfig,
        n: usize,
        seed: u64,
    ) -> Vec<EventOutcome> {
        let reporter = ProgressReporter::new();
        let context = SimulationContext::new(config, &reporter).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| process_event(&context, &mut rng).unwrap())
            .collect()
    }

    #[test]
    fn time_of_flight_matches_nonrelativistic_limit() {
        // 1 MeV neutron: v ≈ 1.383e7 m/s, so 1 m takes about 72.3 ns.
        let tof = time_of_flight(1.0, 1.0, 939.565);
        assert!((tof - 72.3).abs() < 0.2, "tof {tof}");
    }

    #[test]
    fn every_event_reacts_for_a_thin_target_and_pencil_beam() {
        let config = builder().build().unwrap();
        let outcomes = run_events(&config, 200, 1);
        assert!(
            outcomes
                .iter()
                .all(|o| matches!(o, EventOutcome::Reaction(_)))
        );
    }

    #[test]
    fn detected_hits_lie_inside_the_struck_detector() {
        let config = builder().qdc_window(0.0, 100.0).build().unwrap();
        let detector = config.detectors.iter().next().unwrap().1.primitive.clone();
        let outcomes = run_events(&config, 2000, 2);
        let hits: Vec<&Hit> = outcomes
            .iter()
            .filter_map(|o| match o {
                EventOutcome::Reaction(r) => Some(r),
                _ => None,
            })
            .flat_map(|r| r.hits.iter())
            .collect();
        assert!(!hits.is_empty());
        for hit in hits {
            assert_eq!(hit.product, Product::Ejectile);
            let local = detector.local_coords(&hit.position);
            assert!(local.x.abs() <= detector.width() / 2.0 + 1e-9);
            assert!(local.y.abs() <= detector.length() / 2.0 + 1e-9);
            assert!(local.z.abs() <= detector.depth() / 2.0 + 1e-9);
            assert!(hit.tof > 0.0);
            assert!(hit.qdc <= hit.energy);
        }
    }

    #[test]
    fn qdc_window_rejects_every_hit_when_out_of_reach() {
        let config = builder().qdc_window(1000.0, 2000.0).build().unwrap();
        for outcome in run_events(&config, 500, 3) {
            if let EventOutcome::Reaction(record) = outcome {
                assert!(record.hits.is_empty());
                assert!(!record.detected);
            }
        }
    }

    #[test]
    fn coincidence_requires_both_products() {
        // The only detector sees ejectiles, so no event can be in coincidence.
        let config = builder()
            .qdc_window(0.0, 100.0)
            .require_coincidence(true)
            .build()
            .unwrap();
        for outcome in run_events(&config, 500, 4) {
            if let EventOutcome::Reaction(record) = outcome {
                assert!(!record.detected);
            }
        }
    }

    #[test]
    fn thick_target_stops_the_beam() {
        let mut target = crate::engine::config::tests::ch2_target();
        target.set_thickness(500.0).unwrap();
        let config = builder().target(target).straggling(false).build().unwrap();
        let outcomes = run_events(&config, 300, 5);
        let stopped = outcomes
            .iter()
            .filter(|o| matches!(o, EventOutcome::BeamStopped))
            .count();
        assert!(stopped > 0);
    }

    #[test]
    fn beam_missing_the_target_is_reported() {
        let config = builder()
            .beam_spot(BeamSpot::Halo { diameter: 1.0 })
            .build()
            .unwrap();
        for outcome in run_events(&config, 50, 6) {
            assert_eq!(outcome, EventOutcome::BeamMissed);
        }
    }

    #[test]
    fn recoil_detectors_only_register_recoils() {
        let mut primitive = Primitive::new(0.2, 0.2, 0.01).unwrap();
        primitive.set_position(Vector3::new(0.0, 0.0, 0.3));
        let array: DetectorArray = [Detector::new(primitive, "recoil")].into_iter().collect();
        let config = builder()
            .detectors(array)
            .energy_loss(false)
            .qdc_window(0.0, 100.0)
            .build()
            .unwrap();
        let mut recoils = 0;
        for outcome in run_events(&config, 500, 7) {
            if let EventOutcome::Reaction(record) = outcome {
                assert!(record.hits.iter().all(|h| h.product == Product::Recoil));
                recoils += record.hits.len();
            }
        }
        assert!(recoils > 0);
    }
}
