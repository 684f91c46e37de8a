use super::angular::AngularDist;
use super::particle::Particle;
use nalgebra::Vector3;
use rand::Rng;
use std::f64::consts::PI;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq)]
pub enum KinematicsError {
    #[error("Particle '{name}' has a non-positive mass ({mass} MeV)")]
    InvalidMass { name: String, mass: f64 },
    #[error("Recoil ground-state mass is non-positive for Q = {0} MeV")]
    InvalidQValue(f64),
    #[error("Excitation energy must be non-negative, got {0} MeV")]
    InvalidExcitation(f64),
    #[error("Angular distribution for state {0} is not initialized")]
    UninitializedDistribution(usize),
}

/// One populated recoil state.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionState {
    /// Excitation energy above the ground state (MeV).
    pub excitation: f64,
    pub distribution: AngularDist,
}

/// Lab-frame outcome for one reaction product, with directions in the beam
/// frame (beam along +z).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductState {
    /// Kinetic energy (MeV).
    pub energy: f64,
    /// Unit direction.
    pub direction: Vector3<f64>,
    /// Polar angle (rad) relative to the beam.
    pub lab_angle: f64,
    /// Center-of-mass polar angle (rad).
    pub com_angle: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReactionProducts {
    pub state: usize,
    pub ejectile: ProductState,
    pub recoil: ProductState,
}

/// Two-body relativistic reaction A(b,c)D.
///
/// The recoil ground-state mass follows from the Q-value so that the reaction
/// conserves energy exactly; excited states add their excitation energy.
#[derive(Debug, Clone, PartialEq)]
pub struct Kinematics {
    beam: Particle,
    target: Particle,
    ejectile: Particle,
    recoil: Particle,
    q_value: f64,
    recoil_ground_mass: f64,
    states: Vec<ReactionState>,
}

impl Kinematics {
    pub fn new(
        beam: Particle,
        target: Particle,
        ejectile: Particle,
        recoil: Particle,
        q_value: f64,
    ) -> Result<Self, KinematicsError> {
        for particle in [&beam, &target, &ejectile] {
            if !(particle.mass() > 0.0) {
                return Err(KinematicsError::InvalidMass {
                    name: particle.name().to_string(),
                    mass: particle.mass(),
                });
            }
        }
        let recoil_ground_mass = beam.mass() + target.mass() - ejectile.mass() - q_value;
        if !(recoil_ground_mass > 0.0) {
            return Err(KinematicsError::InvalidQValue(q_value));
        }
        Ok(Self {
            beam,
            target,
            ejectile,
            recoil,
            q_value,
            recoil_ground_mass,
            states: Vec::new(),
        })
    }

    /// Adds a recoil state and returns its index. State 0 is conventionally the
    /// ground state.
    pub fn add_state(
        &mut self,
        excitation: f64,
        distribution: AngularDist,
    ) -> Result<usize, KinematicsError> {
        if !(excitation >= 0.0) {
            return Err(KinematicsError::InvalidExcitation(excitation));
        }
        let index = self.states.len();
        if !distribution.is_initialized() {
            return Err(KinematicsError::UninitializedDistribution(index));
        }
        debug!(
            index,
            excitation,
            cross_section = distribution.total_cross_section(),
            "Added recoil state"
        );
        self.states.push(ReactionState {
            excitation,
            distribution,
        });
        Ok(index)
    }

    pub fn beam(&self) -> &Particle {
        &self.beam
    }

    pub fn target(&self) -> &Particle {
        &self.target
    }

    pub fn ejectile(&self) -> &Particle {
        &self.ejectile
    }

    pub fn recoil(&self) -> &Particle {
        &self.recoil
    }

    /// Ground-state Q-value (MeV).
    pub fn q_value(&self) -> f64 {
        self.q_value
    }

    pub fn states(&self) -> &[ReactionState] {
        &self.states
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Recoil rest mass (MeV/c²) in `state`; the ground-state mass for an
    /// unknown index.
    pub fn recoil_mass(&self, state: usize) -> f64 {
        self.recoil_ground_mass + self.states.get(state).map_or(0.0, |s| s.excitation)
    }

    /// Total cross-section (mb) of every state, in state order.
    pub fn state_weights(&self) -> Vec<f64> {
        self.states
            .iter()
            .map(|s| s.distribution.total_cross_section())
            .collect()
    }

    pub fn total_cross_section(&self) -> f64 {
        self.state_weights().iter().sum()
    }

    /// Reactions per second summed over states.
    pub fn rate(&self) -> f64 {
        self.states.iter().map(|s| s.distribution.rate()).sum()
    }

    /// Lowest beam kinetic energy (MeV) that can populate `state`.
    pub fn threshold(&self, state: usize) -> f64 {
        let final_mass = self.ejectile.mass() + self.recoil_mass(state);
        let initial_mass = self.beam.mass() + self.target.mass();
        ((final_mass * final_mass - initial_mass * initial_mass) / (2.0 * self.target.mass()))
            .max(0.0)
    }

    /// Samples a CoM angle (rad) from the distribution of `state`, or -1 for an
    /// unknown state.
    pub fn sample_com_angle(&self, state: usize, rng: &mut impl Rng) -> f64 {
        self.states
            .get(state)
            .map_or(-1.0, |s| s.distribution.sample(rng))
    }

    /// Lab-frame products for a beam of kinetic energy `beam_energy` reacting
    /// at CoM angle `com_angle` and azimuth `phi`. `None` below threshold.
    pub fn products(
        &self,
        beam_energy: f64,
        state: usize,
        com_angle: f64,
        phi: f64,
    ) -> Option<ReactionProducts> {
        if !(beam_energy >= 0.0) {
            return None;
        }
        let mb = self.beam.mass();
        let mt = self.target.mass();
        let me = self.ejectile.mass();
        let mr = self.recoil_mass(state);

        let s = (mb + mt).powi(2) + 2.0 * mt * beam_energy;
        let sqrt_s = s.sqrt();
        if sqrt_s < me + mr {
            return None;
        }

        let e3_cm = (s + me * me - mr * mr) / (2.0 * sqrt_s);
        let e4_cm = (s + mr * mr - me * me) / (2.0 * sqrt_s);
        let p_cm = (e3_cm * e3_cm - me * me).max(0.0).sqrt();

        let total = beam_energy + mb + mt;
        let p_beam = (beam_energy * beam_energy + 2.0 * beam_energy * mb).sqrt();
        let beta = p_beam / total;
        let gamma = total / sqrt_s;

        let ejectile = boost(e3_cm, me, p_cm, com_angle, phi, beta, gamma);
        let recoil = boost(e4_cm, mr, p_cm, PI - com_angle, phi + PI, beta, gamma);
        Some(ReactionProducts {
            state,
            ejectile,
            recoil,
        })
    }
}

fn boost(
    energy_cm: f64,
    mass: f64,
    p_cm: f64,
    theta: f64,
    phi: f64,
    beta: f64,
    gamma: f64,
) -> ProductState {
    let p_parallel = gamma * (p_cm * theta.cos() + beta * energy_cm);
    let p_perp = p_cm * theta.sin();
    let energy_lab = gamma * (energy_cm + beta * p_cm * theta.cos());
    let momentum = Vector3::new(p_perp * phi.cos(), p_perp * phi.sin(), p_parallel);
    ProductState {
        energy: (energy_lab - mass).max(0.0),
        direction: momentum.try_normalize(0.0).unwrap_or_else(Vector3::z),
        lab_angle: p_perp.atan2(p_parallel),
        com_angle: theta,
    }
}
