//! Reaction physics: particle species, the target foil, CoM angular
//! distributions, two-body kinematics and multiple scattering.

pub mod angular;
pub mod kinematics;
pub mod particle;
pub mod straggling;
pub mod target;

pub use angular::{AngularDist, AngularDistError, RateParams};
pub use kinematics::{Kinematics, KinematicsError, ProductState, ReactionProducts, ReactionState};
pub use particle::Particle;
pub use straggling::{straggle_direction, straggle_sigma};
pub use target::{InteractionPoint, Target, TargetError};
