use crate::core::detectors::{DetectorArray, Efficiency};
use crate::core::physics::{Kinematics, Target};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: String,
    },
}

/// Transverse profile of the beam at the target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BeamSpot {
    /// Pencil beam on the axis.
    #[default]
    Point,
    /// Uniform disk of the given diameter (m).
    Circle { diameter: f64 },
    /// Gaussian in x and y with the given FWHM (m).
    Gaussian { fwhm: f64 },
    /// Ring of the given diameter (m).
    Halo { diameter: f64 },
}

impl BeamSpot {
    /// Radius (m) used to place the focal point of a divergent beam.
    pub fn radius(&self) -> f64 {
        match *self {
            BeamSpot::Point => 0.0,
            BeamSpot::Circle { diameter } | BeamSpot::Halo { diameter } => diameter / 2.0,
            BeamSpot::Gaussian { fwhm } => fwhm / 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BeamConfig {
    /// Mean kinetic energy (MeV).
    pub energy: f64,
    /// FWHM of the energy spread (MeV).
    pub energy_spread: f64,
    pub spot: BeamSpot,
    /// Half-angle (rad) of the beam cone. Zero gives a parallel beam.
    pub divergence: f64,
    /// Particles per second, enabling rates and beam time.
    pub intensity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransportConfig {
    /// Slow the beam and charged products in the target.
    pub energy_loss: bool,
    /// Apply multiple scattering to the beam in the target.
    pub straggling: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectionConfig {
    pub efficiency: Efficiency,
    /// FWHM (ns) of the time-of-flight smearing.
    pub time_resolution: f64,
    /// Accepted QDC range (MeV), inclusive.
    pub qdc_window: (f64, f64),
    /// Count an event only when both an ejectile and a recoil are detected.
    pub require_coincidence: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Number of beam particles thrown.
    pub events: u64,
    pub seed: u64,
    /// Events per independently seeded chunk.
    pub chunk_size: u64,
}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub beam: BeamConfig,
    pub target: Target,
    pub kinematics: Kinematics,
    pub detectors: DetectorArray,
    pub transport: TransportConfig,
    pub detection: DetectionConfig,
    pub run: RunConfig,
}

pub const DEFAULT_QDC_WINDOW: (f64, f64) = (0.1, 5.0);
pub const DEFAULT_CHUNK_SIZE: u64 = 1000;

#[derive(Default)]
pub struct SimulationConfigBuilder {
    beam_energy: Option<f64>,
    energy_spread: Option<f64>,
    beam_spot: Option<BeamSpot>,
    divergence: Option<f64>,
    intensity: Option<f64>,
    target: Option<Target>,
    kinematics: Option<Kinematics>,
    detectors: Option<DetectorArray>,
    energy_loss: Option<bool>,
    straggling: Option<bool>,
    efficiency: Option<Efficiency>,
    time_resolution: Option<f64>,
    qdc_window: Option<(f64, f64)>,
    require_coincidence: Option<bool>,
    events: Option<u64>,
    seed: Option<u64>,
    chunk_size: Option<u64>,
}

impl SimulationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn beam_energy(mut self, energy: f64) -> Self {
        self.beam_energy = Some(energy);
        self
    }
    pub fn energy_spread(mut self, fwhm: f64) -> Self {
        self.energy_spread = Some(fwhm);
        self
    }
    pub fn beam_spot(mut self, spot: BeamSpot) -> Self {
        self.beam_spot = Some(spot);
        self
    }
    pub fn divergence(mut self, angle: f64) -> Self {
        self.divergence = Some(angle);
        self
    }
    pub fn intensity(mut self, intensity: f64) -> Self {
        self.intensity = Some(intensity);
        self
    }
    pub fn target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }
    pub fn kinematics(mut self, kinematics: Kinematics) -> Self {
        self.kinematics = Some(kinematics);
        self
    }
    pub fn detectors(mut self, detectors: DetectorArray) -> Self {
        self.detectors = Some(detectors);
        self
    }
    pub fn energy_loss(mut self, enabled: bool) -> Self {
        self.energy_loss = Some(enabled);
        self
    }
    pub fn straggling(mut self, enabled: bool) -> Self {
        self.straggling = Some(enabled);
        self
    }
    pub fn efficiency(mut self, efficiency: Efficiency) -> Self {
        self.efficiency = Some(efficiency);
        self
    }
    pub fn time_resolution(mut self, fwhm: f64) -> Self {
        self.time_resolution = Some(fwhm);
        self
    }
    pub fn qdc_window(mut self, min: f64, max: f64) -> Self {
        self.qdc_window = Some((min, max));
        self
    }
    pub fn require_coincidence(mut self, required: bool) -> Self {
        self.require_coincidence = Some(required);
        self
    }
    pub fn events(mut self, events: u64) -> Self {
        self.events = Some(events);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
    pub fn chunk_size(mut self, size: u64) -> Self {
        self.chunk_size = Some(size);
        self
    }

    pub fn build(self) -> Result<SimulationConfig, ConfigError> {
        let beam = BeamConfig {
            energy: self
                .beam_energy
                .ok_or(ConfigError::MissingParameter("beam_energy"))?,
            energy_spread: self.energy_spread.unwrap_or(0.0),
            spot: self.beam_spot.unwrap_or_default(),
            divergence: self.divergence.unwrap_or(0.0),
            intensity: self.intensity,
        };
        let transport = TransportConfig {
            energy_loss: self.energy_loss.unwrap_or(true),
            straggling: self.straggling.unwrap_or(true),
        };
        let detection = DetectionConfig {
            efficiency: self.efficiency.unwrap_or_else(Efficiency::perfect),
            time_resolution: self.time_resolution.unwrap_or(0.0),
            qdc_window: self.qdc_window.unwrap_or(DEFAULT_QDC_WINDOW),
            require_coincidence: self.require_coincidence.unwrap_or(false),
        };
        let run = RunConfig {
            events: self.events.ok_or(ConfigError::MissingParameter("events"))?,
            seed: self.seed.unwrap_or(0),
            chunk_size: self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE),
        };
        let config = SimulationConfig {
            beam,
            target: self.target.ok_or(ConfigError::MissingParameter("target"))?,
            kinematics: self
                .kinematics
                .ok_or(ConfigError::MissingParameter("kinematics"))?,
            detectors: self
                .detectors
                .ok_or(ConfigError::MissingParameter("detectors"))?,
            transport,
            detection,
            run,
        };
        config.validate()?;
        Ok(config)
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.beam.energy > 0.0) {
            return Err(invalid("beam_energy", "must be positive"));
        }
        if !(self.beam.energy_spread >= 0.0) {
            return Err(invalid("energy_spread", "must not be negative"));
        }
        if !(0.0..std::f64::consts::FRAC_PI_2).contains(&self.beam.divergence) {
            return Err(invalid("divergence", "must lie in [0, pi/2)"));
        }
        if let Some(intensity) = self.beam.intensity {
            if !(intensity > 0.0) {
                return Err(invalid("intensity", "must be positive"));
            }
        }
        if self.kinematics.num_states() == 0 {
            return Err(invalid("kinematics", "no recoil states defined"));
        }
        if self.detectors.is_empty() {
            return Err(invalid("detectors", "the detector array is empty"));
        }
        if !(self.detection.time_resolution >= 0.0) {
            return Err(invalid("time_resolution", "must not be negative"));
        }
        let (min, max) = self.detection.qdc_window;
        if !(min <= max) {
            return Err(invalid("qdc_window", format!("empty window [{min}, {max}]")));
        }
        if self.run.events == 0 {
            return Err(invalid("events", "must be at least 1"));
        }
        if self.run.chunk_size == 0 {
            return Err(invalid("chunk_size", "must be at least 1"));
        }
        Ok(())
    }
}
