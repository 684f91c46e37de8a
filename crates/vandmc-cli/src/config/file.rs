use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use vandmc::engine::config as core_config;

/// A particle given either by name (`"d"`, `"13N"`) or explicitly.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum PartialParticle {
    Name(String),
    Explicit {
        name: String,
        z: u8,
        a: u16,
        #[serde(rename = "mass-amu")]
        mass_amu: Option<f64>,
    },
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "kebab-case", tag = "shape")]
pub enum PartialBeamSpot {
    Point,
    Circle { diameter: f64 },
    Gaussian { fwhm: f64 },
    Halo { diameter: f64 },
}

impl From<PartialBeamSpot> for core_config::BeamSpot {
    fn from(p: PartialBeamSpot) -> Self {
        match p {
            PartialBeamSpot::Point => core_config::BeamSpot::Point,
            PartialBeamSpot::Circle { diameter } => core_config::BeamSpot::Circle { diameter },
            PartialBeamSpot::Gaussian { fwhm } => core_config::BeamSpot::Gaussian { fwhm },
            PartialBeamSpot::Halo { diameter } => core_config::BeamSpot::Halo { diameter },
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialBeamConfig {
    pub particle: Option<PartialParticle>,
    /// MeV.
    pub energy: Option<f64>,
    /// FWHM in MeV.
    pub energy_spread: Option<f64>,
    pub spot: Option<PartialBeamSpot>,
    /// Half-angle in degrees.
    pub divergence: Option<f64>,
    /// Particles per second.
    pub intensity: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialTargetConfig {
    /// Path to the material description file.
    pub material: Option<PathBuf>,
    pub nucleus: Option<PartialParticle>,
    /// mg/cm².
    pub thickness: Option<f64>,
    /// Tilt in degrees.
    pub angle: Option<f64>,
    /// mg/cm², overriding the value derived from the material.
    pub radiation_length: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialStateConfig {
    /// MeV above the recoil ground state.
    #[serde(default)]
    pub excitation: f64,
    /// Two-column CoM angle (deg) and dσ/dΩ (mb/sr) file.
    pub distribution: Option<PathBuf>,
    /// Total cross-section (mb) of an isotropic state.
    pub cross_section: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialReactionConfig {
    pub ejectile: Option<PartialParticle>,
    pub recoil: Option<PartialParticle>,
    /// Ground-state Q-value in MeV.
    pub q_value: Option<f64>,
    #[serde(default)]
    pub states: Vec<PartialStateConfig>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialEfficiencyConfig {
    pub small: Option<PathBuf>,
    pub medium: Option<PathBuf>,
    pub large: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialDetectorsConfig {
    /// Path to the detector CSV file.
    pub file: Option<PathBuf>,
    pub efficiency: Option<PartialEfficiencyConfig>,
    /// FWHM in ns.
    pub time_resolution: Option<f64>,
    /// Accepted QDC range in MeV.
    pub qdc_window: Option<(f64, f64)>,
    pub require_coincidence: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialSimulationConfig {
    pub events: Option<u64>,
    pub seed: Option<u64>,
    pub chunk_size: Option<u64>,
    pub energy_loss: Option<bool>,
    pub straggling: Option<bool>,
    /// CSV file of detected hits.
    pub output: Option<PathBuf>,
}

/// The simulation TOML file with every field optional. Missing values come
/// from the command line or from [`super::DefaultsConfig`].
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialRunConfig {
    pub beam: Option<PartialBeamConfig>,
    pub target: Option<PartialTargetConfig>,
    pub reaction: Option<PartialReactionConfig>,
    pub detectors: Option<PartialDetectorsConfig>,
    pub simulation: Option<PartialSimulationConfig>,
    /// Directory that relative paths in the file are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl PartialRunConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(config)
    }

    pub fn parse(content: &str, base_dir: &Path) -> Result<Self> {
        let mut config: Self =
            toml::from_str(content).map_err(|e| CliError::Config(e.to_string()))?;
        config.base_dir = base_dir.to_path_buf();
        Ok(config)
    }

    /// Joins relative paths onto the configuration file's directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}
