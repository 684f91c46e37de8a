mod defaults;
mod file;
mod models;

pub use defaults::DefaultsConfig;
pub use file::{PartialParticle, PartialRunConfig};
pub use models::AppConfig;

use crate::cli::SimulateArgs;
use crate::error::{CliError, Result};
use crate::utils::parser;
use file::{PartialEfficiencyConfig, PartialStateConfig};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};
use vandmc::core::detectors::{DetectorArray, Efficiency, SizeClass};
use vandmc::core::io::{TextFormat, read_efficiency_curve, read_material_file};
use vandmc::core::physics::{AngularDist, Kinematics, Particle, RateParams, Target};
use vandmc::engine::config as core_config;
use vandmc::engine::error::EngineError;

/// Builds a particle from its configuration entry. Nuclei without a given
/// mass default to `A` atomic mass units.
pub fn build_particle(partial: &PartialParticle) -> Result<Particle> {
    let (name, z, a, mass_amu) = match partial {
        PartialParticle::Name(spec) => {
            let spec =
                parser::parse_particle(spec).map_err(|e| CliError::Argument(e.to_string()))?;
            (spec.name, spec.z, spec.a, spec.mass_amu)
        }
        PartialParticle::Explicit {
            name,
            z,
            a,
            mass_amu,
        } => (name.clone(), *z, *a, *mass_amu),
    };
    let mass_amu = mass_amu.unwrap_or_else(|| {
        debug!(particle = %name, "No mass given, using A atomic mass units");
        f64::from(a)
    });
    Ok(Particle::with_mass_amu(
        &name,
        f64::from(z),
        f64::from(a),
        mass_amu,
    ))
}

fn require<T>(value: Option<T>, key: &str) -> Result<T> {
    value.ok_or_else(|| {
        CliError::Config(format!(
            "`{}` is required in the config file.",
            key
        ))
    })
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid value for {}: {}", key, value)))
}

impl PartialRunConfig {
    pub fn merge_with_cli(mut self, args: &SimulateArgs) -> Result<AppConfig> {
        self.apply_set_values(&args.set_values)?;
        let defaults = DefaultsConfig::default();

        let beam = self.beam.take().unwrap_or_default();
        let target_config = self.target.take().unwrap_or_default();
        let reaction = self.reaction.take().unwrap_or_default();
        let detectors_config = self.detectors.take().unwrap_or_default();
        let sim_config = self.simulation.take().unwrap_or_default();

        let target = self.load_target(
            require(target_config.material.as_deref(), "target.material")?,
            require(target_config.nucleus.as_ref(), "target.nucleus")?,
            require(target_config.thickness, "target.thickness")?,
            target_config
                .angle
                .unwrap_or(defaults.target_angle_deg)
                .to_radians(),
            target_config.radiation_length,
        )?;

        let rate = beam
            .intensity
            .map(|intensity| RateParams::new(intensity, &target));
        let kinematics = Kinematics::new(
            build_particle(require(beam.particle.as_ref(), "beam.particle")?)?,
            target.nucleus().clone(),
            build_particle(require(reaction.ejectile.as_ref(), "reaction.ejectile")?)?,
            build_particle(require(reaction.recoil.as_ref(), "reaction.recoil")?)?,
            require(reaction.q_value, "reaction.q-value")?,
        )
        .map_err(|e| CliError::Config(e.to_string()))?;
        let kinematics = self.add_states(kinematics, &reaction.states, rate)?;

        let detectors_path =
            self.resolve(require(detectors_config.file.as_deref(), "detectors.file")?);
        info!("Loading detector array from {:?}", &detectors_path);
        let detectors = DetectorArray::read_from_path(&detectors_path)?;
        let efficiency = self.load_efficiency(detectors_config.efficiency.as_ref())?;

        let (qdc_min, qdc_max) = detectors_config.qdc_window.unwrap_or(defaults.qdc_window);
        let mut builder = core_config::SimulationConfigBuilder::new()
            .beam_energy(require(beam.energy, "beam.energy")?)
            .energy_spread(beam.energy_spread.unwrap_or(defaults.energy_spread))
            .beam_spot(beam.spot.map(core_config::BeamSpot::from).unwrap_or_default())
            .divergence(
                beam.divergence
                    .unwrap_or(defaults.divergence_deg)
                    .to_radians(),
            )
            .target(target)
            .kinematics(kinematics)
            .detectors(detectors)
            .efficiency(efficiency)
            .time_resolution(
                detectors_config
                    .time_resolution
                    .unwrap_or(defaults.time_resolution),
            )
            .qdc_window(qdc_min, qdc_max)
            .require_coincidence(
                args.coincidence
                    || detectors_config
                        .require_coincidence
                        .unwrap_or(defaults.require_coincidence),
            )
            .energy_loss(
                !args.no_energy_loss && sim_config.energy_loss.unwrap_or(defaults.energy_loss),
            )
            .straggling(
                !args.no_straggling && sim_config.straggling.unwrap_or(defaults.straggling),
            )
            .events(args.events.or(sim_config.events).unwrap_or(defaults.events))
            .seed(args.seed.or(sim_config.seed).unwrap_or(defaults.seed))
            .chunk_size(sim_config.chunk_size.unwrap_or(defaults.chunk_size));
        if let Some(intensity) = beam.intensity {
            builder = builder.intensity(intensity);
        }

        let output = args
            .output
            .clone()
            .or_else(|| sim_config.output.as_deref().map(|path| self.resolve(path)));

        Ok(AppConfig {
            core_config: builder.build().map_err(|e| CliError::Config(e.to_string()))?,
            output,
        })
    }

    fn load_target(
        &self,
        material: &Path,
        nucleus: &PartialParticle,
        thickness: f64,
        angle: f64,
        radiation_length: Option<f64>,
    ) -> Result<Target> {
        let material_path = self.resolve(material);
        info!("Loading target material from {:?}", &material_path);
        let material = read_material_file(&material_path)?;
        if !material.use_eloss() {
            warn!(
                "Energy loss is switched off in material '{}'.",
                material.name()
            );
        }
        let mut target = Target::new(build_particle(nucleus)?, material, thickness, angle)
            .map_err(EngineError::from)?;
        if let Some(radiation_length) = radiation_length {
            target
                .set_radiation_length(radiation_length)
                .map_err(EngineError::from)?;
        }
        Ok(target)
    }

    fn add_states(
        &self,
        mut kinematics: Kinematics,
        states: &[PartialStateConfig],
        rate: Option<RateParams>,
    ) -> Result<Kinematics> {
        if states.is_empty() {
            return Err(CliError::Config(
                "At least one `[[reaction.states]]` entry is required.".to_string(),
            ));
        }
        for (index, state) in states.iter().enumerate() {
            let distribution = match (&state.distribution, state.cross_section) {
                (Some(path), None) => AngularDist::from_file(&self.resolve(path), rate)?,
                (None, Some(total)) => {
                    AngularDist::isotropic(total).map_err(|e| CliError::Config(e.to_string()))?
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Reaction state {} needs exactly one of `distribution` or `cross-section`.",
                        index
                    )));
                }
            };
            kinematics
                .add_state(state.excitation, distribution)
                .map_err(|e| CliError::Config(e.to_string()))?;
        }
        Ok(kinematics)
    }

    fn load_efficiency(&self, partial: Option<&PartialEfficiencyConfig>) -> Result<Efficiency> {
        let mut efficiency = Efficiency::perfect();
        let Some(partial) = partial else {
            return Ok(efficiency);
        };
        for (class, path) in [
            (SizeClass::Small, &partial.small),
            (SizeClass::Medium, &partial.medium),
            (SizeClass::Large, &partial.large),
        ] {
            if let Some(path) = path {
                efficiency.set_curve(class, read_efficiency_curve(&self.resolve(path))?);
            }
        }
        Ok(efficiency)
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "beam.energy" => {
                    self.beam.get_or_insert_with(Default::default).energy =
                        Some(parse_value(key, value_str)?);
                }
                "beam.energy-spread" => {
                    self.beam
                        .get_or_insert_with(Default::default)
                        .energy_spread = Some(parse_value(key, value_str)?);
                }
                "beam.divergence" => {
                    self.beam.get_or_insert_with(Default::default).divergence =
                        Some(parse_value(key, value_str)?);
                }
                "beam.intensity" => {
                    self.beam.get_or_insert_with(Default::default).intensity =
                        Some(parse_value(key, value_str)?);
                }
                "beam.particle" => {
                    self.beam.get_or_insert_with(Default::default).particle =
                        Some(PartialParticle::Name(value_str.to_string()));
                }
                "target.thickness" => {
                    self.target
                        .get_or_insert_with(Default::default)
                        .thickness = Some(parse_value(key, value_str)?);
                }
                "target.angle" => {
                    self.target.get_or_insert_with(Default::default).angle =
                        Some(parse_value(key, value_str)?);
                }
                "reaction.q-value" => {
                    self.reaction.get_or_insert_with(Default::default).q_value =
                        Some(parse_value(key, value_str)?);
                }
                "detectors.time-resolution" => {
                    self.detectors
                        .get_or_insert_with(Default::default)
                        .time_resolution = Some(parse_value(key, value_str)?);
                }
                "detectors.require-coincidence" => {
                    self.detectors
                        .get_or_insert_with(Default::default)
                        .require_coincidence = Some(parse_value(key, value_str)?);
                }
                "simulation.events" => {
                    self.simulation.get_or_insert_with(Default::default).events =
                        Some(parse_value(key, value_str)?);
                }
                "simulation.seed" => {
                    self.simulation.get_or_insert_with(Default::default).seed =
                        Some(parse_value(key, value_str)?);
                }
                "simulation.chunk-size" => {
                    self.simulation
                        .get_or_insert_with(Default::default)
                        .chunk_size = Some(parse_value(key, value_str)?);
                }
                "simulation.energy-loss" => {
                    self.simulation
                        .get_or_insert_with(Default::default)
                        .energy_loss = Some(parse_value(key, value_str)?);
                }
                "simulation.straggling" => {
                    self.simulation
                        .get_or_insert_with(Default::default)
                        .straggling = Some(parse_value(key, value_str)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use vandmc::engine::config::BeamSpot;

    pub(crate) const MATERIAL: &str = "\
name CH2
density 0.93
elements 2
C - 1
H - 2
";

    pub(crate) const DETECTORS: &str = "\
x,y,z,theta,phi,psi,type,subtype,length,width,depth,material
0,0,1,0,0,0,vandle,large,,,,
";

    pub(crate) const CONFIG: &str = r#"
[beam]
particle = "d"
energy = 10.0

[target]
material = "ch2.mat"
nucleus = "12C"
thickness = 1.0

[reaction]
ejectile = "n"
recoil = "13N"
q-value = -0.281

[[reaction.states]]
cross-section = 10.0

[detectors]
file = "bars.csv"

[simulation]
events = 200
seed = 4
"#;

    /// A run directory holding a material, detector file and configuration.
    pub(crate) fn run_dir(config: &str) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ch2.mat"), MATERIAL).unwrap();
        fs::write(dir.path().join("bars.csv"), DETECTORS).unwrap();
        let config_path = dir.path().join("run.toml");
        fs::write(&config_path, config).unwrap();
        (dir, config_path)
    }

    fn simulate_args(config_path: &Path, extra: &[&str]) -> SimulateArgs {
        let mut args = vec!["vandmc", "simulate", "-c", config_path.to_str().unwrap()];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Commands::Simulate(args) => args,
            _ => panic!("Expected 'simulate' subcommand"),
        }
    }

    fn merged(config: &str, extra: &[&str]) -> Result<AppConfig> {
        let (_dir, path) = run_dir(config);
        let args = simulate_args(&path, extra);
        PartialRunConfig::from_file(&path)?.merge_with_cli(&args)
    }

    #[test]
    fn load_from_file_and_merge_with_defaults() {
        let app = merged(CONFIG, &[]).unwrap();
        let config = &app.core_config;
        assert_eq!(config.beam.energy, 10.0);
        assert_eq!(config.beam.spot, BeamSpot::Point);
        assert_eq!(config.run.events, 200);
        assert_eq!(config.run.seed, 4);
        assert_eq!(config.run.chunk_size, DefaultsConfig::default().chunk_size);
        assert!(config.transport.energy_loss);
        assert!(config.transport.straggling);
        assert_eq!(config.detection.qdc_window, DefaultsConfig::default().qdc_window);
        assert_eq!(config.detectors.len(), 1);
        assert_eq!(config.kinematics.num_states(), 1);
        assert_eq!(config.kinematics.beam().name(), "d");
        assert_eq!(config.target.nucleus().name(), "12C");
        assert!(app.output.is_none());
    }

    #[test]
    fn cli_args_override_file_values() {
        let app = merged(
            CONFIG,
            &["-n", "50", "--seed", "11", "--no-straggling", "--coincidence", "-o", "hits.csv"],
        )
        .unwrap();
        let config = &app.core_config;
        assert_eq!(config.run.events, 50);
        assert_eq!(config.run.seed, 11);
        assert!(!config.transport.straggling);
        assert!(config.detection.require_coincidence);
        assert_eq!(app.output, Some(PathBuf::from("hits.csv")));
    }

    #[test]
    fn set_values_override_file_and_defaults() {
        let app = merged(
            CONFIG,
            &[
                "-S",
                "beam.energy=12.5",
                "-S",
                "simulation.chunk-size=64",
                "-S",
                "target.angle=30",
            ],
        )
        .unwrap();
        let config = &app.core_config;
        assert_eq!(config.beam.energy, 12.5);
        assert_eq!(config.run.chunk_size, 64);
        assert!((config.target.angle() - 30f64.to_radians()).abs() < 1e-12);
    }

    #[test]
    fn invalid_set_values_are_rejected() {
        let unknown = merged(CONFIG, &["-S", "beam.colour=red"]);
        assert!(matches!(unknown, Err(CliError::Config(msg)) if msg.contains("Unsupported")));
        let malformed = merged(CONFIG, &["-S", "beam.energy"]);
        assert!(matches!(malformed, Err(CliError::Config(msg)) if msg.contains("KEY=VALUE")));
        let bad_number = merged(CONFIG, &["-S", "simulation.events=many"]);
        assert!(matches!(bad_number, Err(CliError::Config(_))));
    }

    #[test]
    fn missing_sections_are_reported_by_key() {
        let config = CONFIG.replace("q-value = -0.281", "");
        match merged(&config, &[]) {
            Err(CliError::Config(msg)) => assert!(msg.contains("reaction.q-value"), "{msg}"),
            other => panic!("expected a config error, got {:?}", other.err()),
        }
    }

    #[test]
    fn state_needs_exactly_one_distribution_source() {
        let config = CONFIG.replace(
            "cross-section = 10.0",
            "cross-section = 10.0\ndistribution = \"gs.dat\"",
        );
        assert!(matches!(merged(&config, &[]), Err(CliError::Config(_))));
    }

    #[test]
    fn tabulated_state_and_efficiency_files_are_resolved_relative_to_the_config() {
        let config = CONFIG
            .replace("cross-section = 10.0", "distribution = \"gs.dat\"")
            .replace(
                "file = \"bars.csv\"",
                "file = \"bars.csv\"\nefficiency = { large = \"large.eff\" }",
            );
        let (dir, path) = run_dir(&config);
        fs::write(dir.path().join("gs.dat"), "0 1.0\n90 1.0\n180 1.0\n").unwrap();
        fs::write(dir.path().join("large.eff"), "0.5 0.2\n5.0 0.4\n").unwrap();

        let app = PartialRunConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&simulate_args(&path, &[]))
            .unwrap();
        let config = &app.core_config;
        assert!(!config.kinematics.states()[0].distribution.is_isotropic());
        assert!(config.detection.efficiency.curve(SizeClass::Large).is_some());
        assert!(config.detection.efficiency.curve(SizeClass::Small).is_none());
    }

    #[test]
    fn missing_material_file_is_a_load_error() {
        let config = CONFIG.replace("ch2.mat", "missing.mat");
        assert!(matches!(merged(&config, &[]), Err(CliError::Load(_))));
    }

    #[test]
    fn particles_default_to_mass_number_in_amu() {
        let carbon = build_particle(&PartialParticle::Name("12C".to_string())).unwrap();
        assert!((carbon.mass_amu() - 12.0).abs() < 1e-9);
        let explicit = build_particle(&PartialParticle::Explicit {
            name: "beam".to_string(),
            z: 1,
            a: 2,
            mass_amu: Some(2.0141),
        })
        .unwrap();
        assert_eq!(explicit.name(), "beam");
        assert!((explicit.mass_amu() - 2.0141).abs() < 1e-9);
    }
}
