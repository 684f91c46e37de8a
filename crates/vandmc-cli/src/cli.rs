use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "C. R. Thornsberry",
    version,
    about = "VANDMC CLI - Monte Carlo simulation of charged-particle reactions, energy loss in targets and detection in arrays of scintillator bars.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used to process event chunks.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the reaction Monte Carlo described by a configuration file.
    Simulate(SimulateArgs),
    /// Compute stopping power and range of a particle in a material.
    Range(RangeArgs),
    /// Measure the geometric coverage of a detector array for an isotropic point source.
    Coverage(CoverageArgs),
}

/// Arguments for the `simulate` subcommand.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    // --- Core Arguments ---
    /// Path to the simulation configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Path for the CSV file of detected hits.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    // --- Run Overrides ---
    /// Override the number of beam particles thrown.
    #[arg(short = 'n', long, value_name = "INT")]
    pub events: Option<u64>,

    /// Override the random seed.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    // --- Physics Overrides ---
    /// Disable energy loss in the target, overriding the config file.
    #[arg(long)]
    pub no_energy_loss: bool,

    /// Disable beam straggling in the target, overriding the config file.
    #[arg(long)]
    pub no_straggling: bool,

    /// Count an event only when both reaction products are detected.
    #[arg(long)]
    pub coincidence: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S beam.energy=12.5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `range` subcommand.
#[derive(Args, Debug)]
pub struct RangeArgs {
    /// Path to the material description file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub material: PathBuf,

    /// Particle species, e.g. 'p', 'd', 'alpha' or '12C'.
    #[arg(short, long, default_value = "p", value_name = "SPEC")]
    pub particle: String,

    /// Kinetic energy (MeV).
    #[arg(short, long, required = true, value_name = "MEV")]
    pub energy: f64,

    /// Also report the energy left after traveling this distance (m).
    #[arg(short, long, value_name = "METERS")]
    pub distance: Option<f64>,

    /// Write the tabulated range-energy relation to this CSV file.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Number of entries in the written table.
    #[arg(long, default_value_t = 100, value_name = "INT")]
    pub steps: usize,
}

/// Arguments for the `coverage` subcommand.
#[derive(Args, Debug)]
pub struct CoverageArgs {
    /// Path to the detector CSV file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub detectors: PathBuf,

    /// Number of isotropic rays.
    #[arg(short = 'n', long, default_value_t = 100_000, value_name = "INT")]
    pub trials: u64,

    /// Random seed.
    #[arg(long, default_value_t = 0, value_name = "INT")]
    pub seed: u64,

    /// Source position in meters, as 'x,y,z'.
    #[arg(long, default_value = "0,0,0", value_name = "X,Y,Z")]
    pub source: String,

    /// Write the entry point of every struck detector to this CSV file.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulate_parses_overrides_and_set_values() {
        let cli = Cli::parse_from([
            "vandmc",
            "simulate",
            "-c",
            "run.toml",
            "-n",
            "5000",
            "--no-straggling",
            "-S",
            "beam.energy=12.5",
            "-S",
            "simulation.seed=3",
        ]);
        let Commands::Simulate(args) = cli.command else {
            panic!("Expected 'simulate' subcommand");
        };
        assert_eq!(args.config, PathBuf::from("run.toml"));
        assert_eq!(args.events, Some(5000));
        assert!(args.no_straggling);
        assert!(!args.no_energy_loss);
        assert_eq!(args.set_values, vec!["beam.energy=12.5", "simulation.seed=3"]);
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::parse_from(["vandmc", "range", "-m", "ch2.mat", "-e", "5", "-vv", "-j", "2"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.threads, Some(2));
        let Commands::Range(args) = cli.command else {
            panic!("Expected 'range' subcommand");
        };
        assert_eq!(args.particle, "p");
        assert_eq!(args.steps, 100);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["vandmc", "-q", "-v", "coverage", "-d", "bars.csv"]);
        assert!(result.is_err());
    }
}
