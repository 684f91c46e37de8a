use crate::cli::RangeArgs;
use crate::config::{PartialParticle, build_particle};
use crate::error::{CliError, Result};
use crate::output::{range_rows, write_rows};
use tracing::info;
use vandmc::core::io::read_material_file;
use vandmc::core::materials::{EnergyLossProfile, RangeTable};
use vandmc::engine::error::EngineError;

const TABLE_MIN_ENERGY: f64 = 0.1; // MeV

/// Stopping power and range at one energy, plus the optional slab traversal.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeReport {
    /// MeV/m.
    pub stopping_power: f64,
    /// m.
    pub range: f64,
    /// Energy left and distance traveled after the requested slab.
    pub traversal: Option<(f64, f64)>,
}

pub fn run(args: RangeArgs) -> Result<()> {
    if args.energy.is_nan() || args.energy <= 0.0 {
        return Err(CliError::Argument(format!(
            "Energy must be positive, got {} MeV",
            args.energy
        )));
    }
    info!("Loading material from {:?}", &args.material);
    let material = read_material_file(&args.material)?;
    let mut particle = build_particle(&PartialParticle::Name(args.particle.clone()))?;
    if !particle.is_charged() {
        return Err(CliError::Argument(format!(
            "'{}' is neutral and loses no energy by ionization",
            particle.name()
        )));
    }

    let report = RangeReport {
        stopping_power: material.stopping_power(args.energy, particle.z(), particle.mass()),
        range: material.range(args.energy, particle.z(), particle.mass()),
        traversal: match args.distance {
            Some(distance) => {
                particle
                    .set_material(&material, args.energy, 0.0)
                    .map_err(|source| EngineError::RangeTable {
                        particle: particle.name().to_string(),
                        source,
                    })?;
                particle
                    .table_new_energy(args.energy, distance)
                    .map(|t| (t.energy, t.distance))
            }
            None => None,
        },
    };

    println!(
        "{} at {} MeV in {} ({} g/cm3)",
        particle.name(),
        args.energy,
        material.name(),
        material.density()
    );
    println!("  Stopping power: {:.4} MeV/m", report.stopping_power);
    println!("  Range:          {:.6e} m", report.range);
    if let Some(distance) = args.distance {
        match report.traversal {
            Some((energy, _)) if energy > 0.0 => {
                println!("  After {} m:     {:.4} MeV", distance, energy)
            }
            Some((_, traveled)) => println!("  Stopped after {:.6e} m", traveled),
            None => println!("  Energy outside the tabulated range"),
        }
    }

    if let Some(path) = &args.output {
        let table = RangeTable::build(
            args.steps,
            TABLE_MIN_ENERGY.min(args.energy / 2.0),
            args.energy,
            particle.z(),
            particle.mass(),
            &material,
        )
        .map_err(|source| EngineError::RangeTable {
            particle: particle.name().to_string(),
            source,
        })?;
        let rows = write_rows(path, range_rows(&table))?;
        println!("✓ {} table entries written to: {}", rows, path.display());
    }

    Ok(())
}
