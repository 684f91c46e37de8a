use crate::cli::CoverageArgs;
use crate::error::{CliError, Result};
use crate::output::{coverage_rows, write_rows};
use crate::utils::{parser, progress::CliProgressHandler};
use tracing::info;
use vandmc::core::detectors::DetectorArray;
use vandmc::core::io::TextFormat;
use vandmc::engine::progress::ProgressReporter;
use vandmc::workflows::coverage::{self, CoverageConfig};

pub fn run(args: CoverageArgs, show_progress: bool) -> Result<()> {
    let source = parser::parse_vector(&args.source).map_err(|e| CliError::Argument(e.to_string()))?;
    info!("Loading detectors from {:?}", &args.detectors);
    let detectors = DetectorArray::read_from_path(&args.detectors)?;

    let config = CoverageConfig {
        trials: args.trials,
        seed: args.seed,
        source,
        record_hits: args.output.is_some(),
        ..CoverageConfig::default()
    };

    let progress_handler = if show_progress {
        CliProgressHandler::new()
    } else {
        CliProgressHandler::hidden()
    };
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Scanning {} detectors with {} rays from ({}, {}, {}) m...",
        detectors.len(),
        config.trials,
        source.x,
        source.y,
        source.z
    );
    let summary = coverage::run(&detectors, &config, &reporter)?;

    println!();
    println!(
        "Covered:      {} of {} ({:.4}%)",
        summary.covered,
        summary.trials,
        100.0 * summary.efficiency()
    );
    println!("Solid angle:  {:.5} sr", summary.solid_angle());
    for (index, (_, detector)) in detectors.iter().enumerate() {
        println!(
            "  {:>4} {:<8} {:<8} {:.5} sr",
            index,
            detector.kind,
            detector.subtype,
            summary.detector_solid_angle(index)
        );
    }

    if let Some(path) = &args.output {
        let rows = write_rows(path, coverage_rows(&summary.hits))?;
        println!("✓ {} detector entries written to: {}", rows, path.display());
    }

    Ok(())
}
