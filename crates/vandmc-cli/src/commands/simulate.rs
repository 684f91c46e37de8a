use crate::cli::SimulateArgs;
use crate::config::PartialRunConfig;
use crate::error::Result;
use crate::output::{hit_rows, write_rows};
use crate::utils::progress::CliProgressHandler;
use tracing::{info, warn};
use vandmc::engine::config::SimulationConfig;
use vandmc::engine::progress::ProgressReporter;
use vandmc::workflows::simulate::{self, SimulationSummary};

pub fn run(args: SimulateArgs, show_progress: bool) -> Result<()> {
    let partial_config = PartialRunConfig::from_file(&args.config)?;
    info!("Merging configuration from file and CLI arguments...");
    let app_config = partial_config.merge_with_cli(&args)?;
    let config = &app_config.core_config;

    let progress_handler = if show_progress {
        CliProgressHandler::new()
    } else {
        CliProgressHandler::hidden()
    };
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Simulating {} {} on {} ({} detectors)...",
        config.run.events,
        config.kinematics.beam().name(),
        config.target.material().name(),
        config.detectors.len()
    );
    info!("Invoking the core simulation workflow...");
    let summary = simulate::run(config, &reporter)?;

    print_summary(config, &summary);

    match &app_config.output {
        Some(path) => {
            let rows = write_rows(path, hit_rows(&summary.detected))?;
            info!("Wrote {} hit rows to {:?}", rows, path);
            println!("✓ {} hits written to: {}", rows, path.display());
        }
        None if summary.tally.detected > 0 => {
            warn!("No output file given, detected hits were not written.");
        }
        None => {}
    }

    Ok(())
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}

pub fn print_summary(config: &SimulationConfig, summary: &SimulationSummary) {
    let tally = &summary.tally;
    println!();
    println!("Beam particles thrown:   {}", tally.simulated);
    println!(
        "  missed target:         {} ({:.2}%)",
        tally.beam_missed,
        percent(tally.beam_missed, tally.simulated)
    );
    println!(
        "  stopped in target:     {} ({:.2}%)",
        tally.beam_stopped,
        percent(tally.beam_stopped, tally.simulated)
    );
    println!(
        "  below threshold:       {} ({:.2}%)",
        tally.below_threshold,
        percent(tally.below_threshold, tally.simulated)
    );
    println!("Reactions:               {}", tally.reactions);
    for (state, count) in tally.state_reactions.iter().enumerate() {
        let excitation = config
            .kinematics
            .states()
            .get(state)
            .map_or(0.0, |s| s.excitation);
        println!(
            "  state {} (Ex = {:.3} MeV): {} ({:.2}%)",
            state,
            excitation,
            count,
            percent(*count, tally.reactions)
        );
    }
    println!(
        "Products stopped:        {} ejectiles, {} recoils",
        tally.ejectile_stopped, tally.recoil_stopped
    );
    println!(
        "Geometric hits:          {} ({:.4} per reaction)",
        tally.geometric_hits,
        tally.geometric_efficiency()
    );
    println!(
        "Registered hits:         {} ejectiles, {} recoils",
        tally.ejectile_hits, tally.recoil_hits
    );
    println!(
        "Detected events:         {} ({:.3}% of reactions)",
        tally.detected,
        100.0 * tally.detection_efficiency()
    );
    for (detector, hits) in tally.detector_hits.iter().enumerate().filter(|(_, h)| **h > 0) {
        println!("  detector {:>4}: {}", detector, hits);
    }
    println!("Total cross-section:     {:.4} mb", summary.cross_section);
    if let Some(rate) = summary.reaction_rate {
        println!("Reaction rate:           {:.4e} /s", rate);
    }
    if let Some(beam_time) = summary.beam_time {
        println!("Equivalent beam time:    {:.4e} s", beam_time);
    }
}
