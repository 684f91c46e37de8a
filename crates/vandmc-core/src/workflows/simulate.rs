use super::chunk_ranges;
use crate::core::physics::RateParams;
use crate::engine::config::SimulationConfig;
use crate::engine::context::SimulationContext;
use crate::engine::error::EngineError;
use crate::engine::event::{EventOutcome, ReactionRecord, process_event};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tally::Tally;
use rand::{SeedableRng, rngs::StdRng};
use std::ops::Range;
use tracing::{info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Fraction of stopped beam particles above which the target is flagged as too
/// thick.
const STOPPED_BEAM_WARNING: f64 = 0.1;

/// A reaction that passed the detection criteria.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedEvent {
    /// Index of the thrown beam particle.
    pub event: u64,
    pub record: ReactionRecord,
}

#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub tally: Tally,
    /// Detected events in event order.
    pub detected: Vec<DetectedEvent>,
    /// Total reaction cross-section (mb) summed over recoil states.
    pub cross_section: f64,
    /// Reactions per second, when a beam intensity is configured.
    pub reaction_rate: Option<f64>,
    /// Beam time (s) represented by the thrown particles.
    pub beam_time: Option<f64>,
}

struct ChunkResult {
    tally: Tally,
    detected: Vec<DetectedEvent>,
}

#[instrument(skip_all, name = "simulation_workflow")]
pub fn run(
    config: &SimulationConfig,
    reporter: &ProgressReporter,
) -> Result<SimulationSummary, EngineError> {
    config.validate()?;

    reporter.report(Progress::PhaseStart { name: "Setup" });
    info!(
        beam = config.kinematics.beam().name(),
        target = config.target.material().name(),
        energy = config.beam.energy,
        detectors = config.detectors.len(),
        states = config.kinematics.num_states(),
        "Preparing simulation."
    );
    let context = SimulationContext::new(config, reporter)?;
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart { name: "Simulation" });
    reporter.report(Progress::TaskStart {
        total_steps: config.run.events,
    });
    let chunks = chunk_ranges(config.run.events, config.run.chunk_size);
    let seed = config.run.seed;

    #[cfg(not(feature = "parallel"))]
    let results = chunks
        .into_iter()
        .map(|(index, range)| run_chunk(&context, seed.wrapping_add(index), range))
        .collect::<Result<Vec<_>, _>>()?;

    #[cfg(feature = "parallel")]
    let results = chunks
        .into_par_iter()
        .map(|(index, range)| run_chunk(&context, seed.wrapping_add(index), range))
        .collect::<Result<Vec<_>, _>>()?;

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    let mut tally = Tally::new(config.detectors.len(), config.kinematics.num_states());
    let mut detected = Vec::new();
    for result in results {
        tally.merge(&result.tally);
        detected.extend(result.detected);
    }

    let cross_section = config.kinematics.total_cross_section();
    let reaction_rate = config
        .beam
        .intensity
        .map(|intensity| RateParams::new(intensity, &config.target).rate(cross_section));
    let beam_time = config
        .beam
        .intensity
        .map(|intensity| tally.simulated as f64 / intensity);

    if tally.beam_stopped_fraction() > STOPPED_BEAM_WARNING {
        warn!(
            "{:.1}% of beam particles stopped in the target. The target may be too thick.",
            100.0 * tally.beam_stopped_fraction()
        );
    }
    info!(
        simulated = tally.simulated,
        reactions = tally.reactions,
        detected = tally.detected,
        geometric_efficiency = tally.geometric_efficiency(),
        detection_efficiency = tally.detection_efficiency(),
        "Simulation complete."
    );

    Ok(SimulationSummary {
        tally,
        detected,
        cross_section,
        reaction_rate,
        beam_time,
    })
}

fn run_chunk(
    context: &SimulationContext,
    seed: u64,
    events: Range<u64>,
) -> Result<ChunkResult, EngineError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tally = Tally::new(
        context.config.detectors.len(),
        context.config.kinematics.num_states(),
    );
    let mut detected = Vec::new();
    let steps = events.end - events.start;
    for event in events {
        let outcome = process_event(context, &mut rng)?;
        tally.record(&outcome);
        if let EventOutcome::Reaction(record) = outcome {
            if record.detected {
                detected.push(DetectedEvent { event, record });
            }
        }
    }
    context.reporter.report(Progress::TaskAdvance { steps });
    Ok(ChunkResult { tally, detected })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::tests::builder;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[test]
    fn run_is_reproducible_for_a_fixed_seed() {
        let config = builder().events(600).chunk_size(128).seed(42).build().unwrap();
        let reporter = ProgressReporter::new();
        let a = run(&config, &reporter).unwrap();
        let b = run(&config, &reporter).unwrap();
        assert_eq!(a.tally, b.tally);
        assert_eq!(a.detected, b.detected);
        assert_eq!(a.tally.simulated, 600);
    }

    #[test]
    fn different_seeds_give_different_events() {
        let reporter = ProgressReporter::new();
        let a = run(&builder().events(400).seed(1).build().unwrap(), &reporter).unwrap();
        let b = run(&builder().events(400).seed(2).build().unwrap(), &reporter).unwrap();
        let first = |s: &SimulationSummary| {
            s.detected.first().map(|d| d.record.interaction)
        };
        assert!(a.detected.is_empty() || first(&a) != first(&b));
    }

    #[test]
    fn progress_advances_by_every_event() {
        let config = builder().events(250).chunk_size(100).build().unwrap();
        let total = AtomicU64::new(0);
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::TaskAdvance { steps } = event {
                total.fetch_add(steps, Ordering::Relaxed);
            }
        }));
        run(&config, &reporter).unwrap();
        assert_eq!(total.load(Ordering::Relaxed), 250);
    }

    #[test]
    fn detected_events_are_ordered_and_flagged() {
        let config = builder()
            .events(3000)
            .chunk_size(500)
            .qdc_window(0.0, 100.0)
            .build()
            .unwrap();
        let summary = run(&config, &ProgressReporter::new()).unwrap();
        assert_eq!(summary.tally.detected as usize, summary.detected.len());
        assert!(summary.detected.windows(2).all(|w| w[0].event < w[1].event));
        assert!(summary.detected.iter().all(|d| d.record.detected));
    }

    #[test]
    fn rates_need_a_beam_intensity() {
        let reporter = ProgressReporter::new();
        let without = run(&builder().events(10).build().unwrap(), &reporter).unwrap();
        assert!(without.reaction_rate.is_none());
        assert!(without.beam_time.is_none());

        let with = run(&builder().events(10).intensity(1e6).build().unwrap(), &reporter).unwrap();
        assert!(with.reaction_rate.unwrap() > 0.0);
        assert!((with.beam_time.unwrap() - 1e-5).abs() < 1e-15);
        assert_eq!(with.cross_section, 10.0);
    }
}
