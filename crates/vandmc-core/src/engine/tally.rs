use super::event::{EventOutcome, Product};

/// Running counts over processed events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tally {
    pub simulated: u64,
    pub beam_missed: u64,
    pub beam_stopped: u64,
    pub below_threshold: u64,
    pub reactions: u64,
    pub ejectile_stopped: u64,
    pub recoil_stopped: u64,
    /// Product trajectories crossing any detector.
    pub geometric_hits: u64,
    pub ejectile_hits: u64,
    pub recoil_hits: u64,
    pub detected: u64,
    /// Registered hits per detector, in array order.
    pub detector_hits: Vec<u64>,
    /// Reactions per recoil state.
    pub state_reactions: Vec<u64>,
}

impl Tally {
    pub fn new(num_detectors: usize, num_states: usize) -> Self {
        Self {
            detector_hits: vec![0; num_detectors],
            state_reactions: vec![0; num_states],
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: &EventOutcome) {
        self.simulated += 1;
        let record = match outcome {
            EventOutcome::BeamMissed => {
                self.beam_missed += 1;
                return;
            }
            EventOutcome::BeamStopped => {
                self.beam_stopped += 1;
                return;
            }
            EventOutcome::BelowThreshold => {
                self.below_threshold += 1;
                return;
            }
            EventOutcome::Reaction(record) => record,
        };

        self.reactions += 1;
        bump(&mut self.state_reactions, record.state);
        self.ejectile_stopped += u64::from(record.ejectile_stopped);
        self.recoil_stopped += u64::from(record.recoil_stopped);
        self.geometric_hits += u64::from(record.geometric_hits);
        for hit in &record.hits {
            bump(&mut self.detector_hits, hit.detector);
            match hit.product {
                Product::Ejectile => self.ejectile_hits += 1,
                Product::Recoil => self.recoil_hits += 1,
            }
        }
        self.detected += u64::from(record.detected);
    }

    pub fn merge(&mut self, other: &Tally) {
        self.simulated += other.simulated;
        self.beam_missed += other.beam_missed;
        self.beam_stopped += other.beam_stopped;
        self.below_threshold += other.below_threshold;
        self.reactions += other.reactions;
        self.ejectile_stopped += other.ejectile_stopped;
        self.recoil_stopped += other.recoil_stopped;
        self.geometric_hits += other.geometric_hits;
        self.ejectile_hits += other.ejectile_hits;
        self.recoil_hits += other.recoil_hits;
        self.detected += other.detected;
        merge_counts(&mut self.detector_hits, &other.detector_hits);
        merge_counts(&mut self.state_reactions, &other.state_reactions);
    }

    /// Geometric hits per reaction.
    pub fn geometric_efficiency(&self) -> f64 {
        ratio(self.geometric_hits, self.reactions)
    }

    /// Detected events per reaction.
    pub fn detection_efficiency(&self) -> f64 {
        ratio(self.detected, self.reactions)
    }

    /// Fraction of thrown beam particles that stopped in the target.
    pub fn beam_stopped_fraction(&self) -> f64 {
        ratio(self.beam_stopped, self.simulated)
    }
}

fn bump(counts: &mut Vec<u64>, index: usize) {
    if counts.len() <= index {
        counts.resize(index + 1, 0);
    }
    counts[index] += 1;
}

fn merge_counts(into: &mut Vec<u64>, from: &[u64]) {
    if into.len() < from.len() {
        into.resize(from.len(), 0);
    }
    for (a, b) in into.iter_mut().zip(from) {
        *a += b;
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::detectors::Face;
    use crate::engine::event::{Hit, ReactionRecord};
    use nalgebra::Vector3;

    fn hit(product: Product, detector: usize) -> Hit {
        Hit {
            product,
            detector,
            face: Face::Front,
            position: Vector3::zeros(),
            local: Vector3::zeros(),
            theta: 0.0,
            phi: 0.0,
            energy: 1.0,
            qdc: 0.5,
            tof: 10.0,
        }
    }

    fn reaction(state: usize, hits: Vec<Hit>) -> EventOutcome {
        EventOutcome::Reaction(ReactionRecord {
            state,
            beam_energy: 10.0,
            interaction: Vector3::zeros(),
            beam_direction: Vector3::z(),
            com_angle: 1.0,
            ejectile_stopped: false,
            recoil_stopped: true,
            geometric_hits: hits.len() as u32 + 1,
            detected: !hits.is_empty(),
            hits,
        })
    }

    #[test]
    fn record_counts_each_outcome() {
        let mut tally = Tally::new(2, 2);
        tally.record(&EventOutcome::BeamMissed);
        tally.record(&EventOutcome::BeamStopped);
        tally.record(&EventOutcome::BelowThreshold);
        tally.record(&reaction(1, vec![hit(Product::Ejectile, 0), hit(Product::Recoil, 1)]));
        tally.record(&reaction(0, vec![]));

        assert_eq!(tally.simulated, 5);
        assert_eq!(tally.beam_missed, 1);
        assert_eq!(tally.beam_stopped, 1);
        assert_eq!(tally.below_threshold, 1);
        assert_eq!(tally.reactions, 2);
        assert_eq!(tally.recoil_stopped, 2);
        assert_eq!(tally.geometric_hits, 4);
        assert_eq!(tally.ejectile_hits, 1);
        assert_eq!(tally.recoil_hits, 1);
        assert_eq!(tally.detected, 1);
        assert_eq!(tally.detector_hits, vec![1, 1]);
        assert_eq!(tally.state_reactions, vec![1, 1]);
        assert_eq!(tally.detection_efficiency(), 0.5);
        assert_eq!(tally.geometric_efficiency(), 2.0);
        assert_eq!(tally.beam_stopped_fraction(), 0.2);
    }

    #[test]
    fn merge_adds_counts_and_extends_vectors() {
        let mut a = Tally::new(1, 1);
        a.record(&reaction(0, vec![hit(Product::Ejectile, 0)]));
        let mut b = Tally::new(3, 1);
        b.record(&reaction(0, vec![hit(Product::Ejectile, 2)]));
        a.merge(&b);
        assert_eq!(a.reactions, 2);
        assert_eq!(a.detector_hits, vec![1, 0, 1]);
        assert_eq!(a.state_reactions, vec![2]);
    }

    #[test]
    fn efficiencies_are_zero_without_reactions() {
        let tally = Tally::new(0, 0);
        assert_eq!(tally.detection_efficiency(), 0.0);
        assert_eq!(tally.geometric_efficiency(), 0.0);
        assert_eq!(tally.beam_stopped_fraction(), 0.0);
    }
}
