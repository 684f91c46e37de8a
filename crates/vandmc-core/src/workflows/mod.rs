//! # Workflows Module
//!
//! Complete procedures that tie the [`crate::core`] models and the
//! [`crate::engine`] machinery together. These are the entry points used by the
//! command line driver.
//!
//! - [`simulate`] - The full reaction Monte Carlo, from beam spot to detector hits
//! - [`coverage`] - Geometric efficiency of a detector array for an isotropic point source
//!
//! Both split their work into independently seeded chunks of events, so a run
//! gives the same answer whether or not the `parallel` feature is enabled.

pub mod coverage;
pub mod simulate;

use std::ops::Range;

/// Splits `0..total` into consecutive ranges of at most `chunk_size` events,
/// each paired with its chunk index.
pub(crate) fn chunk_ranges(total: u64, chunk_size: u64) -> Vec<(u64, Range<u64>)> {
    let chunk_size = chunk_size.max(1);
    (0..total.div_ceil(chunk_size))
        .map(|index| {
            let start = index * chunk_size;
            (index, start..(start + chunk_size).min(total))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_ranges_cover_every_event_once() {
        let chunks = chunk_ranges(2500, 1000);
        assert_eq!(
            chunks,
            vec![(0, 0..1000), (1, 1000..2000), (2, 2000..2500)]
        );
    }

    #[test]
    fn chunk_ranges_handle_exact_and_empty_totals() {
        assert_eq!(chunk_ranges(10, 5).len(), 2);
        assert!(chunk_ranges(0, 5).is_empty());
        assert_eq!(chunk_ranges(3, 0), vec![(0, 0..1), (1, 1..2), (2, 2..3)]);
    }
}
