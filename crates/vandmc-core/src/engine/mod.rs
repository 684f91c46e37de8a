//! # Engine Module
//!
//! Stateful Monte Carlo machinery that turns the stateless models of
//! [`crate::core`] into simulated events.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - The validated simulation setup and its builder
//! - **Run Context** ([`context`]) - Range tables and beam geometry derived once per run
//! - **Event Transport** ([`event`]) - One beam particle from the beam spot to the detectors
//! - **Sampling** ([`sampling`]) - Random helpers that always take an explicit RNG
//! - **Tallies** ([`tally`]) - Mergeable event counts and efficiencies
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting
//! - **Error Handling** ([`error`]) - Engine-level error taxonomy

pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod progress;
pub mod sampling;
pub mod tally;
