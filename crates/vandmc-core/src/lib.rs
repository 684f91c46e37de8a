//! # VANDMC Core Library
//!
//! A Monte Carlo engine for two-body charged-particle reactions, energy loss of
//! ions in compound materials, and ray tracing of reaction products through
//! arrays of rectangular detectors.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless models and mathematics: vector and
//!   line helpers, the Bethe-Bloch stopping-power model (`Material`), range
//!   tables, detector geometry (`Primitive`), angular distributions, reaction
//!   kinematics and plain-text readers.
//!
//! - **[`engine`]: The Logic Core.** Stateful Monte Carlo machinery. Holds the
//!   validated simulation configuration, random sampling helpers that always
//!   take an explicit RNG, progress reporting, and the per-event transport of
//!   beam and reaction products.
//!
//! - **[`workflows`]: The Public API.** Complete procedures built from the two
//!   layers below: the full reaction simulation and an isotropic coverage scan
//!   of a detector array.

pub mod core;
pub mod engine;
pub mod workflows;
