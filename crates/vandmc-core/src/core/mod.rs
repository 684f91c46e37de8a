//! # Core Module
//!
//! Stateless building blocks shared by every simulation driver.
//!
//! ## Architecture
//!
//! - **Mathematics** ([`math`]) - Spherical coordinates, local frames, 2D rays and
//!   segments, regular polygons and linear interpolation
//! - **Energy Loss** ([`materials`]) - Physical constants, the element table,
//!   the Bethe-Bloch `Material` model and interpolated `RangeTable`s
//! - **Geometry** ([`detectors`]) - Oriented rectangular prisms, detector arrays
//!   and intrinsic efficiency curves
//! - **Reaction Physics** ([`physics`]) - Particles, targets, angular
//!   distributions, two-body kinematics and multiple scattering
//! - **File I/O** ([`io`]) - Readers for material, detector, distribution and
//!   efficiency files
//!
//! ## Units
//!
//! Unless stated otherwise, energies are in MeV, masses in MeV/c², lengths in
//! meters, angles in radians, densities in g/cm³ and areal thicknesses in mg/cm².

pub mod detectors;
pub mod io;
pub mod materials;
pub mod math;
pub mod physics;
