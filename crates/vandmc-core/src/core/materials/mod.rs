//! Energy loss of charged particles in matter.
//!
//! [`Material`] evaluates a Bethe-Bloch stopping power with shell and density
//! corrections for any compound. Because integrating it per event is costly,
//! [`RangeTable`] tabulates the range-energy relation once per particle species
//! and material and answers lookups by linear interpolation.

pub mod constants;
pub mod elements;
pub mod material;
pub mod range_table;

pub use material::{Element, Material, MaterialError};
pub use range_table::{EnergyLossProfile, RangeTable, RangeTableError, Traversal};
