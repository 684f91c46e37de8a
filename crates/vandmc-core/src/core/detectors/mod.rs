//! Detector geometry: oriented rectangular prisms, arrays of them, and
//! intrinsic efficiency curves for the standard bar sizes.

pub mod array;
pub mod efficiency;
pub mod primitive;

pub use array::{Detector, DetectorArray, DetectorId, DetectorRole};
pub use efficiency::{Efficiency, EfficiencyCurve, EfficiencyError};
pub use primitive::{
    ApparentThickness, Face, FaceHit, GeometryError, Intersection, Primitive, SizeClass,
};
