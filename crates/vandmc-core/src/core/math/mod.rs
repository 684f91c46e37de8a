//! Vector, frame and interpolation helpers used across the geometry and physics
//! models. Points and directions are both plain `nalgebra::Vector3<f64>`.

pub mod interpolate;
pub mod lines;
pub mod polygon;
pub mod transforms;

pub use interpolate::{interpolate, interpolate_table};
pub use lines::{Line, Ray, intersection_params};
pub use polygon::RegularPolygon;
pub use transforms::{
    basis_from_direction, cartesian_to_spherical, distance, pitch_roll_yaw_axes,
    spherical_to_cartesian,
};
