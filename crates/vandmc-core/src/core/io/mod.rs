//! Readers and writers for the plain-text inputs of a simulation.
//!
//! Every format implements [`TextFormat`], which parses from any buffered
//! reader and attaches the file path to errors when reading from disk:
//!
//! - [`Columns`]: whitespace-separated numeric columns, used for angular
//!   distributions, efficiency curves and tabulated ranges
//! - [`Material`](crate::core::materials::Material): the line-oriented
//!   material description
//! - [`DetectorArray`](crate::core::detectors::DetectorArray): the detector
//!   CSV file

pub mod columns;
pub mod detector_file;
pub mod material_file;
pub mod traits;

pub use columns::{Columns, read_efficiency_curve, read_range_table};
pub use detector_file::{DETECTOR_HEADER, DetectorRecord};
pub use material_file::read_material_file;
pub use traits::TextFormat;

use crate::core::detectors::{EfficiencyError, GeometryError};
use crate::core::materials::{MaterialError, RangeTableError};
use crate::core::physics::AngularDistError;
use std::io;
use thiserror::Error;

/// Failure while parsing the contents of a stream.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid material: {0}")]
    Material(#[from] MaterialError),
    #[error("Invalid detector on row {row}: {source}")]
    Geometry { row: usize, source: GeometryError },
    #[error("Invalid range table: {0}")]
    RangeTable(#[from] RangeTableError),
    #[error("Invalid efficiency curve: {0}")]
    Efficiency(#[from] EfficiencyError),
    #[error("Invalid angular distribution: {0}")]
    AngularDist(#[from] AngularDistError),
}

impl ParseError {
    pub(crate) fn syntax(line: usize, message: impl Into<String>) -> Self {
        ParseError::Syntax {
            line,
            message: message.into(),
        }
    }
}

/// Failure while loading a file, with the offending path.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io { path: String, source: io::Error },
    #[error("Failed to parse '{path}': {source}")]
    Parse { path: String, source: ParseError },
}

impl LoadError {
    pub fn path(&self) -> &str {
        match self {
            LoadError::Io { path, .. } | LoadError::Parse { path, .. } => path,
        }
    }
}
