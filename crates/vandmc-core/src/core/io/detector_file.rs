use super::ParseError;
use super::traits::TextFormat;
use crate::core::detectors::{Detector, DetectorArray, GeometryError, Primitive, SizeClass};
use nalgebra::Vector3;
use serde::Deserialize;
use std::io::{self, BufRead, Write};

pub const DETECTOR_HEADER: &str = "x,y,z,theta,phi,psi,type,subtype,length,width,depth,material";

/// One row of the detector CSV file. Positions are in meters and rotation
/// angles in radians. A `small`, `medium` or `large` subtype selects the
/// standard bar size and overrides the dimension columns.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DetectorRecord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub theta: f64,
    pub phi: f64,
    pub psi: f64,
    #[serde(rename = "type")]
    pub kind: String,
    pub subtype: String,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub depth: Option<f64>,
    #[serde(default)]
    pub material: Option<String>,
}

impl DetectorRecord {
    pub fn into_detector(self) -> Result<Detector, GeometryError> {
        let mut primitive = match SizeClass::from_name(&self.subtype) {
            Some(class) => Primitive::standard(class),
            None => Primitive::new(
                self.length.unwrap_or(0.0),
                self.width.unwrap_or(0.0),
                self.depth.unwrap_or(0.0),
            )?,
        };
        primitive.set_position(Vector3::new(self.x, self.y, self.z));
        primitive.set_rotation(self.theta, self.phi, self.psi);

        let mut detector = Detector::new(primitive, &self.kind);
        if !self.subtype.trim().is_empty() {
            detector.subtype = self.subtype;
        }
        detector.material = self.material.unwrap_or_default();
        Ok(detector)
    }
}

impl TextFormat for DetectorArray {
    fn read_from(reader: &mut impl BufRead) -> Result<Self, ParseError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut array = DetectorArray::new();
        for (index, record) in csv_reader.deserialize::<DetectorRecord>().enumerate() {
            let detector = record?
                .into_detector()
                .map_err(|source| ParseError::Geometry {
                    row: index + 1,
                    source,
                })?;
            array.add(detector);
        }
        Ok(array)
    }

    fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        writeln!(writer, "{DETECTOR_HEADER}")?;
        for (_, detector) in self.iter() {
            writeln!(writer, "{}", detector.detector_line())?;
        }
        Ok(())
    }
}
