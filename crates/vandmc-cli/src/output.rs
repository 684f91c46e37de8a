use crate::error::{CliError, Result};
use serde::Serialize;
use std::path::Path;
use tracing::debug;
use vandmc::core::materials::RangeTable;
use vandmc::workflows::coverage::CoverageHit;
use vandmc::workflows::simulate::DetectedEvent;

/// One detector hit of a detected event. Lengths in meters, energies in MeV,
/// angles in radians and times in ns.
#[derive(Debug, Serialize, PartialEq)]
pub struct HitRow {
    pub event: u64,
    pub state: usize,
    pub product: &'static str,
    pub detector: usize,
    pub face: usize,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub local_x: f64,
    pub local_y: f64,
    pub local_z: f64,
    pub theta: f64,
    pub phi: f64,
    pub energy: f64,
    pub qdc: f64,
    pub tof: f64,
    pub beam_energy: f64,
    pub com_angle: f64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CoverageRow {
    pub trial: u64,
    pub detector: usize,
    pub face: usize,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct RangeRow {
    pub energy: f64,
    pub range: f64,
}

pub fn hit_rows(events: &[DetectedEvent]) -> impl Iterator<Item = HitRow> + '_ {
    events.iter().flat_map(|detected| {
        let record = &detected.record;
        record.hits.iter().map(move |hit| HitRow {
            event: detected.event,
            state: record.state,
            product: hit.product.name(),
            detector: hit.detector,
            face: hit.face.index(),
            x: hit.position.x,
            y: hit.position.y,
            z: hit.position.z,
            local_x: hit.local.x,
            local_y: hit.local.y,
            local_z: hit.local.z,
            theta: hit.theta,
            phi: hit.phi,
            energy: hit.energy,
            qdc: hit.qdc,
            tof: hit.tof,
            beam_energy: record.beam_energy,
            com_angle: record.com_angle,
        })
    })
}

pub fn coverage_rows(hits: &[CoverageHit]) -> impl Iterator<Item = CoverageRow> + '_ {
    hits.iter().map(|hit| CoverageRow {
        trial: hit.trial,
        detector: hit.detector,
        face: hit.face.index(),
        x: hit.position.x,
        y: hit.position.y,
        z: hit.position.z,
    })
}

pub fn range_rows(table: &RangeTable) -> impl Iterator<Item = RangeRow> + '_ {
    table.iter().map(|(energy, range)| RangeRow { energy, range })
}

/// Writes `rows` as CSV with a header line and returns the number of rows.
pub fn write_rows<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> Result<usize> {
    let to_error = |source: csv::Error| CliError::Output {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(to_error)?;
    let mut count = 0;
    for row in rows {
        writer.serialize(row).map_err(to_error)?;
        count += 1;
    }
    writer.flush()?;
    debug!(rows = count, "Wrote {:?}", path);
    Ok(count)
}
