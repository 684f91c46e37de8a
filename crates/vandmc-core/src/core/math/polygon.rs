use super::lines::{Line, Ray};
use nalgebra::Vector2;
use std::f64::consts::TAU;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PolygonError {
    #[error("A regular polygon needs at least 3 sides, got {0}")]
    TooFewSides(usize),
    #[error("Inscribed radius must be positive, got {0}")]
    InvalidRadius(f64),
}

/// Regular polygon centered on the origin, with its first edge crossing the +x
/// axis. Points on an edge count as inside.
#[derive(Debug, Clone)]
pub struct RegularPolygon {
    sides: usize,
    sector: f64,
    circumradius: f64,
    edges: Vec<Line>,
}

impl RegularPolygon {
    /// `inscribed_radius` is the radius of the largest circle that fits
    /// inside the polygon.
    pub fn new(inscribed_radius: f64, sides: usize) -> Result<Self, PolygonError> {
        if sides < 3 {
            return Err(PolygonError::TooFewSides(sides));
        }
        if !(inscribed_radius > 0.0) {
            return Err(PolygonError::InvalidRadius(inscribed_radius));
        }

        let sector = TAU / sides as f64;
        let circumradius = inscribed_radius / (sector / 2.0).cos();
        let vertex = |k: usize| {
            let angle = -sector / 2.0 + k as f64 * sector;
            Vector2::new(circumradius * angle.cos(), circumradius * angle.sin())
        };
        let edges = (0..sides).map(|k| Line::new(vertex(k), vertex(k + 1))).collect();

        Ok(Self {
            sides,
            sector,
            circumradius,
            edges,
        })
    }

    pub fn sides(&self) -> usize {
        self.sides
    }

    /// Angle subtended by one edge at the center.
    pub fn sector(&self) -> f64 {
        self.sector
    }

    pub fn circumradius(&self) -> f64 {
        self.circumradius
    }

    pub fn side_length(&self) -> f64 {
        2.0 * self.circumradius * (self.sector / 2.0).sin()
    }

    pub fn edges(&self) -> &[Line] {
        &self.edges
    }

    /// Even-odd test with a ray cast along +x.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let probe = Ray::through(x, y, x + 1.0, y);
        let crossings = self
            .edges
            .iter()
            .filter(|edge| edge.intersect_ray(&probe).is_some())
            .count();
        crossings % 2 == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_degenerate_polygons() {
        assert_eq!(
            RegularPolygon::new(1.0, 2).unwrap_err(),
            PolygonError::TooFewSides(2)
        );
        assert_eq!(
            RegularPolygon::new(0.0, 6).unwrap_err(),
            PolygonError::InvalidRadius(0.0)
        );
    }

    #[test]
    fn square_has_expected_circumradius_and_side() {
        let square = RegularPolygon::new(1.0, 4).unwrap();
        assert!((square.circumradius() - 2f64.sqrt()).abs() < 1e-12);
        assert!((square.side_length() - 2.0).abs() < 1e-12);
        assert_eq!(square.edges().len(), 4);
    }

    #[test]
    fn square_contains_interior_points_and_rejects_exterior_points() {
        let square = RegularPolygon::new(1.0, 4).unwrap();
        assert!(square.contains(0.0, 0.0));
        assert!(square.contains(0.9, -0.3));
        assert!(!square.contains(1.1, 0.0));
        assert!(!square.contains(0.0, 1.2));
        assert!(!square.contains(-3.0, 0.4));
    }

    #[test]
    fn hexagon_contains_points_inside_inscribed_circle() {
        let hexagon = RegularPolygon::new(0.5, 6).unwrap();
        for k in 0..12 {
            let angle = k as f64 * TAU / 12.0 + 0.1;
            assert!(hexagon.contains(0.45 * angle.cos(), 0.45 * angle.sin()));
            assert!(!hexagon.contains(0.7 * angle.cos(), 0.7 * angle.sin()));
        }
    }
}
