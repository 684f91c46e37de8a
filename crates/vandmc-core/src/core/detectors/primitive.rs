use crate::core::math::{pitch_roll_yaw_axes, spherical_to_cartesian};
use nalgebra::{Matrix3, Vector3};
use rand::Rng;
use std::sync::OnceLock;
use thiserror::Error;

const PARALLEL_EPSILON: f64 = 1e-12;
const BOUNDS_EPSILON: f64 = 1e-12;
const SIZE_MATCH_EPSILON: f64 = 1e-9;
const ORTHOGONAL_EPSILON: f64 = 1e-9;

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("Detector dimensions must be positive (length {length}, width {width}, depth {depth})")]
    InvalidDimensions { length: f64, width: f64, depth: f64 },
    #[error("Invalid face index {0}, expected 0-5")]
    InvalidFace(usize),
    #[error("Local unit vectors must be non-zero")]
    DegenerateAxes,
    #[error("Local unit vectors must be mutually orthogonal")]
    NonOrthogonalAxes,
}

/// Faces of a rectangular prism.
///
/// Front and back lie across the local z axis, right and left across x, top
/// and bottom across y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Face {
    Front = 0,
    Right = 1,
    Back = 2,
    Left = 3,
    Top = 4,
    Bottom = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::Front,
        Face::Right,
        Face::Back,
        Face::Left,
        Face::Top,
        Face::Bottom,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Face> {
        Self::ALL.get(index).copied()
    }

    pub fn opposite(self) -> Face {
        match self {
            Face::Front => Face::Back,
            Face::Right => Face::Left,
            Face::Back => Face::Front,
            Face::Left => Face::Right,
            Face::Top => Face::Bottom,
            Face::Bottom => Face::Top,
        }
    }
}

impl TryFrom<usize> for Face {
    type Error = GeometryError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Face::from_index(index).ok_or(GeometryError::InvalidFace(index))
    }
}

/// Standard VANDLE bar sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    /// `(length, width, depth)` in meters.
    pub fn dimensions(self) -> (f64, f64, f64) {
        match self {
            SizeClass::Small => (0.6, 0.03, 0.03),
            SizeClass::Medium => (1.2, 0.05, 0.03),
            SizeClass::Large => (2.0, 0.05, 0.05),
        }
    }

    pub fn from_dimensions(length: f64, width: f64, depth: f64) -> Option<Self> {
        [SizeClass::Small, SizeClass::Medium, SizeClass::Large]
            .into_iter()
            .find(|class| {
                let (l, w, d) = class.dimensions();
                (l - length).abs() < SIZE_MATCH_EPSILON
                    && (w - width).abs() < SIZE_MATCH_EPSILON
                    && (d - depth).abs() < SIZE_MATCH_EPSILON
            })
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "small" => Some(SizeClass::Small),
            "medium" => Some(SizeClass::Medium),
            "large" => Some(SizeClass::Large),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SizeClass::Small => "small",
            SizeClass::Medium => "medium",
            SizeClass::Large => "large",
        }
    }
}

/// A ray crossing one face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceHit {
    pub face: Face,
    /// Global coordinates of the crossing.
    pub point: Vector3<f64>,
    /// Ray parameter at the crossing.
    pub t: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Nearest struck face.
    pub entry: FaceHit,
    /// Farthest struck face, absent when the ray starts inside the volume.
    pub exit: Option<FaceHit>,
    /// Local coordinates of the entry point.
    pub local: Vector3<f64>,
}

impl Intersection {
    /// Distance between the entry and exit points.
    pub fn path_length(&self) -> f64 {
        self.exit
            .map(|exit| (exit.point - self.entry.point).norm())
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApparentThickness {
    pub thickness: f64,
    pub first: Vector3<f64>,
    pub second: Vector3<f64>,
}

/// Oriented rectangular prism.
///
/// Width runs along the local x axis, length along y and depth along z. Global
/// face centers are cached and recomputed lazily after any mutation.
#[derive(Debug, Clone)]
pub struct Primitive {
    position: Vector3<f64>,
    rotation: (f64, f64, f64),
    axes: Matrix3<f64>,
    length: f64,
    width: f64,
    depth: f64,
    size_class: Option<SizeClass>,
    front_face: Face,
    face_centers: OnceLock<[Vector3<f64>; 6]>,
}

impl Primitive {
    pub fn new(length: f64, width: f64, depth: f64) -> Result<Self, GeometryError> {
        let mut primitive = Self {
            position: Vector3::zeros(),
            rotation: (0.0, 0.0, 0.0),
            axes: Matrix3::identity(),
            length: 0.0,
            width: 0.0,
            depth: 0.0,
            size_class: None,
            front_face: Face::Front,
            face_centers: OnceLock::new(),
        };
        primitive.set_size(length, width, depth)?;
        Ok(primitive)
    }

    pub fn standard(class: SizeClass) -> Self {
        let (length, width, depth) = class.dimensions();
        Self {
            position: Vector3::zeros(),
            rotation: (0.0, 0.0, 0.0),
            axes: Matrix3::identity(),
            length,
            width,
            depth,
            size_class: Some(class),
            front_face: Face::Front,
            face_centers: OnceLock::new(),
        }
    }

    pub fn position(&self) -> &Vector3<f64> {
        &self.position
    }

    /// `(theta, phi, psi)` in radians.
    pub fn rotation(&self) -> (f64, f64, f64) {
        self.rotation
    }

    /// Columns are the local x, y and z axes in global coordinates.
    pub fn axes(&self) -> &Matrix3<f64> {
        &self.axes
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn depth(&self) -> f64 {
        self.depth
    }

    pub fn size_class(&self) -> Option<SizeClass> {
        self.size_class
    }

    pub fn front_face(&self) -> Face {
        self.front_face
    }

    pub fn back_face(&self) -> Face {
        self.front_face.opposite()
    }

    pub fn set_position(&mut self, position: Vector3<f64>) {
        self.position = position;
        self.invalidate();
    }

    pub fn set_polar_position(&mut self, r: f64, theta: f64, phi: f64) {
        self.set_position(spherical_to_cartesian(r, theta, phi));
    }

    /// Orients the prism by pitch-roll-yaw angles (radians).
    pub fn set_rotation(&mut self, theta: f64, phi: f64, psi: f64) {
        let (x, y, z) = pitch_roll_yaw_axes(theta, phi, psi);
        self.rotation = (theta, phi, psi);
        self.axes = Matrix3::from_columns(&[x, y, z]);
        self.invalidate();
    }

    /// Sets the local axes directly. The axes are normalized and must be
    /// mutually orthogonal. The stored rotation angles are left untouched.
    pub fn set_unit_vectors(
        &mut self,
        x: Vector3<f64>,
        y: Vector3<f64>,
        z: Vector3<f64>,
    ) -> Result<(), GeometryError> {
        let (x, y, z) = match (x.try_normalize(0.0), y.try_normalize(0.0), z.try_normalize(0.0)) {
            (Some(x), Some(y), Some(z)) => (x, y, z),
            _ => return Err(GeometryError::DegenerateAxes),
        };
        if [x.dot(&y), y.dot(&z), x.dot(&z)]
            .iter()
            .any(|d| d.abs() > ORTHOGONAL_EPSILON)
        {
            return Err(GeometryError::NonOrthogonalAxes);
        }
        self.axes = Matrix3::from_columns(&[x, y, z]);
        self.invalidate();
        Ok(())
    }

    /// Sets the dimensions, recognizing the standard bar sizes.
    pub fn set_size(&mut self, length: f64, width: f64, depth: f64) -> Result<(), GeometryError> {
        if !(length > 0.0 && width > 0.0 && depth > 0.0) {
            return Err(GeometryError::InvalidDimensions {
                length,
                width,
                depth,
            });
        }
        self.length = length;
        self.width = width;
        self.depth = depth;
        self.size_class = SizeClass::from_dimensions(length, width, depth);
        self.invalidate();
        Ok(())
    }

    pub fn set_size_class(&mut self, class: SizeClass) {
        let (length, width, depth) = class.dimensions();
        self.length = length;
        self.width = width;
        self.depth = depth;
        self.size_class = Some(class);
        self.invalidate();
    }

    /// The back face always follows as the opposite face.
    pub fn set_front_face(&mut self, face: Face) {
        self.front_face = face;
    }

    /// Marks the cached face centers dirty; they are rebuilt on next use.
    fn invalidate(&mut self) {
        self.face_centers = OnceLock::new();
    }

    fn axis(&self, i: usize) -> Vector3<f64> {
        self.axes.column(i).into_owned()
    }

    fn centers(&self) -> &[Vector3<f64>; 6] {
        self.face_centers.get_or_init(|| {
            let (x, y, z) = (self.axis(0), self.axis(1), self.axis(2));
            let c = self.position;
            [
                c - z * (self.depth / 2.0),
                c + x * (self.width / 2.0),
                c + z * (self.depth / 2.0),
                c - x * (self.width / 2.0),
                c + y * (self.length / 2.0),
                c - y * (self.length / 2.0),
            ]
        })
    }

    pub fn face_center(&self, face: Face) -> Vector3<f64> {
        self.centers()[face.index()]
    }

    pub fn face_normal(&self, face: Face) -> Vector3<f64> {
        match face {
            Face::Front => self.axis(2),
            Face::Right => self.axis(0),
            Face::Back => -self.axis(2),
            Face::Left => -self.axis(0),
            Face::Top => self.axis(1),
            Face::Bottom => -self.axis(1),
        }
    }

    pub fn local_coords(&self, world: &Vector3<f64>) -> Vector3<f64> {
        self.axes.transpose() * (world - self.position)
    }

    pub fn to_global(&self, local: &Vector3<f64>) -> Vector3<f64> {
        self.position + self.axes * local
    }

    /// Inclusive bounds test of a local point against the extent of `face`.
    pub fn within_face(&self, face: Face, local: &Vector3<f64>) -> bool {
        let half_w = self.width / 2.0 + BOUNDS_EPSILON;
        let half_l = self.length / 2.0 + BOUNDS_EPSILON;
        let half_d = self.depth / 2.0 + BOUNDS_EPSILON;
        match face {
            Face::Front | Face::Back => local.x.abs() <= half_w && local.y.abs() <= half_l,
            Face::Right | Face::Left => local.z.abs() <= half_d && local.y.abs() <= half_l,
            Face::Top | Face::Bottom => local.x.abs() <= half_w && local.z.abs() <= half_d,
        }
    }

    /// Crossing of the ray with the infinite plane holding `face`.
    pub fn plane_intersect(
        &self,
        origin: &Vector3<f64>,
        direction: &Vector3<f64>,
        face: Face,
    ) -> Option<FaceHit> {
        let normal = self.face_normal(face);
        let denom = direction.dot(&normal);
        if denom.abs() < PARALLEL_EPSILON * direction.norm() {
            return None;
        }
        let t = (self.face_center(face) - origin).dot(&normal) / denom;
        if t < 0.0 {
            return None;
        }
        Some(FaceHit {
            face,
            point: origin + direction * t,
            t,
        })
    }

    /// Crossing of the ray with the bounded `face`.
    pub fn face_intersect(
        &self,
        origin: &Vector3<f64>,
        direction: &Vector3<f64>,
        face: Face,
    ) -> Option<FaceHit> {
        self.plane_intersect(origin, direction, face)
            .filter(|hit| self.within_face(face, &self.local_coords(&hit.point)))
    }

    /// Traces the ray `origin + t·direction` (t ≥ 0) through the prism.
    pub fn intersect(
        &self,
        origin: &Vector3<f64>,
        direction: &Vector3<f64>,
    ) -> Option<Intersection> {
        let mut hits: Vec<FaceHit> = Face::ALL
            .iter()
            .filter_map(|&face| self.face_intersect(origin, direction, face))
            .collect();
        if hits.is_empty() {
            return None;
        }
        hits.sort_by(|a, b| a.t.total_cmp(&b.t));

        let entry = hits[0];
        let exit = (hits.len() > 1).then(|| hits[hits.len() - 1]);
        Some(Intersection {
            entry,
            exit,
            local: self.local_coords(&entry.point),
        })
    }

    /// Path length through the prism between two named faces. `None` for
    /// invalid face indices or when the ray misses either face.
    pub fn apparent_thickness(
        &self,
        origin: &Vector3<f64>,
        direction: &Vector3<f64>,
        first: usize,
        second: usize,
    ) -> Option<ApparentThickness> {
        let (first, second) = (Face::from_index(first)?, Face::from_index(second)?);
        let first = self.face_intersect(origin, direction, first)?.point;
        let second = self.face_intersect(origin, direction, second)?.point;
        Some(ApparentThickness {
            thickness: (second - first).norm(),
            first,
            second,
        })
    }

    /// Uniformly distributed point inside the volume, in global coordinates.
    pub fn random_point_inside(&self, rng: &mut impl Rng) -> Vector3<f64> {
        let local = Vector3::new(
            (rng.r#gen::<f64>() - 0.5) * self.width,
            (rng.r#gen::<f64>() - 0.5) * self.length,
            (rng.r#gen::<f64>() - 0.5) * self.depth,
        );
        self.to_global(&local)
    }
}
