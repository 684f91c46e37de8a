use nalgebra::Vector2;

#[inline]
fn cross(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Solves `p1 + d1 t1 = p2 + d2 t2` for `(t1, t2)`.
///
/// Returns `None` when the two directions are parallel (including when either
/// direction is the zero vector).
pub fn intersection_params(
    p1: &Vector2<f64>,
    d1: &Vector2<f64>,
    p2: &Vector2<f64>,
    d2: &Vector2<f64>,
) -> Option<(f64, f64)> {
    let denom = cross(d1, d2);
    if denom.abs() <= f64::EPSILON * d1.norm() * d2.norm() {
        return None;
    }
    let v = p2 - p1;
    Some((cross(&v, d2) / denom, cross(&v, d1) / denom))
}

/// Half-infinite line in the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vector2<f64>,
    pub direction: Vector2<f64>,
}

impl Ray {
    pub fn new(origin: Vector2<f64>, direction: Vector2<f64>) -> Self {
        Self { origin, direction }
    }

    /// Ray starting at `(x1, y1)` and passing through `(x2, y2)`.
    pub fn through(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(Vector2::new(x1, y1), Vector2::new(x2 - x1, y2 - y1))
    }

    #[inline]
    pub fn point_at(&self, t: f64) -> Vector2<f64> {
        self.origin + self.direction * t
    }

    pub fn intersect_ray(&self, other: &Ray) -> Option<Vector2<f64>> {
        let (t1, t2) =
            intersection_params(&self.origin, &self.direction, &other.origin, &other.direction)?;
        (t1 >= 0.0 && t2 >= 0.0).then(|| self.point_at(t1))
    }

    pub fn intersect_line(&self, line: &Line) -> Option<Vector2<f64>> {
        let direction = line.direction();
        let (t1, t2) =
            intersection_params(&self.origin, &self.direction, &line.p1, &direction)?;
        (t1 >= 0.0 && (0.0..=1.0).contains(&t2)).then(|| self.point_at(t1))
    }
}

impl From<Line> for Ray {
    fn from(line: Line) -> Self {
        Self::new(line.p1, line.direction())
    }
}

/// Segment from `p1` to `p2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub p1: Vector2<f64>,
    pub p2: Vector2<f64>,
}

impl Line {
    pub fn new(p1: Vector2<f64>, p2: Vector2<f64>) -> Self {
        Self { p1, p2 }
    }

    /// Segment of `length` starting at `origin` along `direction`.
    pub fn from_ray(ray: &Ray, length: f64) -> Self {
        let unit = ray.direction.normalize();
        Self::new(ray.origin, ray.origin + unit * length)
    }

    #[inline]
    pub fn direction(&self) -> Vector2<f64> {
        self.p2 - self.p1
    }

    pub fn length(&self) -> f64 {
        self.direction().norm()
    }

    pub fn intersect_line(&self, other: &Line) -> Option<Vector2<f64>> {
        let d1 = self.direction();
        let (t1, t2) = intersection_params(&self.p1, &d1, &other.p1, &other.direction())?;
        ((0.0..=1.0).contains(&t1) && (0.0..=1.0).contains(&t2)).then(|| self.p1 + d1 * t1)
    }

    pub fn intersect_ray(&self, ray: &Ray) -> Option<Vector2<f64>> {
        let d1 = self.direction();
        let (t1, t2) = intersection_params(&self.p1, &d1, &ray.origin, &ray.direction)?;
        ((0.0..=1.0).contains(&t1) && t2 >= 0.0).then(|| self.p1 + d1 * t1)
    }
}
