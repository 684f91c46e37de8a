use nalgebra::{Matrix3, Rotation3, Vector3};

pub fn spherical_to_cartesian(r: f64, theta: f64, phi: f64) -> Vector3<f64> {
    let (sin_theta, cos_theta) = theta.sin_cos();
    let (sin_phi, cos_phi) = phi.sin_cos();
    Vector3::new(
        r * sin_theta * cos_phi,
        r * sin_theta * sin_phi,
        r * cos_theta,
    )
}

/// Returns `(r, theta, phi)` with theta in [0, π] and phi in (-π, π].
/// The zero vector maps to all zeros.
pub fn cartesian_to_spherical(v: &Vector3<f64>) -> (f64, f64, f64) {
    let r = v.norm();
    if r == 0.0 {
        return (0.0, 0.0, 0.0);
    }
    let theta = (v.z / r).clamp(-1.0, 1.0).acos();
    let phi = v.y.atan2(v.x);
    (r, theta, phi)
}

#[inline]
pub fn distance(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    (b - a).norm()
}

/// Rotation carrying +Z onto `direction`: a polar rotation about y followed by
/// an azimuthal rotation about z. Columns of the result are the rotated axes.
pub fn basis_from_direction(direction: &Vector3<f64>) -> Matrix3<f64> {
    let (_, theta, phi) = cartesian_to_spherical(direction);
    let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), phi)
        * Rotation3::from_axis_angle(&Vector3::y_axis(), theta);
    rotation.into_inner()
}

/// Local unit axes `(x, y, z)` of a body rotated by `theta` about y, `phi`
/// about z and `psi` about x (pitch-roll-yaw).
pub fn pitch_roll_yaw_axes(
    theta: f64,
    phi: f64,
    psi: f64,
) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>) {
    let (sin_theta, cos_theta) = theta.sin_cos();
    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_psi, cos_psi) = psi.sin_cos();

    let x = Vector3::new(cos_theta * cos_phi, cos_theta * sin_phi, -sin_theta);
    let y = Vector3::new(
        sin_psi * sin_theta * cos_phi - cos_psi * sin_phi,
        sin_psi * sin_theta * sin_phi + cos_psi * cos_phi,
        cos_theta * sin_psi,
    );
    let z = Vector3::new(
        cos_psi * sin_theta * cos_phi + sin_psi * sin_phi,
        cos_psi * sin_theta * sin_phi - sin_psi * cos_phi,
        cos_theta * cos_psi,
    );
    (x.normalize(), y.normalize(), z.normalize())
}
