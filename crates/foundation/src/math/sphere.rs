//! Spherical placement helpers for a globe whose prime meridian at the
//! equator faces +Z (toward a camera sitting on the +Z axis).

use super::{Quat, Vec3};

/// Project latitude/longitude in degrees onto a sphere of `radius`.
///
/// `x = r·sin(lon)·cos(lat)`, `y = r·sin(lat)`, `z = r·cos(lat)·cos(lon)`.
pub fn lat_lon_to_cartesian(lat_deg: f64, lon_deg: f64, radius: f64) -> Vec3 {
    let lat = (lat_deg / 180.0) * std::f64::consts::PI;
    let lon = (lon_deg / 180.0) * std::f64::consts::PI;

    Vec3::new(
        radius * lon.sin() * lat.cos(),
        radius * lat.sin(),
        radius * lat.cos() * lon.cos(),
    )
}

/// Orientation that points an object's local +Z axis from `position` toward `target`.
///
/// Objects (unlike cameras) look down their +Z axis. When `up` is parallel
/// to the viewing axis the axis is nudged slightly so a basis still exists.
pub fn look_at_rotation(position: Vec3, target: Vec3, up: Vec3) -> Quat {
    let mut z = target - position;
    if z.length_squared() == 0.0 {
        z = Vec3::Z;
    }
    let mut z = z.try_normalize().unwrap_or(Vec3::Z);

    let mut x = up.cross(z);
    if x.length_squared() == 0.0 {
        if up.z.abs() == 1.0 {
            z.x += 0.0001;
        } else {
            z.z += 0.0001;
        }
        z = z.try_normalize().unwrap_or(Vec3::Z);
        x = up.cross(z);
    }
    let x = x.try_normalize().unwrap_or(Vec3::X);
    let y = z.cross(x);

    Quat::from_rotation_axes(x, y, z)
}

#[cfg(test)]
mod tests {
    use super::{lat_lon_to_cartesian, look_at_rotation};
    use crate::math::Vec3;

    fn assert_vec_close(a: Vec3, b: Vec3, eps: f64) {
        let d = (a - b).length();
        assert!(d <= eps, "expected {a:?} ~= {b:?} (diff {d})");
    }

    #[test]
    fn origin_meridian_faces_positive_z() {
        assert_vec_close(lat_lon_to_cartesian(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 5.0), 1e-12);
    }

    #[test]
    fn east_longitude_maps_to_positive_x() {
        assert_vec_close(lat_lon_to_cartesian(0.0, 90.0, 5.0), Vec3::new(5.0, 0.0, 0.0), 1e-12);
    }

    #[test]
    fn north_pole_maps_to_positive_y() {
        assert_vec_close(lat_lon_to_cartesian(90.0, 0.0, 2.0), Vec3::new(0.0, 2.0, 0.0), 1e-12);
    }

    #[test]
    fn projected_points_lie_on_sphere() {
        for (lat, lon) in [(23.6345, -102.5528), (-33.9, 151.2), (64.1, -21.9)] {
            let p = lat_lon_to_cartesian(lat, lon, 5.0);
            assert!((p.length() - 5.0).abs() < 1e-12);
        }
    }

    #[test]
    fn look_at_points_local_z_toward_target() {
        let position = lat_lon_to_cartesian(48.85, 2.35, 5.0);
        let q = look_at_rotation(position, Vec3::ZERO, Vec3::Y);
        let forward = q.rotate(Vec3::Z);
        let expected = (Vec3::ZERO - position).try_normalize().expect("dir");
        assert_vec_close(forward, expected, 1e-9);
    }

    #[test]
    fn look_at_survives_the_poles() {
        let position = Vec3::new(0.0, 5.0, 0.0);
        let q = look_at_rotation(position, Vec3::ZERO, Vec3::Y);
        let forward = q.rotate(Vec3::Z);
        assert_vec_close(forward, -Vec3::Y, 1e-3);
    }
}
