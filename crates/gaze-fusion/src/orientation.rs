//! Spherical and Cartesian gaze-direction conversions.
//!
//! Gaze enters the pipeline as spherical angles in the scene-camera
//! frame and leaves as spherical angles in the world frame. The scene
//! frame measures its polar angle from the camera's `y` axis while the
//! world frame measures from `z` (up), so the two conversions are not
//! inverses of each other; [`world_spherical_to_cartesian`] is the
//! inverse of [`cartesian_to_spherical`].
//!
//! NaN angles (blinks, dropped gaze estimates) pass through every
//! conversion unchanged rather than erroring.

use gaze_types::SphericalAngle;
use glam::{DQuat, DVec3};

use crate::error::{FusionError, Result};

/// Builds a rotation quaternion from scalar-first `[w, x, y, z]`
/// components.
///
/// IMU samples store their orientation scalar-first; `glam` is
/// scalar-last.
#[must_use]
pub fn quat_from_wxyz(wxyz: [f64; 4]) -> DQuat {
    let [w, x, y, z] = wxyz;
    DQuat::from_xyzw(x, y, z, w)
}

/// Converts scene-frame spherical gaze angles to a Cartesian
/// direction.
///
/// Scene frame: `x` right, `y` down, `z` forward along the optical
/// axis. Elevation 0° / azimuth 0° maps to `(0, 0, 1)`; elevation is
/// positive up, azimuth positive to the wearer's right.
#[must_use]
pub fn spherical_to_cartesian(angle: SphericalAngle) -> DVec3 {
    let polar = (angle.elevation_deg + 90.0).to_radians();
    let planar = (90.0 - angle.azimuth_deg).to_radians();
    DVec3::new(
        polar.sin() * planar.cos(),
        polar.cos(),
        polar.sin() * planar.sin(),
    )
}

/// Converts each scene-frame gaze angle in a series.
#[must_use]
pub fn spherical_to_cartesian_series(angles: &[SphericalAngle]) -> Vec<DVec3> {
    angles.iter().map(|&a| spherical_to_cartesian(a)).collect()
}

/// Converts a world-frame Cartesian direction to spherical angles.
///
/// World frame: `z` up, `y` magnetic North, `x` East. Elevation is 0°
/// on the horizon, positive up; azimuth is 0° at North, positive
/// leftwards (counterclockwise seen from above), matching IMU yaw,
/// and wrapped to `[-180°, 180°)`.
///
/// The zero vector has no direction; its elevation comes out NaN.
#[must_use]
pub fn cartesian_to_spherical(direction: DVec3) -> SphericalAngle {
    let radius = direction.length();
    // z/radius can drift past 1 by a rounding ulp at the poles.
    let elevation_deg = 90.0 - (direction.z / radius).clamp(-1.0, 1.0).acos().to_degrees();
    let azimuth_deg = wrap_azimuth_deg(direction.y.atan2(direction.x).to_degrees() - 90.0);
    SphericalAngle::new(elevation_deg, azimuth_deg)
}

/// Converts each world-frame direction in a series.
#[must_use]
pub fn cartesian_to_spherical_series(directions: &[DVec3]) -> Vec<SphericalAngle> {
    directions
        .iter()
        .map(|&d| cartesian_to_spherical(d))
        .collect()
}

/// Converts world-frame spherical angles back to a Cartesian unit
/// direction.
///
/// Inverse of [`cartesian_to_spherical`] for non-degenerate inputs.
#[must_use]
pub fn world_spherical_to_cartesian(angle: SphericalAngle) -> DVec3 {
    let polar = (90.0 - angle.elevation_deg).to_radians();
    let planar = (angle.azimuth_deg + 90.0).to_radians();
    DVec3::new(
        polar.sin() * planar.cos(),
        polar.sin() * planar.sin(),
        polar.cos(),
    )
}

/// Rotates a direction by a unit quaternion.
///
/// Callers supply pre-normalized quaternions; nothing is normalized
/// here.
#[must_use]
pub fn rotate_by_quaternion(direction: DVec3, rotation: DQuat) -> DVec3 {
    rotation * direction
}

/// Rotates each direction by the quaternion at the same index.
///
/// # Errors
///
/// Returns [`FusionError::ShapeMismatch`] if the series lengths
/// differ.
pub fn rotate_series(directions: &[DVec3], rotations: &[DQuat]) -> Result<Vec<DVec3>> {
    if directions.len() != rotations.len() {
        return Err(FusionError::shape_mismatch(
            directions.len(),
            rotations.len(),
        ));
    }
    Ok(directions
        .iter()
        .zip(rotations)
        .map(|(&direction, &rotation)| rotation * direction)
        .collect())
}

/// Wraps an azimuth in degrees to `[-180°, 180°)`.
///
/// Valid for inputs of any magnitude, not just single-revolution
/// overshoots.
#[must_use]
pub fn wrap_azimuth_deg(azimuth_deg: f64) -> f64 {
    (azimuth_deg + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::similar_names
)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn straight_ahead_gaze_is_scene_forward() {
        let v = spherical_to_cartesian(SphericalAngle::ahead());
        assert_relative_eq!(v.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(v.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(v.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn upward_gaze_is_scene_negative_y() {
        // Scene y points down.
        let v = spherical_to_cartesian(SphericalAngle::new(90.0, 0.0));
        assert_relative_eq!(v.y, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn rightward_gaze_is_scene_positive_x() {
        let v = spherical_to_cartesian(SphericalAngle::new(0.0, 90.0));
        assert_relative_eq!(v.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(v.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn north_maps_to_zero_azimuth() {
        let angles = cartesian_to_spherical(DVec3::Y);
        assert_relative_eq!(angles.elevation_deg, 0.0, epsilon = 1e-9);
        assert_relative_eq!(angles.azimuth_deg, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn west_is_positive_azimuth() {
        // World azimuth grows leftwards from North, so West sits at +90°.
        let angles = cartesian_to_spherical(DVec3::new(-1.0, 0.0, 0.0));
        assert_relative_eq!(angles.azimuth_deg, 90.0, epsilon = 1e-9);
        let east = cartesian_to_spherical(DVec3::X);
        assert_relative_eq!(east.azimuth_deg, -90.0, epsilon = 1e-9);
    }

    #[test]
    fn world_round_trip_recovers_direction() {
        let samples = [
            DVec3::new(0.3, 0.4, 0.5),
            DVec3::new(-1.0, 2.0, -0.5),
            DVec3::new(0.0, 1.0, 0.0),
        ];
        for v in samples {
            let back = world_spherical_to_cartesian(cartesian_to_spherical(v));
            let unit = v.normalize();
            assert_relative_eq!(back.x, unit.x, epsilon = 1e-9);
            assert_relative_eq!(back.y, unit.y, epsilon = 1e-9);
            assert_relative_eq!(back.z, unit.z, epsilon = 1e-9);
        }
    }

    #[test]
    fn world_angles_round_trip() {
        let angle = SphericalAngle::new(-35.0, 120.0);
        let back = cartesian_to_spherical(world_spherical_to_cartesian(angle));
        assert_relative_eq!(back.elevation_deg, -35.0, epsilon = 1e-9);
        assert_relative_eq!(back.azimuth_deg, 120.0, epsilon = 1e-9);
    }

    #[test]
    fn identity_rotation_preserves_direction() {
        let v = DVec3::new(0.1, -0.2, 0.97);
        let rotated = rotate_by_quaternion(v, DQuat::IDENTITY);
        assert_relative_eq!(rotated.x, v.x, epsilon = 1e-12);
        assert_relative_eq!(rotated.y, v.y, epsilon = 1e-12);
        assert_relative_eq!(rotated.z, v.z, epsilon = 1e-12);
    }

    #[test]
    fn rotate_series_applies_elementwise() {
        let quarter = DQuat::from_rotation_z(FRAC_PI_2);
        let out = rotate_series(&[DVec3::Y, DVec3::Y], &[DQuat::IDENTITY, quarter]).unwrap();
        assert_relative_eq!(out[0].y, 1.0, epsilon = 1e-9);
        assert_relative_eq!(out[1].x, -1.0, epsilon = 1e-9);
        assert_relative_eq!(out[1].y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn rotate_series_rejects_length_mismatch() {
        let err = rotate_series(&[DVec3::Z, DVec3::Z], &[DQuat::IDENTITY]).unwrap_err();
        assert!(matches!(
            err,
            FusionError::ShapeMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn wrap_azimuth_handles_overshoot() {
        assert_relative_eq!(wrap_azimuth_deg(185.0), -175.0, epsilon = 1e-12);
        assert_relative_eq!(wrap_azimuth_deg(-185.0), 175.0, epsilon = 1e-12);
        assert_relative_eq!(wrap_azimuth_deg(45.0), 45.0, epsilon = 1e-12);
        // Multi-revolution inputs wrap too.
        assert_relative_eq!(wrap_azimuth_deg(725.0), 5.0, epsilon = 1e-12);
        assert_relative_eq!(wrap_azimuth_deg(-545.0), 175.0, epsilon = 1e-12);
    }

    #[test]
    fn nan_gaze_passes_through() {
        let v = spherical_to_cartesian(SphericalAngle::new(f64::NAN, 0.0));
        assert!(v.y.is_nan());

        let angles = cartesian_to_spherical(DVec3::new(f64::NAN, 0.0, 1.0));
        assert!(angles.elevation_deg.is_nan());
        assert!(angles.azimuth_deg.is_nan());

        assert!(wrap_azimuth_deg(f64::NAN).is_nan());
    }

    #[test]
    fn zero_vector_elevation_is_nan() {
        let angles = cartesian_to_spherical(DVec3::ZERO);
        assert!(angles.elevation_deg.is_nan());
    }

    #[test]
    fn quat_from_wxyz_reorders_components() {
        assert_eq!(quat_from_wxyz([1.0, 0.0, 0.0, 0.0]), DQuat::IDENTITY);

        let q = quat_from_wxyz([0.5, 0.1, 0.2, 0.3]);
        assert_eq!(q.w, 0.5);
        assert_eq!(q.x, 0.1);
        assert_eq!(q.y, 0.2);
        assert_eq!(q.z, 0.3);
    }

    #[test]
    fn series_conversions_match_scalar_ones() {
        let angles = [SphericalAngle::ahead(), SphericalAngle::new(10.0, -20.0)];
        let vectors = spherical_to_cartesian_series(&angles);
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[1], spherical_to_cartesian(angles[1]));

        let back = cartesian_to_spherical_series(&vectors);
        assert_eq!(back.len(), 2);
        assert_eq!(back[0], cartesian_to_spherical(vectors[0]));
    }
}
