//! Rigid transforms between the scene, IMU, and world frames.
//!
//! The scene camera and the IMU are both fixed in the glasses module,
//! so one calibrated rotation plus translation moves data between
//! them. The IMU-to-world rotation changes every sample and arrives
//! as a quaternion from the device's orientation filter.

use gaze_types::{Frame, SphericalAngle};
use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

use crate::error::{FusionError, Result};
use crate::orientation::{cartesian_to_spherical, spherical_to_cartesian};

/// Serde support for `DQuat` fields.
mod dquat_serde {
    use glam::DQuat;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct QuatData {
        x: f64,
        y: f64,
        z: f64,
        w: f64,
    }

    pub fn serialize<S: Serializer>(quat: &DQuat, serializer: S) -> Result<S::Ok, S::Error> {
        QuatData {
            x: quat.x,
            y: quat.y,
            z: quat.z,
            w: quat.w,
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DQuat, D::Error> {
        let data = QuatData::deserialize(deserializer)?;
        Ok(DQuat::from_xyzw(data.x, data.y, data.z, data.w))
    }
}

/// Serde support for `DVec3` fields.
mod dvec3_serde {
    use glam::DVec3;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Vec3Data {
        x: f64,
        y: f64,
        z: f64,
    }

    pub fn serialize<S: Serializer>(vec: &DVec3, serializer: S) -> Result<S::Ok, S::Error> {
        Vec3Data {
            x: vec.x,
            y: vec.y,
            z: vec.z,
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DVec3, D::Error> {
        let data = Vec3Data::deserialize(deserializer)?;
        Ok(DVec3::new(data.x, data.y, data.z))
    }
}

/// Calibrated rigid transform from the scene-camera frame to the IMU
/// frame.
///
/// The endpoints travel with the calibration as [`Frame`] values, so
/// serialized calibrations and log lines name the frames they bridge.
///
/// [`MountTransform::neon`] describes the Pupil Labs Neon module;
/// rigs with a different camera placement substitute their own
/// calibration through [`MountTransform::new`].
///
/// # Example
///
/// ```
/// use gaze_fusion::MountTransform;
/// use gaze_types::SphericalAngle;
/// use glam::DQuat;
///
/// let mount = MountTransform::neon();
/// let world = mount.gaze_to_world(&[SphericalAngle::ahead()], &[DQuat::IDENTITY])?;
///
/// // With the IMU level, straight-ahead gaze picks up the scene
/// // camera's 12° downward tilt.
/// assert!((world[0].elevation_deg + 12.0).abs() < 1e-9);
/// # Ok::<(), gaze_fusion::FusionError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MountTransform {
    /// Rotation taking scene-frame directions into the IMU frame.
    #[serde(with = "dquat_serde")]
    pub rotation: DQuat,
    /// Scene-camera origin expressed in IMU coordinates, in
    /// centimeters. Applied to points only; directions rotate
    /// translation-free.
    #[serde(with = "dvec3_serde")]
    pub translation: DVec3,
    /// Frame the calibration maps from.
    pub source: Frame,
    /// Frame the calibration maps into. The per-sample device
    /// orientation carries directions on from here into
    /// [`Frame::World`].
    pub target: Frame,
}

impl MountTransform {
    /// Pitch from the scene frame to the IMU frame on the Neon
    /// module, in degrees.
    ///
    /// Combines the -90° axis change between the scene camera
    /// (`z` forward) and the IMU (`y` forward) with the scene
    /// camera's extra 12° downward tilt in the housing.
    pub const NEON_SCENE_PITCH_DEG: f64 = -102.0;

    /// Scene-camera origin in IMU coordinates on the Neon module, in
    /// centimeters.
    pub const NEON_SCENE_OFFSET: DVec3 = DVec3::new(0.0, -1.3, -6.62);

    /// Creates a transform from an explicit calibration.
    ///
    /// The endpoints are always [`Frame::Scene`] and [`Frame::Imu`];
    /// a custom calibration changes the numbers, not the chain.
    #[must_use]
    pub const fn new(rotation: DQuat, translation: DVec3) -> Self {
        Self {
            rotation,
            translation,
            source: Frame::Scene,
            target: Frame::Imu,
        }
    }

    /// Returns the factory calibration of the Pupil Labs Neon module.
    #[must_use]
    pub fn neon() -> Self {
        Self::new(
            DQuat::from_rotation_x(Self::NEON_SCENE_PITCH_DEG.to_radians()),
            Self::NEON_SCENE_OFFSET,
        )
    }

    /// Moves a point from the scene frame into the IMU frame.
    #[must_use]
    pub fn scene_to_imu_point(&self, point: DVec3) -> DVec3 {
        self.rotation * point + self.translation
    }

    /// Moves a direction from the scene frame into the IMU frame.
    ///
    /// Directions rotate without picking up the mount translation.
    #[must_use]
    pub fn scene_to_imu_direction(&self, direction: DVec3) -> DVec3 {
        self.rotation * direction
    }

    /// Moves a direction from the scene frame into the world frame.
    ///
    /// `imu_to_world` is the device orientation sampled at the same
    /// instant as the direction.
    #[must_use]
    pub fn scene_to_world_direction(&self, direction: DVec3, imu_to_world: DQuat) -> DVec3 {
        imu_to_world * self.scene_to_imu_direction(direction)
    }

    /// Moves a point from the scene frame into the world frame.
    #[must_use]
    pub fn scene_to_world_point(&self, point: DVec3, imu_to_world: DQuat) -> DVec3 {
        imu_to_world * self.scene_to_imu_point(point)
    }

    /// Runs a gaze series through the full scene-to-world chain.
    ///
    /// Each gaze angle pairs with the quaternion at the same index.
    /// NaN gaze samples (blinks) come out as NaN world angles.
    ///
    /// # Errors
    ///
    /// Returns [`FusionError::ShapeMismatch`] if the two series have
    /// different lengths.
    pub fn gaze_to_world(
        &self,
        gaze: &[SphericalAngle],
        imu_to_world: &[DQuat],
    ) -> Result<Vec<SphericalAngle>> {
        if gaze.len() != imu_to_world.len() {
            return Err(FusionError::shape_mismatch(gaze.len(), imu_to_world.len()));
        }
        Ok(gaze
            .iter()
            .zip(imu_to_world)
            .map(|(&angle, &rotation)| {
                let scene = spherical_to_cartesian(angle);
                cartesian_to_spherical(self.scene_to_world_direction(scene, rotation))
            })
            .collect())
    }
}

impl Default for MountTransform {
    /// Defaults to the Neon factory calibration.
    fn default() -> Self {
        Self::neon()
    }
}

/// Returns the direction the wearer faces in the world frame.
///
/// Rotates the IMU's neutral forward axis (`y`, out the front of the
/// module) by the sampled orientation. At identity the result is
/// magnetic North.
#[must_use]
pub fn imu_heading_in_world(imu_to_world: DQuat) -> DVec3 {
    imu_to_world * DVec3::Y
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
    fn level_imu_reports_camera_tilt() {
        let mount = MountTransform::neon();
        let world = mount
            .gaze_to_world(&[SphericalAngle::ahead()], &[DQuat::IDENTITY])
            .unwrap();
        assert_relative_eq!(world[0].elevation_deg, -12.0, epsilon = 1e-9);
        assert_relative_eq!(world[0].azimuth_deg, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn quarter_turn_left_moves_azimuth() {
        let mount = MountTransform::neon();
        let quarter_left = DQuat::from_rotation_z(FRAC_PI_2);
        let world = mount
            .gaze_to_world(&[SphericalAngle::ahead()], &[quarter_left])
            .unwrap();
        assert_relative_eq!(world[0].azimuth_deg, 90.0, epsilon = 1e-9);
        assert_relative_eq!(world[0].elevation_deg, -12.0, epsilon = 1e-9);
    }

    #[test]
    fn directions_ignore_translation() {
        let mount = MountTransform::neon();
        let as_direction = mount.scene_to_imu_direction(DVec3::Z);
        let as_point = mount.scene_to_imu_point(DVec3::Z);
        let offset = as_point - as_direction;
        assert_relative_eq!(offset.x, MountTransform::NEON_SCENE_OFFSET.x, epsilon = 1e-12);
        assert_relative_eq!(offset.y, MountTransform::NEON_SCENE_OFFSET.y, epsilon = 1e-12);
        assert_relative_eq!(offset.z, MountTransform::NEON_SCENE_OFFSET.z, epsilon = 1e-12);
    }

    #[test]
    fn world_point_applies_rotation_and_translation() {
        let mount = MountTransform::neon();
        let quarter_left = DQuat::from_rotation_z(FRAC_PI_2);
        let direct = mount.scene_to_world_point(DVec3::Z, quarter_left);
        let chained = quarter_left * mount.scene_to_imu_point(DVec3::Z);
        assert_relative_eq!(direct.x, chained.x, epsilon = 1e-12);
        assert_relative_eq!(direct.y, chained.y, epsilon = 1e-12);
        assert_relative_eq!(direct.z, chained.z, epsilon = 1e-12);
    }

    #[test]
    fn gaze_to_world_rejects_length_mismatch() {
        let mount = MountTransform::neon();
        let err = mount
            .gaze_to_world(&[SphericalAngle::ahead()], &[])
            .unwrap_err();
        assert!(matches!(
            err,
            FusionError::ShapeMismatch {
                expected: 1,
                actual: 0
            }
        ));
    }

    #[test]
    fn blink_stays_nan_through_chain() {
        let mount = MountTransform::neon();
        let world = mount
            .gaze_to_world(&[SphericalAngle::new(f64::NAN, f64::NAN)], &[DQuat::IDENTITY])
            .unwrap();
        assert!(world[0].elevation_deg.is_nan());
        assert!(world[0].azimuth_deg.is_nan());
    }

    #[test]
    fn identity_mount_leaves_frames_unreconciled() {
        // Without the -102° pitch, scene forward lands on world up.
        let mount = MountTransform::new(DQuat::IDENTITY, DVec3::ZERO);
        let world = mount
            .gaze_to_world(&[SphericalAngle::ahead()], &[DQuat::IDENTITY])
            .unwrap();
        assert_relative_eq!(world[0].elevation_deg, 90.0, epsilon = 1e-9);
    }

    #[test]
    fn mount_endpoints_are_scene_and_imu() {
        let custom = MountTransform::new(DQuat::IDENTITY, DVec3::ZERO);
        assert_eq!(custom.source, Frame::Scene);
        assert_eq!(custom.target, Frame::Imu);
        let neon = MountTransform::neon();
        assert_eq!(neon.source, Frame::Scene);
        assert_eq!(neon.target, Frame::Imu);
    }

    #[test]
    fn heading_is_north_at_identity() {
        let heading = imu_heading_in_world(DQuat::IDENTITY);
        assert_relative_eq!(heading.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(heading.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(heading.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn heading_turns_with_the_device() {
        let quarter_left = DQuat::from_rotation_z(FRAC_PI_2);
        let heading = imu_heading_in_world(quarter_left);
        assert_relative_eq!(heading.x, -1.0, epsilon = 1e-9);
        assert_relative_eq!(heading.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn serde_round_trip() {
        let mount = MountTransform::neon();
        let json = serde_json::to_string(&mount).unwrap();
        let back: MountTransform = serde_json::from_str(&json).unwrap();
        assert_relative_eq!(back.rotation.x, mount.rotation.x, epsilon = 1e-12);
        assert_relative_eq!(back.rotation.w, mount.rotation.w, epsilon = 1e-12);
        assert_relative_eq!(back.translation.z, mount.translation.z, epsilon = 1e-12);
        assert_eq!(back.source, Frame::Scene);
        assert_eq!(back.target, Frame::Imu);
    }
}
