//! Inertial Measurement Unit (IMU) sample types.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One orientation sample from the headset IMU.
///
/// Neon's IMU export provides a fused absolute orientation as a unit
/// quaternion (IMU body frame → world frame) alongside derived Euler
/// angles; only the yaw angle is carried here because it doubles as
/// the compass heading in degrees.
///
/// # Quaternion Convention
///
/// The quaternion is stored as `[w, x, y, z]` where `w` is the scalar
/// part. Samples are expected to be normalized by the device; this
/// type does not enforce normalization, it only reports it.
///
/// # Example
///
/// ```
/// use gaze_types::ImuSample;
///
/// let sample = ImuSample::identity();
/// assert_eq!(sample.quaternion, [1.0, 0.0, 0.0, 0.0]);
/// assert!(sample.is_normalized(1e-10));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImuSample {
    /// Orientation as unit quaternion: `[w, x, y, z]`, body → world.
    pub quaternion: [f64; 4],
    /// Yaw in degrees (0 = North, increasing clockwise), used as the
    /// wearer's heading.
    pub yaw_deg: f64,
}

impl ImuSample {
    /// Creates a sample from a `[w, x, y, z]` quaternion and heading.
    #[must_use]
    pub const fn new(quaternion: [f64; 4], yaw_deg: f64) -> Self {
        Self {
            quaternion,
            yaw_deg,
        }
    }

    /// The no-rotation sample: a level wearer facing north.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            quaternion: [1.0, 0.0, 0.0, 0.0],
            yaw_deg: 0.0,
        }
    }

    /// Euclidean norm of the stored quaternion.
    #[must_use]
    pub fn quaternion_norm(&self) -> f64 {
        self.quaternion.iter().map(|c| c * c).sum::<f64>().sqrt()
    }

    /// Rescales the quaternion to unit length, keeping the heading.
    ///
    /// Returns `None` for a zero quaternion, which carries no
    /// orientation to rescale.
    #[must_use]
    pub fn normalized(&self) -> Option<Self> {
        let norm = self.quaternion_norm();
        if norm < 1e-10 {
            return None;
        }
        Some(Self {
            quaternion: self.quaternion.map(|c| c / norm),
            yaw_deg: self.yaw_deg,
        })
    }

    /// Checks the quaternion length against `1.0` within `tolerance`.
    #[must_use]
    pub fn is_normalized(&self, tolerance: f64) -> bool {
        (self.quaternion_norm() - 1.0).abs() < tolerance
    }
}

impl Default for ImuSample {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::float_cmp)] // identity() stores these constants verbatim
    fn identity_is_level_and_facing_north() {
        let sample = ImuSample::identity();
        assert_eq!(sample.quaternion, [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(sample.yaw_deg, 0.0);
        assert!(sample.is_normalized(1e-10));
    }

    #[test]
    fn rescaling_keeps_the_heading() {
        let raw = ImuSample::new([0.0, 0.0, 3.0, 4.0], 271.5);
        let unit = raw.normalized().unwrap_or_default();
        assert!(unit.is_normalized(1e-12));
        assert!((unit.yaw_deg - 271.5).abs() < 1e-12);
    }

    #[test]
    fn zero_quaternion_cannot_be_rescaled() {
        let sample = ImuSample::new([0.0; 4], 90.0);
        assert!(sample.normalized().is_none());
    }

    #[test]
    fn norm_matches_hand_computation() {
        let sample = ImuSample::new([1.0, 2.0, 2.0, 4.0], 0.0);
        assert!((sample.quaternion_norm() - 5.0).abs() < 1e-12);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn samples_round_trip_through_serde() {
        let sample = ImuSample::new([0.0, 0.0, 0.6, 0.8], 123.25);
        let json = serde_json::to_string(&sample).ok();
        assert!(json.is_some());

        let parsed: Result<ImuSample, _> = serde_json::from_str(&json.unwrap_or_default());
        assert_eq!(parsed.ok(), Some(sample));
    }
}
