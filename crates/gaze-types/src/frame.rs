//! Coordinate frames for gaze and orientation data.
//!
//! Every direction vector in this workspace belongs to one of three
//! frames; `gaze-fusion` carries gaze through all of them in order.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Reference frame for a direction vector.
///
/// The transform chain in `gaze-fusion` moves gaze from `Scene`
/// through `Imu` to `World`; the mount calibration there carries
/// its endpoints as `Frame` values.
///
/// # Example
///
/// ```
/// use gaze_types::Frame;
///
/// assert_eq!(Frame::Scene.name(), "scene");
/// assert_eq!(Frame::World.name(), "world");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Frame {
    /// Scene-camera frame: x right, y down, z forward along the
    /// camera's optical axis.
    Scene,
    /// IMU body frame, rigidly mounted to the headset.
    Imu,
    /// World frame: z up, y north, x east.
    World,
}

impl Frame {
    /// Returns the name of the frame for display purposes.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Scene => "scene",
            Self::Imu => "imu",
            Self::World => "world",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_names() {
        assert_eq!(Frame::Scene.name(), "scene");
        assert_eq!(Frame::Imu.name(), "imu");
        assert_eq!(Frame::World.name(), "world");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn frame_serialization() {
        let json = serde_json::to_string(&Frame::Imu).ok();
        assert!(json.is_some());
    }
}
