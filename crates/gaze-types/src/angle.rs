//! Spherical gaze angles in the device convention.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A gaze direction as elevation/azimuth degrees.
///
/// # Angle Convention
///
/// Neon reports gaze in a device convention that differs from
/// mathematical spherical coordinates:
///
/// - Elevation 0° lies in the horizontal plane (not at the pole);
///   positive is up.
/// - Azimuth 0° is straight ahead; positive is to the wearer's right.
///
/// `gaze-fusion` converts to and from Cartesian vectors with the
/// offsets this convention requires; never feed these angles into a
/// textbook spherical formula directly.
///
/// Eye videos with no detectable pupil (blinks, device not worn)
/// export as blank cells and load as `NaN` here. `NaN` angles pass
/// through the fusion pipeline unchanged rather than erroring.
///
/// # Example
///
/// ```
/// use gaze_types::SphericalAngle;
///
/// let gaze = SphericalAngle::new(-12.0, 30.0);
/// assert!(gaze.elevation_deg < 0.0); // looking slightly down
/// assert!(!gaze.is_nan());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SphericalAngle {
    /// Elevation in degrees; 0° horizontal, positive up.
    pub elevation_deg: f64,
    /// Azimuth in degrees; 0° straight ahead, positive right.
    pub azimuth_deg: f64,
}

impl SphericalAngle {
    /// Creates a gaze angle from elevation and azimuth degrees.
    #[must_use]
    pub const fn new(elevation_deg: f64, azimuth_deg: f64) -> Self {
        Self {
            elevation_deg,
            azimuth_deg,
        }
    }

    /// Returns the straight-ahead gaze (both angles zero).
    #[must_use]
    pub const fn ahead() -> Self {
        Self {
            elevation_deg: 0.0,
            azimuth_deg: 0.0,
        }
    }

    /// Checks whether either angle is `NaN` (no gaze detected).
    #[must_use]
    pub fn is_nan(&self) -> bool {
        self.elevation_deg.is_nan() || self.azimuth_deg.is_nan()
    }
}

impl Default for SphericalAngle {
    fn default() -> Self {
        Self::ahead()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::float_cmp)] // Exact constant values from ahead()
    fn ahead_is_zero() {
        let gaze = SphericalAngle::ahead();
        assert_eq!(gaze.elevation_deg, 0.0);
        assert_eq!(gaze.azimuth_deg, 0.0);
        assert!(!gaze.is_nan());
    }

    #[test]
    fn nan_detection() {
        assert!(SphericalAngle::new(f64::NAN, 0.0).is_nan());
        assert!(SphericalAngle::new(0.0, f64::NAN).is_nan());
        assert!(!SphericalAngle::new(-12.0, 45.0).is_nan());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn angle_serialization() {
        let gaze = SphericalAngle::new(-12.0, 30.0);
        let json = serde_json::to_string(&gaze).ok();
        assert!(json.is_some());
    }
}
