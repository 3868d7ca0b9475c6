//! GPS position types.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A GPS position fix.
///
/// The external logger used alongside Neon records plain
/// latitude/longitude pairs; no altitude, accuracy, or fix-quality
/// fields survive its export.
///
/// Coordinates are WGS84 decimal degrees: latitude positive north of
/// the equator, longitude positive east of Greenwich.
///
/// # Example
///
/// ```
/// use gaze_types::GpsFix;
///
/// let fix = GpsFix::new(52.5200, 13.4050); // Berlin
/// assert!(fix.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GpsFix {
    /// Latitude in degrees (-90 to 90).
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180).
    pub longitude: f64,
}

impl GpsFix {
    /// Creates a GPS fix from coordinates.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Checks that both coordinates lie in their degree ranges.
    ///
    /// `NaN` coordinates are never valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle distance to another fix, in meters.
    ///
    /// Haversine over a spherical Earth, which is accurate to well
    /// under a percent at walking scales.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        haversine_m(self, other)
    }
}

/// Haversine distance between two fixes in meters.
fn haversine_m(a: &GpsFix, b: &GpsFix) -> f64 {
    const EARTH_RADIUS_M: f64 = 6_371_000.0;

    let half_dlat = (b.latitude - a.latitude).to_radians() / 2.0;
    let half_dlon = (b.longitude - a.longitude).to_radians() / 2.0;
    let cos_lats = a.latitude.to_radians().cos() * b.latitude.to_radians().cos();

    let h = half_dlat.sin().powi(2) + cos_lats * half_dlon.sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixes_validate_coordinate_bounds() {
        assert!(GpsFix::new(52.5200, 13.4050).is_valid());
        assert!(GpsFix::new(-90.0, 180.0).is_valid());
        assert!(!GpsFix::new(90.01, 0.0).is_valid());
        assert!(!GpsFix::new(0.0, -180.5).is_valid());
        assert!(!GpsFix::new(f64::NAN, 0.0).is_valid());
        assert!(!GpsFix::new(0.0, f64::NAN).is_valid());
    }

    #[test]
    fn berlin_to_munich_is_about_five_hundred_km() {
        let berlin = GpsFix::new(52.5200, 13.4050);
        let munich = GpsFix::new(48.1351, 11.5820);

        let distance = berlin.distance_to(&munich);
        assert!(distance > 495_000.0 && distance < 515_000.0);
    }

    #[test]
    fn distance_to_itself_is_zero() {
        let fix = GpsFix::new(52.5200, 13.4050);
        assert!(fix.distance_to(&fix) < 1e-6);
    }

    #[test]
    fn one_latitude_step_is_about_eleven_meters() {
        // The synthetic walks in this workspace step 0.0001° per fix.
        let a = GpsFix::new(52.0, 13.0);
        let b = GpsFix::new(52.0001, 13.0);

        let distance = a.distance_to(&b);
        assert!(distance > 10.0 && distance < 12.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn fixes_round_trip_through_serde() {
        let fix = GpsFix::new(52.5200, 13.4050);
        let json = serde_json::to_string(&fix).ok();
        assert!(json.is_some());

        let parsed: Result<GpsFix, _> = serde_json::from_str(&json.unwrap_or_default());
        assert_eq!(parsed.ok(), Some(fix));
    }
}
