//! Recording stream bundle.
//!
//! Groups the channels of one recording for processing in
//! `gaze-fusion` or for serialized storage.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{EventMarker, GpsFix, ImuSample, SphericalAngle, Stream, TimeRange, VideoFrame};

/// All streams of one recording.
///
/// The four sensor streams (gps, imu, gaze, video) drive alignment;
/// events are annotations resolved against the fused output and take
/// no part in the shared time axis.
///
/// # Example
///
/// ```
/// use gaze_types::{RecordingStreams, Stream};
///
/// let streams = RecordingStreams::new(
///     Stream::empty("gps"),
///     Stream::empty("imu"),
///     Stream::empty("gaze"),
///     Stream::empty("world"),
///     Stream::empty("events"),
/// );
///
/// assert!(streams.shared_coverage().is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RecordingStreams {
    /// GPS fixes from the external logger (sparse).
    pub gps: Stream<GpsFix>,
    /// IMU orientation samples (high rate).
    pub imu: Stream<ImuSample>,
    /// Gaze angles in the scene-camera convention.
    pub gaze: Stream<SphericalAngle>,
    /// Scene-camera frame timestamps (the canonical axis).
    pub video: Stream<VideoFrame>,
    /// Labelled recording events.
    pub events: Stream<EventMarker>,
}

impl RecordingStreams {
    /// Creates a bundle from the five recording streams.
    #[must_use]
    pub const fn new(
        gps: Stream<GpsFix>,
        imu: Stream<ImuSample>,
        gaze: Stream<SphericalAngle>,
        video: Stream<VideoFrame>,
        events: Stream<EventMarker>,
    ) -> Self {
        Self {
            gps,
            imu,
            gaze,
            video,
            events,
        }
    }

    /// Returns the closed interval covered by all four sensor streams.
    ///
    /// Events are excluded: they are annotations, not an alignment
    /// input. Returns `None` if any sensor stream is empty or the
    /// coverages do not intersect.
    #[must_use]
    pub fn shared_coverage(&self) -> Option<TimeRange> {
        let mut range = self.gps.coverage()?;
        for other in [
            self.imu.coverage()?,
            self.gaze.coverage()?,
            self.video.coverage()?,
        ] {
            range = range.intersection(other)?;
        }
        Some(range)
    }

    /// Returns the total number of samples across all five streams.
    #[must_use]
    pub fn total_samples(&self) -> usize {
        self.gps.len() + self.imu.len() + self.gaze.len() + self.video.len() + self.events.len()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::{Sampled, Timestamp};

    fn stream<T>(name: &str, samples: Vec<(u64, T)>) -> Stream<T> {
        Stream::new(
            name,
            samples
                .into_iter()
                .map(|(ts, value)| Sampled::new(Timestamp::from_nanos(ts), value))
                .collect(),
        )
        .unwrap()
    }

    fn bundle() -> RecordingStreams {
        RecordingStreams::new(
            stream("gps", vec![(0, GpsFix::new(0.0, 0.0)), (100, GpsFix::new(0.0, 0.0))]),
            stream("imu", vec![(10, ImuSample::identity()), (90, ImuSample::identity())]),
            stream("gaze", vec![(5, SphericalAngle::ahead()), (95, SphericalAngle::ahead())]),
            stream("world", vec![(20, VideoFrame::new(0)), (80, VideoFrame::new(1))]),
            Stream::empty("events"),
        )
    }

    #[test]
    fn shared_coverage_intersects_sensor_streams() {
        let streams = bundle();
        let coverage = streams.shared_coverage().unwrap();
        assert_eq!(coverage.start, Timestamp::from_nanos(20));
        assert_eq!(coverage.end, Timestamp::from_nanos(80));
    }

    #[test]
    fn shared_coverage_ignores_events() {
        // Empty events stream must not veto coverage.
        let streams = bundle();
        assert!(streams.events.is_empty());
        assert!(streams.shared_coverage().is_some());
    }

    #[test]
    fn shared_coverage_none_when_disjoint() {
        let mut streams = bundle();
        streams.gps = stream("gps", vec![(500, GpsFix::new(0.0, 0.0)), (600, GpsFix::new(0.0, 0.0))]);
        assert!(streams.shared_coverage().is_none());
    }

    #[test]
    fn total_samples_counts_all_streams() {
        let streams = bundle();
        assert_eq!(streams.total_samples(), 8);
    }
}
