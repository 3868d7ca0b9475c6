//! End-to-end fusion of a recording into queryable tables.
//!
//! [`FusionPipeline::build`] takes validated sensor streams and
//! produces two tables over the same columns: a canonical one on the
//! scene-video frame axis, meant for per-frame rendering, and a
//! full-rate one on the IMU axis for fine-grained lookups. Each row
//! carries the wearer's interpolated position, compass heading, and
//! gaze in both the scene and world frames.

use gaze_types::{
    EventMarker, GpsFix, RecordingStreams, SphericalAngle, Stream, TimeRange, Timestamp,
};
use glam::DQuat;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::align::StreamAligner;
use crate::error::{FusionError, Result};
use crate::orientation::quat_from_wxyz;
use crate::transform::MountTransform;

/// One fused sample: everything known about the wearer at one
/// instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedRow {
    /// Axis timestamp the row is keyed to.
    pub timestamp: Timestamp,
    /// Index of the nearest scene-video frame.
    pub frame_index: u64,
    /// Interpolated GPS position.
    pub position: GpsFix,
    /// Compass heading from the IMU, in degrees (0° = North).
    pub heading_deg: f64,
    /// Gaze in the scene frame, as recorded.
    pub gaze_scene: SphericalAngle,
    /// Gaze in the world frame, after the transform chain.
    pub gaze_world: SphericalAngle,
}

/// An event marker resolved against the fused table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventFix {
    /// Label of the event marker.
    pub label: String,
    /// The marker's own timestamp.
    pub timestamp: Timestamp,
    /// Frame index of the matched row.
    pub frame_index: u64,
    /// Position of the matched row.
    pub position: GpsFix,
    /// Heading of the matched row, in degrees.
    pub heading_deg: f64,
    /// World-frame gaze of the matched row.
    pub gaze_world: SphericalAngle,
}

/// Time-ordered fused rows with nearest-row query support.
///
/// Queries clamp to the table edges instead of erroring: a timestamp
/// before the first row resolves to the first row. Callers that need
/// strict bounds pass a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedTable {
    axis: String,
    rows: Vec<AlignedRow>,
}

impl FusedTable {
    /// Creates a table from time-ordered rows.
    ///
    /// # Errors
    ///
    /// Returns [`FusionError::NonMonotonic`] if row timestamps
    /// decrease anywhere.
    pub fn new(axis: impl Into<String>, rows: Vec<AlignedRow>) -> Result<Self> {
        let axis = axis.into();
        if let Some(index) = rows
            .windows(2)
            .position(|pair| pair[1].timestamp < pair[0].timestamp)
        {
            return Err(FusionError::non_monotonic(axis, index + 1));
        }
        Ok(Self { axis, rows })
    }

    /// Name of the stream whose timestamps key this table.
    #[must_use]
    pub fn axis(&self) -> &str {
        &self.axis
    }

    /// The fused rows in time order.
    #[must_use]
    pub fn rows(&self) -> &[AlignedRow] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Checks whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Time span covered by the rows.
    #[must_use]
    pub fn coverage(&self) -> Option<TimeRange> {
        match (self.rows.first(), self.rows.last()) {
            (Some(first), Some(last)) => Some(TimeRange::new(first.timestamp, last.timestamp)),
            _ => None,
        }
    }

    /// Finds the row nearest to a timestamp, optionally inside a
    /// window.
    ///
    /// Timestamps outside the (windowed) table clamp to the edge
    /// rows; ties go to the earlier row.
    ///
    /// # Errors
    ///
    /// Returns [`FusionError::InsufficientData`] if the table, or the
    /// window within it, holds no rows.
    pub fn lookup_nearest(
        &self,
        timestamp: Timestamp,
        window: Option<TimeRange>,
    ) -> Result<&AlignedRow> {
        let rows = self.rows_in(window)?;
        Ok(&rows[nearest_row_index(rows, timestamp)])
    }

    /// Finds the row whose position is closest to `position`,
    /// optionally inside a window.
    ///
    /// Distance is great-circle distance. Rows whose distance
    /// computes to NaN never win against finite ones.
    ///
    /// # Errors
    ///
    /// Returns [`FusionError::InsufficientData`] if the table, or the
    /// window within it, holds no rows.
    pub fn lookup_nearest_position(
        &self,
        position: GpsFix,
        window: Option<TimeRange>,
    ) -> Result<&AlignedRow> {
        let rows = self.rows_in(window)?;
        let mut best = &rows[0];
        let mut best_distance = position.distance_to(&best.position);
        for row in &rows[1..] {
            let distance = position.distance_to(&row.position);
            if distance < best_distance || (best_distance.is_nan() && !distance.is_nan()) {
                best = row;
                best_distance = distance;
            }
        }
        Ok(best)
    }

    /// Resolves each event marker to its nearest row.
    ///
    /// Markers outside the (windowed) table clamp to the edge rows,
    /// matching [`FusedTable::lookup_nearest`]. A recording without
    /// markers yields an empty vector, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`FusionError::InsufficientData`] if the table, or the
    /// window within it, holds no rows.
    pub fn annotate_events(
        &self,
        events: &Stream<EventMarker>,
        window: Option<TimeRange>,
    ) -> Result<Vec<EventFix>> {
        let rows = self.rows_in(window)?;
        Ok(events
            .iter()
            .map(|sample| {
                let row = &rows[nearest_row_index(rows, sample.timestamp)];
                EventFix {
                    label: sample.value.label.clone(),
                    timestamp: sample.timestamp,
                    frame_index: row.frame_index,
                    position: row.position,
                    heading_deg: row.heading_deg,
                    gaze_world: row.gaze_world,
                }
            })
            .collect())
    }

    /// Rows within the window, or all rows when `window` is `None`.
    fn rows_in(&self, window: Option<TimeRange>) -> Result<&[AlignedRow]> {
        let rows = match window {
            None => &self.rows[..],
            Some(range) => {
                let start = lower_bound(&self.rows, range.start);
                let end = upper_bound(&self.rows, range.end);
                &self.rows[start..end]
            }
        };
        if rows.is_empty() {
            return Err(FusionError::insufficient_data(
                self.axis.clone(),
                "no rows inside the query window",
            ));
        }
        Ok(rows)
    }
}

/// First index whose timestamp is at or past `target`.
fn lower_bound(rows: &[AlignedRow], target: Timestamp) -> usize {
    let mut lo = 0;
    let mut hi = rows.len();
    while lo < hi {
        let mid = usize::midpoint(lo, hi);
        if rows[mid].timestamp < target {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// First index whose timestamp is past `target`.
fn upper_bound(rows: &[AlignedRow], target: Timestamp) -> usize {
    let mut lo = 0;
    let mut hi = rows.len();
    while lo < hi {
        let mid = usize::midpoint(lo, hi);
        if rows[mid].timestamp <= target {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Index of the row nearest to `target`, clamped to the slice edges,
/// ties toward the earlier row. `rows` must be non-empty.
fn nearest_row_index(rows: &[AlignedRow], target: Timestamp) -> usize {
    let lo = lower_bound(rows, target);
    if lo == 0 {
        return 0;
    }
    if lo >= rows.len() {
        return rows.len() - 1;
    }
    let before = lo - 1;
    let dist_before = target.abs_diff(rows[before].timestamp);
    let dist_after = rows[lo].timestamp.abs_diff(target);
    if dist_before <= dist_after { before } else { lo }
}

/// The two fused tables produced from one recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionOutput {
    /// Table keyed to scene-video frame timestamps.
    pub canonical: FusedTable,
    /// Table keyed to IMU timestamps.
    pub full_rate: FusedTable,
}

/// Fuses a recording's sensor streams into queryable tables.
///
/// The pipeline holds only the mount calibration; everything else is
/// per-call input, so one pipeline serves any number of recordings
/// from the same rig.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionPipeline {
    mount: MountTransform,
}

impl FusionPipeline {
    /// Creates a pipeline with an explicit mount calibration.
    #[must_use]
    pub const fn new(mount: MountTransform) -> Self {
        Self { mount }
    }

    /// Creates a pipeline for the Pupil Labs Neon module.
    #[must_use]
    pub fn neon() -> Self {
        Self::new(MountTransform::neon())
    }

    /// The mount calibration in use.
    #[must_use]
    pub const fn mount(&self) -> MountTransform {
        self.mount
    }

    /// Fuses the streams into the canonical and full-rate tables.
    ///
    /// Both axes are first restricted to the closed intersection of
    /// the gps, imu, gaze, and video coverages; axis samples outside
    /// it are dropped rather than extrapolated over. Events do not
    /// constrain the intersection.
    ///
    /// # Errors
    ///
    /// Returns [`FusionError::InsufficientData`] if the stream
    /// coverages do not intersect, if an axis has no samples inside
    /// the intersection, or if GPS holds fewer than two fixes; and
    /// [`FusionError::NonMonotonic`] if GPS timestamps repeat.
    pub fn build(&self, streams: &RecordingStreams) -> Result<FusionOutput> {
        let Some(coverage) = streams.shared_coverage() else {
            return Err(FusionError::insufficient_data(
                "recording",
                "sensor stream coverages do not intersect",
            ));
        };
        debug!(
            start_ns = coverage.start.as_nanos(),
            end_ns = coverage.end.as_nanos(),
            "restricting axes to shared coverage"
        );

        let full_rate_axis = StreamAligner::from_stream(&streams.imu).restrict(coverage);
        let canonical_axis = StreamAligner::from_stream(&streams.video).restrict(coverage);
        for axis in [&full_rate_axis, &canonical_axis] {
            if axis.is_empty() {
                return Err(FusionError::insufficient_data(
                    axis.name(),
                    "no samples inside the shared coverage",
                ));
            }
        }

        let full_rate = self.table_for_axis(&full_rate_axis, streams)?;
        let canonical = self.table_for_axis(&canonical_axis, streams)?;
        info!(
            canonical_rows = canonical.len(),
            full_rate_rows = full_rate.len(),
            "fused recording streams"
        );

        Ok(FusionOutput {
            canonical,
            full_rate,
        })
    }

    /// Computes the fused columns over one axis.
    fn table_for_axis(
        &self,
        axis: &StreamAligner,
        streams: &RecordingStreams,
    ) -> Result<FusedTable> {
        let orientations = axis.sample_nearest(&streams.imu)?;
        let gaze_scene = axis.sample_nearest(&streams.gaze)?;
        let frames = axis.sample_nearest(&streams.video)?;
        let latitudes = axis.interpolate_channel(&streams.gps, |fix| fix.latitude)?;
        let longitudes = axis.interpolate_channel(&streams.gps, |fix| fix.longitude)?;

        let quaternions: Vec<DQuat> = orientations
            .iter()
            .map(|sample| quat_from_wxyz(sample.quaternion))
            .collect();
        debug!(
            axis = axis.name(),
            source = self.mount.source.name(),
            target = self.mount.target.name(),
            "carrying gaze through the mount"
        );
        let gaze_world = self.mount.gaze_to_world(&gaze_scene, &quaternions)?;

        let mut rows = Vec::with_capacity(axis.len());
        for (index, &timestamp) in axis.timestamps().iter().enumerate() {
            rows.push(AlignedRow {
                timestamp,
                frame_index: frames[index].index,
                position: GpsFix::new(latitudes[index], longitudes[index]),
                heading_deg: orientations[index].yaw_deg,
                gaze_scene: gaze_scene[index],
                gaze_world: gaze_world[index],
            });
        }
        FusedTable::new(axis.name(), rows)
    }
}

impl Default for FusionPipeline {
    /// Defaults to the Neon mount calibration.
    fn default() -> Self {
        Self::neon()
    }
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
    use gaze_types::{ImuSample, Sampled, VideoFrame};

    fn sample<T>(nanos: u64, value: T) -> Sampled<T> {
        Sampled::new(Timestamp::from_nanos(nanos), value)
    }

    fn level_imu(yaw_deg: f64) -> ImuSample {
        ImuSample::new([1.0, 0.0, 0.0, 0.0], yaw_deg)
    }

    fn synthetic_streams() -> RecordingStreams {
        let gps = Stream::new(
            "gps",
            vec![
                sample(0, GpsFix::new(52.0, 13.0)),
                sample(1_000, GpsFix::new(52.001, 13.001)),
            ],
        )
        .unwrap();
        let imu = Stream::new(
            "imu",
            (0..=10).map(|i| sample(i * 100, level_imu(0.0))).collect(),
        )
        .unwrap();
        let gaze = Stream::new(
            "gaze",
            (0..=20)
                .map(|i| sample(i * 50, SphericalAngle::ahead()))
                .collect(),
        )
        .unwrap();
        let video = Stream::new(
            "world",
            (0..=4).map(|i| sample(i * 250, VideoFrame::new(i))).collect(),
        )
        .unwrap();
        let events = Stream::new("events", vec![sample(400, EventMarker::new("waypoint"))])
            .unwrap();
        RecordingStreams::new(gps, imu, gaze, video, events)
    }

    #[test]
    fn build_produces_both_tables() {
        let output = FusionPipeline::neon().build(&synthetic_streams()).unwrap();
        assert_eq!(output.full_rate.len(), 11);
        assert_eq!(output.canonical.len(), 5);
        assert_eq!(output.full_rate.axis(), "imu");
        assert_eq!(output.canonical.axis(), "world");
    }

    #[test]
    fn level_device_reports_camera_tilt() {
        let output = FusionPipeline::neon().build(&synthetic_streams()).unwrap();
        for row in output.canonical.rows() {
            assert!((row.gaze_world.elevation_deg + 12.0).abs() < 1e-9);
            assert!(row.gaze_world.azimuth_deg.abs() < 1e-9);
        }
    }

    #[test]
    fn rows_carry_interpolated_position() {
        let output = FusionPipeline::neon().build(&synthetic_streams()).unwrap();
        let row = output
            .full_rate
            .lookup_nearest(Timestamp::from_nanos(500), None)
            .unwrap();
        assert!(row.position.latitude > 52.0 && row.position.latitude < 52.001);
        assert!(row.position.longitude > 13.0 && row.position.longitude < 13.001);
    }

    #[test]
    fn row_timestamps_are_ordered() {
        let output = FusionPipeline::neon().build(&synthetic_streams()).unwrap();
        for table in [&output.canonical, &output.full_rate] {
            for pair in table.rows().windows(2) {
                assert!(pair[0].timestamp <= pair[1].timestamp);
            }
        }
    }

    #[test]
    fn axes_restrict_to_shared_coverage() {
        let mut streams = synthetic_streams();
        streams.gps = Stream::new(
            "gps",
            vec![
                sample(200, GpsFix::new(52.0, 13.0)),
                sample(800, GpsFix::new(52.001, 13.001)),
            ],
        )
        .unwrap();
        let output = FusionPipeline::neon().build(&streams).unwrap();
        // IMU stamps 200..=800 survive the restriction.
        assert_eq!(output.full_rate.len(), 7);
        assert_eq!(
            output.full_rate.coverage(),
            Some(TimeRange::new(
                Timestamp::from_nanos(200),
                Timestamp::from_nanos(800)
            ))
        );
        // Video frames at 250, 500, and 750.
        assert_eq!(output.canonical.len(), 3);
    }

    #[test]
    fn disjoint_streams_cannot_fuse() {
        let mut streams = synthetic_streams();
        streams.gps = Stream::new(
            "gps",
            vec![
                sample(5_000, GpsFix::new(52.0, 13.0)),
                sample(6_000, GpsFix::new(52.0, 13.0)),
            ],
        )
        .unwrap();
        let err = FusionPipeline::neon().build(&streams).unwrap_err();
        assert!(matches!(err, FusionError::InsufficientData { .. }));
    }

    #[test]
    fn single_gps_fix_is_not_enough() {
        let mut streams = synthetic_streams();
        streams.gps = Stream::new("gps", vec![sample(500, GpsFix::new(52.0, 13.0))]).unwrap();
        let err = FusionPipeline::neon().build(&streams).unwrap_err();
        assert!(matches!(
            err,
            FusionError::InsufficientData { ref stream, .. } if stream == "gps"
        ));
    }

    #[test]
    fn lookup_nearest_clamps_to_edges() {
        let output = FusionPipeline::neon().build(&synthetic_streams()).unwrap();
        let early = output
            .canonical
            .lookup_nearest(Timestamp::zero(), None)
            .unwrap();
        assert_eq!(early.frame_index, 0);
        let late = output
            .canonical
            .lookup_nearest(Timestamp::from_nanos(10_000), None)
            .unwrap();
        assert_eq!(late.frame_index, 4);
    }

    #[test]
    fn halfway_lookup_takes_the_earlier_row() {
        let output = FusionPipeline::neon().build(&synthetic_streams()).unwrap();
        // 125 ns sits exactly between the rows at 0 and 250.
        let halfway = output
            .canonical
            .lookup_nearest(Timestamp::from_nanos(125), None)
            .unwrap();
        assert_eq!(halfway.frame_index, 0);
        let past_halfway = output
            .canonical
            .lookup_nearest(Timestamp::from_nanos(126), None)
            .unwrap();
        assert_eq!(past_halfway.frame_index, 1);
    }

    #[test]
    fn lookup_respects_window() {
        let output = FusionPipeline::neon().build(&synthetic_streams()).unwrap();
        let window = TimeRange::new(Timestamp::from_nanos(400), Timestamp::from_nanos(600));
        let row = output
            .full_rate
            .lookup_nearest(Timestamp::zero(), Some(window))
            .unwrap();
        assert_eq!(row.timestamp, Timestamp::from_nanos(400));
    }

    #[test]
    fn empty_window_is_an_error() {
        let output = FusionPipeline::neon().build(&synthetic_streams()).unwrap();
        let window = TimeRange::new(Timestamp::from_nanos(401), Timestamp::from_nanos(402));
        let err = output
            .full_rate
            .lookup_nearest(Timestamp::zero(), Some(window))
            .unwrap_err();
        assert!(matches!(err, FusionError::InsufficientData { .. }));
    }

    #[test]
    fn annotate_events_resolves_positions() {
        let streams = synthetic_streams();
        let output = FusionPipeline::neon().build(&streams).unwrap();
        let fixes = output
            .full_rate
            .annotate_events(&streams.events, None)
            .unwrap();
        assert_eq!(fixes.len(), 1);
        assert_eq!(fixes[0].label, "waypoint");
        assert_eq!(fixes[0].timestamp, Timestamp::from_nanos(400));
        assert_eq!(fixes[0].heading_deg, 0.0);
        assert!(fixes[0].position.latitude > 52.0);
    }

    #[test]
    fn lookup_nearest_position_finds_closest_row() {
        let output = FusionPipeline::neon().build(&synthetic_streams()).unwrap();
        let row = output
            .full_rate
            .lookup_nearest_position(GpsFix::new(52.001, 13.001), None)
            .unwrap();
        assert_eq!(row.timestamp, Timestamp::from_nanos(1_000));
    }

    #[test]
    fn fused_output_round_trips_through_serde() {
        let output = FusionPipeline::neon().build(&synthetic_streams()).unwrap();
        let json = serde_json::to_string(&output).unwrap();
        let back: FusionOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(back.full_rate.len(), output.full_rate.len());
        assert_eq!(back.canonical.axis(), "world");
    }

    #[test]
    fn default_pipeline_uses_the_neon_mount() {
        let pipeline = FusionPipeline::default();
        assert_eq!(pipeline.mount(), MountTransform::neon());
    }
}
