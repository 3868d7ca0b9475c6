//! End-to-end fusion tests over a synthetic outdoor walk.
//!
//! These tests drive the full public API the way a playback tool
//! would: build both tables from one recording, then query them. The
//! synthetic recording covers the behaviors field data exercises:
//! - Streams at different rates (GPS 1 Hz up to gaze 20 Hz)
//! - A heading change halfway through the walk
//! - Event markers placed on and off row timestamps
//! - A blink exported as NaN gaze angles
//!
//! To run: cargo test -p gaze-fusion --test pipeline

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::f64::consts::FRAC_1_SQRT_2;

use gaze_fusion::prelude::*;
use gaze_types::{
    EventMarker, GpsFix, ImuSample, RecordingStreams, Sampled, SphericalAngle, Stream, TimeRange,
    Timestamp, VideoFrame,
};

/// Recording start, at a realistic epoch scale.
const BASE_NS: u64 = 1_700_000_000_000_000_000;
const SEC: u64 = 1_000_000_000;

fn ts(offset_ns: u64) -> Timestamp {
    Timestamp::from_nanos(BASE_NS + offset_ns)
}

fn at<T>(offset_ns: u64, value: T) -> Sampled<T> {
    Sampled::new(ts(offset_ns), value)
}

/// IMU sample for a level wearer facing north.
fn facing_north() -> ImuSample {
    ImuSample::identity()
}

/// IMU sample for a level wearer facing west (a 90° left turn).
fn facing_west() -> ImuSample {
    ImuSample::new([FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2], 90.0)
}

/// A four-second walk north, turning west after two seconds.
///
/// GPS at 1 Hz, IMU at 10 Hz, gaze at 20 Hz, scene video at 5 Hz,
/// with markers at the turn and at the end.
fn walk_recording() -> RecordingStreams {
    let gps = Stream::new(
        "gps",
        (0..=4)
            .map(|i| at(i * SEC, GpsFix::new(52.0 + 0.0001 * i as f64, 13.0)))
            .collect(),
    )
    .unwrap();
    let imu = Stream::new(
        "imu",
        (0..=40)
            .map(|i| {
                let sample = if i <= 20 { facing_north() } else { facing_west() };
                at(i * SEC / 10, sample)
            })
            .collect(),
    )
    .unwrap();
    let gaze = Stream::new(
        "gaze",
        (0..=80)
            .map(|i| at(i * SEC / 20, SphericalAngle::ahead()))
            .collect(),
    )
    .unwrap();
    let video = Stream::new(
        "world",
        (0..=20).map(|i| at(i * SEC / 5, VideoFrame::new(i))).collect(),
    )
    .unwrap();
    let events = Stream::new(
        "events",
        vec![
            at(2 * SEC, EventMarker::new("turn left")),
            at(4 * SEC, EventMarker::new("arrive")),
        ],
    )
    .unwrap();
    RecordingStreams::new(gps, imu, gaze, video, events)
}

#[test]
fn fused_walk_resolves_positions_and_gaze() {
    let output = FusionPipeline::neon().build(&walk_recording()).unwrap();

    assert_eq!(output.canonical.axis(), "world");
    assert_eq!(output.canonical.len(), 21);
    assert_eq!(output.full_rate.axis(), "imu");
    assert_eq!(output.full_rate.len(), 41);

    for table in [&output.canonical, &output.full_rate] {
        for pair in table.rows().windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
        }
        // The walk is monotone northward, so interpolated latitudes
        // stay inside the hull of the fixes.
        for row in table.rows() {
            assert!(row.position.latitude >= 52.0 - 1e-9);
            assert!(row.position.latitude <= 52.0004 + 1e-9);
            assert!((row.position.longitude - 13.0).abs() < 1e-9);
        }
    }

    // Level and facing north: gaze lands 12° below the horizon, dead
    // ahead, for the whole first half.
    for row in output.canonical.rows() {
        if row.timestamp <= ts(2 * SEC) {
            assert!((row.gaze_world.elevation_deg + 12.0).abs() < 1e-9);
            assert!(row.gaze_world.azimuth_deg.abs() < 1e-9);
        }
    }

    let halfway = output.full_rate.lookup_nearest(ts(SEC / 2), None).unwrap();
    assert!(halfway.position.latitude > 52.0);
    assert!(halfway.position.latitude < 52.0001);
}

#[test]
fn turning_west_swings_gaze_azimuth() {
    let output = FusionPipeline::neon().build(&walk_recording()).unwrap();
    for row in output.canonical.rows() {
        if row.timestamp >= ts(2 * SEC + SEC / 5) {
            assert!((row.gaze_world.azimuth_deg - 90.0).abs() < 1e-9);
            assert!((row.gaze_world.elevation_deg + 12.0).abs() < 1e-9);
            assert!((row.heading_deg - 90.0).abs() < 1e-9);
        }
    }
}

#[test]
fn events_annotate_against_canonical_rows() {
    let streams = walk_recording();
    let output = FusionPipeline::neon().build(&streams).unwrap();
    let fixes = output
        .canonical
        .annotate_events(&streams.events, None)
        .unwrap();

    assert_eq!(fixes.len(), 2);
    assert_eq!(fixes[0].label, "turn left");
    assert_eq!(fixes[0].timestamp, ts(2 * SEC));
    assert_eq!(fixes[0].frame_index, 10);
    assert!(fixes[0].heading_deg.abs() < 1e-9);

    assert_eq!(fixes[1].label, "arrive");
    assert_eq!(fixes[1].frame_index, 20);
    assert!((fixes[1].heading_deg - 90.0).abs() < 1e-9);
    assert!((fixes[1].position.latitude - 52.0004).abs() < 1e-9);
}

#[test]
fn window_queries_respect_bounds() {
    let output = FusionPipeline::neon().build(&walk_recording()).unwrap();

    let window = TimeRange::new(ts(SEC), ts(3 * SEC));
    let clamped = output
        .canonical
        .lookup_nearest(ts(0), Some(window))
        .unwrap();
    assert_eq!(clamped.timestamp, ts(SEC));

    let gap = TimeRange::new(ts(SEC / 8), ts(SEC / 6));
    let err = output.canonical.lookup_nearest(ts(0), Some(gap)).unwrap_err();
    assert!(matches!(err, FusionError::InsufficientData { .. }));

    let end = output
        .full_rate
        .lookup_nearest_position(GpsFix::new(52.0004, 13.0), None)
        .unwrap();
    assert_eq!(end.timestamp, ts(4 * SEC));
}

#[test]
fn blink_rows_pass_nan_through() {
    let mut streams = walk_recording();
    let mut samples: Vec<Sampled<SphericalAngle>> = streams.gaze.iter().cloned().collect();
    // A blink at t=1s exports as NaN angles.
    samples[20].value = SphericalAngle::new(f64::NAN, f64::NAN);
    streams.gaze = Stream::new("gaze", samples).unwrap();

    let output = FusionPipeline::neon().build(&streams).unwrap();
    let blink_row = output.canonical.lookup_nearest(ts(SEC), None).unwrap();
    assert!(blink_row.gaze_world.is_nan());

    // Neighboring rows keep their finite gaze.
    let before = output.canonical.lookup_nearest(ts(SEC - SEC / 5), None).unwrap();
    assert!(!before.gaze_world.is_nan());
    assert!((before.gaze_world.elevation_deg + 12.0).abs() < 1e-9);
}

#[test]
fn output_serializes_for_downstream_tools() {
    let output = FusionPipeline::neon().build(&walk_recording()).unwrap();
    let json = serde_json::to_string(&output).unwrap();
    let back: FusionOutput = serde_json::from_str(&json).unwrap();

    assert_eq!(back.canonical.len(), output.canonical.len());
    assert_eq!(back.full_rate.len(), output.full_rate.len());
    assert_eq!(back.canonical.rows()[10].frame_index, 10);
    assert_eq!(back.canonical.axis(), "world");
}
