//! Recording ingestion for the gaze fusion workspace.
//!
//! This crate loads the on-disk artifacts of an outdoor eye-tracking
//! session into validated [`gaze_types`] streams:
//!
//! - **`gaze.csv`** - gaze elevation/azimuth per eye-camera frame
//! - **`imu.csv`** - absolute orientation quaternions plus heading
//! - **`world_timestamps.csv`** - scene-video frame capture times
//! - **`events.csv`** - labelled recording moments
//! - **external GPS CSV** - position fixes from the phone logger
//! - **`info.json`** - recording metadata
//!
//! The CSV files are flat comma-separated exports; columns are found
//! by header name so exporter versions can add or reorder columns
//! freely. All parsing lives behind typed [`IoError`] values.
//!
//! # Layer 1 Crate
//!
//! This crate touches the filesystem and nothing else: no network,
//! no video decoding. The scene video stays on disk; fused rows
//! reference it by frame index.
//!
//! # Example
//!
//! ```no_run
//! use gaze_io::load_recording;
//!
//! let streams = load_recording("recording/", "track/gps.csv")?;
//! println!("{} gaze samples", streams.gaze.len());
//! # Ok::<(), gaze_io::IoError>(())
//! ```
//!
//! # Quality Standards
//!
//! - No `unwrap`/`expect` in library code
//! - All public APIs documented
//! - Malformed input surfaces as a typed [`IoError`], never a panic

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod csv;
mod error;
mod info;

// Re-export loader functions
pub use csv::{
    load_events_csv, load_gaze_csv, load_gps_csv, load_imu_csv, load_world_timestamps_csv,
};

// Re-export error types
pub use error::{IoError, IoResult};

// Re-export metadata types
pub use info::{RecordingInfo, load_info};

use std::path::Path;

use gaze_types::RecordingStreams;
use tracing::info;

/// Load a full recording: the Neon export folder plus the GPS CSV.
///
/// `neon_dir` is the unzipped "Timeseries Data" folder containing
/// `gaze.csv`, `imu.csv`, `world_timestamps.csv`, and `events.csv`;
/// `gps_csv` is the external logger's track for the same session.
///
/// # Errors
///
/// Returns an error if any file cannot be read or parsed; see the
/// individual loaders for the per-file failure modes.
///
/// # Example
///
/// ```no_run
/// use gaze_io::load_recording;
///
/// let streams = load_recording("recording/", "track/gps.csv")?;
/// assert_eq!(streams.video.name(), "world");
/// # Ok::<(), gaze_io::IoError>(())
/// ```
pub fn load_recording<P: AsRef<Path>, Q: AsRef<Path>>(
    neon_dir: P,
    gps_csv: Q,
) -> IoResult<RecordingStreams> {
    let neon_dir = neon_dir.as_ref();
    let gps = load_gps_csv(gps_csv)?;
    let imu = load_imu_csv(neon_dir.join("imu.csv"))?;
    let gaze = load_gaze_csv(neon_dir.join("gaze.csv"))?;
    let video = load_world_timestamps_csv(neon_dir.join("world_timestamps.csv"))?;
    let events = load_events_csv(neon_dir.join("events.csv"))?;
    info!(
        gps_fixes = gps.len(),
        imu_samples = imu.len(),
        gaze_samples = gaze.len(),
        video_frames = video.len(),
        event_markers = events.len(),
        "loaded recording streams"
    );
    Ok(RecordingStreams::new(gps, imu, gaze, video, events))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn write_recording(dir: &Path) {
        std::fs::write(
            dir.join("gaze.csv"),
            "timestamp [ns],azimuth [deg],elevation [deg]\n1000,-3.2,-7.4\n2000,1.1,-6.0\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("imu.csv"),
            "timestamp [ns],yaw [deg],quaternion w,quaternion x,quaternion y,quaternion z\n\
             1000,0.0,1.0,0.0,0.0,0.0\n2000,1.5,1.0,0.0,0.0,0.0\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("world_timestamps.csv"),
            "timestamp [ns]\n1000\n1500\n2000\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("events.csv"),
            "timestamp [ns],name\n1500,recording.begin\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("gps.csv"),
            "timestamp [ns],latitude,longitude\n1000,52.0,13.0\n2000,52.001,13.001\n",
        )
        .unwrap();
    }

    #[test]
    fn recording_loads_all_streams() {
        let dir = tempfile::tempdir().unwrap();
        write_recording(dir.path());

        let streams = load_recording(dir.path(), dir.path().join("gps.csv")).unwrap();
        assert_eq!(streams.gps.len(), 2);
        assert_eq!(streams.imu.len(), 2);
        assert_eq!(streams.gaze.len(), 2);
        assert_eq!(streams.video.len(), 3);
        assert_eq!(streams.events.len(), 1);
        assert_eq!(streams.video.name(), "world");
        assert!(streams.shared_coverage().is_some());
    }

    #[test]
    fn missing_file_names_its_path() {
        let dir = tempfile::tempdir().unwrap();
        write_recording(dir.path());
        std::fs::remove_file(dir.path().join("imu.csv")).unwrap();

        let err = load_recording(dir.path(), dir.path().join("gps.csv")).unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { ref path } if path.ends_with("imu.csv")));
    }
}
