//! Recording metadata from `info.json`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use gaze_types::{Duration, TimeRange, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::{IoError, IoResult};

/// The metadata of one recording.
///
/// `info.json` carries many device and app fields; only the ones the
/// fusion workspace consumes are modelled here, and unknown fields
/// are ignored on load.
///
/// # Example
///
/// ```
/// use gaze_io::RecordingInfo;
///
/// let info: RecordingInfo = serde_json::from_str(
///     r#"{"recording_id":"63c52a","start_time":1699985853880887321,"duration":4003000000}"#,
/// )?;
/// assert_eq!(info.start().as_nanos(), 1_699_985_853_880_887_321);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingInfo {
    /// Unique recording identifier.
    pub recording_id: String,
    /// Recording start in UTC epoch nanoseconds.
    pub start_time: u64,
    /// Recorded length in nanoseconds.
    pub duration: u64,
}

impl RecordingInfo {
    /// Recording start as a timestamp.
    #[must_use]
    pub const fn start(&self) -> Timestamp {
        Timestamp::from_nanos(self.start_time)
    }

    /// The span the recording claims to cover.
    ///
    /// Returns `None` if start plus duration overflows the timestamp
    /// range.
    #[must_use]
    pub fn recorded_span(&self) -> Option<TimeRange> {
        let start = self.start();
        let end = start.checked_add(Duration::from_nanos(self.duration))?;
        Some(TimeRange::new(start, end))
    }
}

/// Load recording metadata from an `info.json` file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the JSON lacks a
/// required field.
pub fn load_info<P: AsRef<Path>>(path: P) -> IoResult<RecordingInfo> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IoError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IoError::Io(e)
        }
    })?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const INFO_JSON: &str = r#"{
        "android_device_model": "Motorola Moto G",
        "app_version": "2.8.25",
        "data_format_version": "2.2",
        "duration": 4003000000,
        "recording_id": "63c52a1b-8f2e-4602-9a5e-2f1f1c12f3a0",
        "start_time": 1699985853880887321,
        "wearer_name": "test wearer"
    }"#;

    #[test]
    fn unknown_fields_are_ignored() {
        let info: RecordingInfo = serde_json::from_str(INFO_JSON).unwrap();
        assert_eq!(info.recording_id, "63c52a1b-8f2e-4602-9a5e-2f1f1c12f3a0");
        assert_eq!(info.start_time, 1_699_985_853_880_887_321);
        assert_eq!(info.duration, 4_003_000_000);
    }

    #[test]
    fn recorded_span_adds_duration() {
        let info: RecordingInfo = serde_json::from_str(INFO_JSON).unwrap();
        let span = info.recorded_span().unwrap();
        assert_eq!(span.start, info.start());
        assert_eq!(
            span.end.as_nanos(),
            1_699_985_853_880_887_321 + 4_003_000_000
        );
    }

    #[test]
    fn missing_field_is_an_error() {
        let result: Result<RecordingInfo, _> =
            serde_json::from_str(r#"{"recording_id": "63c52a"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("info.json");
        std::fs::write(&path, INFO_JSON).unwrap();
        let info = load_info(&path).unwrap();
        assert_eq!(info.duration, 4_003_000_000);
    }

    #[test]
    fn load_nonexistent_file() {
        let err = load_info("no_such_recording/info.json").unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }
}
