//! Loaders for the timeseries CSV files of a recording.
//!
//! A Neon "Timeseries Data" export is a folder of flat CSV files, one
//! per sensor, every row stamped with UTC nanoseconds. The companion
//! GPS logger writes the same layout. Columns are located by header
//! name, never by position, because the exporter adds and reorders
//! columns between versions.
//!
//! # Layout
//!
//! ```text
//! section id,recording id,timestamp [ns],...,azimuth [deg],elevation [deg]
//! f0709ab,63c52a,1699985853880887321,...,-3.217509,-7.413944
//! f0709ab,63c52a,1699985853885887321,...,,
//! ```
//!
//! Cells are split on plain commas; these exports never quote cells.
//! Blank gaze-angle cells (blinks, device not worn) load as `NaN`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use gaze_types::{
    EventMarker, GpsFix, ImuSample, Sampled, SphericalAngle, Stream, Timestamp, VideoFrame,
};
use tracing::warn;

use crate::error::{IoError, IoResult};

/// Open a file for buffered reading, mapping absence to a typed error.
fn open_buffered(path: &Path) -> IoResult<BufReader<File>> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IoError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IoError::Io(e)
        }
    })?;
    Ok(BufReader::new(file))
}

/// Split a CSV row into trimmed cells.
fn split_row(line: &str) -> Vec<&str> {
    line.split(',').map(str::trim).collect()
}

/// Locate a column by header name.
fn column_index(header: &str, file: &str, column: &str) -> IoResult<usize> {
    header
        .split(',')
        .map(str::trim)
        .position(|cell| cell == column)
        .ok_or_else(|| IoError::missing_column(file, column))
}

/// Fetch one cell of a row, rejecting rows shorter than the header.
fn cell<'a>(cells: &[&'a str], index: usize, file: &str) -> IoResult<&'a str> {
    cells
        .get(index)
        .copied()
        .ok_or_else(|| IoError::invalid_content(format!("truncated row in {file}")))
}

/// Parse a gaze angle cell; blank means no gaze was detected.
fn parse_angle(cell: &str) -> IoResult<f64> {
    if cell.is_empty() {
        return Ok(f64::NAN);
    }
    Ok(cell.parse()?)
}

/// Read the header line of a CSV file.
fn header_line(lines: &mut std::io::Lines<impl BufRead>, file: &str) -> IoResult<String> {
    match lines.next() {
        Some(line) => Ok(line?),
        None => Err(IoError::invalid_content(format!("{file} is empty"))),
    }
}

/// Load the gaze stream from `gaze.csv`.
///
/// Uses the `timestamp [ns]`, `elevation [deg]`, and `azimuth [deg]`
/// columns. Blank angle cells load as `NaN` and flow through fusion
/// unchanged.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a required column is
/// missing, a cell fails to parse, or timestamps decrease.
///
/// # Example
///
/// ```no_run
/// use gaze_io::load_gaze_csv;
///
/// let gaze = load_gaze_csv("recording/gaze.csv")?;
/// println!("loaded {} gaze samples", gaze.len());
/// # Ok::<(), gaze_io::IoError>(())
/// ```
pub fn load_gaze_csv<P: AsRef<Path>>(path: P) -> IoResult<Stream<SphericalAngle>> {
    read_gaze_csv(open_buffered(path.as_ref())?)
}

fn read_gaze_csv<R: BufRead>(reader: R) -> IoResult<Stream<SphericalAngle>> {
    const FILE: &str = "gaze.csv";
    let mut lines = reader.lines();
    let header = header_line(&mut lines, FILE)?;
    let ts_col = column_index(&header, FILE, "timestamp [ns]")?;
    let elevation_col = column_index(&header, FILE, "elevation [deg]")?;
    let azimuth_col = column_index(&header, FILE, "azimuth [deg]")?;

    let mut samples = Vec::new();
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let cells = split_row(&line);
        let timestamp = Timestamp::from_nanos(cell(&cells, ts_col, FILE)?.parse()?);
        let elevation = parse_angle(cell(&cells, elevation_col, FILE)?)?;
        let azimuth = parse_angle(cell(&cells, azimuth_col, FILE)?)?;
        samples.push(Sampled::new(
            timestamp,
            SphericalAngle::new(elevation, azimuth),
        ));
    }
    Ok(Stream::new("gaze", samples)?)
}

/// Load the orientation stream from `imu.csv`.
///
/// Uses the `timestamp [ns]`, `quaternion w/x/y/z`, and `yaw [deg]`
/// columns; the other inertial columns are ignored. Non-unit
/// quaternions still load, with the row count logged at warn level.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a required column is
/// missing, a cell fails to parse, or timestamps decrease.
pub fn load_imu_csv<P: AsRef<Path>>(path: P) -> IoResult<Stream<ImuSample>> {
    read_imu_csv(open_buffered(path.as_ref())?)
}

fn read_imu_csv<R: BufRead>(reader: R) -> IoResult<Stream<ImuSample>> {
    const FILE: &str = "imu.csv";
    // The exporter rounds quaternion components to six decimals, so
    // honest rows sit well inside this.
    const UNIT_TOLERANCE: f64 = 1e-3;
    let mut lines = reader.lines();
    let header = header_line(&mut lines, FILE)?;
    let ts_col = column_index(&header, FILE, "timestamp [ns]")?;
    let w_col = column_index(&header, FILE, "quaternion w")?;
    let x_col = column_index(&header, FILE, "quaternion x")?;
    let y_col = column_index(&header, FILE, "quaternion y")?;
    let z_col = column_index(&header, FILE, "quaternion z")?;
    let yaw_col = column_index(&header, FILE, "yaw [deg]")?;

    let mut samples = Vec::new();
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let cells = split_row(&line);
        let timestamp = Timestamp::from_nanos(cell(&cells, ts_col, FILE)?.parse()?);
        let quaternion = [
            cell(&cells, w_col, FILE)?.parse()?,
            cell(&cells, x_col, FILE)?.parse()?,
            cell(&cells, y_col, FILE)?.parse()?,
            cell(&cells, z_col, FILE)?.parse()?,
        ];
        let yaw_deg = cell(&cells, yaw_col, FILE)?.parse()?;
        samples.push(Sampled::new(timestamp, ImuSample::new(quaternion, yaw_deg)));
    }
    let off_unit = samples
        .iter()
        .filter(|sample| !sample.value.is_normalized(UNIT_TOLERANCE))
        .count();
    if off_unit > 0 {
        warn!(rows = off_unit, "imu.csv has non-unit quaternions");
    }
    Ok(Stream::new("imu", samples)?)
}

/// Load the scene-video frame stream from `world_timestamps.csv`.
///
/// The file holds one row per captured frame; the frame index is the
/// row ordinal, not a file column.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the timestamp column
/// is missing, a cell fails to parse, or timestamps decrease.
pub fn load_world_timestamps_csv<P: AsRef<Path>>(path: P) -> IoResult<Stream<VideoFrame>> {
    read_world_timestamps_csv(open_buffered(path.as_ref())?)
}

fn read_world_timestamps_csv<R: BufRead>(reader: R) -> IoResult<Stream<VideoFrame>> {
    const FILE: &str = "world_timestamps.csv";
    let mut lines = reader.lines();
    let header = header_line(&mut lines, FILE)?;
    let ts_col = column_index(&header, FILE, "timestamp [ns]")?;

    let mut samples = Vec::new();
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let cells = split_row(&line);
        let timestamp = Timestamp::from_nanos(cell(&cells, ts_col, FILE)?.parse()?);
        let frame = VideoFrame::new(samples.len() as u64);
        samples.push(Sampled::new(timestamp, frame));
    }
    Ok(Stream::new("world", samples)?)
}

/// Load the event markers from `events.csv`.
///
/// Uses the `timestamp [ns]` and `name` columns. Labels are taken
/// verbatim from the `name` cell. A recording without markers yields
/// an empty stream.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a required column is
/// missing, a timestamp fails to parse, or timestamps decrease.
pub fn load_events_csv<P: AsRef<Path>>(path: P) -> IoResult<Stream<EventMarker>> {
    read_events_csv(open_buffered(path.as_ref())?)
}

fn read_events_csv<R: BufRead>(reader: R) -> IoResult<Stream<EventMarker>> {
    const FILE: &str = "events.csv";
    let mut lines = reader.lines();
    let header = header_line(&mut lines, FILE)?;
    let ts_col = column_index(&header, FILE, "timestamp [ns]")?;
    let name_col = column_index(&header, FILE, "name")?;

    let mut samples = Vec::new();
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let cells = split_row(&line);
        let timestamp = Timestamp::from_nanos(cell(&cells, ts_col, FILE)?.parse()?);
        let marker = EventMarker::new(cell(&cells, name_col, FILE)?);
        samples.push(Sampled::new(timestamp, marker));
    }
    Ok(Stream::new("events", samples)?)
}

/// Load the position stream from the external GPS logger's CSV.
///
/// Uses the `timestamp [ns]`, `latitude`, and `longitude` columns.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a required column is
/// missing, a cell fails to parse, or timestamps decrease.
pub fn load_gps_csv<P: AsRef<Path>>(path: P) -> IoResult<Stream<GpsFix>> {
    read_gps_csv(open_buffered(path.as_ref())?)
}

fn read_gps_csv<R: BufRead>(reader: R) -> IoResult<Stream<GpsFix>> {
    const FILE: &str = "gps.csv";
    let mut lines = reader.lines();
    let header = header_line(&mut lines, FILE)?;
    let ts_col = column_index(&header, FILE, "timestamp [ns]")?;
    let lat_col = column_index(&header, FILE, "latitude")?;
    let lon_col = column_index(&header, FILE, "longitude")?;

    let mut samples = Vec::new();
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let cells = split_row(&line);
        let timestamp = Timestamp::from_nanos(cell(&cells, ts_col, FILE)?.parse()?);
        let latitude = cell(&cells, lat_col, FILE)?.parse()?;
        let longitude = cell(&cells, lon_col, FILE)?.parse()?;
        samples.push(Sampled::new(timestamp, GpsFix::new(latitude, longitude)));
    }
    Ok(Stream::new("gps", samples)?)
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

    const GAZE_CSV: &str = "\
section id,recording id,timestamp [ns],gaze x [px],gaze y [px],azimuth [deg],elevation [deg]
s1,r1,1000,811.0,603.1,-3.2,-7.4
s1,r1,2000,812.4,601.9,,
s1,r1,3000,810.2,600.0,4.6,-6.9
";

    const IMU_CSV: &str = "\
section id,recording id,timestamp [ns],roll [deg],pitch [deg],yaw [deg],quaternion w,quaternion x,quaternion y,quaternion z
s1,r1,1000,0.1,-0.3,12.5,1.0,0.0,0.0,0.0
s1,r1,2000,0.2,-0.2,13.0,0.98,0.0,0.0,0.19
";

    const WORLD_CSV: &str = "\
section id,recording id,timestamp [ns]
s1,r1,500
s1,r1,1500
s1,r1,2500
";

    const EVENTS_CSV: &str = "\
recording id,timestamp [ns],name,type
r1,1200,recording.begin,recording
r1,2200,waypoint reached,user
";

    const GPS_CSV: &str = "\
timestamp [ns],latitude,longitude
1000,52.5200,13.4050
2000,52.5201,13.4052
";

    #[test]
    fn gaze_columns_locate_by_header() {
        let stream = read_gaze_csv(GAZE_CSV.as_bytes()).unwrap();
        assert_eq!(stream.len(), 3);
        assert_eq!(stream.name(), "gaze");
        let first = stream.first().unwrap();
        assert_eq!(first.timestamp, Timestamp::from_nanos(1_000));
        assert_eq!(first.value.elevation_deg, -7.4);
        assert_eq!(first.value.azimuth_deg, -3.2);
    }

    #[test]
    fn blank_gaze_cells_load_as_nan() {
        let stream = read_gaze_csv(GAZE_CSV.as_bytes()).unwrap();
        assert!(stream.samples()[1].value.is_nan());
        assert!(!stream.samples()[2].value.is_nan());
    }

    #[test]
    fn missing_column_is_a_typed_error() {
        let csv = "section id,timestamp [ns],elevation [deg]\ns1,1000,-7.4\n";
        let err = read_gaze_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            IoError::MissingColumn { ref file, ref column }
                if file == "gaze.csv" && column == "azimuth [deg]"
        ));
    }

    #[test]
    fn imu_rows_parse_quaternion_and_yaw() {
        let stream = read_imu_csv(IMU_CSV.as_bytes()).unwrap();
        assert_eq!(stream.len(), 2);
        let second = stream.samples()[1].value;
        assert_eq!(second.quaternion, [0.98, 0.0, 0.0, 0.19]);
        assert_eq!(second.yaw_deg, 13.0);
    }

    #[test]
    fn non_unit_quaternions_still_load() {
        let csv = "timestamp [ns],yaw [deg],quaternion w,quaternion x,quaternion y,quaternion z\n\
                   1000,90.0,0.5,0.5,0.5,0.6\n";
        let stream = read_imu_csv(csv.as_bytes()).unwrap();
        assert_eq!(stream.len(), 1);
        assert_eq!(stream.samples()[0].value.quaternion, [0.5, 0.5, 0.5, 0.6]);
    }

    #[test]
    fn world_frame_indices_are_row_ordinals() {
        let stream = read_world_timestamps_csv(WORLD_CSV.as_bytes()).unwrap();
        assert_eq!(stream.len(), 3);
        for (ordinal, sample) in stream.iter().enumerate() {
            assert_eq!(sample.value.index, ordinal as u64);
        }
        assert_eq!(
            stream.last().unwrap().timestamp,
            Timestamp::from_nanos(2_500)
        );
    }

    #[test]
    fn events_parse_names() {
        let stream = read_events_csv(EVENTS_CSV.as_bytes()).unwrap();
        assert_eq!(stream.len(), 2);
        assert_eq!(stream.samples()[0].value.label, "recording.begin");
        assert_eq!(stream.samples()[1].value.label, "waypoint reached");
    }

    #[test]
    fn empty_events_file_yields_empty_stream() {
        let csv = "recording id,timestamp [ns],name,type\n";
        let stream = read_events_csv(csv.as_bytes()).unwrap();
        assert!(stream.is_empty());
    }

    #[test]
    fn gps_rows_parse() {
        let stream = read_gps_csv(GPS_CSV.as_bytes()).unwrap();
        assert_eq!(stream.len(), 2);
        let fix = stream.first().unwrap().value;
        assert_eq!(fix.latitude, 52.52);
        assert_eq!(fix.longitude, 13.405);
        assert!(fix.is_valid());
    }

    #[test]
    fn decreasing_timestamps_are_rejected() {
        let csv = "timestamp [ns],latitude,longitude\n2000,52.0,13.0\n1000,52.1,13.1\n";
        let err = read_gps_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, IoError::Stream(_)));
    }

    #[test]
    fn truncated_row_is_rejected() {
        let csv = "timestamp [ns],latitude,longitude\n1000,52.0\n";
        let err = read_gps_csv(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("truncated row in gps.csv"));
    }

    #[test]
    fn malformed_number_is_rejected() {
        let csv = "timestamp [ns],latitude,longitude\n1000,fifty-two,13.0\n";
        let err = read_gps_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, IoError::ParseFloat(_)));
    }

    #[test]
    fn empty_file_is_rejected() {
        let err = read_gaze_csv("".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("gaze.csv is empty"));
    }

    #[test]
    fn crlf_rows_parse() {
        let csv = "timestamp [ns],latitude,longitude\r\n1000,52.0,13.0\r\n";
        let stream = read_gps_csv(csv.as_bytes()).unwrap();
        assert_eq!(stream.len(), 1);
        assert_eq!(stream.first().unwrap().value.longitude, 13.0);
    }

    #[test]
    fn load_nonexistent_file() {
        let result = load_gaze_csv("no_such_recording/gaze.csv");
        assert!(result.is_err());
        if let Err(IoError::FileNotFound { path }) = result {
            assert!(path.to_string_lossy().contains("no_such_recording"));
        }
    }

    #[test]
    fn load_from_disk_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gps.csv");
        std::fs::write(&path, GPS_CSV).unwrap();
        let stream = load_gps_csv(&path).unwrap();
        assert_eq!(stream.len(), 2);
    }
}
