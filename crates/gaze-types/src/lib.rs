//! Data types for head-worn eye-tracker recordings.
//!
//! This crate provides the foundational types shared across the gaze
//! fusion workspace:
//! - Recording ingestion (`gaze-io`)
//! - Temporal alignment and orientation transforms (`gaze-fusion`)
//! - Downstream visualization and export tools
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with no heavyweight dependencies (serde is
//! optional). It can be used in CLI tools, servers, WASM, and test
//! harnesses alike.
//!
//! # Stream Types
//!
//! - [`Sampled`] / [`Stream`] - timestamped samples with validated
//!   ordering
//! - [`GpsFix`] - position from the external GPS logger
//! - [`ImuSample`] - absolute orientation quaternion plus heading
//! - [`SphericalAngle`] - gaze elevation/azimuth in the device
//!   convention
//! - [`VideoFrame`] - scene-camera frame reference (canonical axis)
//! - [`EventMarker`] - labelled recording moments
//! - [`RecordingStreams`] - one recording's streams, bundled
//!
//! # Coordinate Frames
//!
//! Direction data references a [`Frame`]:
//! - `Scene` - scene-camera frame (z forward)
//! - `Imu` - IMU body frame
//! - `World` - z up, y north, x east
//!
//! # Time
//!
//! All samples use [`Timestamp`] (UTC nanoseconds), enabling precise
//! temporal alignment in `gaze-fusion`. Fused-table queries select by
//! closed [`TimeRange`] bounds.
//!
//! # Design Philosophy
//!
//! These are **raw recording types**. Derived quantities (world-frame
//! gaze, fused rows) belong in `gaze-fusion`. The separation keeps
//! loaders and math testable against the same small vocabulary.
//!
//! # Example
//!
//! ```
//! use gaze_types::{Sampled, SphericalAngle, Stream, Timestamp};
//!
//! let gaze = Stream::new(
//!     "gaze",
//!     vec![Sampled::new(
//!         Timestamp::from_nanos(0),
//!         SphericalAngle::new(-12.0, 30.0),
//!     )],
//! )?;
//!
//! assert_eq!(gaze.len(), 1);
//! # Ok::<(), gaze_types::StreamError>(())
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod angle;
mod error;
mod event;
mod frame;
mod gps;
mod imu;
mod recording;
mod stream;
mod time;
mod video;

// Re-export core types
pub use angle::SphericalAngle;
pub use error::StreamError;
pub use event::EventMarker;
pub use frame::Frame;
pub use gps::GpsFix;
pub use imu::ImuSample;
pub use recording::RecordingStreams;
pub use stream::{Sampled, Stream};
pub use time::{Duration, TimeRange, Timestamp};
pub use video::VideoFrame;
