//! Temporal alignment and gaze-to-world fusion for head-worn
//! eye-tracker recordings.
//!
//! A recording arrives as independent streams on their own clocks:
//! gaze angles from the eye cameras, orientation quaternions from the
//! IMU, fixes from a GPS logger, scene-video frame timestamps, and
//! event markers. This crate lines them up on shared time axes and
//! carries gaze through the scene, IMU, and world frames, so that
//! every output row states where the wearer was and where they were
//! looking.
//!
//! # Orientation Math
//!
//! - [`spherical_to_cartesian`] / [`cartesian_to_spherical`] -
//!   device-convention angles to unit vectors and back
//! - [`quat_from_wxyz`] - IMU quaternion layout into [`glam::DQuat`]
//! - [`rotate_series`] - length-checked batch rotation
//! - [`wrap_azimuth_deg`] - normalization into [-180°, 180°)
//!
//! # Transform Chain
//!
//! - [`MountTransform`] - rigid scene-camera to IMU calibration, with
//!   the Neon module's factory values as the default
//! - [`imu_heading_in_world`] - the wearer's forward direction
//!
//! # Alignment
//!
//! - [`StreamAligner`] - nearest-sample selection and monotone cubic
//!   channel interpolation onto a target axis
//! - [`MonotoneCubic`] - overshoot-free interpolant over timestamped
//!   knots
//!
//! # Pipeline
//!
//! - [`FusionPipeline`] - whole-recording fusion over the shared
//!   coverage window
//! - [`FusedTable`] - time-ordered rows with nearest-row queries
//! - [`AlignedRow`] / [`EventFix`] / [`FusionOutput`] - result types
//!
//! # Layer 1 Crate
//!
//! This crate does no I/O. It consumes validated `gaze_types` streams
//! (produced by `gaze-io` or built in memory) and returns fused
//! tables; persistence and rendering live downstream.
//!
//! # Example
//!
//! ```
//! use gaze_fusion::MountTransform;
//! use gaze_types::SphericalAngle;
//! use glam::DQuat;
//!
//! // A level, north-facing wearer looking straight ahead gazes 12°
//! // below the horizon: the scene camera tilts down by that much.
//! let mount = MountTransform::neon();
//! let world = mount.gaze_to_world(&[SphericalAngle::ahead()], &[DQuat::IDENTITY])?;
//! assert!((world[0].elevation_deg + 12.0).abs() < 1e-9);
//! assert!(world[0].azimuth_deg.abs() < 1e-9);
//! # Ok::<(), gaze_fusion::FusionError>(())
//! ```
//!
//! # Quality Standards
//!
//! - No `unwrap`/`expect` in library code
//! - All public APIs documented
//! - Length and ordering preconditions checked, never assumed
//! - No silent extrapolation: out-of-coverage evaluation is an error

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod align;
mod error;
mod interpolation;
mod orientation;
mod pipeline;
mod transform;

// Re-export alignment types
pub use align::StreamAligner;

// Re-export error types
pub use error::{FusionError, Result};

// Re-export interpolation types
pub use interpolation::MonotoneCubic;

// Re-export orientation math
pub use orientation::{
    cartesian_to_spherical, cartesian_to_spherical_series, quat_from_wxyz, rotate_by_quaternion,
    rotate_series, spherical_to_cartesian, spherical_to_cartesian_series,
    world_spherical_to_cartesian, wrap_azimuth_deg,
};

// Re-export pipeline types
pub use pipeline::{AlignedRow, EventFix, FusedTable, FusionOutput, FusionPipeline};

// Re-export transform types
pub use transform::{MountTransform, imu_heading_in_world};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        AlignedRow, EventFix, FusedTable, FusionError, FusionOutput, FusionPipeline,
        MonotoneCubic, MountTransform, Result, StreamAligner, cartesian_to_spherical,
        cartesian_to_spherical_series, imu_heading_in_world, quat_from_wxyz, rotate_by_quaternion,
        rotate_series, spherical_to_cartesian, spherical_to_cartesian_series,
        world_spherical_to_cartesian, wrap_azimuth_deg,
    };
}
