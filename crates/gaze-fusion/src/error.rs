//! Error types for alignment and transform operations.

use gaze_types::Timestamp;
use thiserror::Error;

/// Errors that can occur while aligning or transforming streams.
#[derive(Debug, Error)]
pub enum FusionError {
    /// Two series that must share a length do not.
    #[error("series length mismatch: expected {expected} elements, got {actual}")]
    ShapeMismatch {
        /// Expected element count.
        expected: usize,
        /// Actual element count.
        actual: usize,
    },

    /// A query timestamp falls outside a stream's coverage.
    ///
    /// Alignment and interpolation never extrapolate; callers restrict
    /// their axis to the covered span instead.
    #[error(
        "timestamp {ts} ns is outside stream '{stream}' coverage [{lo} ns, {hi} ns]",
        ts = .timestamp.as_nanos(),
        lo = .min.as_nanos(),
        hi = .max.as_nanos()
    )]
    OutOfRange {
        /// Name of the stream that was queried.
        stream: String,
        /// The query timestamp.
        timestamp: Timestamp,
        /// Earliest covered timestamp.
        min: Timestamp,
        /// Latest covered timestamp.
        max: Timestamp,
    },

    /// A stream holds too few samples for the requested operation.
    #[error("insufficient data in stream '{stream}': {reason}")]
    InsufficientData {
        /// Name of the stream.
        stream: String,
        /// What the operation needed.
        reason: String,
    },

    /// Sample timestamps are not in the order the operation requires.
    #[error(
        "non-monotonic timestamps in stream '{stream}': sample {index} does not advance past its predecessor"
    )]
    NonMonotonic {
        /// Name of the stream.
        stream: String,
        /// Index of the offending sample.
        index: usize,
    },
}

impl FusionError {
    /// Creates a shape mismatch error.
    #[must_use]
    pub const fn shape_mismatch(expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch { expected, actual }
    }

    /// Creates an out-of-range error.
    #[must_use]
    pub fn out_of_range(
        stream: impl Into<String>,
        timestamp: Timestamp,
        min: Timestamp,
        max: Timestamp,
    ) -> Self {
        Self::OutOfRange {
            stream: stream.into(),
            timestamp,
            min,
            max,
        }
    }

    /// Creates an insufficient data error.
    #[must_use]
    pub fn insufficient_data(stream: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InsufficientData {
            stream: stream.into(),
            reason: reason.into(),
        }
    }

    /// Creates a non-monotonic input error.
    #[must_use]
    pub fn non_monotonic(stream: impl Into<String>, index: usize) -> Self {
        Self::NonMonotonic {
            stream: stream.into(),
            index,
        }
    }
}

/// Result type for fusion operations.
pub type Result<T> = std::result::Result<T, FusionError>;

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn error_shape_mismatch() {
        let err = FusionError::shape_mismatch(10, 7);
        assert!(err.to_string().contains("expected 10"));
        assert!(err.to_string().contains("got 7"));
    }

    #[test]
    fn error_out_of_range_names_stream_and_bounds() {
        let err = FusionError::out_of_range(
            "gaze",
            Timestamp::from_nanos(50),
            Timestamp::from_nanos(100),
            Timestamp::from_nanos(200),
        );
        let msg = err.to_string();
        assert!(msg.contains("'gaze'"));
        assert!(msg.contains("50 ns"));
        assert!(msg.contains("[100 ns, 200 ns]"));
    }

    #[test]
    fn error_insufficient_data() {
        let err = FusionError::insufficient_data("gps", "need at least 2 samples");
        assert!(err.to_string().contains("insufficient data"));
        assert!(err.to_string().contains("'gps'"));
    }

    #[test]
    fn error_non_monotonic() {
        let err = FusionError::non_monotonic("imu", 3);
        assert!(err.to_string().contains("'imu'"));
        assert!(err.to_string().contains("sample 3"));
    }
}
