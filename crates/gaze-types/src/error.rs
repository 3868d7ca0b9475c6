//! Error types for stream construction.

use thiserror::Error;

/// Errors that can occur when validating recording streams.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Sample timestamps decrease somewhere in the stream.
    ///
    /// Streams must be non-decreasing by timestamp; equal timestamps
    /// are permitted.
    #[error("non-monotonic timestamps in stream '{stream}': sample {index} precedes its predecessor")]
    NonMonotonic {
        /// Name of the offending stream.
        stream: String,
        /// Index of the first sample that breaks ordering.
        index: usize,
    },
}

impl StreamError {
    /// Creates a non-monotonic ordering error.
    #[must_use]
    pub fn non_monotonic(stream: impl Into<String>, index: usize) -> Self {
        Self::NonMonotonic {
            stream: stream.into(),
            index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_stream_and_index() {
        let err = StreamError::non_monotonic("gaze", 7);
        let msg = format!("{err}");
        assert!(msg.contains("gaze"));
        assert!(msg.contains('7'));
    }
}
