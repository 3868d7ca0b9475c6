//! Timestamped samples and validated streams.
//!
//! Every recording channel (gaze, IMU, GPS, video frames, events) is a
//! [`Stream`] of [`Sampled`] values. Ordering is checked once at
//! construction so that alignment in `gaze-fusion` can binary-search
//! without re-validating.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{StreamError, TimeRange, Timestamp};

/// A value paired with its capture timestamp.
///
/// # Example
///
/// ```
/// use gaze_types::{Sampled, Timestamp};
///
/// let sample = Sampled::new(Timestamp::from_nanos(100), 1.5_f64);
/// let doubled = sample.map(|v| v * 2.0);
/// assert_eq!(doubled.timestamp, Timestamp::from_nanos(100));
/// assert!((doubled.value - 3.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sampled<T> {
    /// Capture timestamp of the value.
    pub timestamp: Timestamp,
    /// The sampled value.
    pub value: T,
}

impl<T> Sampled<T> {
    /// Creates a timestamped sample.
    #[must_use]
    pub const fn new(timestamp: Timestamp, value: T) -> Self {
        Self { timestamp, value }
    }

    /// Maps the value while keeping the timestamp.
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sampled<U> {
        Sampled {
            timestamp: self.timestamp,
            value: f(self.value),
        }
    }
}

/// An ordered sequence of timestamped samples from one channel.
///
/// Construction validates that timestamps are non-decreasing (equal
/// timestamps are permitted); the stream is immutable afterwards. The
/// name identifies the channel in error messages and logs.
///
/// # Example
///
/// ```
/// use gaze_types::{Sampled, Stream, Timestamp};
///
/// let stream = Stream::new(
///     "gaze",
///     vec![
///         Sampled::new(Timestamp::from_nanos(0), 1.0_f64),
///         Sampled::new(Timestamp::from_nanos(10), 2.0),
///     ],
/// )?;
///
/// assert_eq!(stream.len(), 2);
/// assert!(stream.coverage().is_some());
/// # Ok::<(), gaze_types::StreamError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Stream<T> {
    /// Channel name, used in diagnostics.
    name: String,
    /// Samples in non-decreasing timestamp order.
    samples: Vec<Sampled<T>>,
}

impl<T> Stream<T> {
    /// Creates a stream after validating timestamp ordering.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::NonMonotonic`] with the index of the
    /// first sample whose timestamp precedes its predecessor.
    pub fn new(name: impl Into<String>, samples: Vec<Sampled<T>>) -> Result<Self, StreamError> {
        let name = name.into();
        for (index, pair) in samples.windows(2).enumerate() {
            if pair[1].timestamp < pair[0].timestamp {
                return Err(StreamError::non_monotonic(name, index + 1));
            }
        }
        Ok(Self { name, samples })
    }

    /// Creates an empty stream.
    #[must_use]
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            samples: Vec::new(),
        }
    }

    /// Returns the channel name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Checks if the stream has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the samples as a slice.
    #[must_use]
    pub fn samples(&self) -> &[Sampled<T>] {
        &self.samples
    }

    /// Gets a sample by index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Sampled<T>> {
        self.samples.get(index)
    }

    /// Returns the earliest sample.
    #[must_use]
    pub fn first(&self) -> Option<&Sampled<T>> {
        self.samples.first()
    }

    /// Returns the latest sample.
    #[must_use]
    pub fn last(&self) -> Option<&Sampled<T>> {
        self.samples.last()
    }

    /// Iterates over the samples in timestamp order.
    pub fn iter(&self) -> std::slice::Iter<'_, Sampled<T>> {
        self.samples.iter()
    }

    /// Iterates over the sample timestamps.
    pub fn timestamps(&self) -> impl Iterator<Item = Timestamp> + '_ {
        self.samples.iter().map(|s| s.timestamp)
    }

    /// Iterates over the sample values.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.samples.iter().map(|s| &s.value)
    }

    /// Returns the closed interval covered by this stream.
    ///
    /// `None` for an empty stream.
    #[must_use]
    pub fn coverage(&self) -> Option<TimeRange> {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => Some(TimeRange::new(first.timestamp, last.timestamp)),
            _ => None,
        }
    }
}

impl<'a, T> IntoIterator for &'a Stream<T> {
    type Item = &'a Sampled<T>;
    type IntoIter = std::slice::Iter<'a, Sampled<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn sample(ts: u64, value: f64) -> Sampled<f64> {
        Sampled::new(Timestamp::from_nanos(ts), value)
    }

    #[test]
    fn stream_accepts_ordered_samples() {
        let stream = Stream::new("gaze", vec![sample(0, 1.0), sample(10, 2.0)]).unwrap();
        assert_eq!(stream.len(), 2);
        assert_eq!(stream.name(), "gaze");
    }

    #[test]
    fn stream_accepts_equal_timestamps() {
        let stream = Stream::new("gaze", vec![sample(10, 1.0), sample(10, 2.0)]);
        assert!(stream.is_ok());
    }

    #[test]
    fn stream_rejects_decreasing_timestamps() {
        let result = Stream::new(
            "imu",
            vec![sample(0, 1.0), sample(10, 2.0), sample(5, 3.0)],
        );
        match result {
            Err(StreamError::NonMonotonic { stream, index }) => {
                assert_eq!(stream, "imu");
                assert_eq!(index, 2);
            }
            Ok(_) => panic!("out-of-order stream was accepted"),
        }
    }

    #[test]
    fn empty_stream_has_no_coverage() {
        let stream = Stream::<f64>::empty("gps");
        assert!(stream.is_empty());
        assert!(stream.coverage().is_none());
    }

    #[test]
    fn coverage_spans_first_to_last() {
        let stream = Stream::new("gps", vec![sample(100, 0.0), sample(300, 0.0)]).unwrap();
        let coverage = stream.coverage().unwrap();
        assert_eq!(coverage.start, Timestamp::from_nanos(100));
        assert_eq!(coverage.end, Timestamp::from_nanos(300));
    }

    #[test]
    fn sampled_map_keeps_timestamp() {
        let s = sample(42, 2.0).map(|v| v * 2.0);
        assert_eq!(s.timestamp, Timestamp::from_nanos(42));
        assert!((s.value - 4.0).abs() < 1e-12);
    }

    #[test]
    fn iterators_follow_sample_order() {
        let stream = Stream::new("gaze", vec![sample(0, 1.0), sample(10, 2.0)]).unwrap();
        let ts: Vec<u64> = stream.timestamps().map(Timestamp::as_nanos).collect();
        assert_eq!(ts, vec![0, 10]);
        let values: Vec<f64> = stream.values().copied().collect();
        assert_eq!(values.len(), 2);
    }
}
