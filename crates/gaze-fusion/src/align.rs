//! Temporal alignment of sensor streams onto a shared axis.
//!
//! Every sensor in the rig free-runs at its own rate, so fusing them
//! means choosing one stream's timestamps as the axis and resampling
//! the rest onto it. Discrete streams (gaze, orientation, video
//! frames) take the nearest sample; continuous channels (GPS latitude
//! and longitude) go through [`MonotoneCubic`].

use gaze_types::{Sampled, Stream, TimeRange, Timestamp};

use crate::error::{FusionError, Result};
use crate::interpolation::MonotoneCubic;

/// Aligns source streams onto a fixed target-timestamp axis.
///
/// The axis is immutable once built; [`StreamAligner::restrict`]
/// produces a new aligner over a sub-span.
///
/// # Example
///
/// ```
/// use gaze_fusion::StreamAligner;
/// use gaze_types::{Sampled, Stream, Timestamp};
///
/// let source = Stream::new(
///     "gaze",
///     vec![
///         Sampled::new(Timestamp::from_nanos(0), 1.0),
///         Sampled::new(Timestamp::from_nanos(10), 2.0),
///     ],
/// )?;
/// let aligner = StreamAligner::from_timestamps(
///     "axis",
///     vec![Timestamp::from_nanos(2), Timestamp::from_nanos(9)],
/// )?;
/// assert_eq!(aligner.sample_nearest(&source)?, vec![1.0, 2.0]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamAligner {
    name: String,
    axis: Vec<Timestamp>,
}

impl StreamAligner {
    /// Builds an aligner over a stream's own timestamps.
    #[must_use]
    pub fn from_stream<T>(stream: &Stream<T>) -> Self {
        Self {
            name: stream.name().to_string(),
            axis: stream.timestamps().collect(),
        }
    }

    /// Builds an aligner over explicit target timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`FusionError::NonMonotonic`] if the timestamps
    /// decrease anywhere. Equal neighbors are allowed, matching
    /// [`Stream`] ordering.
    pub fn from_timestamps(name: impl Into<String>, axis: Vec<Timestamp>) -> Result<Self> {
        let name = name.into();
        if let Some(index) = axis.windows(2).position(|pair| pair[1] < pair[0]) {
            return Err(FusionError::non_monotonic(name, index + 1));
        }
        Ok(Self { name, axis })
    }

    /// Keeps only axis entries inside `range`.
    #[must_use]
    pub fn restrict(&self, range: TimeRange) -> Self {
        Self {
            name: self.name.clone(),
            axis: self
                .axis
                .iter()
                .copied()
                .filter(|&ts| range.contains(ts))
                .collect(),
        }
    }

    /// Name of the stream the axis came from.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The target timestamps.
    #[must_use]
    pub fn timestamps(&self) -> &[Timestamp] {
        &self.axis
    }

    /// Number of target timestamps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.axis.len()
    }

    /// Checks whether the axis is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.axis.is_empty()
    }

    /// Time span covered by the axis.
    #[must_use]
    pub fn coverage(&self) -> Option<TimeRange> {
        match (self.axis.first(), self.axis.last()) {
            (Some(&first), Some(&last)) => Some(TimeRange::new(first, last)),
            _ => None,
        }
    }

    /// Picks, for every axis timestamp, the nearest source sample.
    ///
    /// An axis timestamp equal to a source timestamp returns exactly
    /// that sample; a timestamp equidistant between two samples takes
    /// the earlier one.
    ///
    /// # Errors
    ///
    /// - [`FusionError::InsufficientData`] if the source is empty.
    /// - [`FusionError::OutOfRange`] if any axis timestamp falls
    ///   outside the source's coverage. Nearest-sample alignment
    ///   never extrapolates.
    pub fn sample_nearest<T: Clone>(&self, source: &Stream<T>) -> Result<Vec<T>> {
        let Some(coverage) = source.coverage() else {
            return Err(FusionError::insufficient_data(
                source.name(),
                "cannot align against an empty stream",
            ));
        };
        let samples = source.samples();

        let mut aligned = Vec::with_capacity(self.axis.len());
        for &target in &self.axis {
            if !coverage.contains(target) {
                return Err(FusionError::out_of_range(
                    source.name(),
                    target,
                    coverage.start,
                    coverage.end,
                ));
            }
            aligned.push(samples[nearest_index(samples, target)].value.clone());
        }
        Ok(aligned)
    }

    /// Resamples one scalar channel of the source onto the axis with
    /// monotone cubic interpolation.
    ///
    /// `extract` pulls the channel out of each sample (for GPS,
    /// latitude or longitude).
    ///
    /// # Errors
    ///
    /// Anything [`MonotoneCubic::fit`] or [`MonotoneCubic::evaluate`]
    /// reports: too few source samples, non-monotonic source
    /// timestamps, or an axis timestamp outside the source span.
    pub fn interpolate_channel<T>(
        &self,
        source: &Stream<T>,
        extract: impl Fn(&T) -> f64,
    ) -> Result<Vec<f64>> {
        let timestamps: Vec<Timestamp> = source.timestamps().collect();
        let values: Vec<f64> = source.values().map(extract).collect();
        let curve = MonotoneCubic::fit(source.name(), &timestamps, &values)?;
        self.axis.iter().map(|&ts| curve.evaluate(ts)).collect()
    }
}

/// Index of the sample nearest to `target`, ties toward the earlier
/// sample. `samples` must be non-empty.
fn nearest_index<T>(samples: &[Sampled<T>], target: Timestamp) -> usize {
    let mut lo = 0;
    let mut hi = samples.len();
    while lo < hi {
        let mid = usize::midpoint(lo, hi);
        if samples[mid].timestamp < target {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    // lo is the first sample at or past target
    if lo == 0 {
        return 0;
    }
    if lo >= samples.len() {
        return samples.len() - 1;
    }
    let before = lo - 1;
    let dist_before = target.abs_diff(samples[before].timestamp);
    let dist_after = samples[lo].timestamp.abs_diff(target);
    if dist_before <= dist_after { before } else { lo }
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

    fn stream_of(name: &str, points: &[(u64, f64)]) -> Stream<f64> {
        Stream::new(
            name,
            points
                .iter()
                .map(|&(nanos, value)| Sampled::new(Timestamp::from_nanos(nanos), value))
                .collect(),
        )
        .unwrap()
    }

    fn axis(nanos: &[u64]) -> StreamAligner {
        StreamAligner::from_timestamps(
            "axis",
            nanos.iter().map(|&n| Timestamp::from_nanos(n)).collect(),
        )
        .unwrap()
    }

    #[test]
    fn equal_timestamp_returns_that_sample() {
        let source = stream_of("gaze", &[(0, 1.0), (10, 2.0), (20, 3.0)]);
        let aligned = axis(&[10]).sample_nearest(&source).unwrap();
        assert_eq!(aligned, vec![2.0]);
    }

    #[test]
    fn halfway_tie_takes_the_earlier_sample() {
        let source = stream_of("gaze", &[(0, 1.0), (10, 2.0)]);
        let aligned = axis(&[5]).sample_nearest(&source).unwrap();
        assert_eq!(aligned, vec![1.0]);
    }

    #[test]
    fn nearest_picks_by_distance() {
        let source = stream_of("gaze", &[(0, 1.0), (10, 2.0), (100, 3.0)]);
        let aligned = axis(&[4, 6, 98]).sample_nearest(&source).unwrap();
        assert_eq!(aligned, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn axis_outside_source_coverage_errors() {
        let source = stream_of("gaze", &[(10, 1.0), (20, 2.0)]);
        let err = axis(&[5]).sample_nearest(&source).unwrap_err();
        assert!(matches!(
            err,
            FusionError::OutOfRange { ref stream, timestamp, .. }
                if stream == "gaze" && timestamp == Timestamp::from_nanos(5)
        ));
    }

    #[test]
    fn empty_source_errors() {
        let source: Stream<f64> = Stream::empty("gaze");
        let err = axis(&[5]).sample_nearest(&source).unwrap_err();
        assert!(matches!(err, FusionError::InsufficientData { .. }));
    }

    #[test]
    fn restrict_drops_entries_outside_the_range() {
        let aligner = axis(&[0, 10, 20, 30, 40]);
        let restricted = aligner.restrict(TimeRange::new(
            Timestamp::from_nanos(10),
            Timestamp::from_nanos(30),
        ));
        assert_eq!(
            restricted.timestamps(),
            &[
                Timestamp::from_nanos(10),
                Timestamp::from_nanos(20),
                Timestamp::from_nanos(30),
            ]
        );
        assert_eq!(restricted.name(), "axis");
    }

    #[test]
    fn from_timestamps_rejects_decreasing_axes() {
        let err = StreamAligner::from_timestamps(
            "axis",
            vec![Timestamp::from_nanos(10), Timestamp::from_nanos(5)],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            FusionError::NonMonotonic { ref stream, index: 1 } if stream == "axis"
        ));
    }

    #[test]
    fn from_stream_reuses_name_and_timestamps() {
        let source = stream_of("imu", &[(1, 0.0), (2, 0.0)]);
        let aligner = StreamAligner::from_stream(&source);
        assert_eq!(aligner.name(), "imu");
        assert_eq!(aligner.len(), 2);
        assert!(!aligner.is_empty());
        assert_eq!(
            aligner.coverage(),
            Some(TimeRange::new(
                Timestamp::from_nanos(1),
                Timestamp::from_nanos(2)
            ))
        );
    }

    #[test]
    fn interpolates_gps_channel_between_fixes() {
        let gps = stream_of("gps", &[(0, 10.0), (3, 10.003)]);
        let values = axis(&[0, 1, 2, 3])
            .interpolate_channel(&gps, |&lat| lat)
            .unwrap();
        assert_eq!(values.len(), 4);
        assert!((values[0] - 10.0).abs() < 1e-12);
        assert!(values[1] > 10.0 && values[1] < 10.003);
        assert!(values[2] > values[1]);
        assert!((values[3] - 10.003).abs() < 1e-12);
    }

    #[test]
    fn interpolation_error_names_the_source_stream() {
        let gps = stream_of("gps", &[(10, 1.0)]);
        let err = axis(&[10]).interpolate_channel(&gps, |&v| v).unwrap_err();
        assert!(matches!(
            err,
            FusionError::InsufficientData { ref stream, .. } if stream == "gps"
        ));
    }
}
