//! Time types for recording data.
//!
//! Neon recordings stamp every sample with UTC nanoseconds since the
//! Unix epoch, and the companion GPS logger writes the same axis. All
//! alignment in `gaze-fusion` happens on these stamps.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Nanosecond-precision UTC timestamp.
///
/// Stored as whole nanoseconds so ordering checks and nearest-sample
/// lookups stay exact; conversion to floating seconds happens only at
/// the arithmetic edges.
///
/// # Example
///
/// ```
/// use gaze_types::Timestamp;
///
/// let ts = Timestamp::from_nanos(1_699_985_853_880_887_321);
/// assert_eq!(ts.as_nanos(), 1_699_985_853_880_887_321);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Timestamp {
    /// Nanoseconds since the Unix epoch.
    nanos: u64,
}

impl Timestamp {
    /// Creates a timestamp from nanoseconds since the epoch.
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// The timestamp as whole nanoseconds.
    #[must_use]
    pub const fn as_nanos(self) -> u64 {
        self.nanos
    }

    /// The timestamp as floating seconds.
    ///
    /// Epoch-scale values lose sub-microsecond precision in `f64`;
    /// interpolation in `gaze-fusion` offsets to a local origin
    /// before converting.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_secs_f64(self) -> f64 {
        self.nanos as f64 / 1e9
    }

    /// The earliest representable timestamp.
    #[must_use]
    pub const fn zero() -> Self {
        Self { nanos: 0 }
    }

    /// Advances the timestamp by a duration.
    ///
    /// Returns `None` when the sum leaves `u64` range.
    #[must_use]
    pub fn checked_add(self, duration: Duration) -> Option<Self> {
        self.nanos.checked_add(duration.as_nanos()).map(Self::from_nanos)
    }

    /// Rewinds the timestamp by a duration.
    ///
    /// Returns `None` if the result would precede the epoch.
    #[must_use]
    pub fn checked_sub(self, duration: Duration) -> Option<Self> {
        self.nanos.checked_sub(duration.as_nanos()).map(Self::from_nanos)
    }

    /// Absolute difference between two timestamps.
    ///
    /// Order-independent, so distance comparisons need no sorting.
    #[must_use]
    pub const fn abs_diff(self, other: Self) -> Duration {
        Duration::from_nanos(self.nanos.abs_diff(other.nanos))
    }
}

/// An interval between two timestamps.
///
/// # Example
///
/// ```
/// use gaze_types::Duration;
///
/// let frame = Duration::from_nanos(200_000_000); // one 5 Hz frame
/// assert!((frame.as_secs_f64() - 0.2).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Duration {
    /// Interval length in nanoseconds.
    nanos: u64,
}

impl Duration {
    /// Builds an interval from a raw nanosecond count.
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// Builds an interval from a whole-second count.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self {
            nanos: secs * 1_000_000_000,
        }
    }

    /// The interval as whole nanoseconds.
    #[must_use]
    pub const fn as_nanos(self) -> u64 {
        self.nanos
    }

    /// The interval as floating seconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_secs_f64(self) -> f64 {
        self.nanos as f64 / 1e9
    }

    /// The empty interval.
    #[must_use]
    pub const fn zero() -> Self {
        Self { nanos: 0 }
    }

    /// Checks whether the interval is empty.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.nanos == 0
    }
}

/// A closed time range (inclusive start, inclusive end).
///
/// Fused-table queries select rows by closed `(start, end)` bounds,
/// so a range covering a single sample is representable as
/// `start == end`.
///
/// # Example
///
/// ```
/// use gaze_types::{TimeRange, Timestamp};
///
/// let range = TimeRange::new(Timestamp::from_nanos(1_000), Timestamp::from_nanos(2_000));
///
/// assert!(range.contains(Timestamp::from_nanos(1_500)));
/// assert!(range.contains(Timestamp::from_nanos(2_000)));
/// assert!(!range.contains(Timestamp::from_nanos(2_500)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimeRange {
    /// First instant covered.
    pub start: Timestamp,
    /// Last instant covered.
    pub end: Timestamp,
}

impl TimeRange {
    /// Builds the range between two endpoints.
    ///
    /// Reversed endpoints are accepted and stored in order.
    #[must_use]
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        let (start, end) = if end < start { (end, start) } else { (start, end) };
        Self { start, end }
    }

    /// Creates a range covering a single instant.
    #[must_use]
    pub const fn instant(timestamp: Timestamp) -> Self {
        Self {
            start: timestamp,
            end: timestamp,
        }
    }

    /// Span between the two endpoints.
    #[must_use]
    pub const fn duration(self) -> Duration {
        self.start.abs_diff(self.end)
    }

    /// Whether the range covers `timestamp`.
    ///
    /// Both endpoints are inclusive.
    #[must_use]
    pub fn contains(self, timestamp: Timestamp) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }

    /// Whether two ranges share at least one instant.
    ///
    /// Ranges that merely touch at an endpoint overlap, because the
    /// shared endpoint belongs to both.
    #[must_use]
    pub fn overlaps(self, other: Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// The shared portion of two ranges, or `None` when disjoint.
    #[must_use]
    pub fn intersection(self, other: Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(Self { start, end })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_stamps_survive_conversion() {
        let ts = Timestamp::from_nanos(1_699_985_853_880_887_321);
        assert_eq!(ts.as_nanos(), 1_699_985_853_880_887_321);
        assert!((ts.as_secs_f64() - 1_699_985_853.880_887).abs() < 1e-3);
    }

    #[test]
    fn checked_arithmetic_stops_at_the_bounds() {
        let ts = Timestamp::from_nanos(1_000);
        let gaze_frame = Duration::from_nanos(50_000_000);

        assert_eq!(
            ts.checked_add(gaze_frame),
            Some(Timestamp::from_nanos(50_001_000))
        );
        assert_eq!(ts.checked_sub(gaze_frame), None);
        assert_eq!(
            Timestamp::from_nanos(u64::MAX).checked_add(Duration::from_nanos(1)),
            None
        );
    }

    #[test]
    fn abs_diff_ignores_operand_order() {
        let frame = Timestamp::from_nanos(200_000_000);
        let blink = Timestamp::from_nanos(350_000_000);

        assert_eq!(frame.abs_diff(blink), Duration::from_nanos(150_000_000));
        assert_eq!(blink.abs_diff(frame), Duration::from_nanos(150_000_000));
    }

    #[test]
    fn whole_second_durations() {
        let recording = Duration::from_secs(4);
        assert_eq!(recording.as_nanos(), 4_000_000_000);
        assert!(!recording.is_zero());
        assert!(Duration::zero().is_zero());
    }

    #[test]
    fn time_range_contains_both_endpoints() {
        let range = TimeRange::new(Timestamp::from_nanos(1_000), Timestamp::from_nanos(2_000));

        assert!(range.contains(Timestamp::from_nanos(1_000)));
        assert!(range.contains(Timestamp::from_nanos(1_500)));
        assert!(range.contains(Timestamp::from_nanos(2_000)));
        assert!(!range.contains(Timestamp::from_nanos(500)));
        assert!(!range.contains(Timestamp::from_nanos(2_001)));
    }

    #[test]
    fn time_range_instant() {
        let range = TimeRange::instant(Timestamp::from_nanos(7_500));
        assert!(range.contains(Timestamp::from_nanos(7_500)));
        assert!(!range.contains(Timestamp::from_nanos(7_499)));
        assert!(range.duration().is_zero());
    }

    #[test]
    fn time_range_overlaps_at_touching_endpoint() {
        let base = TimeRange::new(Timestamp::from_nanos(1_000), Timestamp::from_nanos(2_000));
        let shifted = TimeRange::new(Timestamp::from_nanos(1_500), Timestamp::from_nanos(2_500));
        let touching = TimeRange::new(Timestamp::from_nanos(2_000), Timestamp::from_nanos(3_000));
        let beyond = TimeRange::new(Timestamp::from_nanos(2_001), Timestamp::from_nanos(3_000));

        assert!(base.overlaps(shifted));
        assert!(base.overlaps(touching)); // shared endpoint belongs to both
        assert!(!base.overlaps(beyond));
    }

    #[test]
    fn overlapping_ranges_intersect() {
        let base = TimeRange::new(Timestamp::from_nanos(1_000), Timestamp::from_nanos(2_000));
        let shifted = TimeRange::new(Timestamp::from_nanos(1_500), Timestamp::from_nanos(2_500));

        assert_eq!(
            base.intersection(shifted),
            Some(TimeRange::new(
                Timestamp::from_nanos(1_500),
                Timestamp::from_nanos(2_000)
            ))
        );
    }

    #[test]
    fn touching_ranges_intersect_at_a_single_instant() {
        let base = TimeRange::new(Timestamp::from_nanos(1_000), Timestamp::from_nanos(2_000));
        let touching = TimeRange::new(Timestamp::from_nanos(2_000), Timestamp::from_nanos(3_000));

        assert_eq!(
            base.intersection(touching),
            Some(TimeRange::instant(Timestamp::from_nanos(2_000)))
        );
    }

    #[test]
    fn disjoint_ranges_have_no_intersection() {
        let base = TimeRange::new(Timestamp::from_nanos(1_000), Timestamp::from_nanos(2_000));
        let beyond = TimeRange::new(Timestamp::from_nanos(2_001), Timestamp::from_nanos(3_000));
        assert!(base.intersection(beyond).is_none());
    }

    #[test]
    fn reversed_endpoints_are_reordered() {
        let range = TimeRange::new(Timestamp::from_nanos(9_000), Timestamp::from_nanos(4_000));
        assert_eq!(range.start, Timestamp::from_nanos(4_000));
        assert_eq!(range.end, Timestamp::from_nanos(9_000));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn timestamps_round_trip_through_serde() {
        let ts = Timestamp::from_nanos(1_699_985_853_880_887_321);
        let json = serde_json::to_string(&ts).ok();
        assert!(json.is_some());

        let parsed: Result<Timestamp, _> = serde_json::from_str(&json.unwrap_or_default());
        assert_eq!(parsed.ok(), Some(ts));
    }
}
