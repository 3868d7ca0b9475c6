//! Shape-preserving cubic interpolation over timestamped channels.
//!
//! GPS position arrives near 1 Hz while the fused tables run at IMU
//! or video rate, so latitude and longitude are resampled onto a much
//! denser axis. An unconstrained cubic spline overshoots around
//! plateaus and corners; the monotone cubic here never leaves the
//! envelope of its knot values.

use gaze_types::{TimeRange, Timestamp};

use crate::error::{FusionError, Result};

/// Monotone piecewise-cubic interpolant over one scalar channel.
///
/// Tangents follow the Fritsch-Carlson construction: secant slopes
/// blend through a weighted harmonic mean and go to zero across local
/// extrema, which keeps every cubic segment inside the value range of
/// its two knots.
///
/// Knot timestamps convert to `f64` seconds relative to the first
/// knot before any float math, so epoch-scale nanosecond stamps keep
/// their precision.
///
/// # Example
///
/// ```
/// use gaze_fusion::MonotoneCubic;
/// use gaze_types::Timestamp;
///
/// let curve = MonotoneCubic::fit(
///     "gps",
///     &[Timestamp::from_nanos(0), Timestamp::from_nanos(3)],
///     &[10.0, 10.003],
/// )?;
/// let lat = curve.evaluate(Timestamp::from_nanos(1))?;
/// assert!((lat - 10.001).abs() < 1e-9);
/// # Ok::<(), gaze_fusion::FusionError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MonotoneCubic {
    channel: String,
    origin: Timestamp,
    last: Timestamp,
    xs: Vec<f64>,
    ys: Vec<f64>,
    tangents: Vec<f64>,
}

impl MonotoneCubic {
    /// Fits a monotone cubic through the given knots.
    ///
    /// # Errors
    ///
    /// - [`FusionError::ShapeMismatch`] if the series lengths differ.
    /// - [`FusionError::InsufficientData`] with fewer than two knots.
    /// - [`FusionError::NonMonotonic`] if the timestamps do not
    ///   strictly increase.
    pub fn fit(channel: &str, timestamps: &[Timestamp], values: &[f64]) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(FusionError::shape_mismatch(timestamps.len(), values.len()));
        }
        if timestamps.len() < 2 {
            return Err(FusionError::insufficient_data(
                channel,
                format!(
                    "interpolation needs at least 2 samples, got {}",
                    timestamps.len()
                ),
            ));
        }
        if let Some(index) = timestamps.windows(2).position(|pair| pair[1] <= pair[0]) {
            return Err(FusionError::non_monotonic(channel, index + 1));
        }

        let origin = timestamps[0];
        let xs: Vec<f64> = timestamps
            .iter()
            .map(|ts| ts.abs_diff(origin).as_secs_f64())
            .collect();
        let tangents = fritsch_carlson_tangents(&xs, values);

        Ok(Self {
            channel: channel.to_string(),
            origin,
            last: timestamps[timestamps.len() - 1],
            xs,
            ys: values.to_vec(),
            tangents,
        })
    }

    /// Evaluates the interpolant at a timestamp.
    ///
    /// Values at the knots reproduce exactly.
    ///
    /// # Errors
    ///
    /// Returns [`FusionError::OutOfRange`] outside the fitted span.
    /// Extrapolation is never silent.
    pub fn evaluate(&self, timestamp: Timestamp) -> Result<f64> {
        if timestamp < self.origin || timestamp > self.last {
            return Err(FusionError::out_of_range(
                self.channel.clone(),
                timestamp,
                self.origin,
                self.last,
            ));
        }
        let x = timestamp.abs_diff(self.origin).as_secs_f64();

        let mut lo = 0;
        let mut hi = self.xs.len();
        while lo < hi {
            let mid = usize::midpoint(lo, hi);
            if self.xs[mid] < x {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        // lo is the first knot at or past x
        let segment = lo.saturating_sub(1).min(self.xs.len() - 2);

        let width = self.xs[segment + 1] - self.xs[segment];
        let t = (x - self.xs[segment]) / width;
        let t2 = t * t;
        let t3 = t2 * t;
        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = 3.0 * t2 - 2.0 * t3;
        let h11 = t3 - t2;

        Ok(h00 * self.ys[segment]
            + h10 * width * self.tangents[segment]
            + h01 * self.ys[segment + 1]
            + h11 * width * self.tangents[segment + 1])
    }

    /// Name of the channel this interpolant was fitted over.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Number of knots.
    #[must_use]
    pub fn knot_count(&self) -> usize {
        self.xs.len()
    }

    /// Time span covered by the fit.
    #[must_use]
    pub fn coverage(&self) -> TimeRange {
        TimeRange::new(self.origin, self.last)
    }
}

/// Fritsch-Carlson tangents for knots at `xs` with values `ys`.
///
/// `xs` must be strictly increasing with at least two entries.
fn fritsch_carlson_tangents(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let widths: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    let secants: Vec<f64> = widths
        .iter()
        .zip(ys.windows(2))
        .map(|(width, pair)| (pair[1] - pair[0]) / width)
        .collect();

    if n == 2 {
        return vec![secants[0]; 2];
    }

    let mut tangents = vec![0.0; n];
    for i in 1..n - 1 {
        // A sign change or flat secant marks a local extremum; the
        // tangent there is zero.
        if secants[i - 1] * secants[i] > 0.0 {
            let w1 = 2.0 * widths[i] + widths[i - 1];
            let w2 = widths[i] + 2.0 * widths[i - 1];
            tangents[i] = (w1 + w2) / (w1 / secants[i - 1] + w2 / secants[i]);
        }
    }
    tangents[0] = edge_tangent(widths[0], widths[1], secants[0], secants[1]);
    tangents[n - 1] = edge_tangent(
        widths[n - 2],
        widths[n - 3],
        secants[n - 2],
        secants[n - 3],
    );
    tangents
}

/// One-sided three-point endpoint tangent with shape-preserving
/// clamps.
fn edge_tangent(h0: f64, h1: f64, secant0: f64, secant1: f64) -> f64 {
    let estimate = ((2.0 * h0 + h1) * secant0 - h0 * secant1) / (h0 + h1);
    if estimate.signum() != secant0.signum() {
        0.0
    } else if secant0.signum() != secant1.signum() && estimate.abs() > 3.0 * secant0.abs() {
        3.0 * secant0
    } else {
        estimate
    }
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

    fn stamps(nanos: &[u64]) -> Vec<Timestamp> {
        nanos.iter().map(|&n| Timestamp::from_nanos(n)).collect()
    }

    #[test]
    fn reproduces_knot_values_exactly() {
        let ts = stamps(&[0, 10, 25, 40]);
        let ys = [1.0, 4.0, 2.5, 7.0];
        let curve = MonotoneCubic::fit("test", &ts, &ys).unwrap();
        assert_eq!(curve.knot_count(), 4);
        for (t, y) in ts.iter().zip(ys) {
            assert_eq!(curve.evaluate(*t).unwrap(), y);
        }
    }

    #[test]
    fn linear_data_interpolates_linearly() {
        let ts = stamps(&[0, 1_000_000, 2_000_000]);
        let curve = MonotoneCubic::fit("test", &ts, &[0.0, 1.0, 2.0]).unwrap();
        let mid = curve.evaluate(Timestamp::from_nanos(500_000)).unwrap();
        assert!((mid - 0.5).abs() < 1e-9);
    }

    #[test]
    fn two_point_fit_is_the_secant() {
        let ts = stamps(&[0, 3]);
        let curve = MonotoneCubic::fit("gps", &ts, &[10.0, 10.003]).unwrap();
        let lat = curve.evaluate(Timestamp::from_nanos(1)).unwrap();
        assert!((lat - 10.001).abs() < 1e-9);
        let lat = curve.evaluate(Timestamp::from_nanos(2)).unwrap();
        assert!((lat - 10.002).abs() < 1e-9);
    }

    #[test]
    fn increasing_data_stays_increasing() {
        let ts = stamps(&[0, 100, 150, 400, 500]);
        let curve =
            MonotoneCubic::fit("test", &ts, &[0.0, 1.0, 1.5, 8.0, 8.2]).unwrap();
        let mut previous = f64::NEG_INFINITY;
        for n in 0..=500 {
            let value = curve.evaluate(Timestamp::from_nanos(n)).unwrap();
            assert!(value >= previous - 1e-12, "dipped at {n} ns");
            previous = value;
        }
    }

    #[test]
    fn plateau_does_not_overshoot() {
        let ts = stamps(&[0, 10, 20, 30]);
        let curve = MonotoneCubic::fit("test", &ts, &[5.0, 5.0, 5.0, 9.0]).unwrap();
        for n in 0..=20 {
            let value = curve.evaluate(Timestamp::from_nanos(n)).unwrap();
            assert!((value - 5.0).abs() < 1e-12, "left the plateau at {n} ns");
        }
    }

    #[test]
    fn decreasing_data_stays_within_envelope() {
        let ts = stamps(&[0, 10, 20]);
        let curve = MonotoneCubic::fit("test", &ts, &[4.0, 2.0, 1.5]).unwrap();
        for n in 0..=20 {
            let value = curve.evaluate(Timestamp::from_nanos(n)).unwrap();
            assert!(value <= 4.0 + 1e-12);
            assert!(value >= 1.5 - 1e-12);
        }
    }

    #[test]
    fn epoch_scale_timestamps_keep_precision() {
        let base = 1_700_000_000_000_000_000;
        let ts = stamps(&[base, base + 1_000_000, base + 2_000_000]);
        let curve = MonotoneCubic::fit("gps", &ts, &[0.0, 1.0, 2.0]).unwrap();
        let mid = curve
            .evaluate(Timestamp::from_nanos(base + 500_000))
            .unwrap();
        assert!((mid - 0.5).abs() < 1e-9);
    }

    #[test]
    fn rejects_single_knot() {
        let err = MonotoneCubic::fit("gps", &stamps(&[5]), &[1.0]).unwrap_err();
        assert!(matches!(err, FusionError::InsufficientData { .. }));
        assert!(err.to_string().contains("'gps'"));
    }

    #[test]
    fn rejects_duplicate_timestamps() {
        let err = MonotoneCubic::fit("gps", &stamps(&[0, 10, 10, 20]), &[0.0, 1.0, 1.0, 2.0])
            .unwrap_err();
        assert!(matches!(
            err,
            FusionError::NonMonotonic { ref stream, index: 2 } if stream == "gps"
        ));
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = MonotoneCubic::fit("gps", &stamps(&[0, 10]), &[1.0]).unwrap_err();
        assert!(matches!(
            err,
            FusionError::ShapeMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn refuses_to_extrapolate() {
        let curve = MonotoneCubic::fit("gps", &stamps(&[100, 200]), &[1.0, 2.0]).unwrap();
        assert!(curve.evaluate(Timestamp::from_nanos(99)).is_err());
        assert!(curve.evaluate(Timestamp::from_nanos(201)).is_err());
        assert!(curve.evaluate(Timestamp::from_nanos(100)).is_ok());
        assert!(curve.evaluate(Timestamp::from_nanos(200)).is_ok());
        assert_eq!(
            curve.coverage(),
            TimeRange::new(Timestamp::from_nanos(100), Timestamp::from_nanos(200))
        );
    }

    #[test]
    fn out_of_range_error_names_the_channel() {
        let curve = MonotoneCubic::fit("gps", &stamps(&[100, 200]), &[1.0, 2.0]).unwrap();
        let err = curve.evaluate(Timestamp::from_nanos(50)).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'gps'"));
        assert!(msg.contains("50 ns"));
        assert!(msg.contains("[100 ns, 200 ns]"));
    }
}
