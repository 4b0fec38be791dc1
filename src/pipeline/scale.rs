//! Dual-polarity scaling for shared-axis charts
//!
//! Download and upload render as opposing signed stacks on one linear axis.
//! When their magnitudes differ by an order of magnitude (500 Mbit/s of
//! download against 20 Mbit/s of stream upload) a naive shared axis crushes
//! the smaller side flat. This module computes a single ratio between the
//! two sides' peak visible totals and rescales the negative side to visually
//! match the positive one; the ratio travels with the transformed data so
//! adapters can invert it when formatting true values.
//!
//! The positive side is always the unscaled side. The orientation flag only
//! swaps which [`Direction`] that is.

use crate::types::{Bucket, Direction, SeriesKey, VisibilityMap};

/// Transformed chart dataset plus the ratio needed to invert it
///
/// The ratio is ephemeral: recomputed on every call, never persisted.
#[derive(Debug, Clone)]
pub struct ScaledChart {
    /// Buckets with positive-side values as `abs(v)` and negative-side
    /// values as `-abs(v) * ratio`
    pub buckets: Vec<Bucket>,
    /// `max positive-side total / max negative-side total` (1 when either
    /// side is zero)
    pub ratio: f64,
}

impl ScaledChart {
    /// An empty chart with the neutral ratio
    pub fn empty() -> Self {
        Self {
            buckets: Vec::new(),
            ratio: 1.0,
        }
    }
}

/// Which direction renders above the axis under the given orientation
pub fn positive_direction(flipped: bool) -> Direction {
    if flipped {
        Direction::Upload
    } else {
        Direction::Download
    }
}

/// Scale buckets so both polarities share one axis
///
/// `classify` assigns every series to a [`Direction`]; the group matching
/// [`positive_direction`] is the primary (unscaled, positive) side and the
/// other is the opposing (scaled, negated) side.
///
/// Hidden series (visibility entry `false`) contribute zero to the totals
/// that drive the ratio, but their values are still transformed and present
/// in the output; drawing is the adapter's decision. A key missing from the
/// visibility map counts as shown. Zero-length input yields an empty chart
/// with ratio 1. Never fails.
pub fn scale<F>(
    buckets: Vec<Bucket>,
    visibility: &VisibilityMap,
    classify: F,
    flipped: bool,
) -> ScaledChart
where
    F: Fn(&SeriesKey) -> Direction,
{
    if buckets.is_empty() {
        return ScaledChart::empty();
    }

    let positive = positive_direction(flipped);

    // Pass 1: peak visible total per side across the whole dataset
    let mut max_positive: f64 = 0.0;
    let mut max_opposing: f64 = 0.0;
    for bucket in &buckets {
        let mut positive_total = 0.0;
        let mut opposing_total = 0.0;
        for (key, value) in &bucket.values {
            if !visibility.get(key).copied().unwrap_or(true) {
                continue;
            }
            if classify(key) == positive {
                positive_total += value;
            } else {
                opposing_total += value;
            }
        }
        max_positive = max_positive.max(positive_total);
        max_opposing = max_opposing.max(opposing_total);
    }

    let ratio = if max_positive > 0.0 && max_opposing > 0.0 {
        max_positive / max_opposing
    } else {
        1.0
    };

    // Pass 2: sign and scale every value, hidden series included
    let mut transformed = buckets;
    for bucket in &mut transformed {
        for (key, value) in bucket.values.iter_mut() {
            *value = if classify(key) == positive {
                value.abs()
            } else {
                -value.abs() * ratio
            };
        }
    }

    ScaledChart {
        buckets: transformed,
        ratio,
    }
}

/// Recover the true magnitude of a transformed value
///
/// Positive-side values were never scaled; negative-side values were
/// multiplied by the ratio, so divide it back out.
pub fn invert(transformed: f64, ratio: f64) -> f64 {
    let mut value = transformed.abs();
    if transformed < 0.0 && ratio != 1.0 {
        value /= ratio;
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClientId, Sample};
    use chrono::{TimeZone, Utc};

    fn dl(id: &str) -> SeriesKey {
        SeriesKey::ClientDownload(ClientId::from(id))
    }

    fn up(id: &str) -> SeriesKey {
        SeriesKey::ClientUpload(ClientId::from(id))
    }

    fn bucket_at(secs: i64) -> Bucket {
        Sample::new(Utc.timestamp_opt(secs, 0).unwrap())
    }

    fn classify(key: &SeriesKey) -> Direction {
        key.direction()
    }

    #[test]
    fn test_empty_input() {
        let chart = scale(Vec::new(), &VisibilityMap::new(), classify, false);
        assert!(chart.buckets.is_empty());
        assert_eq!(chart.ratio, 1.0);
    }

    #[test]
    fn test_ratio_and_transform_scenario() {
        // Peak download total 100, peak upload total 25 -> ratio 4; an
        // upload value of 10 lands at -40 and inverts back to 10
        let buckets = vec![
            bucket_at(0)
                .with_value(dl("a"), 100.0)
                .with_value(up("a"), 25.0),
            bucket_at(60)
                .with_value(dl("a"), 50.0)
                .with_value(up("a"), 10.0),
        ];
        let chart = scale(buckets, &VisibilityMap::new(), classify, false);

        assert_eq!(chart.ratio, 4.0);
        assert_eq!(chart.buckets[0].value(&dl("a")), 100.0);
        assert_eq!(chart.buckets[0].value(&up("a")), -100.0);
        assert_eq!(chart.buckets[1].value(&up("a")), -40.0);
        assert_eq!(invert(-40.0, chart.ratio), 10.0);
    }

    #[test]
    fn test_scale_symmetry() {
        // Equal totals on both sides at every bucket: ratio 1, positive side
        // untouched
        let buckets = vec![
            bucket_at(0).with_value(dl("a"), 30.0).with_value(up("a"), 30.0),
            bucket_at(60).with_value(dl("a"), 10.0).with_value(up("a"), 10.0),
        ];
        let chart = scale(buckets, &VisibilityMap::new(), classify, false);

        assert_eq!(chart.ratio, 1.0);
        assert_eq!(chart.buckets[0].value(&dl("a")), 30.0);
        assert_eq!(chart.buckets[0].value(&up("a")), -30.0);
    }

    #[test]
    fn test_zero_side_gives_neutral_ratio() {
        let buckets = vec![bucket_at(0).with_value(dl("a"), 100.0)];
        let chart = scale(buckets, &VisibilityMap::new(), classify, false);
        assert_eq!(chart.ratio, 1.0);
    }

    #[test]
    fn test_hidden_series_excluded_from_ratio_but_still_transformed() {
        let mut visibility = VisibilityMap::new();
        visibility.insert(up("noisy"), false);

        let buckets = vec![bucket_at(0)
            .with_value(dl("a"), 100.0)
            .with_value(up("a"), 25.0)
            .with_value(up("noisy"), 1000.0)];
        let chart = scale(buckets, &visibility, classify, false);

        // Ratio driven by the visible upload total (25), not the hidden one
        assert_eq!(chart.ratio, 4.0);
        // The hidden series is still present and transformed
        assert_eq!(chart.buckets[0].value(&up("noisy")), -4000.0);
    }

    #[test]
    fn test_flipped_orientation_swaps_sides() {
        let buckets = vec![bucket_at(0)
            .with_value(dl("a"), 100.0)
            .with_value(up("a"), 25.0)];
        let chart = scale(buckets, &VisibilityMap::new(), classify, true);

        // Upload is now the positive, unscaled side; download scales down to
        // match its peak
        assert_eq!(chart.ratio, 0.25);
        assert_eq!(chart.buckets[0].value(&up("a")), 25.0);
        assert_eq!(chart.buckets[0].value(&dl("a")), -25.0);
        assert_eq!(invert(-25.0, chart.ratio), 100.0);
    }

    #[test]
    fn test_negative_inputs_are_normalized() {
        // Magnitudes are what matter; stray negative readings do not flip a
        // series to the wrong side
        let buckets = vec![bucket_at(0)
            .with_value(dl("a"), -50.0)
            .with_value(up("a"), 50.0)];
        let chart = scale(buckets, &VisibilityMap::new(), classify, false);
        assert_eq!(chart.buckets[0].value(&dl("a")), 50.0);
        assert_eq!(chart.buckets[0].value(&up("a")), -50.0);
    }

    #[test]
    fn test_missing_visibility_entry_counts_as_shown() {
        let buckets = vec![bucket_at(0)
            .with_value(dl("a"), 100.0)
            .with_value(up("new-client"), 50.0)];
        let chart = scale(buckets, &VisibilityMap::new(), classify, false);
        assert_eq!(chart.ratio, 2.0);
    }

    #[test]
    fn test_inverse_round_trip() {
        let ratios: [f64; 4] = [0.25, 1.0, 4.0, 123.456];
        let values: [f64; 4] = [0.0, 0.5, 10.0, 987.0];
        for &ratio in &ratios {
            for &v in &values {
                // Positive side: transform is abs
                assert!((invert(v.abs(), ratio) - v.abs()).abs() < 1e-9);
                // Negative side: transform is -abs(v) * ratio
                let transformed = -v.abs() * ratio;
                assert!((invert(transformed, ratio) - v.abs()).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_injected_classifier_overrides_default_grouping() {
        // Force everything into the download group: no opposing side, ratio 1
        let buckets = vec![bucket_at(0)
            .with_value(dl("a"), 10.0)
            .with_value(up("a"), 20.0)];
        let chart = scale(
            buckets,
            &VisibilityMap::new(),
            |_| Direction::Download,
            false,
        );
        assert_eq!(chart.ratio, 1.0);
        assert_eq!(chart.buckets[0].value(&up("a")), 20.0);
    }
}
