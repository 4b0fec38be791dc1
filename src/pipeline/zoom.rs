//! Zoom filtering for chart datasets
//!
//! Narrows a bucket (or raw sample) sequence to a caller-specified half-open
//! time sub-range and reports the sub-range's effective duration, used
//! downstream to pick axis-label coarseness. The duration is advisory, not
//! authoritative.

use chrono::{DateTime, Duration, Utc};

use crate::types::Bucket;

/// Half-open time range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomRange {
    /// Inclusive lower bound
    pub start: DateTime<Utc>,
    /// Exclusive upper bound
    pub end: DateTime<Utc>,
}

impl ZoomRange {
    /// Create a new range
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Whether the instant falls inside `[start, end)`
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// Keep only buckets whose timestamps fall inside the range
///
/// `None` means no zoom and returns the input unchanged. An empty result is
/// an empty vec, never an error.
pub fn zoom(mut buckets: Vec<Bucket>, range: Option<ZoomRange>) -> Vec<Bucket> {
    if let Some(range) = range {
        buckets.retain(|b| range.contains(b.timestamp));
    }
    buckets
}

/// Span between the first and last included timestamps
///
/// Returns `None` for fewer than 2 data points.
pub fn effective_duration(buckets: &[Bucket]) -> Option<Duration> {
    let first = buckets.first()?.timestamp;
    let last = buckets.last()?.timestamp;
    if buckets.len() < 2 {
        return None;
    }
    Some(last - first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sample;
    use chrono::TimeZone;

    fn bucket_at(secs: i64) -> Bucket {
        Sample::new(Utc.timestamp_opt(secs, 0).unwrap())
    }

    fn range(start: i64, end: i64) -> ZoomRange {
        ZoomRange::new(
            Utc.timestamp_opt(start, 0).unwrap(),
            Utc.timestamp_opt(end, 0).unwrap(),
        )
    }

    #[test]
    fn test_no_range_is_identity() {
        let buckets = vec![bucket_at(0), bucket_at(60), bucket_at(120)];
        let out = zoom(buckets.clone(), None);
        assert_eq!(out, buckets);
    }

    #[test]
    fn test_half_open_bounds() {
        let buckets = vec![bucket_at(0), bucket_at(60), bucket_at(120)];
        let out = zoom(buckets, Some(range(0, 120)));
        let times: Vec<i64> = out.iter().map(|b| b.unix_seconds()).collect();
        // End is exclusive, start inclusive
        assert_eq!(times, vec![0, 60]);
    }

    #[test]
    fn test_fully_inside_range_is_noop() {
        let buckets = vec![bucket_at(60), bucket_at(120)];
        let out = zoom(buckets.clone(), Some(range(0, 600)));
        assert_eq!(out, buckets);
    }

    #[test]
    fn test_empty_result_is_not_an_error() {
        let buckets = vec![bucket_at(0), bucket_at(60)];
        let out = zoom(buckets, Some(range(1000, 2000)));
        assert!(out.is_empty());
        assert_eq!(effective_duration(&out), None);
    }

    #[test]
    fn test_effective_duration() {
        let buckets = vec![bucket_at(0), bucket_at(60), bucket_at(300)];
        assert_eq!(effective_duration(&buckets), Some(Duration::seconds(300)));
    }

    #[test]
    fn test_effective_duration_needs_two_points() {
        assert_eq!(effective_duration(&[]), None);
        assert_eq!(effective_duration(&[bucket_at(42)]), None);
    }
}
