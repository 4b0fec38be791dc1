//! Chart data pipeline
//!
//! The pipeline turns a raw sample batch into a bounded, visually balanced
//! chart dataset: aggregate into time buckets, narrow to the zoomed
//! sub-range, then dual-polarity scale so download and upload share one
//! axis. The whole chain is a pure synchronous function of its inputs, with no
//! ambient storage reads and no render-cycle coupling; any host (web bridge,
//! CLI, batch job) calls it identically.
//!
//! # Stages
//!
//! - [`aggregate`] - fixed-width time bucketing with per-field means
//! - [`zoom`] - half-open range filter plus advisory effective duration
//! - [`scale`] - signed-axis normalization with a recoverable ratio
//!
//! Persistence of the view state that parameterizes a call ([`ChartView`])
//! is the caller's responsibility at the boundary; see the store module.

pub mod aggregate;
pub mod scale;
pub mod zoom;

pub use aggregate::{aggregate, Resolution, ALLOWED_RESOLUTION_MINUTES};
pub use scale::{invert, positive_direction, scale, ScaledChart};
pub use zoom::{effective_duration, zoom, ZoomRange};

use chrono::Duration;

use crate::error::Result;
use crate::types::{Bucket, Sample, SeriesKey, VisibilityMap};

/// Everything that parameterizes one chart computation
///
/// Injected explicitly so the pipeline stays a pure function; the hosting
/// dashboard loads and persists these through the stores.
#[derive(Debug, Clone)]
pub struct ChartView {
    /// Requested bucketing resolution
    pub resolution: Resolution,
    /// Optional zoom sub-range
    pub zoom: Option<ZoomRange>,
    /// Which series count toward the scale (and get drawn)
    pub visibility: VisibilityMap,
    /// Orientation: false renders download above the axis, true upload
    pub flipped: bool,
}

impl Default for ChartView {
    fn default() -> Self {
        Self {
            resolution: Resolution::Raw,
            zoom: None,
            visibility: VisibilityMap::new(),
            flipped: false,
        }
    }
}

/// Output handed to a presentation adapter
#[derive(Debug, Clone)]
pub struct ChartData {
    /// Transformed buckets, strictly ascending by timestamp
    pub buckets: Vec<Bucket>,
    /// Scale ratio the adapter must invert when formatting true values
    pub ratio: f64,
    /// Advisory span of the zoomed data, for axis-label coarseness
    pub effective_duration: Option<Duration>,
}

/// Run the full pipeline: aggregate, zoom, scale
///
/// Series group membership uses [`SeriesKey::direction`]; hosts needing a
/// different grouping can compose the stages directly with a custom
/// classifier.
pub fn build_chart(samples: &[Sample], view: &ChartView) -> Result<ChartData> {
    let buckets = aggregate(samples, view.resolution)?;
    let zoomed = zoom(buckets, view.zoom);
    let effective_duration = effective_duration(&zoomed);
    let chart = scale(zoomed, &view.visibility, SeriesKey::direction, view.flipped);

    Ok(ChartData {
        buckets: chart.buckets,
        ratio: chart.ratio,
        effective_duration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClientId;
    use chrono::{TimeZone, Utc};

    fn dl(id: &str) -> SeriesKey {
        SeriesKey::ClientDownload(ClientId::from(id))
    }

    fn up(id: &str) -> SeriesKey {
        SeriesKey::ClientUpload(ClientId::from(id))
    }

    fn sample_at(secs: i64, down: f64, upv: f64) -> Sample {
        Sample::new(Utc.timestamp_opt(secs, 0).unwrap())
            .with_value(dl("tv"), down)
            .with_value(up("tv"), upv)
    }

    #[test]
    fn test_build_chart_end_to_end() {
        let samples = vec![
            sample_at(0, 100.0, 25.0),
            sample_at(30, 50.0, 5.0),
            sample_at(90, 20.0, 10.0),
        ];
        let view = ChartView {
            resolution: Resolution::Minutes(1.0),
            ..Default::default()
        };
        let chart = build_chart(&samples, &view).unwrap();

        // Two one-minute buckets; first averages the first two samples
        assert_eq!(chart.buckets.len(), 2);
        assert_eq!(chart.buckets[0].value(&dl("tv")), 75.0);
        // Peak download 75 vs peak upload 15 -> ratio 5
        assert_eq!(chart.ratio, 5.0);
        assert_eq!(chart.buckets[1].value(&up("tv")), -50.0);
        assert_eq!(
            chart.effective_duration,
            Some(Duration::seconds(60))
        );
    }

    #[test]
    fn test_build_chart_empty() {
        let chart = build_chart(&[], &ChartView::default()).unwrap();
        assert!(chart.buckets.is_empty());
        assert_eq!(chart.ratio, 1.0);
        assert_eq!(chart.effective_duration, None);
    }

    #[test]
    fn test_zoom_applies_before_scaling() {
        // The ratio must reflect only what is inside the zoom window
        let samples = vec![sample_at(0, 1000.0, 10.0), sample_at(120, 100.0, 50.0)];
        let view = ChartView {
            resolution: Resolution::Minutes(1.0),
            zoom: Some(ZoomRange::new(
                Utc.timestamp_opt(60, 0).unwrap(),
                Utc.timestamp_opt(600, 0).unwrap(),
            )),
            ..Default::default()
        };
        let chart = build_chart(&samples, &view).unwrap();

        assert_eq!(chart.buckets.len(), 1);
        assert_eq!(chart.ratio, 2.0);
    }
}
