//! Time bucketing and multi-series aggregation
//!
//! Buckets raw samples into fixed-width intervals and produces one averaged
//! record per bucket. Resolution is either raw passthrough or an interval
//! drawn from a fixed allowed set ([`ALLOWED_RESOLUTION_MINUTES`]); anything
//! else is a caller error and fails fast rather than silently defaulting,
//! since a coerced interval would corrupt bucket boundaries invisibly.

use chrono::{TimeZone, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::{BandVisError, Result};
use crate::types::{Bucket, Sample, SeriesKey};

/// Aggregation intervals callers may request, in minutes
pub const ALLOWED_RESOLUTION_MINUTES: &[f64] = &[0.25, 0.5, 1.0, 5.0, 10.0, 15.0, 30.0, 60.0];

/// Requested chart resolution
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Resolution {
    /// Pass samples through unmodified
    #[default]
    Raw,
    /// Average into buckets of this many minutes (sub-minute fractions allowed)
    Minutes(f64),
}

impl Resolution {
    /// Validate a minute count against the allowed set
    pub fn from_minutes(minutes: f64) -> Result<Self> {
        if ALLOWED_RESOLUTION_MINUTES.contains(&minutes) {
            Ok(Resolution::Minutes(minutes))
        } else {
            Err(BandVisError::InvalidResolution { minutes })
        }
    }

    /// All selectable resolutions, raw first
    pub fn all() -> Vec<Resolution> {
        let mut out = vec![Resolution::Raw];
        out.extend(ALLOWED_RESOLUTION_MINUTES.iter().map(|&m| Resolution::Minutes(m)));
        out
    }

    /// Bucket width in whole seconds, None for raw
    ///
    /// Every allowed fractional resolution is an integral number of seconds.
    pub fn interval_seconds(&self) -> Option<i64> {
        match self {
            Resolution::Raw => None,
            Resolution::Minutes(m) => Some((m * 60.0).round() as i64),
        }
    }

    /// Get display name for this resolution
    pub fn display_name(&self) -> String {
        match self {
            Resolution::Raw => "Raw".to_string(),
            Resolution::Minutes(m) if *m < 1.0 => format!("{:.0} s", m * 60.0),
            Resolution::Minutes(m) => format!("{:.0} min", m),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// Persisted form is the external contract: the literal "raw" or a number of
// minutes.
impl Serialize for Resolution {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Resolution::Raw => serializer.serialize_str("raw"),
            Resolution::Minutes(m) => serializer.serialize_f64(*m),
        }
    }
}

struct ResolutionVisitor;

impl Visitor<'_> for ResolutionVisitor {
    type Value = Resolution;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("the string \"raw\" or an allowed number of minutes")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Resolution, E> {
        if v.eq_ignore_ascii_case("raw") {
            Ok(Resolution::Raw)
        } else {
            Err(E::custom(format!("unknown resolution '{}'", v)))
        }
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Resolution, E> {
        Resolution::from_minutes(v).map_err(|e| E::custom(e.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Resolution, E> {
        self.visit_f64(v as f64)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Resolution, E> {
        self.visit_f64(v as f64)
    }
}

impl<'de> Deserialize<'de> for Resolution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(ResolutionVisitor)
    }
}

/// Bucket raw samples into fixed-width intervals and average every field
///
/// Each sample lands in the bucket starting at
/// `floor(unix_secs / interval) * interval`. For every field key seen in any
/// member sample the bucket holds the arithmetic mean over all member
/// samples, with an absent field contributing 0, so partial data dilutes the
/// average instead of excluding the field. Output is re-sorted ascending by
/// bucket timestamp since hash grouping does not preserve order.
///
/// Raw resolution returns the input unchanged. Empty input yields empty
/// output.
pub fn aggregate(samples: &[Sample], resolution: Resolution) -> Result<Vec<Bucket>> {
    let interval = match resolution.interval_seconds() {
        None => return Ok(samples.to_vec()),
        Some(secs) => secs,
    };
    if interval <= 0 {
        return Err(BandVisError::InvalidResolution {
            minutes: interval as f64 / 60.0,
        });
    }

    let mut groups: HashMap<i64, Vec<&Sample>> = HashMap::new();
    for sample in samples {
        let start = sample.unix_seconds().div_euclid(interval) * interval;
        groups.entry(start).or_default().push(sample);
    }

    let mut buckets: Vec<Bucket> = groups
        .into_iter()
        .map(|(start, members)| mean_bucket(start, &members))
        .collect();
    buckets.sort_by_key(|b| b.timestamp);

    Ok(buckets)
}

/// Average a group of samples into one bucket at the given lower boundary
fn mean_bucket(start_secs: i64, members: &[&Sample]) -> Bucket {
    let timestamp = Utc
        .timestamp_opt(start_secs, 0)
        .single()
        .unwrap_or_else(|| Utc.timestamp_opt(0, 0).unwrap());

    let keys: HashSet<&SeriesKey> = members.iter().flat_map(|s| s.values.keys()).collect();

    let mut bucket = Bucket::new(timestamp);
    let count = members.len() as f64;
    for key in keys {
        let sum: f64 = members.iter().map(|s| s.value(key)).sum();
        bucket.set(key.clone(), sum / count);
    }
    bucket
}
