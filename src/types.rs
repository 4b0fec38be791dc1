//! Core data types for BandVis
//!
//! This module contains the fundamental data structures used throughout
//! the crate for representing telemetry samples, chart series, and clients.
//!
//! # Main Types
//!
//! - [`Sample`] - One raw, timestamped telemetry point (also used as [`Bucket`])
//! - [`SeriesKey`] - Stable identifier for one drawable quantity
//! - [`Direction`] - Traffic direction a series belongs to (download/upload)
//! - [`Client`] - Descriptor for one bandwidth-split client
//!
//! # Timestamps
//!
//! Sample timestamps are UTC instants with second resolution. Sources deliver
//! them as ISO-8601 strings that may lack an explicit UTC designator; a
//! designator-less timestamp is treated as UTC, never local time
//! ([`parse_utc_timestamp`]).
//!
//! # Samples vs Buckets
//!
//! A [`Bucket`] is a [`Sample`] whose timestamp is a bucket's lower boundary
//! and whose values are per-field means. The two are the same type so that
//! raw (passthrough) resolution is indistinguishable from aggregated output
//! to downstream consumers.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::de::{self, Deserialize, Deserializer, Visitor};
use serde::ser::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{BandVisError, Result};

/// Identifier for one bandwidth-split client (e.g. a device or user slot)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub String);

impl ClientId {
    /// Create a new client id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ClientId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Traffic direction a series belongs to
///
/// The dual-polarity scaler balances the two directions against each other;
/// which one renders above the axis depends on the orientation flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Traffic towards the client (WAN ingress)
    #[default]
    Download,
    /// Traffic from the server outwards (WAN egress, served streams)
    Upload,
}

impl Direction {
    /// Get the opposite direction
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Download => Direction::Upload,
            Direction::Upload => Direction::Download,
        }
    }

    /// Get display name for this direction
    pub fn display_name(&self) -> &'static str {
        match self {
            Direction::Download => "Download",
            Direction::Upload => "Upload",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Stable identifier for one drawable quantity
///
/// The string form (used for persistence and by adapters) is stable:
/// `client:<id>:download`, `client:<id>:upload-limit`, `wan:download`,
/// `stream:bitrate`, and so on. Serialized as that string so visibility maps
/// round-trip as flat JSON objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SeriesKey {
    /// Per-client download speed
    ClientDownload(ClientId),
    /// Per-client upload speed
    ClientUpload(ClientId),
    /// Per-client configured download limit
    ClientDownloadLimit(ClientId),
    /// Per-client configured upload limit
    ClientUploadLimit(ClientId),
    /// Total bitrate of active media streams
    StreamBitrate,
    /// Number of active media streams
    StreamCount,
    /// WAN counter download speed (SNMP)
    WanDownload,
    /// WAN counter upload speed (SNMP)
    WanUpload,
}

impl SeriesKey {
    /// The traffic direction this series belongs to
    ///
    /// Stream series count as upload: a media server serving a stream is
    /// outbound traffic.
    pub fn direction(&self) -> Direction {
        match self {
            SeriesKey::ClientDownload(_)
            | SeriesKey::ClientDownloadLimit(_)
            | SeriesKey::WanDownload => Direction::Download,
            SeriesKey::ClientUpload(_)
            | SeriesKey::ClientUploadLimit(_)
            | SeriesKey::StreamBitrate
            | SeriesKey::StreamCount
            | SeriesKey::WanUpload => Direction::Upload,
        }
    }

    /// The client this series belongs to, if any
    pub fn client_id(&self) -> Option<&ClientId> {
        match self {
            SeriesKey::ClientDownload(id)
            | SeriesKey::ClientUpload(id)
            | SeriesKey::ClientDownloadLimit(id)
            | SeriesKey::ClientUploadLimit(id) => Some(id),
            _ => None,
        }
    }

    /// Whether this series is a configured limit rather than a measurement
    pub fn is_limit(&self) -> bool {
        matches!(
            self,
            SeriesKey::ClientDownloadLimit(_) | SeriesKey::ClientUploadLimit(_)
        )
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesKey::ClientDownload(id) => write!(f, "client:{}:download", id),
            SeriesKey::ClientUpload(id) => write!(f, "client:{}:upload", id),
            SeriesKey::ClientDownloadLimit(id) => write!(f, "client:{}:download-limit", id),
            SeriesKey::ClientUploadLimit(id) => write!(f, "client:{}:upload-limit", id),
            SeriesKey::StreamBitrate => write!(f, "stream:bitrate"),
            SeriesKey::StreamCount => write!(f, "stream:count"),
            SeriesKey::WanDownload => write!(f, "wan:download"),
            SeriesKey::WanUpload => write!(f, "wan:upload"),
        }
    }
}

impl FromStr for SeriesKey {
    type Err = BandVisError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "stream:bitrate" => return Ok(SeriesKey::StreamBitrate),
            "stream:count" => return Ok(SeriesKey::StreamCount),
            "wan:download" => return Ok(SeriesKey::WanDownload),
            "wan:upload" => return Ok(SeriesKey::WanUpload),
            _ => {}
        }

        // client:<id>:<kind>; the id itself may not contain ':'
        let mut parts = s.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("client"), Some(id), Some(kind)) if !id.is_empty() => {
                let id = ClientId::new(id);
                match kind {
                    "download" => Ok(SeriesKey::ClientDownload(id)),
                    "upload" => Ok(SeriesKey::ClientUpload(id)),
                    "download-limit" => Ok(SeriesKey::ClientDownloadLimit(id)),
                    "upload-limit" => Ok(SeriesKey::ClientUploadLimit(id)),
                    other => Err(BandVisError::Serialization(format!(
                        "Unknown series kind '{}' in key '{}'",
                        other, s
                    ))),
                }
            }
            _ => Err(BandVisError::Serialization(format!(
                "Unknown series key '{}'",
                s
            ))),
        }
    }
}

impl Serialize for SeriesKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

struct SeriesKeyVisitor;

impl Visitor<'_> for SeriesKeyVisitor {
    type Value = SeriesKey;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a series key string such as 'client:<id>:download'")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<SeriesKey, E> {
        SeriesKey::from_str(v).map_err(|e| E::custom(e.to_string()))
    }
}

impl<'de> Deserialize<'de> for SeriesKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_str(SeriesKeyVisitor)
    }
}

/// Series visibility: shown (`true`) or hidden (`false`) per key
///
/// Complete for all known keys after load; persisted data is never trusted
/// to be complete and is overlaid on a hard-coded default map.
pub type VisibilityMap = HashMap<SeriesKey, bool>;

/// One raw telemetry point: a UTC timestamp and named numeric fields
///
/// Missing fields are absent from the map (read back as 0), never an error.
/// Samples for a lookback window arrive in ascending timestamp order but at
/// irregular intervals.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// When the point was captured (UTC, second resolution)
    pub timestamp: DateTime<Utc>,
    /// Field values keyed by series
    pub values: HashMap<SeriesKey, f64>,
}

/// One aggregated, time-windowed record derived from one or more samples
///
/// Same type as [`Sample`]: the timestamp is the bucket's lower boundary and
/// every value is the arithmetic mean over the contributing samples.
pub type Bucket = Sample;

impl Sample {
    /// Create an empty sample at the given instant
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            values: HashMap::new(),
        }
    }

    /// Create an empty sample from an ISO-8601 timestamp string
    pub fn at(timestamp: &str) -> Result<Self> {
        Ok(Self::new(parse_utc_timestamp(timestamp)?))
    }

    /// Builder-style field assignment
    pub fn with_value(mut self, key: SeriesKey, value: f64) -> Self {
        self.values.insert(key, value);
        self
    }

    /// Set a field value
    pub fn set(&mut self, key: SeriesKey, value: f64) {
        self.values.insert(key, value);
    }

    /// Get a field value, treating an absent field as 0
    pub fn value(&self, key: &SeriesKey) -> f64 {
        self.values.get(key).copied().unwrap_or(0.0)
    }

    /// Timestamp as Unix seconds
    pub fn unix_seconds(&self) -> i64 {
        self.timestamp.timestamp()
    }
}

/// Parse an ISO-8601 timestamp, treating a missing UTC designator as UTC
///
/// Sources are not consistent about the trailing `Z`; a designator-less
/// timestamp must be interpreted as UTC, not local time.
pub fn parse_utc_timestamp(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    Err(BandVisError::Timestamp(format!(
        "Could not parse '{}' as an ISO-8601 UTC timestamp",
        s
    )))
}

/// Descriptor for one bandwidth-split client
///
/// Clients drive the sample field set, the default visibility map, and
/// stack-order reconciliation. The enabled flags and limits come from the
/// bandwidth-split configuration managed by the hosting application.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Client {
    /// Stable identifier
    pub id: ClientId,
    /// Human-readable name
    pub name: String,
    /// Whether the download split is enabled for this client
    #[serde(default = "default_true")]
    pub download_enabled: bool,
    /// Whether the upload split is enabled for this client
    #[serde(default = "default_true")]
    pub upload_enabled: bool,
    /// Configured download limit in kbit/s (None = unlimited)
    #[serde(default)]
    pub download_limit_kbps: Option<f64>,
    /// Configured upload limit in kbit/s (None = unlimited)
    #[serde(default)]
    pub upload_limit_kbps: Option<f64>,
}

fn default_true() -> bool {
    true
}

impl Client {
    /// Create an enabled client with no limits
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ClientId::new(id),
            name: name.into(),
            download_enabled: true,
            upload_enabled: true,
            download_limit_kbps: None,
            upload_limit_kbps: None,
        }
    }

    /// Whether the client participates in the given direction
    pub fn supports(&self, direction: Direction) -> bool {
        match direction {
            Direction::Download => self.download_enabled,
            Direction::Upload => self.upload_enabled,
        }
    }

    /// Whether the client participates in any direction
    pub fn is_enabled(&self) -> bool {
        self.download_enabled || self.upload_enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_key_round_trip() {
        let keys = [
            SeriesKey::ClientDownload(ClientId::from("living-room")),
            SeriesKey::ClientUpload(ClientId::from("living-room")),
            SeriesKey::ClientDownloadLimit(ClientId::from("office")),
            SeriesKey::ClientUploadLimit(ClientId::from("office")),
            SeriesKey::StreamBitrate,
            SeriesKey::StreamCount,
            SeriesKey::WanDownload,
            SeriesKey::WanUpload,
        ];

        for key in keys {
            let parsed: SeriesKey = key.to_string().parse().unwrap();
            assert_eq!(parsed, key);
        }
    }

    #[test]
    fn test_series_key_rejects_garbage() {
        assert!("nonsense".parse::<SeriesKey>().is_err());
        assert!("client::download".parse::<SeriesKey>().is_err());
        assert!("client:x:sideways".parse::<SeriesKey>().is_err());
    }

    #[test]
    fn test_series_key_json_map_keys() {
        let mut map = HashMap::new();
        map.insert(SeriesKey::WanDownload, true);
        map.insert(SeriesKey::ClientUpload(ClientId::from("tv")), false);

        let json = serde_json::to_string(&map).unwrap();
        let back: HashMap<SeriesKey, bool> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_series_key_direction() {
        assert_eq!(
            SeriesKey::ClientDownload(ClientId::from("a")).direction(),
            Direction::Download
        );
        assert_eq!(
            SeriesKey::ClientUploadLimit(ClientId::from("a")).direction(),
            Direction::Upload
        );
        // Serving a stream is outbound traffic
        assert_eq!(SeriesKey::StreamBitrate.direction(), Direction::Upload);
        assert_eq!(SeriesKey::WanDownload.direction(), Direction::Download);
    }

    #[test]
    fn test_parse_utc_timestamp_with_designator() {
        let dt = parse_utc_timestamp("2026-03-01T12:30:00Z").unwrap();
        assert_eq!(dt.timestamp(), 1772368200);
    }

    #[test]
    fn test_parse_utc_timestamp_without_designator() {
        // A designator-less timestamp is UTC, not local time
        let with = parse_utc_timestamp("2026-03-01T12:30:00Z").unwrap();
        let without = parse_utc_timestamp("2026-03-01T12:30:00").unwrap();
        assert_eq!(with, without);
    }

    #[test]
    fn test_parse_utc_timestamp_offset() {
        let dt = parse_utc_timestamp("2026-03-01T13:30:00+01:00").unwrap();
        let utc = parse_utc_timestamp("2026-03-01T12:30:00Z").unwrap();
        assert_eq!(dt, utc);
    }

    #[test]
    fn test_parse_utc_timestamp_garbage() {
        assert!(parse_utc_timestamp("not a time").is_err());
    }

    #[test]
    fn test_sample_absent_value_is_zero() {
        let sample = Sample::at("2026-03-01T00:00:00").unwrap();
        assert_eq!(sample.value(&SeriesKey::WanDownload), 0.0);
    }

    #[test]
    fn test_client_supports() {
        let mut client = Client::new("tv", "Living Room TV");
        assert!(client.supports(Direction::Download));
        assert!(client.supports(Direction::Upload));

        client.upload_enabled = false;
        assert!(client.supports(Direction::Download));
        assert!(!client.supports(Direction::Upload));
        assert!(client.is_enabled());
    }
}
