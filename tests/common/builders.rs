//! Builders for test data

use bandvis_rs::types::{ClientId, Sample, SeriesKey};
use chrono::{TimeZone, Utc};

/// Fluent builder for telemetry samples
#[derive(Debug, Clone)]
pub struct SampleBuilder {
    sample: Sample,
}

#[allow(dead_code)]
impl SampleBuilder {
    /// Start a sample at the given Unix second
    pub fn at(secs: i64) -> Self {
        Self {
            sample: Sample::new(Utc.timestamp_opt(secs, 0).unwrap()),
        }
    }

    /// Per-client download speed
    pub fn download(mut self, client: &str, kbps: f64) -> Self {
        self.sample
            .set(SeriesKey::ClientDownload(ClientId::from(client)), kbps);
        self
    }

    /// Per-client upload speed
    pub fn upload(mut self, client: &str, kbps: f64) -> Self {
        self.sample
            .set(SeriesKey::ClientUpload(ClientId::from(client)), kbps);
        self
    }

    /// Stream bitrate
    pub fn stream_bitrate(mut self, kbps: f64) -> Self {
        self.sample.set(SeriesKey::StreamBitrate, kbps);
        self
    }

    /// WAN counter speeds
    pub fn wan(mut self, down_kbps: f64, up_kbps: f64) -> Self {
        self.sample.set(SeriesKey::WanDownload, down_kbps);
        self.sample.set(SeriesKey::WanUpload, up_kbps);
        self
    }

    /// Finish the sample
    pub fn build(self) -> Sample {
        self.sample
    }
}
