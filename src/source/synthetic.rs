//! Synthetic sample source
//!
//! Generates deterministic, plausible bandwidth telemetry without a real
//! home-media server behind it. Used by the demo binary and by tests that
//! need an end-to-end source.
//!
//! # Waveforms
//!
//! Each client's speeds follow a configurable waveform; values are a pure
//! function of the sample timestamp, so two fetches over the same window
//! produce identical batches.
//!
//! - [`Waveform::Constant`] - fixed value
//! - [`Waveform::Sine`] - sinusoid with period, amplitude, and offset
//! - [`Waveform::Sawtooth`] - linear ramp that resets each period
//! - [`Waveform::Square`] - alternates between low and high each half period

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::f64::consts::TAU;

use crate::error::Result;
use crate::source::SampleSource;
use crate::types::{Client, Sample, SeriesKey};

/// Deterministic value generator, a pure function of the timestamp
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Waveform {
    /// Fixed value
    Constant(f64),
    /// Sinusoid: `offset + amplitude * sin(2π t / period)`
    Sine {
        period_secs: f64,
        amplitude: f64,
        offset: f64,
    },
    /// Linear ramp from 0 to `max`, resetting each period
    Sawtooth { period_secs: f64, max: f64 },
    /// Alternates between `low` and `high` each half period
    Square {
        period_secs: f64,
        low: f64,
        high: f64,
    },
}

impl Waveform {
    /// Evaluate at the given Unix second, clamped to non-negative
    pub fn value_at(&self, unix_secs: i64) -> f64 {
        let t = unix_secs as f64;
        let v = match self {
            Waveform::Constant(v) => *v,
            Waveform::Sine {
                period_secs,
                amplitude,
                offset,
            } => offset + amplitude * (TAU * t / period_secs).sin(),
            Waveform::Sawtooth { period_secs, max } => max * (t / period_secs).fract().abs(),
            Waveform::Square {
                period_secs,
                low,
                high,
            } => {
                if (t / (period_secs / 2.0)).floor() as i64 % 2 == 0 {
                    *low
                } else {
                    *high
                }
            }
        };
        v.max(0.0)
    }
}

/// Per-client waveform configuration
#[derive(Debug, Clone)]
pub struct ClientProfile {
    /// The client this profile generates for
    pub client: Client,
    /// Download speed waveform (kbit/s)
    pub download: Waveform,
    /// Upload speed waveform (kbit/s)
    pub upload: Waveform,
}

impl ClientProfile {
    /// Profile with a sine download and a quieter sine upload
    pub fn new(client: Client) -> Self {
        Self {
            client,
            download: Waveform::Sine {
                period_secs: 600.0,
                amplitude: 20_000.0,
                offset: 50_000.0,
            },
            upload: Waveform::Sine {
                period_secs: 450.0,
                amplitude: 1_000.0,
                offset: 2_000.0,
            },
        }
    }

    /// Override the download waveform
    pub fn with_download(mut self, waveform: Waveform) -> Self {
        self.download = waveform;
        self
    }

    /// Override the upload waveform
    pub fn with_upload(mut self, waveform: Waveform) -> Self {
        self.upload = waveform;
        self
    }
}

/// Deterministic telemetry generator implementing [`SampleSource`]
pub struct SyntheticSource {
    profiles: Vec<ClientProfile>,
    stream_bitrate: Waveform,
    stream_count: Waveform,
    /// Seconds between generated samples
    cadence_secs: i64,
    /// Fixed "now" for reproducible windows; None uses the wall clock
    fixed_now: Option<DateTime<Utc>>,
}

impl SyntheticSource {
    /// Create a source generating for the given clients
    pub fn new(clients: Vec<Client>) -> Self {
        Self {
            profiles: clients.into_iter().map(ClientProfile::new).collect(),
            stream_bitrate: Waveform::Square {
                period_secs: 1200.0,
                low: 4_000.0,
                high: 12_000.0,
            },
            stream_count: Waveform::Square {
                period_secs: 1200.0,
                low: 1.0,
                high: 3.0,
            },
            cadence_secs: 10,
            fixed_now: None,
        }
    }

    /// Replace the generated client profiles
    pub fn with_profiles(mut self, profiles: Vec<ClientProfile>) -> Self {
        self.profiles = profiles;
        self
    }

    /// Seconds between generated samples
    pub fn with_cadence_secs(mut self, cadence_secs: i64) -> Self {
        self.cadence_secs = cadence_secs.max(1);
        self
    }

    /// Pin "now" so fetches over the same window are reproducible
    pub fn with_fixed_now(mut self, now: DateTime<Utc>) -> Self {
        self.fixed_now = Some(now);
        self
    }

    fn now(&self) -> DateTime<Utc> {
        self.fixed_now.unwrap_or_else(Utc::now)
    }

    /// Generate one sample at the given instant
    fn sample_at(&self, timestamp: DateTime<Utc>) -> Sample {
        let secs = timestamp.timestamp();
        let mut sample = Sample::new(timestamp);

        let mut wan_down = 0.0;
        let mut wan_up = 0.0;
        for profile in &self.profiles {
            let id = &profile.client.id;
            let down = profile.download.value_at(secs);
            let up = profile.upload.value_at(secs);
            wan_down += down;
            wan_up += up;

            if profile.client.download_enabled {
                sample.set(SeriesKey::ClientDownload(id.clone()), down);
                if let Some(limit) = profile.client.download_limit_kbps {
                    sample.set(SeriesKey::ClientDownloadLimit(id.clone()), limit);
                }
            }
            if profile.client.upload_enabled {
                sample.set(SeriesKey::ClientUpload(id.clone()), up);
                if let Some(limit) = profile.client.upload_limit_kbps {
                    sample.set(SeriesKey::ClientUploadLimit(id.clone()), limit);
                }
            }
        }

        let bitrate = self.stream_bitrate.value_at(secs);
        sample.set(SeriesKey::StreamBitrate, bitrate);
        sample.set(SeriesKey::StreamCount, self.stream_count.value_at(secs));
        sample.set(SeriesKey::WanDownload, wan_down);
        sample.set(SeriesKey::WanUpload, wan_up + bitrate);

        sample
    }
}

impl SampleSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&mut self, lookback: Duration) -> Result<Vec<Sample>> {
        let end = self.now().timestamp();
        let start = end - lookback.num_seconds().max(0);

        // Align to the cadence so successive fetches see stable timestamps
        let mut t = start.div_euclid(self.cadence_secs) * self.cadence_secs;
        if t < start {
            t += self.cadence_secs;
        }
        let mut samples = Vec::new();
        while t <= end {
            samples.push(self.sample_at(Utc.timestamp_opt(t, 0).unwrap()));
            t += self.cadence_secs;
        }
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClientId;

    fn source() -> SyntheticSource {
        let clients = vec![Client::new("tv", "TV"), Client::new("office", "Office")];
        SyntheticSource::new(clients)
            .with_fixed_now(Utc.timestamp_opt(10_000, 0).unwrap())
            .with_cadence_secs(10)
    }

    #[test]
    fn test_fetch_is_deterministic() {
        let mut a = source();
        let mut b = source();
        let batch_a = a.fetch(Duration::minutes(5)).unwrap();
        let batch_b = b.fetch(Duration::minutes(5)).unwrap();
        assert_eq!(batch_a, batch_b);
        assert!(!batch_a.is_empty());
    }

    #[test]
    fn test_fetch_is_ascending_and_within_window() {
        let mut src = source();
        let batch = src.fetch(Duration::minutes(5)).unwrap();

        for pair in batch.windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
        }
        assert!(batch.first().unwrap().unix_seconds() >= 10_000 - 300);
        assert!(batch.last().unwrap().unix_seconds() <= 10_000);
    }

    #[test]
    fn test_disabled_direction_produces_no_series() {
        let mut client = Client::new("quiet", "Quiet");
        client.upload_enabled = false;
        let mut src = SyntheticSource::new(vec![client])
            .with_fixed_now(Utc.timestamp_opt(10_000, 0).unwrap());

        let batch = src.fetch(Duration::minutes(1)).unwrap();
        let key = SeriesKey::ClientUpload(ClientId::from("quiet"));
        assert!(batch.iter().all(|s| !s.values.contains_key(&key)));
    }

    #[test]
    fn test_limits_emitted_when_configured() {
        let mut client = Client::new("capped", "Capped");
        client.download_limit_kbps = Some(80_000.0);
        let mut src = SyntheticSource::new(vec![client])
            .with_fixed_now(Utc.timestamp_opt(10_000, 0).unwrap());

        let batch = src.fetch(Duration::minutes(1)).unwrap();
        let key = SeriesKey::ClientDownloadLimit(ClientId::from("capped"));
        assert!(batch.iter().all(|s| s.value(&key) == 80_000.0));
    }

    #[test]
    fn test_waveforms_are_non_negative() {
        let wave = Waveform::Sine {
            period_secs: 60.0,
            amplitude: 10.0,
            offset: 0.0,
        };
        for t in 0..120 {
            assert!(wave.value_at(t) >= 0.0);
        }
    }

    #[test]
    fn test_square_wave_alternates() {
        let wave = Waveform::Square {
            period_secs: 20.0,
            low: 1.0,
            high: 2.0,
        };
        assert_eq!(wave.value_at(0), 1.0);
        assert_eq!(wave.value_at(10), 2.0);
        assert_eq!(wave.value_at(20), 1.0);
    }
}
