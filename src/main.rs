//! BandVis - Headless Dashboard Host
//!
//! Runs the telemetry pipeline against the synthetic source and logs chart
//! summaries. Serves as the reference wiring for embedding the core: real
//! hosts swap in their own `SampleSource` and presentation adapter.

use bandvis_rs::config::{ensure_app_data_dir, view_state_path, AppConfig};
use bandvis_rs::dashboard::Dashboard;
use bandvis_rs::pipeline::invert;
use bandvis_rs::source::{Poller, PollerMessage, SyntheticSource};
use bandvis_rs::store::JsonFileStore;
use bandvis_rs::types::Client;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load_or_default();

    // Initialize logging; the file layer guard must outlive the subscriber
    let _file_guard = init_logging(&config)?;

    tracing::info!("Starting BandVis dashboard host");

    let clients = demo_clients();
    let view_state = view_state_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine app data directory"))?;
    let mut dashboard = Dashboard::new(JsonFileStore::open(view_state), clients.clone());
    dashboard.set_resolution(config.chart.resolution);

    let source = SyntheticSource::new(clients);
    let (poller, messages) = Poller::spawn(
        Box::new(source),
        config.collection.poll_interval(),
        config.collection.lookback(),
    );

    for msg in messages.iter() {
        let stopped = matches!(msg, PollerMessage::Shutdown);
        dashboard.apply_message(msg);
        if stopped {
            break;
        }

        match dashboard.chart() {
            Ok(chart) => {
                let peak_upload = chart
                    .buckets
                    .iter()
                    .flat_map(|b| b.values.values())
                    .copied()
                    .fold(0.0f64, |acc, v| if v < 0.0 { acc.max(-v) } else { acc });
                tracing::info!(
                    buckets = chart.buckets.len(),
                    ratio = chart.ratio,
                    peak_upload_kbps = invert(-peak_upload, chart.ratio),
                    stale = dashboard.fetch_error().is_some(),
                    "Chart updated"
                );
            }
            Err(e) => tracing::error!("Chart computation failed: {}", e),
        }
    }

    poller.shutdown();
    Ok(())
}

/// Initialize tracing with an env filter and optional rolling file layer
fn init_logging(
    config: &AppConfig,
) -> anyhow::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.filter.clone()));

    if config.logging.file_logging {
        let dir = ensure_app_data_dir()?;
        let appender = tracing_appender::rolling::daily(dir, "bandvis.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer))
            .init();
        Ok(Some(guard))
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
        Ok(None)
    }
}

/// Static demo client set for the synthetic source
fn demo_clients() -> Vec<Client> {
    let mut tv = Client::new("living-room-tv", "Living Room TV");
    tv.download_limit_kbps = Some(80_000.0);

    let office = Client::new("office", "Office");

    let mut nas = Client::new("nas", "NAS");
    nas.upload_limit_kbps = Some(10_000.0);

    vec![tv, office, nas]
}
