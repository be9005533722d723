use std::{path::Path, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use config::{Cli, MapsConfig};
use dotenvy::dotenv;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
use presentation::{
    app::{SubmissionOutcome, TrafficApp},
    form::RawForm,
};
use services::map_service::GoogleMapService;
use tokio::io::BufReader;
use tracing::{Subscriber, error, info};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

mod config;
mod model;
mod presentation;
mod services;

const SERVICE_NAME: &str = "road_traffic_lights";

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    _ = dotenv();
    let cli = Cli::parse();

    let (provider, _guard) = init_tracing(&cli.log_dir, cli.otlp_endpoint.as_deref())?;

    let service = GoogleMapService::new(MapsConfig::from(&cli))
        .context("Couldn't build the HTTP client")?;
    let app = TrafficApp::new(service, cli.fetch_mode(), cli.color_style());

    let res = run(&app, cli.form.into_raw_form()).await;
    if let Err(e) = &res {
        error!("{e:?}");
    }

    if let Some(provider) = provider {
        if let Err(e) = provider.shutdown() {
            eprintln!("Couldn't flush spans: {e}");
        }
    }

    res
}

/// One submission if the form came from the command line, otherwise an interactive session
async fn run(app: &TrafficApp<GoogleMapService>, form: Option<RawForm>) -> Result<()> {
    let mut out = std::io::stdout();

    let Some(form) = form else {
        info!("Starting interactive session");
        app.run_interactive(
            &mut BufReader::new(tokio::io::stdin()),
            &mut tokio::io::stdout(),
            &mut out,
        )
        .await?;
        return Ok(());
    };

    match app.submit(form, &mut out).await? {
        SubmissionOutcome::InvalidInput(e) => Err(e).context("Invalid input"),
        _ => Ok(()),
    }
}

/// Logs to a daily rolling file and, when an endpoint is configured, exports spans over OTLP
fn init_tracing(
    log_dir: &Path,
    otlp_endpoint: Option<&str>,
) -> Result<(Option<SdkTracerProvider>, WorkerGuard)> {
    let provider = otlp_endpoint
        .map(|endpoint| -> Result<SdkTracerProvider> {
            let exporter = SpanExporter::builder()
                .with_tonic()
                .with_endpoint(endpoint)
                .with_timeout(Duration::from_millis(1000))
                .build()
                .context("Couldn't build the OTLP span exporter")?;

            Ok(SdkTracerProvider::builder()
                .with_batch_exporter(exporter)
                .with_resource(Resource::builder().with_service_name(SERVICE_NAME).build())
                .build())
        })
        .transpose()?;

    let telemetry_layer = provider
        .as_ref()
        .map(|provider| tracing_opentelemetry::layer().with_tracer(provider.tracer(SERVICE_NAME)));

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(SERVICE_NAME)
        .filename_suffix("log")
        .build(log_dir)
        .with_context(|| format!("Couldn't open the log directory {}", log_dir.display()))?;
    let (non_blocking_appender, guard) = tracing_appender::non_blocking(appender);

    // A layer that logs events to rolling files.
    let file_log = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_appender)
        .with_ansi(false)
        .pretty();

    Registry::default()
        .with(telemetry_layer)
        .with(file_log)
        .with(console_log(std::io::stderr))
        .with(env_filter)
        .init();

    info!(otlp_endpoint, "Tracing initialized");

    Ok((provider, guard))
}

/// Warnings and errors also go to the terminal, so failed lookups aren't only in the log file
fn console_log<S, W>(writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_target(false)
        .without_time()
        .with_ansi(false)
        .with_filter(LevelFilter::WARN)
}

#[cfg(test)]
mod tests {
    use std::{
        io::Write,
        sync::{Arc, Mutex},
    };

    use tracing::{error, info, warn};
    use tracing_subscriber::{Registry, layer::SubscriberExt};

    use super::console_log;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn console_shows_only_warnings_and_errors() -> Result<(), anyhow::Error> {
        let buffer = SharedBuffer::default();
        let writer = buffer.clone();
        let subscriber = Registry::default().with(console_log(move || writer.clone()));

        tracing::subscriber::with_default(subscriber, || {
            info!("got 3 snapped points");
            warn!("No snapped points found");
            error!("error fetching data from the Roads API: HTTP status client error (403 Forbidden)");
        });

        let console = String::from_utf8(buffer.0.lock().unwrap().clone())?;
        assert!(console.contains("No snapped points found"));
        assert!(console.contains("error fetching data from the Roads API"));
        assert!(!console.contains("got 3 snapped points"));

        Ok(())
    }
}
