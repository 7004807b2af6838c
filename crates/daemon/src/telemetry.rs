//! Telemetry setup for OpenTelemetry integration

use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

const ENDPOINT_VAR: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

/// OpenTelemetry layer, if configured and compiled in
///
/// # Environment Variables
///
/// - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (e.g., http://localhost:4317)
/// - `OTEL_SERVICE_NAME`: Service name (default: jumpqueued)
pub fn layer<S>() -> Option<Box<dyn Layer<S> + Send + Sync>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let endpoint = std::env::var(ENDPOINT_VAR).ok()?;

    // The subscriber is not installed yet, so failures go to stderr
    #[cfg(feature = "telemetry")]
    return match otel_layer(&endpoint) {
        Ok(layer) => Some(layer),
        Err(e) => {
            eprintln!("Failed to initialize OpenTelemetry (continuing without it): {e}");
            None
        }
    };

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = endpoint;
        None
    }
}

/// Log what `layer` decided, once the subscriber is installed
pub fn report_status() {
    if std::env::var(ENDPOINT_VAR).is_err() {
        tracing::debug!("OpenTelemetry not configured ({} not set)", ENDPOINT_VAR);
    } else if cfg!(feature = "telemetry") {
        tracing::info!("OpenTelemetry export enabled");
    } else {
        tracing::warn!("OpenTelemetry endpoint set but feature 'telemetry' not enabled");
        tracing::warn!("Rebuild with: cargo build --features telemetry");
    }
}

#[cfg(feature = "telemetry")]
fn otel_layer<S>(endpoint: &str) -> anyhow::Result<Box<dyn Layer<S> + Send + Sync>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::TracerProvider;

    let service_name =
        std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "jumpqueued".to_string());

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .build();
    let tracer = provider.tracer(service_name);
    opentelemetry::global::set_tracer_provider(provider);

    Ok(tracing_opentelemetry::layer().with_tracer(tracer).boxed())
}
