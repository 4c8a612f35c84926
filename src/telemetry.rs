use opentelemetry::trace::{TraceId, TracerProvider as _};
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::{prelude::*, EnvFilter, Registry};

///  Fetch an opentelemetry::trace::TraceId as hex through the full tracing stack
pub fn get_trace_id() -> TraceId {
    use opentelemetry::trace::TraceContextExt as _; // opentelemetry::Context -> opentelemetry::trace::Span
    use tracing_opentelemetry::OpenTelemetrySpanExt as _; // tracing::Span to opentelemetry::Context

    tracing::Span::current()
        .context()
        .span()
        .span_context()
        .trace_id()
}

/// Flushes pending spans when the run ends.
pub struct Telemetry {
    provider: SdkTracerProvider,
}

impl Drop for Telemetry {
    fn drop(&mut self) {
        if let Err(e) = self.provider.shutdown() {
            eprintln!("Failed to flush traces: {e}");
        }
    }
}

fn tracer_provider() -> SdkTracerProvider {
    let builder = SdkTracerProvider::builder();

    #[cfg(feature = "telemetry")]
    let builder = match opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()
    {
        Ok(exporter) => builder.with_batch_exporter(exporter),
        Err(e) => {
            eprintln!("Trace export disabled: {e}");
            builder
        }
    };

    builder.build()
}

/// Initialize tracing
///
/// Logs go to stderr, filtered by `RUST_LOG` (default `info`).
pub fn init() -> Telemetry {
    let provider = tracer_provider();

    // Setup tracing layers
    let telemetry =
        tracing_opentelemetry::layer().with_tracer(provider.tracer("custom-ca-manager"));
    let logger = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let collector = Registry::default()
        .with(telemetry)
        .with(logger)
        .with(env_filter);

    if let Err(e) = tracing::subscriber::set_global_default(collector) {
        eprintln!("Tracing already initialized: {e}");
    }

    Telemetry { provider }
}
