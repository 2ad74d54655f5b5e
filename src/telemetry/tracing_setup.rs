//! OpenTelemetry tracing setup

/// Initialize OpenTelemetry tracing
pub fn init_tracing(otlp_endpoint: &str) -> anyhow::Result<()> {
    // TODO: Set up OpenTelemetry with OTLP exporter
    tracing::info!(endpoint = otlp_endpoint, "OpenTelemetry tracing configured");
    Ok(())
}
