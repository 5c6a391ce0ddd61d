#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("unable to configure span exporter: {0}")]
    SpanExporterSetup(String),
    #[error("invalid log filter {0}")]
    InvalidLogFilter(String),
    #[error("unable to install the tracing subscriber: {0}")]
    SubscriberSetup(String),
}
