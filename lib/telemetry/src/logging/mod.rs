pub mod format;
pub mod stdout;
pub mod utils;

use gql_gateway_config::log::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;

use crate::{
    error::TelemetryError,
    logging::{stdout::build_stdout_layer, utils::DynLayer},
};

/// Target of the crate's own setup logs. Those never end up in exported traces.
pub const INTERNAL_LOGGER_TARGET: &str = "gql-gateway-internal";

/// Builds the log layers for `config`. The returned guards flush buffered lines when dropped,
/// so the caller keeps them alive for as long as it logs.
pub fn logging_layers_from_config<S>(
    config: &LoggingConfig,
) -> Result<(Vec<DynLayer<S>>, Vec<WorkerGuard>), TelemetryError>
where
    S: tracing::Subscriber
        + for<'span> tracing_subscriber::registry::LookupSpan<'span>
        + Send
        + Sync,
{
    let (layer, guard) = build_stdout_layer(config)?;

    Ok((vec![layer], vec![guard]))
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use gql_gateway_config::log::{LogFormat, LogLevel, LoggingConfig};
    use opentelemetry::trace::TracerProvider;
    use opentelemetry_sdk::trace::{
        InMemorySpanExporter, InMemorySpanExporterBuilder, SdkTracerProvider, SimpleSpanProcessor,
    };
    use tracing_subscriber::{layer::SubscriberExt, Registry};

    use super::*;
    use crate::logging::stdout::build_fmt_layer;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn lines(&self) -> Vec<String> {
            let buffer = self.0.lock().expect("captured logs lock");
            String::from_utf8_lossy(&buffer)
                .lines()
                .map(str::to_string)
                .collect()
        }

        fn json_lines(&self) -> Vec<serde_json::Value> {
            self.lines()
                .iter()
                .map(|line| serde_json::from_str(line).expect("log line is json"))
                .collect()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("captured logs lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn correlated_config(format: LogFormat) -> LoggingConfig {
        LoggingConfig {
            level: LogLevel::Info,
            format,
            service_name: Some("orders".to_string()),
            enable_trace: true,
            ..Default::default()
        }
    }

    fn setup_span_export() -> (SdkTracerProvider, InMemorySpanExporter) {
        let exporter = InMemorySpanExporterBuilder::new().build();
        let provider = SdkTracerProvider::builder()
            .with_span_processor(SimpleSpanProcessor::new(exporter.clone()))
            .build();

        (provider, exporter)
    }

    /// Logs one line inside an exported span and one outside of it.
    fn log_with_span_export(
        config: &LoggingConfig,
        provider: &SdkTracerProvider,
        captured: &CapturedLogs,
    ) {
        let writer = captured.clone();
        let log_layer = build_fmt_layer::<Registry, _>(config, move || writer.clone(), false)
            .expect("valid config");
        let subscriber = tracing_subscriber::registry()
            .with(log_layer)
            .with(tracing_opentelemetry::layer().with_tracer(provider.tracer("logging-tests")));

        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("graphql.operation");
            span.in_scope(|| tracing::info!(order_id = 7, "order placed"));
            tracing::info!("outside any span");
        });
    }

    #[test]
    fn builds_one_layer_per_format() {
        for format in [LogFormat::Json, LogFormat::Text] {
            let config = LoggingConfig {
                format,
                ..Default::default()
            };
            let (layers, guards) =
                logging_layers_from_config::<Registry>(&config).expect("valid config");

            assert_eq!(layers.len(), 1);
            assert_eq!(guards.len(), 1);
        }
    }

    #[test]
    fn rejects_invalid_filter() {
        let config = LoggingConfig {
            filter: Some("gql-gateway=loud".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            logging_layers_from_config::<Registry>(&config),
            Err(TelemetryError::InvalidLogFilter(_))
        ));
    }

    #[test]
    fn json_lines_carry_service_and_trace_ids() {
        let (provider, exporter) = setup_span_export();
        let captured = CapturedLogs::default();
        log_with_span_export(&correlated_config(LogFormat::Json), &provider, &captured);

        provider.force_flush().expect("flush spans");
        let spans = exporter.get_finished_spans().expect("finished spans");
        assert_eq!(spans.len(), 1);

        let lines = captured.json_lines();
        assert_eq!(lines.len(), 2);

        let inside = &lines[0];
        assert_eq!(inside["service"], "orders");
        assert_eq!(inside["message"], "order placed");
        assert_eq!(inside["order_id"], 7);
        assert_eq!(
            inside["trace_id"],
            spans[0].span_context.trace_id().to_string()
        );
        assert_eq!(inside["span_id"], spans[0].span_context.span_id().to_string());

        let outside = &lines[1];
        assert_eq!(outside["service"], "orders");
        assert!(outside.get("trace_id").is_none());
        assert!(outside.get("span_id").is_none());
    }

    #[test]
    fn text_lines_are_prefixed_with_service_and_trace_ids() {
        let (provider, exporter) = setup_span_export();
        let captured = CapturedLogs::default();
        log_with_span_export(&correlated_config(LogFormat::Text), &provider, &captured);

        provider.force_flush().expect("flush spans");
        let spans = exporter.get_finished_spans().expect("finished spans");
        let span_context = &spans[0].span_context;

        let lines = captured.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(&format!(
            "[orders] trace_id={} span_id={} ",
            span_context.trace_id(),
            span_context.span_id()
        )));
        assert!(lines[0].contains("order placed"));
        assert!(lines[1].starts_with("[orders] "));
        assert!(!lines[1].contains("trace_id="));
    }

    #[test]
    fn trace_ids_stay_off_unless_enabled() {
        let (provider, _exporter) = setup_span_export();
        let captured = CapturedLogs::default();
        let config = LoggingConfig {
            level: LogLevel::Info,
            format: LogFormat::Json,
            ..Default::default()
        };
        log_with_span_export(&config, &provider, &captured);

        for line in captured.json_lines() {
            assert!(line.get("service").is_none());
            assert!(line.get("trace_id").is_none());
        }
    }
}
