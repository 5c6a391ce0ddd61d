use gql_gateway_config::telemetry::{
    BatchProcessorConfig, CollectorConfig, OtlpProtocol, TelemetryConfig,
};
use opentelemetry_otlp::{
    Protocol, SpanExporter, WithExportConfig, WithHttpConfig, WithTonicConfig,
};
use opentelemetry_sdk::{
    trace::{self, BatchConfigBuilder, BatchSpanProcessor, Sampler, SdkTracerProvider},
    Resource,
};
use tracing::debug;

use crate::{error::TelemetryError, logging::INTERNAL_LOGGER_TARGET, utils::build_metadata};

pub mod interceptor;
pub mod spans;


pub(super) fn build_trace_provider(
    config: &TelemetryConfig,
    collector: &CollectorConfig,
    resource: Resource,
) -> Result<SdkTracerProvider, TelemetryError> {
    let base_sampler = Sampler::TraceIdRatioBased(config.collect.sampling);
    let mut builder = SdkTracerProvider::builder();

    if config.collect.parent_based_sampler {
        builder = builder.with_sampler(Sampler::ParentBased(Box::new(base_sampler)));
    } else {
        builder = builder.with_sampler(base_sampler);
    }

    let span_exporter = build_span_exporter(collector)?;

    Ok(builder
        .with_max_events_per_span(config.collect.max_events_per_span)
        .with_max_attributes_per_span(config.collect.max_attributes_per_span)
        .with_max_attributes_per_event(config.collect.max_attributes_per_event)
        .with_resource(resource)
        .with_span_processor(build_batched_span_processor(
            &collector.batch_processor,
            span_exporter,
        ))
        .build())
}

fn build_span_exporter(collector: &CollectorConfig) -> Result<SpanExporter, TelemetryError> {
    let endpoint = collector.url();
    debug!(
        target: INTERNAL_LOGGER_TARGET,
        endpoint = %endpoint,
        protocol = collector.protocol.as_str(),
        "setting up OTLP span exporter"
    );

    match collector.protocol {
        OtlpProtocol::Grpc => SpanExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint)
            .with_timeout(collector.batch_processor.max_export_timeout)
            .with_metadata(build_metadata(&collector.headers)?)
            .build()
            .map_err(|e| TelemetryError::SpanExporterSetup(e.to_string())),
        OtlpProtocol::Http => SpanExporter::builder()
            .with_http()
            .with_endpoint(endpoint)
            .with_timeout(collector.batch_processor.max_export_timeout)
            .with_headers(collector.headers.clone())
            .with_protocol(Protocol::HttpBinary)
            .build()
            .map_err(|e| TelemetryError::SpanExporterSetup(e.to_string())),
    }
}

fn build_batched_span_processor(
    config: &BatchProcessorConfig,
    exporter: impl trace::SpanExporter + 'static,
) -> BatchSpanProcessor {
    BatchSpanProcessor::builder(exporter)
        .with_batch_config(
            BatchConfigBuilder::default()
                .with_max_export_batch_size(config.max_export_batch_size as usize)
                .with_max_queue_size(config.max_queue_size as usize)
                .with_scheduled_delay(config.scheduled_delay)
                .build(),
        )
        .build()
}
