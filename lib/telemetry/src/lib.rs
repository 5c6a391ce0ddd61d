//! Tracing of GraphQL operation execution.
//!
//! [`OtelTracer`] is an [`ExecutionInterceptor`] that opens one server span per operation and
//! one internal span per resolver invocation, and records response errors on the operation
//! span. Spans are plain `tracing` spans exported to OpenTelemetry by the layer that
//! [`build_otel_layer_from_config`] builds.
use gql_gateway_config::GatewayConfig;
use opentelemetry::{
    global::set_tracer_provider, trace::TracerProvider, InstrumentationScope, KeyValue,
};
use opentelemetry_sdk::{trace::SdkTracerProvider, Resource};
use tracing::{level_filters::LevelFilter, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::{filter_fn, Targets},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    Layer, Registry,
};

use crate::{logging::INTERNAL_LOGGER_TARGET, traces::build_trace_provider};

pub mod context;
mod error;
pub mod logging;
pub mod pipeline;
pub mod response;
pub mod traces;
mod utils;

pub use context::{FieldContext, OperationContext, OperationType, RequestContext};
pub use error::TelemetryError;
pub use pipeline::{
    BoxError, ExecutionInterceptor, ExecutionPipeline, OperationHandler, Resolver,
    ResolverResult, ResponseHandler,
};
pub use response::{GraphQLError, PathSegment, Response};
pub use traces::interceptor::OtelTracer;

/// Builds the layer exporting spans to the configured collector, with the provider behind it.
/// Returns `None` when no collector is configured.
pub fn build_otel_layer_from_config<S>(
    config: &GatewayConfig,
) -> Result<Option<(impl Layer<S> + Send + Sync + 'static, SdkTracerProvider)>, TelemetryError>
where
    S: Subscriber + for<'span> LookupSpan<'span> + Send + Sync + 'static,
{
    let collector = match &config.telemetry.collector {
        Some(collector) => collector,
        None => return Ok(None),
    };

    let resource = Resource::builder()
        .with_attributes([KeyValue::new("service.name", config.service_name.clone())])
        .build();

    let traces_provider = build_trace_provider(&config.telemetry, collector, resource)?;

    let scope = InstrumentationScope::builder("gql-gateway")
        .with_version(env!("CARGO_PKG_VERSION"))
        .build();

    let tracer = traces_provider.tracer_with_scope(scope);
    let target_filter = Targets::new()
        .with_target(INTERNAL_LOGGER_TARGET, LevelFilter::OFF)
        .with_default(LevelFilter::INFO);

    let traces_layer = tracing_opentelemetry::layer()
        .with_tracer(tracer)
        .with_tracked_inactivity(false)
        .with_location(false)
        .with_threads(false)
        .with_filter(target_filter)
        // Drop events from tracing macros (info!, error!, etc.),
        // but accept those from span.add_event()
        .with_filter(filter_fn(|metadata| metadata.is_span()));

    Ok(Some((traces_layer, traces_provider)))
}

/// Keeps the log writers and the trace provider alive. Dropping it flushes buffered log lines
/// and exports the spans that are still queued.
pub struct TelemetryGuard {
    tracer_provider: Option<SdkTracerProvider>,
    _log_guards: Vec<WorkerGuard>,
}

impl TelemetryGuard {
    pub fn is_tracing_enabled(&self) -> bool {
        self.tracer_provider.is_some()
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.tracer_provider.take() {
            if let Err(err) = provider.shutdown() {
                tracing::warn!(
                    target: INTERNAL_LOGGER_TARGET,
                    error = %err,
                    "failed to shut down the trace provider"
                );
            }
        }
    }
}

/// Installs the global subscriber: log layers per `config.log` plus span export when a
/// collector is configured.
pub fn init(config: &GatewayConfig) -> Result<TelemetryGuard, TelemetryError> {
    let otel = build_otel_layer_from_config::<Registry>(config)?;
    let (log_layers, log_guards) = logging::logging_layers_from_config(&config.log)?;

    let tracer_provider = otel.as_ref().map(|(_, provider)| provider.clone());
    if let Some(provider) = &tracer_provider {
        set_tracer_provider(provider.clone());
    }

    tracing_subscriber::registry()
        .with(otel.map(|(layer, _)| layer))
        .with(log_layers)
        .try_init()
        .map_err(|e| TelemetryError::SubscriberSetup(e.to_string()))?;

    tracing::info!(
        target: INTERNAL_LOGGER_TARGET,
        service_name = %config.service_name,
        tracing_enabled = tracer_provider.is_some(),
        "telemetry initialized"
    );

    Ok(TelemetryGuard {
        tracer_provider,
        _log_guards: log_guards,
    })
}
