use std::io::IsTerminal;

use gql_gateway_config::log::{LogFormat, LoggingConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{format::JsonFields, time::UtcTime, MakeWriter},
    Layer,
};

use crate::{
    error::TelemetryError,
    logging::{
        format::TraceContextFormat,
        utils::{create_env_filter, DynLayer},
    },
};

pub fn build_stdout_layer<S>(
    config: &LoggingConfig,
) -> Result<(DynLayer<S>, WorkerGuard), TelemetryError>
where
    S: tracing::Subscriber
        + for<'span> tracing_subscriber::registry::LookupSpan<'span>
        + Send
        + Sync,
{
    let stdout_stream = std::io::stdout();
    let is_terminal = stdout_stream.is_terminal();
    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(stdout_stream);
    let layer = build_fmt_layer(config, stdout_writer, is_terminal)?;

    Ok((layer, stdout_guard))
}

/// The log layer for `config`, writing through `make_writer`.
pub(crate) fn build_fmt_layer<S, W>(
    config: &LoggingConfig,
    make_writer: W,
    ansi: bool,
) -> Result<DynLayer<S>, TelemetryError>
where
    S: tracing::Subscriber
        + for<'span> tracing_subscriber::registry::LookupSpan<'span>
        + Send
        + Sync,
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let filter = create_env_filter(config)?;
    let timer = UtcTime::rfc_3339();

    let layer = match config.format {
        LogFormat::Json => {
            let format = tracing_subscriber::fmt::format()
                .json()
                .with_timer(timer)
                .with_thread_ids(false)
                .with_target(false)
                .with_file(config.add_source)
                .with_line_number(config.add_source)
                .with_current_span(config.with_span_context)
                .with_span_list(false)
                .flatten_event(true);

            tracing_subscriber::fmt::layer()
                .fmt_fields(JsonFields::new())
                .event_format(TraceContextFormat::new(format, config))
                .with_writer(make_writer)
                .with_filter(filter)
                .boxed()
        }
        LogFormat::Text => {
            let format = tracing_subscriber::fmt::format()
                .compact()
                .with_timer(timer)
                .with_thread_ids(false)
                .with_target(false)
                .with_file(config.add_source)
                .with_line_number(config.add_source);

            tracing_subscriber::fmt::layer()
                .event_format(TraceContextFormat::new(format, config))
                .with_writer(make_writer)
                .with_ansi(ansi)
                .with_filter(filter)
                .boxed()
        }
    };

    Ok(layer)
}
