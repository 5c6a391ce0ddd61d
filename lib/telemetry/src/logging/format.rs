use std::fmt::{self, Write as _};

use gql_gateway_config::log::{LogFormat, LoggingConfig};
use opentelemetry::trace::{SpanId, TraceId};
use tracing::{Event, Subscriber};
use tracing_opentelemetry::OtelData;
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields},
    registry::LookupSpan,
};

/// Event format that puts the service name and the IDs of the active span in front of
/// what `inner` writes.
///
/// JSON lines get `service`, `trace_id` and `span_id` keys. Text lines get a
/// `[service] trace_id=.. span_id=..` prefix.
pub struct TraceContextFormat<F> {
    inner: F,
    format: LogFormat,
    service_name: Option<String>,
    enable_trace: bool,
}

impl<F> TraceContextFormat<F> {
    pub fn new(inner: F, config: &LoggingConfig) -> Self {
        TraceContextFormat {
            inner,
            format: config.format,
            service_name: config.service_name.clone(),
            enable_trace: config.enable_trace,
        }
    }
}

impl<S, N, F> FormatEvent<S, N> for TraceContextFormat<F>
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    N: for<'writer> FormatFields<'writer> + 'static,
    F: FormatEvent<S, N>,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let trace_ids = if self.enable_trace {
            active_trace_ids(ctx, event)
        } else {
            None
        };

        if self.service_name.is_none() && trace_ids.is_none() {
            return self.inner.format_event(ctx, writer, event);
        }

        match self.format {
            LogFormat::Json => {
                let mut line = String::new();
                self.inner.format_event(ctx, Writer::new(&mut line), event)?;
                let Some(rest) = line.strip_prefix('{') else {
                    return writer.write_str(&line);
                };

                writer.write_char('{')?;
                if let Some(service_name) = &self.service_name {
                    let quoted = serde_json::to_string(service_name).map_err(|_| fmt::Error)?;
                    write!(writer, "\"service\":{},", quoted)?;
                }
                if let Some((trace_id, span_id)) = trace_ids {
                    write!(
                        writer,
                        "\"trace_id\":\"{}\",\"span_id\":\"{}\",",
                        trace_id, span_id
                    )?;
                }
                writer.write_str(rest)
            }
            LogFormat::Text => {
                if let Some(service_name) = &self.service_name {
                    write!(writer, "[{}] ", service_name)?;
                }
                if let Some((trace_id, span_id)) = trace_ids {
                    write!(writer, "trace_id={} span_id={} ", trace_id, span_id)?;
                }
                self.inner.format_event(ctx, writer, event)
            }
        }
    }
}

/// IDs of the span the event belongs to, as known to the OpenTelemetry layer.
/// `None` when that layer is not installed or the span was never entered.
fn active_trace_ids<S, N>(
    ctx: &FmtContext<'_, S, N>,
    event: &Event<'_>,
) -> Option<(TraceId, SpanId)>
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    let span = event
        .parent()
        .and_then(|id| ctx.span(id))
        .or_else(|| ctx.lookup_current())?;
    let extensions = span.extensions();
    let otel_data = extensions.get::<OtelData>()?;
    let trace_id = otel_data.trace_id()?;
    let span_id = otel_data.span_id()?;

    (trace_id != TraceId::INVALID).then_some((trace_id, span_id))
}
