use std::time::Duration;

use opentelemetry::KeyValue;
use tracing::{field::Empty, info_span, Span};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::{
    context::{FieldContext, OperationContext},
    response::GraphQLError,
    traces::spans::{attributes, TARGET_NAME},
};

/// Root span of an operation, named `<type> <name>`.
#[derive(Clone, Debug)]
pub struct GraphQLOperationSpan {
    pub span: Span,
}

impl std::ops::Deref for GraphQLOperationSpan {
    type Target = Span;
    fn deref(&self) -> &Self::Target {
        &self.span
    }
}

impl GraphQLOperationSpan {
    pub fn new(parent: &Span, operation: &OperationContext) -> Self {
        let operation_type: &'static str = operation.operation_type().into();
        let operation_name = operation.operation_name();
        let span_name = format!("{} {}", operation_type, operation_name);
        let span = info_span!(
            target: TARGET_NAME,
            parent: parent,
            "graphql.operation",
            "otel.name" = span_name.as_str(),
            "otel.kind" = "Server",
            "otel.status_code" = Empty,
            "graphql.operation.type" = operation_type,
            "graphql.operation.name" = operation_name,
        );
        GraphQLOperationSpan { span }
    }
}

/// Child span of a single resolver invocation, named `<object>.<field>`.
#[derive(Clone, Debug)]
pub struct GraphQLFieldSpan {
    pub span: Span,
}

impl std::ops::Deref for GraphQLFieldSpan {
    type Target = Span;
    fn deref(&self) -> &Self::Target {
        &self.span
    }
}

impl GraphQLFieldSpan {
    pub fn new(parent: &Span, field: &FieldContext) -> Self {
        let span_name = format!("{}.{}", field.object, field.field);
        let span = info_span!(
            target: TARGET_NAME,
            parent: parent,
            "graphql.field",
            "otel.name" = span_name.as_str(),
            "otel.kind" = "Internal",
            "otel.status_code" = Empty,
            "graphql.field.object" = field.object.as_str(),
            "graphql.field.name" = field.field.as_str(),
            "graphql.field.duration_ms" = Empty,
            "graphql.field.error" = Empty,
            "error.message" = Empty,
        );
        GraphQLFieldSpan { span }
    }

    /// Records the elapsed time in whole milliseconds.
    pub fn record_duration(&self, elapsed: Duration) {
        let millis = i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX);
        self.span.record("graphql.field.duration_ms", millis);
    }

    pub fn record_error(&self, error: &(dyn std::error::Error + Send + Sync)) {
        self.span.record("error.message", error.to_string().as_str());
        self.span.record("graphql.field.error", true);
        self.span.record("otel.status_code", "Error");
    }
}

pub trait RecordGraphQLErrors {
    fn span(&self) -> &Span;

    /// Sets the error count and adds one `graphql.error.<index>` event per error, in order.
    /// An empty list records nothing. So does a span that no subscriber created.
    fn record_graphql_errors(&self, errors: &[GraphQLError]) {
        let span = self.span();
        if errors.is_empty() || span.is_disabled() {
            return;
        }

        let count = i64::try_from(errors.len()).unwrap_or(i64::MAX);
        span.set_attribute(attributes::GRAPHQL_ERRORS_COUNT, count);

        for (index, error) in errors.iter().enumerate() {
            span.add_event(
                format!("{}.{}", attributes::GRAPHQL_ERROR_EVENT_PREFIX, index),
                vec![
                    KeyValue::new(attributes::ERROR_MESSAGE, error.message.clone()),
                    KeyValue::new(attributes::ERROR_PATH, error.path_string()),
                ],
            );
        }
    }
}

impl RecordGraphQLErrors for Span {
    fn span(&self) -> &Span {
        self
    }
}

// Implement RecordGraphQLErrors for the span wrappers, using a macro
// to reduce boilerplate.
macro_rules! impl_record_graphql_errors {
    ($($span_type:ty),*) => {
        $(
            impl RecordGraphQLErrors for $span_type {
                fn span(&self) -> &Span {
                    &self.span
                }
            }
        )*
    };
}

impl_record_graphql_errors!(GraphQLOperationSpan, GraphQLFieldSpan);
