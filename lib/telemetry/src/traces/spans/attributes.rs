/// OpenTelemetry span fields interpreted by `tracing-opentelemetry`
pub const OTEL_NAME: &str = "otel.name";
pub const OTEL_KIND: &str = "otel.kind";
pub const OTEL_STATUS_CODE: &str = "otel.status_code";

/// OpenTelemetry standard attributes for errors
pub const ERROR_MESSAGE: &str = "error.message";
pub const ERROR_PATH: &str = "error.path";

/// GraphQL operation attributes
pub const GRAPHQL_OPERATION_TYPE: &str = "graphql.operation.type";
pub const GRAPHQL_OPERATION_NAME: &str = "graphql.operation.name";
pub const GRAPHQL_ERRORS_COUNT: &str = "graphql.errors.count";
/// Prefix of the per-error events, suffixed with the error's position in the response.
pub const GRAPHQL_ERROR_EVENT_PREFIX: &str = "graphql.error";

/// GraphQL field attributes
pub const GRAPHQL_FIELD_OBJECT: &str = "graphql.field.object";
pub const GRAPHQL_FIELD_NAME: &str = "graphql.field.name";
pub const GRAPHQL_FIELD_DURATION_MS: &str = "graphql.field.duration_ms";
pub const GRAPHQL_FIELD_ERROR: &str = "graphql.field.error";
