use std::time::Instant;

use crate::{
    context::RequestContext,
    pipeline::{
        ExecutionInterceptor, OperationHandler, Resolver, ResolverResult, ResponseHandler,
    },
    response::Response,
    traces::spans::graphql::{GraphQLFieldSpan, GraphQLOperationSpan, RecordGraphQLErrors},
};

pub const EXTENSION_NAME: &str = "OpenTelemetryTracer";

/// Traces operation execution: one server span per operation, one internal child span per
/// resolver invocation, and the response errors recorded on the operation span.
///
/// Without a tracing subscriber nothing is exported and requests pass through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct OtelTracer;

impl OtelTracer {
    pub fn new() -> Self {
        OtelTracer
    }
}

impl ExecutionInterceptor for OtelTracer {
    fn extension_name(&self) -> &'static str {
        EXTENSION_NAME
    }

    fn intercept_operation<'exec>(
        &'exec self,
        ctx: &RequestContext,
        next: OperationHandler<'exec>,
    ) -> ResponseHandler<'exec> {
        let operation_span = GraphQLOperationSpan::new(ctx.span(), ctx.operation());
        let operation_ctx = ctx.with_span(operation_span.span.clone());
        let inner = operation_span.in_scope(|| next(&operation_ctx));

        // The span is owned by the returned handler and closes when the handler is
        // consumed or dropped.
        Box::new(move |ctx: &RequestContext| {
            let operation_ctx = ctx.with_span(operation_span.span.clone());
            operation_span.in_scope(|| inner(&operation_ctx))
        })
    }

    fn intercept_field<'exec>(
        &'exec self,
        ctx: &RequestContext,
        next: Resolver<'exec>,
    ) -> ResolverResult {
        let field = match ctx.field() {
            Some(field) if field.is_resolver => field,
            _ => return next(ctx),
        };

        let field_span = GraphQLFieldSpan::new(ctx.span(), field);
        let field_ctx = ctx.with_span(field_span.span.clone());

        let started_at = Instant::now();
        let result = field_span.in_scope(|| next(&field_ctx));
        field_span.record_duration(started_at.elapsed());

        if let Err(err) = &result {
            field_span.record_error(err.as_ref());
        }

        result
    }

    fn intercept_response<'exec>(
        &'exec self,
        ctx: &RequestContext,
        next: ResponseHandler<'exec>,
    ) -> Response {
        let response = next(ctx);
        ctx.span().record_graphql_errors(&response.errors);
        response
    }
}
