//! The extension points of operation execution.
//!
//! An executor hands each hook a continuation (`next`). Interceptors wrap the continuation
//! and must call it at most once; the boxed `FnOnce` handler types enforce that.
use std::error::Error;

use crate::{context::RequestContext, response::Response};

pub type BoxError = Box<dyn Error + Send + Sync>;

pub type ResolverResult = Result<serde_json::Value, BoxError>;

/// Produces the response of an operation. Invoked at most once.
pub type ResponseHandler<'exec> = Box<dyn FnOnce(&RequestContext) -> Response + Send + 'exec>;

/// Prepares an operation and returns the handler that will produce its response.
pub type OperationHandler<'exec> =
    Box<dyn FnOnce(&RequestContext) -> ResponseHandler<'exec> + Send + 'exec>;

/// Resolves the value of a single field.
pub type Resolver<'exec> = Box<dyn FnOnce(&RequestContext) -> ResolverResult + Send + 'exec>;

pub trait ExecutionInterceptor: Send + Sync {
    fn extension_name(&self) -> &'static str;

    fn intercept_operation<'exec>(
        &'exec self,
        ctx: &RequestContext,
        next: OperationHandler<'exec>,
    ) -> ResponseHandler<'exec> {
        next(ctx)
    }

    fn intercept_field<'exec>(
        &'exec self,
        ctx: &RequestContext,
        next: Resolver<'exec>,
    ) -> ResolverResult {
        next(ctx)
    }

    fn intercept_response<'exec>(
        &'exec self,
        ctx: &RequestContext,
        next: ResponseHandler<'exec>,
    ) -> Response {
        next(ctx)
    }
}

pub type ExecutionInterceptorBoxed = Box<dyn ExecutionInterceptor>;

/// An ordered set of interceptors. The first registered interceptor is the outermost one.
#[derive(Default)]
pub struct ExecutionPipeline {
    interceptors: Vec<ExecutionInterceptorBoxed>,
}

impl ExecutionPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interceptor(mut self, interceptor: impl ExecutionInterceptor + 'static) -> Self {
        tracing::debug!(
            extension = interceptor.extension_name(),
            "registered execution interceptor"
        );
        self.interceptors.push(Box::new(interceptor));
        self
    }

    pub fn extension_names(&self) -> Vec<&'static str> {
        self.interceptors
            .iter()
            .map(|interceptor| interceptor.extension_name())
            .collect()
    }

    /// Runs `operation` through every operation interceptor. The returned handler passes the
    /// response through every response interceptor.
    pub fn execute<'exec>(
        &'exec self,
        ctx: &RequestContext,
        operation: OperationHandler<'exec>,
    ) -> ResponseHandler<'exec> {
        let innermost: OperationHandler<'exec> = Box::new(move |ctx: &RequestContext| {
            let response_handler = operation(ctx);
            self.wrap_response(response_handler)
        });

        let wrapped = self
            .interceptors
            .iter()
            .rev()
            .fold(innermost, |next, interceptor| {
                Box::new(move |ctx: &RequestContext| interceptor.intercept_operation(ctx, next))
                    as OperationHandler<'exec>
            });

        wrapped(ctx)
    }

    /// Runs `resolver` through every field interceptor.
    pub fn resolve_field<'exec>(
        &'exec self,
        ctx: &RequestContext,
        resolver: Resolver<'exec>,
    ) -> ResolverResult {
        let wrapped = self
            .interceptors
            .iter()
            .rev()
            .fold(resolver, |next, interceptor| {
                Box::new(move |ctx: &RequestContext| interceptor.intercept_field(ctx, next))
                    as Resolver<'exec>
            });

        wrapped(ctx)
    }

    fn wrap_response<'exec>(&'exec self, handler: ResponseHandler<'exec>) -> ResponseHandler<'exec> {
        self.interceptors
            .iter()
            .rev()
            .fold(handler, |next, interceptor| {
                Box::new(move |ctx: &RequestContext| interceptor.intercept_response(ctx, next))
                    as ResponseHandler<'exec>
            })
    }
}
