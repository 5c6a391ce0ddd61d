//! Per-request state handed down the execution pipeline.
//!
//! There is no global registry of "current" spans: every hook receives a [`RequestContext`]
//! and derives the context it gives to its continuation. The span stored in a context is
//! only ever read (to parent children or to annotate it), never swapped out in place.
use std::sync::Arc;

use tracing::Span;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    strum::Display,
    strum::AsRefStr,
    strum::IntoStaticStr,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum OperationType {
    #[default]
    Query,
    Mutation,
    Subscription,
}

pub const ANONYMOUS_OPERATION_NAME: &str = "anonymous";

/// Metadata of the parsed operation, fixed for the whole request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationContext {
    pub operation_type: Option<OperationType>,
    pub operation_name: Option<String>,
}

impl OperationContext {
    pub fn new(operation_type: OperationType, operation_name: Option<&str>) -> Self {
        OperationContext {
            operation_type: Some(operation_type),
            operation_name: operation_name.map(str::to_string),
        }
    }

    /// Falls back to `query` when the document did not say.
    pub fn operation_type(&self) -> OperationType {
        self.operation_type.unwrap_or_default()
    }

    /// Falls back to `anonymous` when the client did not name the operation.
    pub fn operation_name(&self) -> &str {
        match self.operation_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => ANONYMOUS_OPERATION_NAME,
        }
    }
}

/// Metadata of a single resolver invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldContext {
    /// Name of the object type that owns the field.
    pub object: String,
    pub field: String,
    /// `true` when the value comes from resolver logic, `false` for plain property access.
    pub is_resolver: bool,
}

impl FieldContext {
    pub fn resolver(object: impl Into<String>, field: impl Into<String>) -> Self {
        FieldContext {
            object: object.into(),
            field: field.into(),
            is_resolver: true,
        }
    }

    pub fn property(object: impl Into<String>, field: impl Into<String>) -> Self {
        FieldContext {
            object: object.into(),
            field: field.into(),
            is_resolver: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    operation: Arc<OperationContext>,
    field: Option<Arc<FieldContext>>,
    span: Span,
}

impl RequestContext {
    /// A context with no active span.
    pub fn new(operation: OperationContext) -> Self {
        RequestContext {
            operation: Arc::new(operation),
            field: None,
            span: Span::none(),
        }
    }

    pub fn operation(&self) -> &OperationContext {
        &self.operation
    }

    pub fn field(&self) -> Option<&FieldContext> {
        self.field.as_deref()
    }

    /// The span new children are attached to and response annotations land on.
    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn with_span(&self, span: Span) -> Self {
        RequestContext {
            operation: self.operation.clone(),
            field: self.field.clone(),
            span,
        }
    }

    pub fn with_field(&self, field: FieldContext) -> Self {
        RequestContext {
            operation: self.operation.clone(),
            field: Some(Arc::new(field)),
            span: self.span.clone(),
        }
    }
}
