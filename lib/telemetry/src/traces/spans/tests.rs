use super::attributes;
use super::graphql::{GraphQLFieldSpan, GraphQLOperationSpan, RecordGraphQLErrors};
use crate::context::{FieldContext, OperationContext, OperationType};
use crate::pipeline::BoxError;
use crate::response::GraphQLError;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::field::{Field, Visit};
use tracing::subscriber::with_default;
use tracing::Span;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Registry;

#[derive(Clone, Default)]
struct RecordingLayer {
    fields: Arc<Mutex<HashMap<u64, BTreeMap<String, String>>>>,
}

impl RecordingLayer {
    fn value(&self, id: u64, key: &str) -> Option<String> {
        self.fields
            .lock()
            .expect("recording layer lock")
            .get(&id)
            .and_then(|fields| fields.get(key).cloned())
    }

    fn assert_recorded_value(&self, span: &Span, key: &str, expected: &str) {
        let id = span.id().expect("span id").into_u64();
        assert_eq!(self.value(id, key).as_deref(), Some(expected), "field '{}'", key);
    }

    fn assert_not_recorded(&self, span: &Span, key: &str) {
        let id = span.id().expect("span id").into_u64();
        assert_eq!(self.value(id, key), None, "field '{}'", key);
    }
}

#[derive(Default)]
struct FieldVisitor {
    fields: BTreeMap<String, String>,
}

impl FieldVisitor {
    fn insert(&mut self, field: &Field, value: String) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldVisitor {
    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, value.to_string());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.insert(field, format!("{value:?}"));
    }
}

impl<S> Layer<S> for RecordingLayer
where
    S: tracing::Subscriber,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        id: &tracing::Id,
        _ctx: Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor::default();
        attrs.record(&mut visitor);
        let mut fields = self.fields.lock().expect("recording layer lock");
        fields.insert(id.clone().into_u64(), visitor.fields);
    }

    fn on_record(
        &self,
        id: &tracing::Id,
        values: &tracing::span::Record<'_>,
        _ctx: Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor::default();
        values.record(&mut visitor);
        let mut fields = self.fields.lock().expect("recording layer lock");
        let entry = fields.entry(id.clone().into_u64()).or_default();
        entry.extend(visitor.fields);
    }
}

fn assert_fields(span: &Span, expected_fields: &[&str]) {
    let metadata = span.metadata().expect("Span should have metadata");

    for field in expected_fields {
        assert!(
            span.field(*field).is_some(),
            "Field '{}' is missing from span '{}'",
            field,
            metadata.name()
        );
    }

    let extra_fields = metadata
        .fields()
        .iter()
        .map(|field| field.name())
        .filter(|f| !expected_fields.contains(f))
        .collect::<Vec<_>>()
        .join(",");
    assert_eq!(
        expected_fields.len(),
        metadata.fields().len(),
        "Found extra fields in the span: {}",
        extra_fields
    );
}

#[test]
fn test_graphql_operation_span() {
    let layer = RecordingLayer::default();
    let subscriber = Registry::default().with(layer.clone());

    with_default(subscriber, || {
        let operation = OperationContext::new(OperationType::Mutation, Some("createOrder"));
        let span = GraphQLOperationSpan::new(&Span::none(), &operation);
        assert_fields(
            &span,
            &[
                attributes::OTEL_NAME,
                attributes::OTEL_KIND,
                attributes::OTEL_STATUS_CODE,
                attributes::GRAPHQL_OPERATION_TYPE,
                attributes::GRAPHQL_OPERATION_NAME,
            ],
        );

        layer.assert_recorded_value(&span, attributes::OTEL_NAME, "mutation createOrder");
        layer.assert_recorded_value(&span, attributes::OTEL_KIND, "Server");
        layer.assert_recorded_value(&span, attributes::GRAPHQL_OPERATION_TYPE, "mutation");
        layer.assert_recorded_value(&span, attributes::GRAPHQL_OPERATION_NAME, "createOrder");
        layer.assert_not_recorded(&span, attributes::OTEL_STATUS_CODE);
    });
}

#[test]
fn test_graphql_field_span() {
    let layer = RecordingLayer::default();
    let subscriber = Registry::default().with(layer.clone());

    with_default(subscriber, || {
        let parent = tracing::info_span!("parent");
        let field = FieldContext::resolver("Order", "total");
        let span = GraphQLFieldSpan::new(&parent, &field);
        assert_fields(
            &span,
            &[
                attributes::OTEL_NAME,
                attributes::OTEL_KIND,
                attributes::OTEL_STATUS_CODE,
                attributes::GRAPHQL_FIELD_OBJECT,
                attributes::GRAPHQL_FIELD_NAME,
                attributes::GRAPHQL_FIELD_DURATION_MS,
                attributes::GRAPHQL_FIELD_ERROR,
                attributes::ERROR_MESSAGE,
            ],
        );

        layer.assert_recorded_value(&span, attributes::OTEL_NAME, "Order.total");
        layer.assert_recorded_value(&span, attributes::OTEL_KIND, "Internal");
        layer.assert_recorded_value(&span, attributes::GRAPHQL_FIELD_OBJECT, "Order");
        layer.assert_recorded_value(&span, attributes::GRAPHQL_FIELD_NAME, "total");

        span.record_duration(Duration::from_micros(12_900));
        layer.assert_recorded_value(&span, attributes::GRAPHQL_FIELD_DURATION_MS, "12");

        let err = BoxError::from("price unavailable");
        span.record_error(err.as_ref());
        layer.assert_recorded_value(&span, attributes::ERROR_MESSAGE, "price unavailable");
        layer.assert_recorded_value(&span, attributes::GRAPHQL_FIELD_ERROR, "true");
        layer.assert_recorded_value(&span, attributes::OTEL_STATUS_CODE, "Error");
    });
}

fn parent_of(span: &Span) -> Option<tracing::Id> {
    let id = span.id()?;
    tracing::dispatcher::get_default(|dispatch| {
        let registry = dispatch.downcast_ref::<Registry>()?;
        registry.span(&id)?.parent().map(|parent| parent.id())
    })
}

#[test]
fn parent_comes_from_the_context_span_only() {
    with_default(Registry::default(), || {
        let entered = tracing::info_span!("entered");
        let parent = tracing::info_span!("explicit");

        let field = FieldContext::resolver("Query", "me");
        let field_span = entered.in_scope(|| GraphQLFieldSpan::new(&parent, &field));
        assert_eq!(parent_of(&field_span), parent.id());

        let operation = OperationContext::default();
        let root = entered.in_scope(|| GraphQLOperationSpan::new(&Span::none(), &operation));
        assert!(root.id().is_some());
        assert_eq!(parent_of(&root), None);

        let orphan_field = entered.in_scope(|| GraphQLFieldSpan::new(&Span::none(), &field));
        assert_eq!(parent_of(&orphan_field), None);
    });
}

#[test]
fn recording_errors_without_a_subscriber_is_a_no_op() {
    let errors = vec![GraphQLError::new("boom")];

    Span::none().record_graphql_errors(&errors);

    with_default(tracing::subscriber::NoSubscriber::default(), || {
        let operation = OperationContext::default();
        let span = GraphQLOperationSpan::new(&Span::none(), &operation);
        span.record_graphql_errors(&errors);
        span.record_graphql_errors(&[]);
    });
}
