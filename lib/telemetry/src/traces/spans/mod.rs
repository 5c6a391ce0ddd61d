//! Spans are created through small wrapper structs (see `graphql`) rather than ad-hoc
//! `tracing` calls.
//!
//! The wrappers keep naming and attributes consistent and provide focused helpers for
//! recording common fields and events. Attribute keys live in `attributes` as `const`
//! values and are checked against exported spans in `tests`.
//!
//! Span names are dynamic (`mutation createOrder`, `Order.total`), so every wrapper carries
//! a static `tracing` name and sets the exported name through `otel.name`.
//!
//! The parent of every span is the span carried by the request context. A context without
//! a span starts a new trace, whatever span happens to be entered on the current thread.

pub const TARGET_NAME: &str = "gql-gateway";

pub mod attributes;
pub mod graphql;

#[cfg(test)]
mod tests;
