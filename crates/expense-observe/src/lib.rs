//! Observability setup for the expense gateway.

pub mod tracing_setup;
