//! Observability setup: structured logging with an optional OpenTelemetry
//! span export.

pub mod tracing_setup;
