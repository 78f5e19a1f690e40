//! Observability: runtime telemetry (metrics) and sink abstractions.
//!
//! Structured logs go through `tracing` at the call sites; counters go
//! through `sink::record` only.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventOps, EventReport, EventState};
pub use sink::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink};
