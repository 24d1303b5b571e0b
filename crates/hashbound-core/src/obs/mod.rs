//! Observability: in-memory operation counters.
//!
//! This module does not access storage internals; executors report
//! events into it and callers pull point-in-time reports.

pub(crate) mod metrics;

pub use metrics::{EntityCounters, EventOps, EventState, metrics_report, metrics_reset};
