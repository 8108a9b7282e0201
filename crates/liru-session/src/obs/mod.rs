//! Lightweight in-process observability for sessions.
//!
//! Metrics are plain atomics; rendering to Prometheus text is left to the
//! embedding application (the demo binary prints it on exit).

pub mod metrics;

pub use metrics::SessionMetrics;
