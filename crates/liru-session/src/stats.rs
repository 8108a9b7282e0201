use serde::Serialize;

/// Point-in-time performance snapshot of one session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceSample {
    /// Wall-clock time of the most recent transport call, successful or not.
    pub last_operation_latency_ms: f64,
    /// Reciprocal of the latest inter-call interval. Senders only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rolling_rate: Option<f64>,
    /// Successful exchanges so far.
    pub frames: u64,
}
