//! Metrics instrumentation for the agent loop.

use monk_core::ToolStatus;
use std::time::Instant;

/// Record time from request to end-of-stream.
pub fn record_provider_latency(duration_ms: f64) {
    metrics::histogram!("provider_stream_latency", duration_ms);
}

/// Record tool execution latency.
pub fn record_tool_latency(duration_ms: f64) {
    metrics::histogram!("tool_execution_latency", duration_ms);
}

pub fn record_tool_outcome(status: ToolStatus) {
    let status = match status {
        ToolStatus::Success => "success",
        ToolStatus::Failure => "failure",
        ToolStatus::Denied => "denied",
    };
    metrics::counter!("tool_outcomes", 1, "status" => status);
}

pub fn record_parse_fallbacks(count: usize) {
    if count > 0 {
        metrics::counter!("interpreter_parse_fallbacks", count as u64);
    }
}

pub fn increment_prune_count() {
    metrics::counter!("context_prune_count", 1);
}

pub fn increment_overflow_count() {
    metrics::counter!("context_overflow_count", 1);
}

/// Records elapsed milliseconds into `record` when dropped.
pub struct MetricTimer {
    start: Instant,
    record: fn(f64),
}

impl MetricTimer {
    pub fn new(record: fn(f64)) -> Self {
        Self {
            start: Instant::now(),
            record,
        }
    }
}

impl Drop for MetricTimer {
    fn drop(&mut self) {
        (self.record)(self.start.elapsed().as_secs_f64() * 1000.0);
    }
}
