//! Metrics-based observability hooks for transport and tool phases.
//!
//! ```rust
//! use gobserve::MetricsObservabilityHooks;
//! use gtooling::ToolRuntimeHooks;
//!
//! fn accepts_tool_hooks(_hooks: &dyn ToolRuntimeHooks) {}
//!
//! accepts_tool_hooks(&MetricsObservabilityHooks);
//! ```

use std::time::Duration;

use gtooling::{ToolError, ToolRuntimeHooks};
use gtransport::{TransportError, TransportOperationHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl TransportOperationHooks for MetricsObservabilityHooks {
    fn on_attempt_start(&self, operation: &str, model: &str, _attempt: u32) {
        metrics::counter!(
            "gossamer_transport_attempt_start_total",
            "operation" => operation.to_string(),
            "model" => model.to_string()
        )
        .increment(1);
    }

    fn on_retry_scheduled(
        &self,
        operation: &str,
        model: &str,
        _attempt: u32,
        delay: Duration,
        error: &TransportError,
    ) {
        metrics::counter!(
            "gossamer_transport_retry_scheduled_total",
            "operation" => operation.to_string(),
            "model" => model.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "gossamer_transport_retry_delay_seconds",
            "operation" => operation.to_string(),
            "model" => model.to_string()
        )
        .record(delay.as_secs_f64());
    }

    fn on_success(&self, operation: &str, model: &str, attempts: u32) {
        metrics::counter!(
            "gossamer_transport_success_total",
            "operation" => operation.to_string(),
            "model" => model.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "gossamer_transport_attempts_per_success",
            "operation" => operation.to_string(),
            "model" => model.to_string()
        )
        .record(attempts as f64);
    }

    fn on_failure(&self, operation: &str, model: &str, attempts: u32, error: &TransportError) {
        metrics::counter!(
            "gossamer_transport_failure_total",
            "operation" => operation.to_string(),
            "model" => model.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "gossamer_transport_attempts_per_failure",
            "operation" => operation.to_string(),
            "model" => model.to_string()
        )
        .record(attempts as f64);
    }
}

impl ToolRuntimeHooks for MetricsObservabilityHooks {
    fn on_invocation_start(&self, tool: &str) {
        metrics::counter!(
            "gossamer_tool_invocation_start_total",
            "tool" => tool.to_string()
        )
        .increment(1);
    }

    fn on_invocation_success(&self, tool: &str) {
        metrics::counter!(
            "gossamer_tool_invocation_success_total",
            "tool" => tool.to_string()
        )
        .increment(1);
    }

    fn on_invocation_failure(&self, tool: &str, error: &ToolError) {
        metrics::counter!(
            "gossamer_tool_invocation_failure_total",
            "tool" => tool.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
    }
}
