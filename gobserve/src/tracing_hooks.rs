//! Tracing-based observability hooks for transport and tool phases.
//!
//! ```rust
//! use gobserve::TracingObservabilityHooks;
//! use gtransport::TransportOperationHooks;
//!
//! fn accepts_transport_hooks(_hooks: &dyn TransportOperationHooks) {}
//!
//! accepts_transport_hooks(&TracingObservabilityHooks);
//! ```

use std::time::Duration;

use gtooling::{ToolError, ToolRuntimeHooks};
use gtransport::{TransportError, TransportOperationHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl TransportOperationHooks for TracingObservabilityHooks {
    fn on_attempt_start(&self, operation: &str, model: &str, attempt: u32) {
        tracing::info!(
            phase = "transport",
            event = "attempt_start",
            operation,
            model,
            attempt
        );
    }

    fn on_retry_scheduled(
        &self,
        operation: &str,
        model: &str,
        attempt: u32,
        delay: Duration,
        error: &TransportError,
    ) {
        tracing::warn!(
            phase = "transport",
            event = "retry_scheduled",
            operation,
            model,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }

    fn on_success(&self, operation: &str, model: &str, attempts: u32) {
        tracing::info!(
            phase = "transport",
            event = "success",
            operation,
            model,
            attempts
        );
    }

    fn on_failure(&self, operation: &str, model: &str, attempts: u32, error: &TransportError) {
        tracing::error!(
            phase = "transport",
            event = "failure",
            operation,
            model,
            attempts,
            error_kind = ?error.kind,
            error = %error
        );
    }
}

impl ToolRuntimeHooks for TracingObservabilityHooks {
    fn on_invocation_start(&self, tool: &str) {
        tracing::info!(phase = "tooling", event = "invocation_start", tool);
    }

    fn on_invocation_success(&self, tool: &str) {
        tracing::info!(phase = "tooling", event = "invocation_success", tool);
    }

    fn on_invocation_failure(&self, tool: &str, error: &ToolError) {
        tracing::error!(
            phase = "tooling",
            event = "invocation_failure",
            tool,
            error_kind = ?error.kind,
            error = %error
        );
    }
}
