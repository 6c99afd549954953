//! Panic-isolating wrappers around user-supplied hooks.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use gtooling::{ToolError, ToolRuntimeHooks};
use gtransport::{TransportError, TransportOperationHooks};

pub struct SafeTransportHooks<H> {
    inner: H,
}

impl<H> SafeTransportHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> TransportOperationHooks for SafeTransportHooks<H>
where
    H: TransportOperationHooks,
{
    fn on_attempt_start(&self, operation: &str, model: &str, attempt: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_attempt_start(operation, model, attempt)
        }));
    }

    fn on_retry_scheduled(
        &self,
        operation: &str,
        model: &str,
        attempt: u32,
        delay: Duration,
        error: &TransportError,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_retry_scheduled(operation, model, attempt, delay, error)
        }));
    }

    fn on_success(&self, operation: &str, model: &str, attempts: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_success(operation, model, attempts)
        }));
    }

    fn on_failure(&self, operation: &str, model: &str, attempts: u32, error: &TransportError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_failure(operation, model, attempts, error)
        }));
    }
}

pub struct SafeToolHooks<H> {
    inner: H,
}

impl<H> SafeToolHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ToolRuntimeHooks for SafeToolHooks<H>
where
    H: ToolRuntimeHooks,
{
    fn on_invocation_start(&self, tool: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_invocation_start(tool)));
    }

    fn on_invocation_success(&self, tool: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_invocation_success(tool)));
    }

    fn on_invocation_failure(&self, tool: &str, error: &ToolError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_invocation_failure(tool, error)
        }));
    }
}
