//! Hook contracts for observing tool invocations.
//!
//! ```rust
//! use gtooling::{NoopToolRuntimeHooks, ToolRuntimeHooks};
//!
//! fn accepts_hooks(_hooks: &dyn ToolRuntimeHooks) {}
//!
//! accepts_hooks(&NoopToolRuntimeHooks);
//! ```

use crate::ToolError;

pub trait ToolRuntimeHooks: Send + Sync {
    fn on_invocation_start(&self, _tool: &str) {}

    fn on_invocation_success(&self, _tool: &str) {}

    fn on_invocation_failure(&self, _tool: &str, _error: &ToolError) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopToolRuntimeHooks;

impl ToolRuntimeHooks for NoopToolRuntimeHooks {}
