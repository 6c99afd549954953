//! Production-friendly observability hooks for transport and tool phases.
//!
//! ```rust
//! use gobserve::{MetricsObservabilityHooks, SafeTransportHooks, TracingObservabilityHooks};
//!
//! let _transport_hooks = SafeTransportHooks::new(TracingObservabilityHooks);
//! let _metrics = MetricsObservabilityHooks;
//! ```

mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use metrics_hooks::MetricsObservabilityHooks;
pub use safe_hooks::{SafeToolHooks, SafeTransportHooks};
pub use tracing_hooks::TracingObservabilityHooks;

pub mod prelude {
    pub use crate::{
        MetricsObservabilityHooks, SafeToolHooks, SafeTransportHooks, TracingObservabilityHooks,
    };
}
