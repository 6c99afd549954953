//! Tool runtime context and execution result types.

use gcommon::{MetadataMap, SessionId, TraceId};
use gcontent::{FunctionCall, Part};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolExecutionContext {
    pub session_id: SessionId,
    pub trace_id: Option<TraceId>,
    pub metadata: MetadataMap,
}

impl ToolExecutionContext {
    pub fn new(session_id: impl Into<SessionId>) -> Self {
        Self {
            session_id: session_id.into(),
            trace_id: None,
            metadata: MetadataMap::new(),
        }
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<TraceId>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolExecutionResult {
    pub name: String,
    pub response: Value,
}

impl ToolExecutionResult {
    pub fn new(name: impl Into<String>, response: Value) -> Self {
        Self {
            name: name.into(),
            response,
        }
    }

    pub fn from_call(call: &FunctionCall, response: Value) -> Self {
        Self::new(call.name.clone(), response)
    }

    pub fn into_part(self) -> Part {
        Part::function_response(self.name, self.response)
    }
}
