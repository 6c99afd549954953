//! Chat-layer errors and classification.

use std::error::Error;
use std::fmt::{Display, Formatter};

use gcontent::{ConfigError, ContentError, GenerationResult};
use gtooling::ToolError;
use gtransport::{TransportError, TransportErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    InvalidRequest,
    Content,
    Config,
    SessionBusy,
    UnknownTool,
    FunctionCallLimit,
    Tooling,
    Transport,
    Timeout,
    Internal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
    /// Last model response received before the failure; populated when the
    /// tool-loop iteration limit is reached, for diagnostics.
    pub last_response: Option<GenerationResult>,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            last_response: None,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::InvalidRequest, message)
    }

    pub fn session_busy(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::SessionBusy, message)
    }

    pub fn unknown_tool(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::UnknownTool, message)
    }

    pub fn function_call_limit(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::FunctionCallLimit, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Internal, message)
    }

    pub fn with_last_response(mut self, response: GenerationResult) -> Self {
        self.last_response = Some(response);
        self
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ChatError {}

impl From<ContentError> for ChatError {
    fn from(value: ContentError) -> Self {
        ChatError::new(ChatErrorKind::Content, value.to_string())
    }
}

impl From<ConfigError> for ChatError {
    fn from(value: ConfigError) -> Self {
        ChatError::new(ChatErrorKind::Config, value.to_string())
    }
}

impl From<TransportError> for ChatError {
    fn from(value: TransportError) -> Self {
        let kind = match value.kind {
            TransportErrorKind::Timeout => ChatErrorKind::Timeout,
            _ => ChatErrorKind::Transport,
        };

        ChatError::new(kind, value.to_string())
    }
}

impl From<ToolError> for ChatError {
    fn from(value: ToolError) -> Self {
        ChatError::new(ChatErrorKind::Tooling, value.to_string())
    }
}
