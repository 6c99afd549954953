//! Common imports for most gossamer applications.

pub use crate::{Chats, Client, ClientBuilder, GenerateStream, Models};
pub use crate::{
    AutomaticFunctionCalling, ChatError, ChatErrorKind, ChatSession, ContentArg,
    FunctionDeclaration, GenerationConfig, GenerationResult, Part, Role, Schema, StreamChunk,
    Turn, UsageMetadata,
};
pub use crate::{
    ApiKeyCredentials, DispatchPolicy, ModelInfo, RequestDispatcher, RetryPolicy, Transport,
    TransportError, TransportErrorKind,
};
pub use crate::{ToolError, ToolRegistry, ToolRuntime};
