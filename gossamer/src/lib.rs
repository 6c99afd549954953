//! Unified facade over the gossamer workspace crates.
//!
//! This crate is designed to be the single dependency for most applications:
//! it re-exports the core crates and exposes the [`Client`] with its `models`
//! and `chats` sub-services.
//!
//! ```rust
//! use gossamer::prelude::*;
//!
//! let client = Client::with_api_key("demo-key").expect("client builds");
//! let _models = client.models();
//! let _chats = client.chats();
//! ```

mod chats;
mod client;
mod models;

pub mod prelude;

pub use gchat;
pub use gcommon;
pub use gcontent;
pub use gobserve;
pub use gtooling;
pub use gtransport;

pub use chats::Chats;
pub use client::{Client, ClientBuilder};
pub use models::{GenerateStream, Models};

pub use gchat::{
    ChatChunkStream, ChatError, ChatErrorKind, ChatSession, FunctionCallOrchestrator,
    ToolLoopOutcome,
};
pub use gcommon::{BoxFuture, MetadataMap, SessionId, TraceId};
pub use gcontent::{
    AutomaticFunctionCalling, Blob, Candidate, CandidateDelta, ConfigError, ContentArg,
    ContentError, ContentErrorKind, FileRef, FinishReason, FunctionCall, FunctionDeclaration,
    FunctionResponse, GenerationConfig, GenerationResult, HarmBlockThreshold, HarmCategory,
    HarmProbability, Part, Role, SafetyRating, SafetySetting, Schema, StreamAssembler,
    StreamChunk, Turn, UsageMetadata, UsageMode, normalize_contents, resolve,
};
pub use gobserve::{MetricsObservabilityHooks, TracingObservabilityHooks};
pub use gtooling::{
    DefaultToolRuntime, FunctionTool, NoopToolRuntimeHooks, Tool, ToolError, ToolErrorKind,
    ToolExecutionContext, ToolExecutionResult, ToolRegistry, ToolRuntime, ToolRuntimeHooks,
};
pub use gtransport::{
    ApiKeyCredentials, BoxedChunkStream, ChunkStream, CredentialsProvider, DispatchPolicy,
    GenerateRequest, HttpTransport, ModelInfo, NoopOperationHooks, RequestDispatcher, RetryPolicy,
    SecretString, Transport, TransportError, TransportErrorKind, TransportFuture,
    TransportOperationHooks, VecChunkStream, execute_with_retry,
};
