//! Canonical content model for generative-model calls.
//!
//! Everything a request or response is made of lives here: typed [`Part`]s,
//! role-attributed [`Turn`]s, the [`GenerationConfig`] resolution rules, and
//! the aggregates a streaming call folds into.

mod assemble;
mod config;
mod error;
mod normalize;
mod part;
mod response;
mod safety;
mod turn;

pub use assemble::StreamAssembler;
pub use config::{
    AutomaticFunctionCalling, FunctionDeclaration, GenerationConfig, JSON_MIME_TYPE, Schema,
    resolve,
};
pub use error::{ConfigError, ContentError, ContentErrorKind};
pub use normalize::{ContentArg, normalize_contents};
pub use part::{
    Blob, CodeOutcome, ExecutableCode, ExecutionResult, FileRef, FunctionCall, FunctionResponse,
    Part,
};
pub use response::{
    Candidate, CandidateDelta, FinishReason, GenerationResult, StreamChunk, UsageMetadata,
    UsageMode,
};
pub use safety::{HarmBlockThreshold, HarmCategory, HarmProbability, SafetyRating, SafetySetting};
pub use turn::{Role, Turn};
