//! Transport contracts and request dispatch for generative-model calls.
//!
//! The [`Transport`] trait is the seam to a concrete model service; the
//! [`RequestDispatcher`] layers bounded retry, per-call deadlines, and the
//! streaming/no-retry discipline on top of it.

mod credentials;
mod dispatch;
mod error;
mod http;
mod retry;
mod stream;
mod transport;

pub use credentials::{
    API_KEY_ENV_VARS, ApiKeyCredentials, CredentialsProvider, SecretString,
};
pub use dispatch::{DispatchPolicy, RequestDispatcher};
pub use error::{TransportError, TransportErrorKind};
pub use http::{DEFAULT_BASE_URL, HttpTransport};
pub use retry::{
    NoopOperationHooks, RetryPolicy, TransportOperationHooks, execute_with_retry,
};
pub use stream::{BoxedChunkStream, ChunkStream, VecChunkStream};
pub use transport::{GenerateRequest, ModelInfo, Transport, TransportFuture};
