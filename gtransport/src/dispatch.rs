//! Request dispatch with bounded retry and a per-call deadline.

use std::future::Future;
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use futures_timer::Delay;
use futures_util::future::{Either, select};
use gcontent::{GenerationResult, Turn, UsageMode};

use crate::{
    BoxedChunkStream, GenerateRequest, ModelInfo, NoopOperationHooks, RetryPolicy, Transport,
    TransportError, TransportOperationHooks, execute_with_retry,
};

#[derive(Debug, Clone, PartialEq)]
pub struct DispatchPolicy {
    pub retry: RetryPolicy,
    pub deadline: Duration,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            deadline: Duration::from_secs(120),
        }
    }
}

/// Executes unary, streaming, and token-count calls against a transport.
///
/// Unary calls retry retryable failures under the policy; the deadline spans
/// every attempt of one call, and exhausting it yields a non-retryable
/// timeout. Streams are never retried: re-issuing a partially consumed
/// stream would duplicate already-delivered chunks.
#[derive(Clone)]
pub struct RequestDispatcher {
    transport: Arc<dyn Transport>,
    policy: DispatchPolicy,
    hooks: Arc<dyn TransportOperationHooks>,
}

impl RequestDispatcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            policy: DispatchPolicy::default(),
            hooks: Arc::new(NoopOperationHooks),
        }
    }

    pub fn with_policy(mut self, policy: DispatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn TransportOperationHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn usage_mode(&self) -> UsageMode {
        self.transport.usage_mode()
    }

    /// Unary generation with bounded retry.
    pub async fn generate(
        &self,
        request: GenerateRequest,
    ) -> Result<GenerationResult, TransportError> {
        request.validate()?;
        let model = request.model.clone();

        self.under_deadline(execute_with_retry(
            "generate",
            &model,
            &self.policy.retry,
            self.hooks.as_ref(),
            |_attempt| self.transport.unary_generate(request.clone()),
            |delay| Delay::new(delay),
        ))
        .await
    }

    /// Single-attempt generation; used where a retry could duplicate
    /// externally visible side effects.
    pub async fn generate_once(
        &self,
        request: GenerateRequest,
    ) -> Result<GenerationResult, TransportError> {
        request.validate()?;
        let model = request.model.clone();

        self.under_deadline(execute_with_retry(
            "generate",
            &model,
            &RetryPolicy::none(),
            self.hooks.as_ref(),
            |_attempt| self.transport.unary_generate(request.clone()),
            |delay| Delay::new(delay),
        ))
        .await
    }

    /// Server-streaming generation. Only stream establishment is raced
    /// against the deadline; chunks then flow until the source ends or
    /// fails.
    pub async fn stream(
        &self,
        request: GenerateRequest,
    ) -> Result<BoxedChunkStream<'_>, TransportError> {
        request.validate()?;
        self.under_deadline(self.transport.stream_generate(request))
            .await
    }

    pub async fn count_tokens(
        &self,
        model: impl Into<String>,
        turns: Vec<Turn>,
    ) -> Result<u64, TransportError> {
        let model = model.into();
        if model.trim().is_empty() {
            return Err(TransportError::invalid_request("model must not be empty"));
        }

        self.under_deadline(execute_with_retry(
            "count_tokens",
            &model,
            &self.policy.retry,
            self.hooks.as_ref(),
            |_attempt| self.transport.count_tokens(model.clone(), turns.clone()),
            |delay| Delay::new(delay),
        ))
        .await
    }

    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, TransportError> {
        self.under_deadline(self.transport.list_models()).await
    }

    async fn under_deadline<T>(
        &self,
        operation: impl Future<Output = Result<T, TransportError>>,
    ) -> Result<T, TransportError> {
        let deadline = self.policy.deadline;
        let timer = Delay::new(deadline);

        match select(pin!(operation), timer).await {
            Either::Left((result, _)) => result,
            Either::Right(_) => Err(TransportError::deadline_exceeded(format!(
                "call deadline of {deadline:?} elapsed"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use futures_util::StreamExt;
    use gcontent::{Candidate, FinishReason, GenerationConfig, StreamChunk};

    use super::*;
    use crate::{TransportErrorKind, TransportFuture, VecChunkStream};

    struct ScriptedTransport {
        requests: Mutex<Vec<GenerateRequest>>,
        unary_failures_before_success: Mutex<u32>,
        hang_forever: bool,
    }

    impl ScriptedTransport {
        fn new() -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                unary_failures_before_success: Mutex::new(0),
                hang_forever: false,
            }
        }

        fn failing_first(failures: u32) -> Self {
            let transport = Self::new();
            *transport
                .unary_failures_before_success
                .lock()
                .expect("failures lock") = failures;
            transport
        }

        fn hanging() -> Self {
            let mut transport = Self::new();
            transport.hang_forever = true;
            transport
        }

        fn recorded(&self) -> usize {
            self.requests.lock().expect("requests lock").len()
        }
    }

    impl Transport for ScriptedTransport {
        fn unary_generate<'a>(
            &'a self,
            request: GenerateRequest,
        ) -> TransportFuture<'a, Result<GenerationResult, TransportError>> {
            Box::pin(async move {
                if self.hang_forever {
                    Delay::new(Duration::from_secs(3600)).await;
                }

                self.requests
                    .lock()
                    .expect("requests lock")
                    .push(request.clone());

                let mut remaining = self
                    .unary_failures_before_success
                    .lock()
                    .expect("failures lock");
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(TransportError::unavailable("temporarily overloaded"));
                }

                Ok(GenerationResult::new(vec![Candidate::new(
                    0,
                    Turn::model_text("reply"),
                    Some(FinishReason::Stop),
                )]))
            })
        }

        fn stream_generate<'a>(
            &'a self,
            request: GenerateRequest,
        ) -> TransportFuture<'a, Result<BoxedChunkStream<'a>, TransportError>> {
            Box::pin(async move {
                self.requests.lock().expect("requests lock").push(request);
                let stream = VecChunkStream::new(vec![
                    Ok(StreamChunk::text_delta(0, "re")),
                    Ok(StreamChunk::text_delta(0, "ply")),
                ]);
                Ok(Box::pin(stream) as BoxedChunkStream<'a>)
            })
        }

        fn count_tokens<'a>(
            &'a self,
            _model: String,
            _turns: Vec<Turn>,
        ) -> TransportFuture<'a, Result<u64, TransportError>> {
            Box::pin(async move { Ok(11) })
        }

        fn list_models<'a>(
            &'a self,
        ) -> TransportFuture<'a, Result<Vec<ModelInfo>, TransportError>> {
            Box::pin(async move {
                Ok(vec![ModelInfo {
                    name: "models/gen-mini".to_string(),
                    display_name: None,
                    input_token_limit: Some(32_768),
                    output_token_limit: Some(8_192),
                }])
            })
        }
    }

    fn request() -> GenerateRequest {
        GenerateRequest::new(
            "gen-mini",
            vec![Turn::user_text("hi")],
            GenerationConfig::default(),
        )
    }

    fn fast_policy() -> DispatchPolicy {
        DispatchPolicy {
            retry: RetryPolicy {
                max_attempts: 3,
                initial_backoff: Duration::from_millis(1),
                max_backoff: Duration::from_millis(2),
                backoff_multiplier: 2.0,
            },
            deadline: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn generate_retries_retryable_failures() {
        let transport = Arc::new(ScriptedTransport::failing_first(2));
        let dispatcher =
            RequestDispatcher::new(transport.clone() as Arc<dyn Transport>).with_policy(fast_policy());

        let result = dispatcher.generate(request()).await.expect("should succeed");
        assert_eq!(result.text(), "reply");
        assert_eq!(transport.recorded(), 3);
    }

    #[tokio::test]
    async fn generate_once_never_retries() {
        let transport = Arc::new(ScriptedTransport::failing_first(1));
        let dispatcher =
            RequestDispatcher::new(transport.clone() as Arc<dyn Transport>).with_policy(fast_policy());

        let error = dispatcher
            .generate_once(request())
            .await
            .expect_err("single attempt should fail");
        assert_eq!(error.kind, TransportErrorKind::Unavailable);
        assert_eq!(transport.recorded(), 1);
    }

    #[tokio::test]
    async fn deadline_exhaustion_is_a_terminal_timeout() {
        let transport = Arc::new(ScriptedTransport::hanging());
        let dispatcher =
            RequestDispatcher::new(transport as Arc<dyn Transport>).with_policy(DispatchPolicy {
                retry: RetryPolicy::default(),
                deadline: Duration::from_millis(20),
            });

        let error = dispatcher
            .generate(request())
            .await
            .expect_err("deadline should elapse");
        assert_eq!(error.kind, TransportErrorKind::Timeout);
        assert!(!error.retryable);
    }

    #[tokio::test]
    async fn stream_passes_chunks_through_unmodified() {
        let transport = Arc::new(ScriptedTransport::new());
        let dispatcher = RequestDispatcher::new(transport as Arc<dyn Transport>);

        let mut stream = dispatcher.stream(request()).await.expect("stream starts");
        let mut text = String::new();
        while let Some(chunk) = stream.next().await {
            text.push_str(&chunk.expect("ok chunk").text(0));
        }

        assert_eq!(text, "reply");
    }

    #[tokio::test]
    async fn invalid_request_fails_before_reaching_the_transport() {
        let transport = Arc::new(ScriptedTransport::new());
        let dispatcher = RequestDispatcher::new(transport.clone() as Arc<dyn Transport>);

        let bad = GenerateRequest::new("", vec![Turn::user_text("hi")], GenerationConfig::default());
        let error = dispatcher.generate(bad).await.expect_err("must fail");
        assert_eq!(error.kind, TransportErrorKind::InvalidRequest);
        assert_eq!(transport.recorded(), 0);
    }

    #[tokio::test]
    async fn count_tokens_returns_transport_count_unmodified() {
        let transport = Arc::new(ScriptedTransport::new());
        let dispatcher = RequestDispatcher::new(transport as Arc<dyn Transport>);

        let count = dispatcher
            .count_tokens("gen-mini", vec![Turn::user_text("The quick brown fox")])
            .await
            .expect("count should succeed");
        assert_eq!(count, 11);
    }
}
