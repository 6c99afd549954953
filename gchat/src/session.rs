//! Multi-turn chat sessions with single-writer send discipline.

use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use gcommon::SessionId;
use gcontent::{
    ContentArg, GenerationConfig, GenerationResult, StreamAssembler, StreamChunk, Turn,
    normalize_contents,
};
use gtooling::ToolExecutionContext;
use gtransport::GenerateRequest;

use crate::{ChatError, FunctionCallOrchestrator};

pub type ChatChunkStream<'a> =
    Pin<Box<dyn Stream<Item = Result<StreamChunk, ChatError>> + Send + 'a>>;

/// One conversation: an append-only turn history plus an exclusive send
/// slot. Only a single send (tool-loop iterations included) may be in
/// flight; a concurrent send is rejected immediately, never queued.
pub struct ChatSession {
    id: SessionId,
    model: String,
    config: GenerationConfig,
    orchestrator: FunctionCallOrchestrator,
    history: Mutex<Vec<Turn>>,
    busy: AtomicBool,
}

impl ChatSession {
    pub fn new(
        id: impl Into<SessionId>,
        model: impl Into<String>,
        orchestrator: FunctionCallOrchestrator,
        config: GenerationConfig,
        initial_history: Vec<Turn>,
    ) -> Self {
        Self {
            id: id.into(),
            model: model.into(),
            config,
            orchestrator,
            history: Mutex::new(initial_history),
            busy: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Snapshot of the conversation so far.
    pub fn history(&self) -> Vec<Turn> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub async fn send_text(
        &self,
        text: impl Into<String>,
    ) -> Result<GenerationResult, ChatError> {
        self.send_message(vec![ContentArg::from(text.into())]).await
    }

    /// Sends new content and returns the final model response.
    ///
    /// On success the user turn and every turn the call produced are
    /// appended atomically; on failure the history is left exactly as it
    /// was. The one exception is the tool-iteration limit: the executed
    /// round-trips already happened, so their turns are committed and the
    /// limit error is returned carrying the last response.
    pub async fn send_message(
        &self,
        content: Vec<ContentArg>,
    ) -> Result<GenerationResult, ChatError> {
        let new_turns = normalize_contents(content)?;
        let _slot = self.acquire_send_slot()?;

        let mut base = self.history();
        base.extend(new_turns.clone());

        let outcome = self
            .orchestrator
            .run(
                &self.model,
                base,
                self.config.clone(),
                ToolExecutionContext::new(self.id.clone()),
            )
            .await?;

        {
            let mut history = self
                .history
                .lock()
                .map_err(|_| ChatError::internal("history lock poisoned"))?;
            history.extend(new_turns);
            history.extend(outcome.transcript);
        }

        if outcome.limit_reached {
            Err(ChatError::function_call_limit(format!(
                "automatic function calling stopped after {} tool round-trips",
                outcome.rounds
            ))
            .with_last_response(outcome.response))
        } else {
            Ok(outcome.response)
        }
    }

    /// Sends new content and yields chunks as the transport produces them.
    ///
    /// Tool calls are not executed on this path; functionCall parts stream
    /// through verbatim. The history is appended only when the stream
    /// completes; dropping it early stops the transport pull and leaves the
    /// history untouched.
    pub async fn send_message_stream(
        &self,
        content: Vec<ContentArg>,
    ) -> Result<ChatChunkStream<'_>, ChatError> {
        let new_turns = normalize_contents(content)?;
        let slot = self.acquire_send_slot()?;

        let mut config = self.config.clone();
        self.orchestrator.advertise_tools(&mut config);

        let mut base = self.history();
        base.extend(new_turns.clone());

        let request = GenerateRequest::new(self.model.clone(), base, config);
        let dispatcher = self.orchestrator.dispatcher();
        let usage_mode = dispatcher.usage_mode();

        let mut source = match dispatcher.stream(request).await {
            Ok(stream) => stream,
            Err(error) => return Err(error.into()),
        };

        let stream = try_stream! {
            let _slot = slot;
            let mut assembler = StreamAssembler::new(usage_mode);

            while let Some(item) = source.next().await {
                let chunk = item.map_err(ChatError::from)?;
                assembler.push(&chunk);
                yield chunk;
            }

            let result = assembler.finish();
            let reply = result
                .candidates
                .first()
                .map(|candidate| candidate.content.clone())
                .unwrap_or_else(|| Turn::model(Vec::new()));

            self.commit_stream_turns(new_turns, reply)?;
        };

        Ok(Box::pin(stream))
    }

    fn commit_stream_turns(&self, new_turns: Vec<Turn>, reply: Turn) -> Result<(), ChatError> {
        let mut history = self
            .history
            .lock()
            .map_err(|_| ChatError::internal("history lock poisoned"))?;
        history.extend(new_turns);
        history.push(reply);
        Ok(())
    }

    fn acquire_send_slot(&self) -> Result<SendSlot<'_>, ChatError> {
        self.busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map_err(|_| {
                ChatError::session_busy("another send is already in flight for this session")
            })?;

        Ok(SendSlot { busy: &self.busy })
    }
}

struct SendSlot<'a> {
    busy: &'a AtomicBool,
}

impl Drop for SendSlot<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex as StdMutex;

    use gcontent::{Candidate, FinishReason, Role};
    use gtooling::{DefaultToolRuntime, ToolRegistry};
    use gtransport::{
        BoxedChunkStream, ModelInfo, RequestDispatcher, Transport, TransportError,
        TransportFuture, VecChunkStream,
    };

    use super::*;

    struct EchoTransport {
        requests: StdMutex<Vec<GenerateRequest>>,
        fail_unary: bool,
        fail_mid_stream: bool,
        hang: bool,
    }

    impl EchoTransport {
        fn new() -> Self {
            Self {
                requests: StdMutex::new(Vec::new()),
                fail_unary: false,
                fail_mid_stream: false,
                hang: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail_unary: true,
                ..Self::new()
            }
        }

        fn failing_mid_stream() -> Self {
            Self {
                fail_mid_stream: true,
                ..Self::new()
            }
        }

        fn hanging() -> Self {
            Self {
                hang: true,
                ..Self::new()
            }
        }
    }

    impl Transport for EchoTransport {
        fn unary_generate<'a>(
            &'a self,
            request: GenerateRequest,
        ) -> TransportFuture<'a, Result<GenerationResult, TransportError>> {
            Box::pin(async move {
                if self.hang {
                    std::future::pending::<()>().await;
                }

                if self.fail_unary {
                    return Err(TransportError::unavailable("service down"));
                }

                let prompt = request
                    .turns
                    .last()
                    .map(|turn| turn.text())
                    .unwrap_or_default();
                self.requests.lock().expect("requests lock").push(request);

                Ok(GenerationResult::new(vec![Candidate::new(
                    0,
                    Turn::model_text(format!("echo: {prompt}")),
                    Some(FinishReason::Stop),
                )]))
            })
        }

        fn stream_generate<'a>(
            &'a self,
            request: GenerateRequest,
        ) -> TransportFuture<'a, Result<BoxedChunkStream<'a>, TransportError>> {
            Box::pin(async move {
                let prompt = request
                    .turns
                    .last()
                    .map(|turn| turn.text())
                    .unwrap_or_default();
                self.requests.lock().expect("requests lock").push(request);

                let chunks = if self.fail_mid_stream {
                    vec![
                        Ok(StreamChunk::text_delta(0, "echo: ")),
                        Err(TransportError::transport("connection reset")),
                    ]
                } else {
                    vec![
                        Ok(StreamChunk::text_delta(0, "echo: ")),
                        Ok(StreamChunk::text_delta(0, prompt.clone())
                            .with_finish(0, FinishReason::Stop)),
                    ]
                };

                Ok(Box::pin(VecChunkStream::new(chunks)) as BoxedChunkStream<'a>)
            })
        }

        fn count_tokens<'a>(
            &'a self,
            _model: String,
            _turns: Vec<Turn>,
        ) -> TransportFuture<'a, Result<u64, TransportError>> {
            Box::pin(async move { Ok(0) })
        }

        fn list_models<'a>(
            &'a self,
        ) -> TransportFuture<'a, Result<Vec<ModelInfo>, TransportError>> {
            Box::pin(async move { Ok(Vec::new()) })
        }
    }

    fn session_over(transport: Arc<EchoTransport>) -> ChatSession {
        let dispatcher = RequestDispatcher::new(transport as Arc<dyn Transport>);
        let runtime = Arc::new(DefaultToolRuntime::new(Arc::new(ToolRegistry::new())));
        let orchestrator = FunctionCallOrchestrator::new(dispatcher, runtime);

        ChatSession::new(
            "s1",
            "gen-mini",
            orchestrator,
            GenerationConfig::default(),
            Vec::new(),
        )
    }

    #[tokio::test]
    async fn each_successful_send_appends_one_user_and_one_model_turn() {
        let session = session_over(Arc::new(EchoTransport::new()));

        for n in 1..=3_u32 {
            let result = session
                .send_text(format!("message {n}"))
                .await
                .expect("send should succeed");
            assert_eq!(result.text(), format!("echo: message {n}"));
            assert_eq!(session.history().len(), (2 * n) as usize);
        }

        let history = session.history();
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[1].role, Role::Model);
    }

    #[tokio::test]
    async fn prior_turns_are_included_in_later_requests() {
        let transport = Arc::new(EchoTransport::new());
        let session = session_over(transport.clone());

        session.send_text("first").await.expect("first send");
        session.send_text("second").await.expect("second send");

        let requests = transport.requests.lock().expect("requests lock");
        assert_eq!(requests[0].turns.len(), 1);
        assert_eq!(requests[1].turns.len(), 3);
        assert_eq!(requests[1].turns[1].text(), "echo: first");
    }

    #[tokio::test]
    async fn failed_send_leaves_history_untouched() {
        let session = session_over(Arc::new(EchoTransport::failing()));

        session.send_text("seed").await.expect_err("send must fail");
        assert_eq!(session.history().len(), 0);
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn concurrent_send_is_rejected_immediately() {
        let transport = Arc::new(EchoTransport::hanging());
        let session = Arc::new(session_over(transport));

        let first = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.send_text("slow one").await }
        });

        while !session.is_busy() {
            tokio::task::yield_now().await;
        }

        let error = session
            .send_text("impatient")
            .await
            .expect_err("second send must be rejected");
        assert_eq!(error.kind, crate::ChatErrorKind::SessionBusy);

        first.abort();
        let _ = first.await;
        assert_eq!(session.history().len(), 0);
    }

    #[tokio::test]
    async fn streamed_send_appends_history_on_completion() {
        let session = session_over(Arc::new(EchoTransport::new()));

        let mut stream = session
            .send_message_stream(vec![ContentArg::from("stream me")])
            .await
            .expect("stream should start");

        let mut text = String::new();
        while let Some(chunk) = stream.next().await {
            text.push_str(&chunk.expect("ok chunk").text(0));
        }
        drop(stream);

        assert_eq!(text, "echo: stream me");

        let history = session.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].text(), "echo: stream me");
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn dropping_a_stream_early_releases_the_session_without_appending() {
        let session = session_over(Arc::new(EchoTransport::new()));

        let mut stream = session
            .send_message_stream(vec![ContentArg::from("abandoned")])
            .await
            .expect("stream should start");

        let first = stream.next().await.expect("one chunk").expect("ok chunk");
        assert_eq!(first.text(0), "echo: ");
        drop(stream);

        assert_eq!(session.history().len(), 0);
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn mid_stream_failure_carries_the_error_and_keeps_history_clean() {
        let session = session_over(Arc::new(EchoTransport::failing_mid_stream()));

        let mut stream = session
            .send_message_stream(vec![ContentArg::from("doomed")])
            .await
            .expect("stream should start");

        assert!(stream.next().await.expect("first item").is_ok());
        let failure = stream.next().await.expect("error item");
        assert!(failure.is_err());
        assert!(stream.next().await.is_none());

        drop(stream);
        assert_eq!(session.history().len(), 0);
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn invalid_content_fails_before_acquiring_the_session() {
        let session = session_over(Arc::new(EchoTransport::new()));

        let error = session
            .send_message(Vec::new())
            .await
            .expect_err("empty content must fail");
        assert_eq!(error.kind, crate::ChatErrorKind::Content);
        assert!(!session.is_busy());
    }
}
