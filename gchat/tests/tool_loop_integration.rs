use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use gchat::{ChatErrorKind, ChatSession, FunctionCallOrchestrator};
use gcontent::{
    AutomaticFunctionCalling, Candidate, FinishReason, FunctionDeclaration, GenerationConfig,
    GenerationResult, Part, Role, Schema, Turn,
};
use gtooling::{DefaultToolRuntime, ToolError, ToolRegistry};
use gtransport::{
    BoxedChunkStream, GenerateRequest, ModelInfo, RequestDispatcher, Transport, TransportError,
    TransportFuture, VecChunkStream,
};

/// Requests the `echo` tool until tool responses appear in the context, then
/// answers. With `always_call_tools` it never stops asking.
struct ToolLoopTransport {
    requests: Mutex<Vec<GenerateRequest>>,
    always_call_tools: bool,
}

impl ToolLoopTransport {
    fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            always_call_tools: false,
        }
    }

    fn relentless() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            always_call_tools: true,
        }
    }

    fn tool_call_response() -> GenerationResult {
        GenerationResult::new(vec![Candidate::new(
            0,
            Turn::model(vec![Part::function_call(
                "echo",
                serde_json::json!({"text": "hello"}),
            )]),
            None,
        )])
    }

    fn has_tool_responses(request: &GenerateRequest) -> bool {
        request.turns.iter().any(|turn| {
            turn.parts
                .iter()
                .any(|part| part.as_function_response().is_some())
        })
    }
}

impl Transport for ToolLoopTransport {
    fn unary_generate<'a>(
        &'a self,
        request: GenerateRequest,
    ) -> TransportFuture<'a, Result<GenerationResult, TransportError>> {
        Box::pin(async move {
            let done = !self.always_call_tools && Self::has_tool_responses(&request);
            self.requests.lock().expect("requests lock").push(request);

            if done {
                Ok(GenerationResult::new(vec![Candidate::new(
                    0,
                    Turn::model_text("done"),
                    Some(FinishReason::Stop),
                )]))
            } else {
                Ok(Self::tool_call_response())
            }
        })
    }

    fn stream_generate<'a>(
        &'a self,
        request: GenerateRequest,
    ) -> TransportFuture<'a, Result<BoxedChunkStream<'a>, TransportError>> {
        Box::pin(async move {
            self.requests.lock().expect("requests lock").push(request);
            let stream = VecChunkStream::new(vec![Ok(gcontent::StreamChunk::text_delta(
                0, "streamed",
            ))]);
            Ok(Box::pin(stream) as BoxedChunkStream<'a>)
        })
    }

    fn count_tokens<'a>(
        &'a self,
        _model: String,
        _turns: Vec<Turn>,
    ) -> TransportFuture<'a, Result<u64, TransportError>> {
        Box::pin(async move { Ok(0) })
    }

    fn list_models<'a>(&'a self) -> TransportFuture<'a, Result<Vec<ModelInfo>, TransportError>> {
        Box::pin(async move { Ok(Vec::new()) })
    }
}

fn echo_declaration() -> FunctionDeclaration {
    FunctionDeclaration::new("echo", "Echoes text", Schema::String)
}

fn session_with(
    transport: Arc<ToolLoopTransport>,
    registry: ToolRegistry,
    config: GenerationConfig,
) -> ChatSession {
    let dispatcher = RequestDispatcher::new(transport as Arc<dyn Transport>);
    let runtime = Arc::new(DefaultToolRuntime::new(Arc::new(registry)));
    let orchestrator = FunctionCallOrchestrator::new(dispatcher, runtime);

    ChatSession::new("loop-s1", "gen-mini", orchestrator, config, Vec::new())
}

#[tokio::test]
async fn one_tool_round_trip_grows_history_by_four_turns() {
    let transport = Arc::new(ToolLoopTransport::new());
    let mut registry = ToolRegistry::new();
    registry.register_sync_fn(echo_declaration(), |args, _ctx| Ok(args));

    let session = session_with(transport.clone(), registry, GenerationConfig::default());
    let result = session.send_text("go").await.expect("turn should succeed");

    assert_eq!(result.text(), "done");

    // user, model tool request, tool responses, final model reply
    let history = session.history();
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].role, Role::User);
    assert!(history[1].has_function_calls());
    assert!(history[2].parts[0].as_function_response().is_some());
    assert_eq!(history[3].text(), "done");

    let requests = transport.requests.lock().expect("requests lock");
    assert_eq!(requests.len(), 2);
    assert!(
        requests[0]
            .config
            .tools
            .as_ref()
            .is_some_and(|tools| tools[0].name == "echo")
    );
}

#[tokio::test]
async fn failing_tool_becomes_an_error_response_and_session_survives() {
    let transport = Arc::new(ToolLoopTransport::new());
    let mut registry = ToolRegistry::new();
    registry.register_sync_fn(echo_declaration(), |_args, _ctx| {
        Err(ToolError::execution("tool exploded"))
    });

    let session = session_with(transport, registry, GenerationConfig::default());
    let result = session.send_text("go").await.expect("turn should succeed");
    assert_eq!(result.text(), "done");

    let history = session.history();
    let error_part = history[2].parts[0]
        .as_function_response()
        .expect("function response part");
    assert!(error_part.error);
    assert_eq!(error_part.name, "echo");

    let next = session.send_text("again").await.expect("next send works");
    assert_eq!(next.text(), "done");
}

#[tokio::test]
async fn iteration_limit_fails_after_exactly_three_executions() {
    let transport = Arc::new(ToolLoopTransport::relentless());
    let executions = Arc::new(AtomicU32::new(0));

    let mut registry = ToolRegistry::new();
    registry.register_sync_fn(echo_declaration(), {
        let executions = Arc::clone(&executions);
        move |args, _ctx| {
            executions.fetch_add(1, Ordering::SeqCst);
            Ok(args)
        }
    });

    let config = GenerationConfig::default().with_automatic_function_calling(
        AutomaticFunctionCalling {
            enabled: Some(true),
            max_iterations: Some(3),
        },
    );

    let session = session_with(transport, registry, config);
    let error = session.send_text("go").await.expect_err("limit must trip");

    assert_eq!(error.kind, ChatErrorKind::FunctionCallLimit);
    assert_eq!(executions.load(Ordering::SeqCst), 3);

    let last = error.last_response.expect("last response for diagnostics");
    assert!(last.has_function_calls());

    // user turn plus three request/response round-trips
    assert_eq!(session.history().len(), 7);
    assert!(!session.is_busy());
}

#[tokio::test]
async fn unknown_tool_fails_the_whole_call_without_touching_history() {
    let transport = Arc::new(ToolLoopTransport::new());
    let registry = ToolRegistry::new();

    let config = GenerationConfig::default()
        .with_tools(vec![echo_declaration()]);

    let session = session_with(transport, registry, config);
    let error = session.send_text("go").await.expect_err("must fail");

    assert_eq!(error.kind, ChatErrorKind::UnknownTool);
    assert_eq!(session.history().len(), 0);
    assert!(!session.is_busy());
}

#[tokio::test]
async fn disabled_function_calling_returns_tool_requests_verbatim() {
    let transport = Arc::new(ToolLoopTransport::relentless());
    let mut registry = ToolRegistry::new();
    registry.register_sync_fn(echo_declaration(), |args, _ctx| Ok(args));

    let config = GenerationConfig::default()
        .with_automatic_function_calling(AutomaticFunctionCalling::disabled());

    let session = session_with(transport.clone(), registry, config);
    let result = session.send_text("go").await.expect("send should succeed");

    assert!(result.has_function_calls());
    assert_eq!(result.function_calls()[0].name, "echo");

    assert_eq!(session.history().len(), 2);
    assert_eq!(
        transport.requests.lock().expect("requests lock").len(),
        1
    );
}
