//! Bounded automatic function-calling loop over the dispatcher.

use std::sync::Arc;

use gcontent::{FunctionCall, GenerationConfig, GenerationResult, Part, Turn};
use gtooling::{ToolErrorKind, ToolExecutionContext, ToolRuntime};
use gtransport::{GenerateRequest, RequestDispatcher};

use crate::ChatError;

/// Outcome of one orchestrated call.
///
/// `transcript` holds every turn the call produced beyond the caller's
/// input: model turns (including ones that requested tools), tool-response
/// turns, and the final model turn. When `limit_reached` is set the last
/// response was still requesting tools and no final model turn exists.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolLoopOutcome {
    pub response: GenerationResult,
    pub transcript: Vec<Turn>,
    pub rounds: u32,
    pub limit_reached: bool,
}

/// Runs generation requests and executes model-requested tools until the
/// model stops asking, bounded by the configured iteration limit.
#[derive(Clone)]
pub struct FunctionCallOrchestrator {
    dispatcher: RequestDispatcher,
    runtime: Arc<dyn ToolRuntime>,
}

impl FunctionCallOrchestrator {
    pub fn new(dispatcher: RequestDispatcher, runtime: Arc<dyn ToolRuntime>) -> Self {
        Self {
            dispatcher,
            runtime,
        }
    }

    pub fn dispatcher(&self) -> &RequestDispatcher {
        &self.dispatcher
    }

    /// Advertises registered tool declarations on the config when the caller
    /// did not set any explicitly.
    pub fn advertise_tools(&self, config: &mut GenerationConfig) {
        if config.tools.is_none() {
            let declarations = self.runtime.declarations();
            if !declarations.is_empty() {
                config.tools = Some(declarations);
            }
        }
    }

    pub async fn run(
        &self,
        model: &str,
        base_turns: Vec<Turn>,
        mut config: GenerationConfig,
        context: ToolExecutionContext,
    ) -> Result<ToolLoopOutcome, ChatError> {
        self.advertise_tools(&mut config);

        let automatic = config.function_calling_enabled();
        let max_rounds = config.function_calling_max_iterations();

        let mut working = base_turns;
        let mut transcript = Vec::new();
        let mut rounds = 0_u32;

        // First submission may retry; nothing externally visible has
        // happened yet.
        let mut response = self
            .dispatcher
            .generate(GenerateRequest::new(model, working.clone(), config.clone()))
            .await?;

        loop {
            if !automatic || !response.has_function_calls() {
                if let Some(candidate) = response.candidates.first() {
                    transcript.push(candidate.content.clone());
                }

                return Ok(ToolLoopOutcome {
                    response,
                    transcript,
                    rounds,
                    limit_reached: false,
                });
            }

            let calls: Vec<FunctionCall> = response
                .function_calls()
                .into_iter()
                .cloned()
                .collect();

            let mut response_parts = Vec::with_capacity(calls.len());
            for call in calls {
                response_parts.push(self.execute_call(call, &context).await?);
            }

            let model_turn = response
                .candidates
                .first()
                .map(|candidate| candidate.content.clone())
                .unwrap_or_else(|| Turn::model(Vec::new()));
            let tool_turn = Turn::user(response_parts);

            working.push(model_turn.clone());
            working.push(tool_turn.clone());
            transcript.push(model_turn);
            transcript.push(tool_turn);
            rounds += 1;

            if rounds >= max_rounds {
                return Ok(ToolLoopOutcome {
                    response,
                    transcript,
                    rounds,
                    limit_reached: true,
                });
            }

            // Resubmissions are never retried: the executed tools' side
            // effects must not be duplicated by a replayed request.
            response = self
                .dispatcher
                .generate_once(GenerateRequest::new(model, working.clone(), config.clone()))
                .await?;
        }
    }

    /// Tools run one at a time, in the order the model declared them. A tool
    /// failure becomes an error-flagged response part; an unregistered name
    /// fails the whole call.
    async fn execute_call(
        &self,
        call: FunctionCall,
        context: &ToolExecutionContext,
    ) -> Result<Part, ChatError> {
        let name = call.name.clone();

        match self.runtime.execute(call, context.clone()).await {
            Ok(result) => Ok(result.into_part()),
            Err(error) if error.kind == ToolErrorKind::NotFound => Err(ChatError::unknown_tool(
                format!("model requested unregistered tool '{name}'"),
            )),
            Err(error) => Ok(Part::function_error(
                name,
                serde_json::json!({ "error": error.to_string() }),
            )),
        }
    }
}
