//! Model operations: unary and streaming generation, token counting.

use std::pin::Pin;

use futures_core::Stream;
use futures_util::StreamExt;
use gchat::ChatError;
use gcontent::{
    ContentArg, GenerationConfig, GenerationResult, StreamChunk, normalize_contents, resolve,
};
use gtooling::ToolExecutionContext;
use gtransport::{GenerateRequest, ModelInfo};

use crate::Client;

pub type GenerateStream<'a> =
    Pin<Box<dyn Stream<Item = Result<StreamChunk, ChatError>> + Send + 'a>>;

/// Stateless model operations; each call resolves its own config and routes
/// through the dispatcher (plus the tool loop for unary generation).
pub struct Models<'a> {
    client: &'a Client,
}

impl<'a> Models<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn generate_content(
        &self,
        model: &str,
        contents: Vec<ContentArg>,
        config: Option<GenerationConfig>,
    ) -> Result<GenerationResult, ChatError> {
        let turns = normalize_contents(contents)?;
        let effective = resolve(config.as_ref(), self.client.defaults())?;

        let orchestrator = self.client.orchestrator();
        let context = ToolExecutionContext::new(self.client.next_session_id("call"));
        let outcome = orchestrator.run(model, turns, effective, context).await?;

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

    /// Single-pass chunk stream. Tool calls are not executed on this path;
    /// functionCall parts stream through verbatim.
    pub async fn generate_content_stream(
        &self,
        model: &str,
        contents: Vec<ContentArg>,
        config: Option<GenerationConfig>,
    ) -> Result<GenerateStream<'a>, ChatError> {
        let turns = normalize_contents(contents)?;
        let mut effective = resolve(config.as_ref(), self.client.defaults())?;
        self.client.orchestrator().advertise_tools(&mut effective);

        let request = GenerateRequest::new(model, turns, effective);
        let source = self.client.dispatcher().stream(request).await?;

        Ok(Box::pin(source.map(|item| item.map_err(ChatError::from))))
    }

    pub async fn count_tokens(
        &self,
        model: &str,
        contents: Vec<ContentArg>,
    ) -> Result<u64, ChatError> {
        let turns = normalize_contents(contents)?;
        let count = self.client.dispatcher().count_tokens(model, turns).await?;
        Ok(count)
    }

    pub async fn list(&self) -> Result<Vec<ModelInfo>, ChatError> {
        let models = self.client.dispatcher().list_models().await?;
        Ok(models)
    }
}
