//! Transport contract between the dispatcher and a model service.

use gcommon::BoxFuture;
use gcontent::{GenerationConfig, GenerationResult, Turn, UsageMode};
use serde::{Deserialize, Serialize};

use crate::{BoxedChunkStream, TransportError};

pub type TransportFuture<'a, T> = BoxFuture<'a, T>;

/// Canonical request handed to a transport: model id, ordered turns, and the
/// resolved per-call configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub turns: Vec<Turn>,
    pub config: GenerationConfig,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, turns: Vec<Turn>, config: GenerationConfig) -> Self {
        Self {
            model: model.into(),
            turns,
            config,
        }
    }

    pub fn validate(&self) -> Result<(), TransportError> {
        if self.model.trim().is_empty() {
            return Err(TransportError::invalid_request("model must not be empty"));
        }

        if self.turns.is_empty() {
            return Err(TransportError::invalid_request(
                "at least one turn is required",
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_token_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_token_limit: Option<u32>,
}

pub trait Transport: Send + Sync {
    fn unary_generate<'a>(
        &'a self,
        request: GenerateRequest,
    ) -> TransportFuture<'a, Result<GenerationResult, TransportError>>;

    fn stream_generate<'a>(
        &'a self,
        request: GenerateRequest,
    ) -> TransportFuture<'a, Result<BoxedChunkStream<'a>, TransportError>>;

    fn count_tokens<'a>(
        &'a self,
        model: String,
        turns: Vec<Turn>,
    ) -> TransportFuture<'a, Result<u64, TransportError>>;

    fn list_models<'a>(&'a self) -> TransportFuture<'a, Result<Vec<ModelInfo>, TransportError>>;

    /// How this transport reports usage on stream chunks; the assembler
    /// honors whichever mode is declared here.
    fn usage_mode(&self) -> UsageMode {
        UsageMode::Cumulative
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TransportErrorKind;

    #[test]
    fn request_validation_enforces_model_and_turns() {
        let config = GenerationConfig::default();

        let no_model = GenerateRequest::new("  ", vec![Turn::user_text("hi")], config.clone());
        let error = no_model.validate().expect_err("blank model must fail");
        assert_eq!(error.kind, TransportErrorKind::InvalidRequest);

        let no_turns = GenerateRequest::new("gen-mini", Vec::new(), config.clone());
        assert!(no_turns.validate().is_err());

        let valid = GenerateRequest::new("gen-mini", vec![Turn::user_text("hi")], config);
        assert!(valid.validate().is_ok());
    }
}
