//! Generation results, candidates, and streaming chunk types.
//!
//! ```rust
//! use gcontent::{Candidate, FinishReason, GenerationResult, Turn};
//!
//! let result = GenerationResult::new(vec![Candidate::new(
//!     0,
//!     Turn::model_text("hello"),
//!     Some(FinishReason::Stop),
//! )]);
//!
//! assert_eq!(result.text(), "hello");
//! ```

use serde::{Deserialize, Serialize};

use crate::part::{FunctionCall, Part};
use crate::safety::SafetyRating;
use crate::turn::Turn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Recitation,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: u32,
    pub candidates_token_count: u32,
    pub total_token_count: u32,
}

impl UsageMetadata {
    pub fn new(prompt: u32, candidates: u32) -> Self {
        Self {
            prompt_token_count: prompt,
            candidates_token_count: candidates,
            total_token_count: prompt + candidates,
        }
    }

    pub(crate) fn accumulate(&mut self, other: &UsageMetadata) {
        self.prompt_token_count += other.prompt_token_count;
        self.candidates_token_count += other.candidates_token_count;
        self.total_token_count += other.total_token_count;
    }
}

/// How a transport reports usage on stream chunks.
///
/// `Cumulative` snapshots supersede each other; `Delta` counters are summed
/// by the assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UsageMode {
    #[default]
    Cumulative,
    Delta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub index: u32,
    pub content: Turn,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub safety_ratings: Vec<SafetyRating>,
}

impl Candidate {
    pub fn new(index: u32, content: Turn, finish_reason: Option<FinishReason>) -> Self {
        Self {
            index,
            content,
            finish_reason,
            safety_ratings: Vec::new(),
        }
    }

    pub fn with_safety_ratings(mut self, safety_ratings: Vec<SafetyRating>) -> Self {
        self.safety_ratings = safety_ratings;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub usage: UsageMetadata,
}

impl GenerationResult {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            usage: UsageMetadata::default(),
        }
    }

    pub fn with_usage(mut self, usage: UsageMetadata) -> Self {
        self.usage = usage;
        self
    }

    /// Concatenation of the first candidate's text parts.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .map(|candidate| candidate.content.text())
            .unwrap_or_default()
    }

    /// Function calls requested by the first candidate, in declaration order.
    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        self.candidates
            .first()
            .map(|candidate| candidate.content.function_calls())
            .unwrap_or_default()
    }

    pub fn has_function_calls(&self) -> bool {
        !self.function_calls().is_empty()
    }
}

/// One incremental slice of a streamed generation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamChunk {
    pub candidates: Vec<CandidateDelta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageMetadata>,
}

impl StreamChunk {
    pub fn text_delta(index: u32, delta: impl Into<String>) -> Self {
        Self {
            candidates: vec![CandidateDelta {
                index,
                parts: vec![Part::text(delta)],
                finish_reason: None,
            }],
            usage: None,
        }
    }

    pub fn with_usage(mut self, usage: UsageMetadata) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn with_finish(mut self, index: u32, reason: FinishReason) -> Self {
        if let Some(delta) = self
            .candidates
            .iter_mut()
            .find(|delta| delta.index == index)
        {
            delta.finish_reason = Some(reason);
        } else {
            self.candidates.push(CandidateDelta {
                index,
                parts: Vec::new(),
                finish_reason: Some(reason),
            });
        }

        self
    }

    /// Concatenation of this chunk's text parts for the given candidate.
    pub fn text(&self, index: u32) -> String {
        self.candidates
            .iter()
            .filter(|delta| delta.index == index)
            .flat_map(|delta| delta.parts.iter())
            .filter_map(Part::as_text)
            .collect::<Vec<_>>()
            .concat()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDelta {
    pub index: u32,
    pub parts: Vec<Part>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_reads_first_candidate_only() {
        let result = GenerationResult::new(vec![
            Candidate::new(0, Turn::model_text("primary"), Some(FinishReason::Stop)),
            Candidate::new(1, Turn::model_text("secondary"), Some(FinishReason::Stop)),
        ]);

        assert_eq!(result.text(), "primary");
    }

    #[test]
    fn function_call_accessors_surface_requests() {
        let turn = Turn::model(vec![
            Part::text("calling"),
            Part::function_call("lookup", serde_json::json!({"q": "x"})),
        ]);
        let result = GenerationResult::new(vec![Candidate::new(0, turn, None)]);

        assert!(result.has_function_calls());
        assert_eq!(result.function_calls()[0].name, "lookup");
    }

    #[test]
    fn chunk_text_filters_by_candidate_index() {
        let mut chunk = StreamChunk::text_delta(0, "zero");
        chunk.candidates.push(CandidateDelta {
            index: 1,
            parts: vec![Part::text("one")],
            finish_reason: None,
        });

        assert_eq!(chunk.text(0), "zero");
        assert_eq!(chunk.text(1), "one");
    }
}
