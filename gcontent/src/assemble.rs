//! Folding of stream chunks into running and final aggregates.
//!
//! ```rust
//! use gcontent::{StreamAssembler, StreamChunk, UsageMode};
//!
//! let mut assembler = StreamAssembler::new(UsageMode::Cumulative);
//! assembler.push(&StreamChunk::text_delta(0, "hel"));
//! assembler.push(&StreamChunk::text_delta(0, "lo"));
//!
//! assert_eq!(assembler.current().text(), "hello");
//! ```

use crate::part::Part;
use crate::response::{Candidate, GenerationResult, StreamChunk, UsageMetadata, UsageMode};
use crate::turn::{Role, Turn};

/// Accumulates [`StreamChunk`]s into a [`GenerationResult`].
///
/// Per-candidate text is concatenated in arrival order. The aggregate
/// returned by [`current`](Self::current) is valid after every push, so a
/// consumer that stops early still observes a result consistent with the
/// chunks it actually consumed.
#[derive(Debug, Clone)]
pub struct StreamAssembler {
    mode: UsageMode,
    candidates: Vec<Candidate>,
    usage: UsageMetadata,
}

impl StreamAssembler {
    pub fn new(mode: UsageMode) -> Self {
        Self {
            mode,
            candidates: Vec::new(),
            usage: UsageMetadata::default(),
        }
    }

    pub fn push(&mut self, chunk: &StreamChunk) {
        for delta in &chunk.candidates {
            let candidate = self.candidate_mut(delta.index);

            for part in &delta.parts {
                if let Part::Text(addition) = part
                    && let Some(Part::Text(existing)) = candidate.content.parts.last_mut()
                {
                    existing.push_str(addition);
                    continue;
                }

                candidate.content.parts.push(part.clone());
            }

            if delta.finish_reason.is_some() {
                candidate.finish_reason = delta.finish_reason;
            }
        }

        if let Some(usage) = &chunk.usage {
            match self.mode {
                UsageMode::Cumulative => self.usage = *usage,
                UsageMode::Delta => self.usage.accumulate(usage),
            }
        }
    }

    /// Running aggregate over every chunk pushed so far.
    pub fn current(&self) -> GenerationResult {
        GenerationResult {
            candidates: self.candidates.clone(),
            usage: self.usage,
        }
    }

    pub fn finish(self) -> GenerationResult {
        GenerationResult {
            candidates: self.candidates,
            usage: self.usage,
        }
    }

    fn candidate_mut(&mut self, index: u32) -> &mut Candidate {
        let position = match self
            .candidates
            .iter()
            .position(|candidate| candidate.index == index)
        {
            Some(position) => position,
            None => {
                let insert_at = self
                    .candidates
                    .iter()
                    .position(|candidate| candidate.index > index)
                    .unwrap_or(self.candidates.len());
                self.candidates.insert(
                    insert_at,
                    Candidate::new(index, Turn::new(Role::Model, Vec::new()), None),
                );
                insert_at
            }
        };

        &mut self.candidates[position]
    }
}
