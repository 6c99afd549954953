//! Chat session creation seeded with optional history and config.

use gchat::{ChatError, ChatSession};
use gcontent::{GenerationConfig, Turn, resolve};

use crate::Client;

pub struct Chats<'a> {
    client: &'a Client,
}

impl<'a> Chats<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Creates a session whose per-session config is resolved against the
    /// client defaults once, up front; every send reuses that snapshot.
    pub fn create(
        &self,
        model: impl Into<String>,
        initial_history: Vec<Turn>,
        config: Option<GenerationConfig>,
    ) -> Result<ChatSession, ChatError> {
        let effective = resolve(config.as_ref(), self.client.defaults())?;

        Ok(ChatSession::new(
            self.client.next_session_id("chat"),
            model,
            self.client.orchestrator(),
            effective,
            initial_history,
        ))
    }
}
