//! Ephemeral per-stage conversations.

use crate::errors::GenerationError;
use crate::model::{Content, GenerateContentRequest, GenerationBackend, Role, ToolCapability};
use tracing::debug;
use uuid::Uuid;

/// Conversation state for exactly one stage invocation.
///
/// Created fresh for each stage and consumed by [`Conversation::send`], so no
/// history leaks from one stage into the next.
#[derive(Debug)]
pub struct Conversation {
    id: Uuid,
    agent: String,
    instruction: String,
    capability: ToolCapability,
}

impl Conversation {
    /// Opens a conversation for an agent.
    #[must_use]
    pub fn open(
        agent: impl Into<String>,
        instruction: impl Into<String>,
        capability: ToolCapability,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            agent: agent.into(),
            instruction: instruction.into(),
            capability,
        }
    }

    /// Returns the conversation ID.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the agent name.
    #[must_use]
    pub fn agent(&self) -> &str {
        &self.agent
    }

    /// Builds the request for a user message without sending it.
    #[must_use]
    pub fn request_for(&self, message: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::text(message).with_role(Role::User)],
            ..GenerateContentRequest::default()
        }
        .with_system_instruction(self.instruction.clone())
        .with_capability(self.capability)
    }

    /// Sends one user message and returns the model's text.
    ///
    /// # Errors
    ///
    /// Returns the backend error, or `EmptyResponse` if the model produced no
    /// text.
    pub async fn send(
        self,
        backend: &dyn GenerationBackend,
        model: &str,
        message: &str,
    ) -> Result<String, GenerationError> {
        let request = self.request_for(message);
        debug!(
            conversation_id = %self.id,
            agent = %self.agent,
            web_search = request.has_web_search(),
            "sending stage prompt"
        );

        let response = backend.generate(model, &request).await?;
        let text = response.text();
        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        debug!(conversation_id = %self.id, "conversation closed");
        Ok(text)
    }
}
