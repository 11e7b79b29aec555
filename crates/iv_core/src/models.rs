use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::Result;

/// Generation knobs forwarded to the chat-completion backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl GenerationParams {
    pub const fn new(max_tokens: u32, temperature: f32) -> Self {
        Self { max_tokens, temperature }
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self::new(2048, 0.5)
    }
}

/// Chat-completion collaborator: send one prompt, get text or an explicit failure.
#[async_trait]
pub trait ChatModel: Send + Sync {
    fn name(&self) -> &str;

    /// False when the backend is known to be unusable (e.g. no credentials).
    fn is_available(&self) -> bool {
        true
    }

    /// Any failure is reported as `Error::CollaboratorUnavailable`.
    async fn complete(&self, prompt: &str, params: GenerationParams) -> Result<String>;
}
