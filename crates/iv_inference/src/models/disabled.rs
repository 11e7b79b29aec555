use std::fmt;
use async_trait::async_trait;
use iv_core::{ChatModel, Error, GenerationParams, Result};

/// Stand-in used when no backend can be reached. Every call fails.
pub struct DisabledModel {
    reason: String,
}

impl DisabledModel {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl fmt::Debug for DisabledModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisabledModel").field("reason", &self.reason).finish()
    }
}

#[async_trait]
impl ChatModel for DisabledModel {
    fn name(&self) -> &str {
        "Disabled"
    }

    fn is_available(&self) -> bool {
        false
    }

    async fn complete(&self, _prompt: &str, _params: GenerationParams) -> Result<String> {
        Err(Error::CollaboratorUnavailable(self.reason.clone()))
    }
}
