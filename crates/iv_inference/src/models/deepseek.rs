use std::fmt;
use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use iv_core::config::ModelConfig;
use iv_core::{ChatModel, Error, GenerationParams, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    #[serde(default)]
    content: String,
}

fn unavailable(detail: impl fmt::Display) -> Error {
    Error::CollaboratorUnavailable(detail.to_string())
}

/// OpenAI-compatible chat-completion client (DeepSeek by default).
pub struct DeepSeekModel {
    client: Client,
    api_key: String,
    base_url: String,
    model_name: String,
}

impl DeepSeekModel {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config("DeepSeek API key is required".to_string()))?;
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model_name: config.model_name.clone(),
        })
    }

    fn request_body<'a>(&'a self, prompt: &'a str, params: GenerationParams) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model_name,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        }
    }
}

/// First choice's text; an empty or missing choice counts as a failed call.
fn first_choice(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or_else(|| unavailable("empty completion"))
}

impl fmt::Debug for DeepSeekModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeepSeekModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model_name", &self.model_name)
            .finish()
    }
}

#[async_trait]
impl ChatModel for DeepSeekModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, prompt: &str, params: GenerationParams) -> Result<String> {
        debug!("Sending prompt to {} ({} chars)", self.model_name, prompt.chars().count());
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt, params))
            .send()
            .await
            .map_err(unavailable)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(unavailable(format!("HTTP {}: {}", status, body.trim())));
        }

        let parsed = response.json::<ChatResponse>().await.map_err(unavailable)?;
        first_choice(parsed)
    }
}
