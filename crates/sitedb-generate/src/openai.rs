use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use sitedb_core::config::GenerationSettings;
use sitedb_core::error::Error;
use sitedb_core::traits::{GenerationRequest, Generator};

use crate::prompt;

/// Chat-completions client. Each request becomes a single user message
/// rendered from the agent template for its collection.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    api_key: String,
    company: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiGenerator {
    pub fn new(settings: &GenerationSettings, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.attempt_timeout())
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            api_key: api_key.into(),
            company: settings.company.clone(),
        })
    }

    /// Reads the API key from the environment variable the settings name.
    pub fn from_settings(settings: &GenerationSettings) -> Result<Self> {
        let key = std::env::var(&settings.api_key_env)
            .map_err(|_| Error::InvalidConfig(format!("{} is not set", settings.api_key_env)))?;
        Self::new(settings, key)
    }
}

#[async_trait]
impl Generator for OpenAiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let content = prompt::render(request.kind, &self.company, &request.query, &request.context);
        let body = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![ChatMessage { role: "user", content: &content }],
        };
        debug!(model = %self.model, kind = %request.kind, prompt_chars = content.len(), "sending completion request");
        let response = self.client.post(&self.endpoint).bearer_auth(&self.api_key).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(anyhow!("completion endpoint returned {status}: {}", truncate(&text, 300)));
        }
        parse_completion(&text)
    }
}

/// First choice's message content from a chat-completions response body.
pub fn parse_completion(body: &str) -> Result<String> {
    let parsed: ChatResponse = serde_json::from_str(body).context("decoding completion response")?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("completion response has no content"))
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}
