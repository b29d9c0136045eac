//! OpenAI-compatible chat-completions client
//!
//! The only thing the engine needs from the model is "prompt in, text out";
//! response parsing into candidates happens downstream so a model swap never
//! touches the recommendation logic.

use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::{EngineError, EngineResult},
    services::providers::GenerativeClient,
};

#[derive(Clone)]
pub struct OpenAiClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

impl OpenAiClient {
    pub fn new(
        api_key: String,
        api_url: String,
        model: String,
        timeout: Duration,
    ) -> EngineResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(EngineError::HttpClient)?;
        Ok(Self {
            http_client,
            api_key,
            api_url,
            model,
        })
    }
}

#[async_trait::async_trait]
impl GenerativeClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> EngineResult<String> {
        let url = format!("{}/chat/completions", self.api_url);

        let body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You are a recommendation assistant. Respond only with the exact structured format the user requests, with no extra commentary."
                },
                { "role": "user", "content": prompt }
            ],
            "temperature": 0.8,
        });

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::ExternalApi(format!(
                "Generative API returned status {}: {}",
                status, body
            )));
        }

        let chat: ChatResponse = response.json().await?;

        chat.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| {
                EngineError::ExternalApi("Generative API returned no choices".to_string())
            })
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
