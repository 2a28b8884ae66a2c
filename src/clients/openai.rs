use anyhow::{Error, Result, anyhow};
use reqwest::Client;
use tracing::{debug, info};

use crate::{
    config::Config,
    models::openai::{ChatCompletionRequest, ChatCompletionResponse},
};

pub struct OpenAiClient {
    http_client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(config: &Config) -> Self {
        info!(
            base_url = %config.openai_base_url,
            model = %config.openai_model,
            "OpenAI client initialized"
        );

        Self {
            http_client: Client::new(),
            base_url: config.openai_base_url.clone(),
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
        }
    }

    /// One non-streaming completion for a single user-authored message, using
    /// the configured default model. Single attempt, no retry.
    pub async fn complete(&self, prompt: &str) -> Result<String, Error> {
        self.chat(ChatCompletionRequest::user_prompt(&self.model, prompt))
            .await
    }

    /// One non-streaming completion for an arbitrary request. Returns the
    /// text of the first generated choice.
    pub async fn chat(&self, request: ChatCompletionRequest) -> Result<String, Error> {
        debug!(
            model = %request.model,
            message_count = request.messages.len(),
            "Sending chat completion request"
        );

        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            let completion: ChatCompletionResponse = response.json().await?;

            completion
                .choices
                .into_iter()
                .next()
                .map(|choice| choice.message.content)
                .ok_or_else(|| anyhow!("Completion response contained no choices"))
        } else {
            let error_text = response.text().await?;
            Err(anyhow!(
                "Completion request failed with status {}: {}",
                status,
                error_text
            ))
        }
    }
}
