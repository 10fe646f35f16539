use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use songsmith_config::PromptConfig;

use super::{PromptDeriver, upstream_error};
use crate::{error::CollaboratorError, http_client::http_client, types::GenerationRequest};

const SERVICE: &str = "prompt";

const DEFAULT_SYSTEM_PROMPT: &str = "You write prompts for a music generation model. \
The user message is a JSON song brief with the fields custom, multiselect, htmlContent, vocals and title. \
Reply with a JSON object with exactly two string fields: \"prompt\", the lyrics or description of the song, \
and \"tags\", a comma-separated list of genres and moods.";

/// Derives prompts through an OpenAI-compatible chat completions API
pub(crate) struct ChatPromptDeriver {
    client: Client,
    completions_url: String,
    api_key: Option<SecretString>,
    model: String,
    system_prompt: String,
    temperature: Option<f32>,
}

impl ChatPromptDeriver {
    pub fn new(config: &PromptConfig) -> Self {
        let base = config.base_url.as_str().trim_end_matches('/');

        Self {
            client: http_client(),
            completions_url: format!("{base}/chat/completions"),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            system_prompt: config
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            temperature: config.temperature,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    response_format: ResponseFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    r#type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl PromptDeriver for ChatPromptDeriver {
    async fn derive(&self, request: &GenerationRequest) -> Result<String, CollaboratorError> {
        let brief = serde_json::to_string(request).map_err(|e| CollaboratorError::Decode(e.to_string()))?;

        tracing::debug!(model = %self.model, brief_len = brief.len(), "requesting prompt derivation");

        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &brief,
                },
            ],
            response_format: ResponseFormat { r#type: "json_object" },
            temperature: self.temperature,
        };

        let mut builder = self.client.post(&self.completions_url).json(&body);

        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!(service = SERVICE, error = %e, "upstream request failed");
            CollaboratorError::Connection(e.to_string())
        })?;

        if !response.status().is_success() {
            return Err(upstream_error(SERVICE, response).await);
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::Decode(format!("failed to parse completion: {e}")))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CollaboratorError::Decode("completion contained no message content".to_string()))
    }
}
