pub mod chat;
pub mod suno;

use async_trait::async_trait;

use crate::{
    error::CollaboratorError,
    types::{AudioTrack, GenerationParams, GenerationRequest},
};

/// Turns a creative brief into a structured prompt
#[async_trait]
pub trait PromptDeriver: Send + Sync {
    /// Return the JSON text of a `{ "prompt", "tags" }` object
    async fn derive(&self, request: &GenerationRequest) -> Result<String, CollaboratorError>;
}

/// Synthesizes audio tracks
#[async_trait]
pub trait AudioGenerator: Send + Sync {
    /// Generate tracks, returning whatever the service reports for them
    async fn generate(&self, params: &GenerationParams) -> Result<AudioTrack, CollaboratorError>;
}

/// Fetches previously generated tracks
#[async_trait]
pub trait AudioLookup: Send + Sync {
    /// Look up tracks by id, or list recent tracks when `ids` is `None`
    async fn lookup(&self, ids: Option<&[String]>) -> Result<AudioTrack, CollaboratorError>;
}

/// Map a non-success upstream response into an error, logging the body
pub(crate) async fn upstream_error(service: &str, response: reqwest::Response) -> CollaboratorError {
    let status = response.status();
    let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());

    tracing::error!(%service, %status, body = %message, "upstream returned error");

    CollaboratorError::Upstream {
        status: status.as_u16(),
        message,
    }
}
