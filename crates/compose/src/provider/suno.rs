use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use songsmith_config::AudioConfig;
use url::Url;

use super::{AudioGenerator, AudioLookup, upstream_error};
use crate::{
    error::CollaboratorError,
    http_client::http_client,
    types::{AudioTrack, GenerationParams},
};

const SERVICE: &str = "audio";

/// Client for a Suno-API-compatible audio service
///
/// Serves as both the generator and the lookup collaborator.
pub(crate) struct SunoClient {
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
}

impl SunoClient {
    pub fn new(config: &AudioConfig) -> Self {
        Self {
            client: http_client(),
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{path}", self.base_url)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key.expose_secret()),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<AudioTrack, CollaboratorError> {
        let response = self.authorize(builder).send().await.map_err(|e| {
            tracing::error!(service = SERVICE, error = %e, "upstream request failed");
            CollaboratorError::Connection(e.to_string())
        })?;

        if !response.status().is_success() {
            return Err(upstream_error(SERVICE, response).await);
        }

        response
            .json()
            .await
            .map_err(|e| CollaboratorError::Decode(format!("failed to parse audio response: {e}")))
    }
}

#[async_trait]
impl AudioGenerator for SunoClient {
    async fn generate(&self, params: &GenerationParams) -> Result<AudioTrack, CollaboratorError> {
        tracing::debug!(
            title = %params.title,
            make_instrumental = params.make_instrumental,
            "requesting audio generation"
        );

        self.send(self.client.post(self.endpoint("custom_generate")).json(params))
            .await
    }
}

#[async_trait]
impl AudioLookup for SunoClient {
    async fn lookup(&self, ids: Option<&[String]>) -> Result<AudioTrack, CollaboratorError> {
        let mut url = Url::parse(&self.endpoint("get")).map_err(|e| CollaboratorError::Connection(e.to_string()))?;

        if let Some(ids) = ids {
            url.query_pairs_mut().append_pair("ids", &ids.join(","));
        }

        tracing::debug!(ids = ?ids, "looking up tracks");

        self.send(self.client.get(url)).await
    }
}
