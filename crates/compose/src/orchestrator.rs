use std::{future::Future, sync::Arc, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use songsmith_config::{Config, DEFAULT_MAX_BODY_SIZE, ErrorPolicy};

use crate::{
    cors::CORS_HEADERS,
    error::{CollaboratorError, ComposeError, Phase, Result},
    journal::{FileJournal, RequestLog},
    provider::{AudioGenerator, AudioLookup, PromptDeriver, chat::ChatPromptDeriver, suno::SunoClient},
    types::{AudioTrack, DerivedPrompt, GenerationParams, GenerationRequest},
};

/// Body returned when the final lookup fails under the compatible policy
const LOOKUP_FAILURE_MESSAGE: &str = "Internal server error";

/// Target for intermediate values when debug mode is on
const DIAGNOSTICS_TARGET: &str = "songsmith::diagnostics";

/// Upstream services the pipeline calls
#[derive(Clone)]
pub struct Collaborators {
    pub deriver: Arc<dyn PromptDeriver>,
    pub generator: Arc<dyn AudioGenerator>,
    pub lookup: Arc<dyn AudioLookup>,
}

/// Knobs that shape pipeline behavior
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    pub debug: bool,
    pub error_policy: ErrorPolicy,
    pub timeout: Option<Duration>,
    pub max_body_size: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            debug: false,
            error_policy: ErrorPolicy::default(),
            timeout: None,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

/// Runs a brief through prompt derivation, audio generation and track lookup
pub struct Orchestrator {
    collaborators: Collaborators,
    journal: Arc<dyn RequestLog>,
    settings: PipelineSettings,
}

impl Orchestrator {
    pub fn new(collaborators: Collaborators, journal: Arc<dyn RequestLog>, settings: PipelineSettings) -> Self {
        Self {
            collaborators,
            journal,
            settings,
        }
    }

    /// Handle one compose request
    ///
    /// Failures before the lookup are journaled and answered according to the
    /// error policy. A failed lookup is answered on its own terms and never
    /// journaled.
    pub async fn handle(&self, body: &[u8], query: Option<&str>) -> Response {
        if let Err(error) = self.generate(body).await {
            return self.fail(error).await;
        }

        let ids = track_ids(query);

        tracing::debug!(phase = %Phase::LookingUpTracks, ids = ?ids, "entering phase");

        match self
            .call(Phase::LookingUpTracks, self.collaborators.lookup.lookup(ids.as_deref()))
            .await
        {
            Ok(tracks) => {
                tracing::debug!("compose request responded");
                (StatusCode::OK, CORS_HEADERS, Json(tracks)).into_response()
            }
            Err(error) => {
                tracing::error!(%error, "track lookup failed");
                self.lookup_failure_response(error)
            }
        }
    }

    /// Answer a request whose body could not be read
    ///
    /// Treated like any other malformed brief: journaled and answered
    /// according to the error policy.
    pub async fn reject_body(&self, reason: &str) -> Response {
        self.fail(ComposeError::MalformedRequest(reason.to_string())).await
    }

    pub const fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    async fn fail(&self, error: ComposeError) -> Response {
        tracing::error!(%error, "compose request failed");
        self.record(&format!("Error: {error}")).await;
        self.failure_response(error)
    }

    /// Parse, derive and generate, journaling each upstream result
    async fn generate(&self, body: &[u8]) -> Result<AudioTrack> {
        tracing::debug!(phase = %Phase::Parsing, "entering phase");

        let mut request: GenerationRequest =
            serde_json::from_slice(body).map_err(|e| ComposeError::MalformedRequest(e.to_string()))?;
        request.truncate_title();

        tracing::debug!(phase = %Phase::DerivingPrompt, "entering phase");

        let raw = self
            .call(Phase::DerivingPrompt, self.collaborators.deriver.derive(&request))
            .await?;
        let derived: DerivedPrompt = serde_json::from_str(&raw).map_err(|e| {
            ComposeError::collaborator(
                Phase::DerivingPrompt,
                CollaboratorError::Decode(format!("derived prompt is not a prompt/tags object: {e}")),
            )
        })?;

        if self.settings.debug {
            tracing::info!(target: DIAGNOSTICS_TARGET, derived_prompt = %derived, "prompt derived");
        }
        self.record(&format!("derived_prompt: {derived}")).await;

        tracing::debug!(phase = %Phase::GeneratingAudio, "entering phase");

        let params = GenerationParams::new(&request, derived);
        let generated = self
            .call(Phase::GeneratingAudio, self.collaborators.generator.generate(&params))
            .await?;

        if self.settings.debug {
            tracing::info!(target: DIAGNOSTICS_TARGET, generated_audio = %generated, "audio generated");
        }
        self.record(&format!("generated_audio: {generated}")).await;

        Ok(generated)
    }

    /// Await an upstream call, bounded by the configured timeout
    async fn call<T>(
        &self,
        phase: Phase,
        upstream: impl Future<Output = std::result::Result<T, CollaboratorError>>,
    ) -> Result<T> {
        let outcome = match self.settings.timeout {
            Some(limit) => tokio::time::timeout(limit, upstream)
                .await
                .unwrap_or(Err(CollaboratorError::Timeout(limit))),
            None => upstream.await,
        };

        outcome.map_err(|source| ComposeError::collaborator(phase, source))
    }

    /// Best-effort journal append
    async fn record(&self, message: &str) {
        if let Err(e) = self.journal.append(message).await {
            tracing::warn!(error = %e, "failed to write request journal entry");
        }
    }

    fn failure_response(&self, error: ComposeError) -> Response {
        match self.settings.error_policy {
            ErrorPolicy::Compatible => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response(),
            ErrorPolicy::Typed => error.into_response(),
        }
    }

    fn lookup_failure_response(&self, error: ComposeError) -> Response {
        match self.settings.error_policy {
            ErrorPolicy::Compatible => (
                StatusCode::OK,
                CORS_HEADERS,
                Json(serde_json::json!({ "error": LOOKUP_FAILURE_MESSAGE })),
            )
                .into_response(),
            ErrorPolicy::Typed => (CORS_HEADERS, error).into_response(),
        }
    }
}

/// Track ids from the `ids` query parameter, in the order given
///
/// Absent or empty means "no ids". Segments are kept verbatim.
fn track_ids(query: Option<&str>) -> Option<Vec<String>> {
    let raw = url::form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == "ids")
        .map(|(_, value)| value.into_owned())?;

    (!raw.is_empty()).then(|| raw.split(',').map(str::to_string).collect())
}

/// Builder for constructing the orchestrator from configuration
pub struct PipelineBuilder<'a> {
    config: &'a Config,
}

impl<'a> PipelineBuilder<'a> {
    pub const fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn build(self) -> anyhow::Result<Orchestrator> {
        let audio = Arc::new(SunoClient::new(&self.config.audio));

        let collaborators = Collaborators {
            deriver: Arc::new(ChatPromptDeriver::new(&self.config.prompt)),
            generator: audio.clone(),
            lookup: audio,
        };

        let journal = FileJournal::new(self.config.journal.path.clone());

        let settings = PipelineSettings {
            debug: self.config.compose.debug,
            error_policy: self.config.compose.error_policy,
            timeout: self.config.compose.timeout_duration()?,
            max_body_size: self.config.compose.max_body_size,
        };

        tracing::debug!(
            journal = %journal.path().display(),
            prompt_model = %self.config.prompt.model,
            audio_url = %self.config.audio.base_url,
            "compose pipeline initialized"
        );

        Ok(Orchestrator::new(collaborators, Arc::new(journal), settings))
    }
}
