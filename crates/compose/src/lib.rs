#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod auth;
mod cors;
mod error;
mod http_client;
mod journal;
mod orchestrator;
mod provider;
mod types;

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, RawQuery, State, rejection::BytesRejection},
    middleware,
    response::Response,
    routing::post,
};

pub use auth::{AuthGate, authorize};
pub use error::{CollaboratorError, ComposeError, Phase, Result};
pub use journal::{FileJournal, JournalError, LogEntry, MemoryJournal, RequestLog};
pub use orchestrator::{Collaborators, Orchestrator, PipelineBuilder, PipelineSettings};
pub use provider::{AudioGenerator, AudioLookup, PromptDeriver};
pub use types::{AudioTrack, DerivedPrompt, GenerationParams, GenerationRequest, MAX_TITLE_CHARS};

/// Build the compose pipeline from configuration
pub fn build_server(config: &songsmith_config::Config) -> anyhow::Result<Arc<Orchestrator>> {
    let orchestrator = PipelineBuilder::new(config)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to initialize compose pipeline: {e}"))?;

    Ok(Arc::new(orchestrator))
}

/// Create the compose router
///
/// `POST` is gated by `gate`; `OPTIONS` answers CORS preflight without a token.
/// Bodies over the orchestrator's `max_body_size` reach the handler as a
/// rejection and are answered as malformed briefs.
pub fn endpoint_router(path: &str, orchestrator: Arc<Orchestrator>, gate: AuthGate) -> Router {
    let route = post(compose)
        .layer(DefaultBodyLimit::max(orchestrator.settings().max_body_size))
        .route_layer(middleware::from_fn_with_state(Arc::new(gate), auth::require_token))
        .options(cors::preflight);

    Router::new().route(path, route).with_state(orchestrator)
}

/// Handle compose requests
#[tracing::instrument(name = "compose", skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
async fn compose(
    State(orchestrator): State<Arc<Orchestrator>>,
    RawQuery(query): RawQuery,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => return orchestrator.reject_body(&rejection.body_text()).await,
    };

    tracing::debug!(body_len = body.len(), "compose handler called");

    orchestrator.handle(&body, query.as_deref()).await
}
