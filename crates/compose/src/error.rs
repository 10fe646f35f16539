use std::{fmt, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ComposeError>;

/// Pipeline step a request is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Parsing,
    DerivingPrompt,
    GeneratingAudio,
    LookingUpTracks,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Parsing => "parsing",
            Self::DerivingPrompt => "prompt derivation",
            Self::GeneratingAudio => "audio generation",
            Self::LookingUpTracks => "track lookup",
        })
    }
}

/// Failure reported by an upstream collaborator
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// Network or connection error
    #[error("connection error: {0}")]
    Connection(String),

    /// Upstream answered with a non-success status
    #[error("upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Upstream answered with a body we could not use
    #[error("unexpected upstream response: {0}")]
    Decode(String),

    /// Call did not finish within the configured timeout
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Compose endpoint errors
#[derive(Debug, Error)]
pub enum ComposeError {
    /// Missing or mismatched shared secret
    #[error("Unauthorized")]
    Unauthorized,

    /// Body is not a valid generation request
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// One of the upstream calls failed
    #[error("{phase} failed: {source}")]
    Collaborator {
        phase: Phase,
        #[source]
        source: CollaboratorError,
    },
}

impl ComposeError {
    pub(crate) const fn collaborator(phase: Phase, source: CollaboratorError) -> Self {
        Self::Collaborator { phase, source }
    }

    /// HTTP status code under the typed error policy
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            Self::Collaborator {
                source: CollaboratorError::Timeout(_),
                ..
            } => StatusCode::GATEWAY_TIMEOUT,
            Self::Collaborator { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// Error type string for the response
    pub fn error_type(&self) -> &str {
        match self {
            Self::Unauthorized => "authentication_error",
            Self::MalformedRequest(_) => "invalid_request_error",
            Self::Collaborator {
                source: CollaboratorError::Timeout(_),
                ..
            } => "timeout_error",
            Self::Collaborator { .. } => "api_error",
        }
    }

    /// Message that is safe to expose to API consumers
    ///
    /// Upstream bodies can echo credentials or prompts, so collaborator
    /// failures only name the phase.
    pub fn client_message(&self) -> String {
        match self {
            Self::Collaborator {
                phase,
                source: CollaboratorError::Timeout(_),
            } => format!("{phase} timed out"),
            Self::Collaborator { phase, .. } => format!("{phase} failed"),
            _ => self.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorDetails,
}

#[derive(Debug, Serialize)]
struct ErrorDetails {
    message: String,
    r#type: String,
    code: u16,
}

/// Typed error response, used when `compose.error_policy = "typed"`
impl IntoResponse for ComposeError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error_response = ErrorResponse {
            error: ErrorDetails {
                message: self.client_message(),
                r#type: self.error_type().to_string(),
                code: status.as_u16(),
            },
        };

        (status, Json(error_response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_status_per_kind() {
        assert_eq!(ComposeError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ComposeError::MalformedRequest("missing field `title`".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ComposeError::collaborator(Phase::GeneratingAudio, CollaboratorError::Connection("refused".into()))
                .status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ComposeError::collaborator(Phase::DerivingPrompt, CollaboratorError::Timeout(Duration::from_secs(5)))
                .status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn collaborator_details_stay_out_of_client_message() {
        let error = ComposeError::collaborator(
            Phase::DerivingPrompt,
            CollaboratorError::Upstream {
                status: 401,
                message: "invalid api key sk-live-123".into(),
            },
        );

        assert_eq!(error.client_message(), "prompt derivation failed");
        assert!(error.to_string().contains("sk-live-123"));
    }
}
