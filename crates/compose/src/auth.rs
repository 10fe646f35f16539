use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderName, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use secrecy::{ExposeSecret, SecretString};
use songsmith_config::{Config, ErrorPolicy};

use crate::error::ComposeError;

/// True only when both values are present and identical
pub fn authorize(credential: Option<&str>, expected: Option<&str>) -> bool {
    matches!((credential, expected), (Some(credential), Some(expected)) if credential == expected)
}

/// Shared-secret check in front of the compose endpoint
pub struct AuthGate {
    header: HeaderName,
    expected: Option<SecretString>,
    policy: ErrorPolicy,
}

impl AuthGate {
    pub fn new(header: HeaderName, expected: Option<SecretString>, policy: ErrorPolicy) -> Self {
        Self {
            header,
            expected,
            policy,
        }
    }

    /// Build the gate from `[auth]` and `[compose]`
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let header = HeaderName::try_from(config.auth.header_name.as_str())
            .map_err(|e| anyhow::anyhow!("invalid auth header name `{}`: {e}", config.auth.header_name))?;

        Ok(Self::new(header, config.auth.token.clone(), config.compose.error_policy))
    }

    /// Check the credential carried by `headers`
    ///
    /// Header values that are not visible ASCII count as absent.
    pub fn permits(&self, headers: &http::HeaderMap) -> bool {
        let credential = headers.get(&self.header).and_then(|value| value.to_str().ok());
        authorize(credential, self.expected.as_ref().map(|token| token.expose_secret()))
    }

    fn reject(&self) -> Response {
        match self.policy {
            ErrorPolicy::Compatible => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
            ErrorPolicy::Typed => ComposeError::Unauthorized.into_response(),
        }
    }
}

/// Reject requests without the expected token before any pipeline work
pub async fn require_token(State(gate): State<Arc<AuthGate>>, request: Request, next: Next) -> Response {
    if gate.permits(request.headers()) {
        return next.run(request).await;
    }

    tracing::warn!(
        path = %request.uri().path(),
        header = %gate.header,
        "rejected compose request with missing or invalid token"
    );

    gate.reject()
}
