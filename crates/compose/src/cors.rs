use axum::{
    http::{HeaderName, StatusCode, header},
    response::IntoResponse,
};

/// Permissive cross-origin headers attached to compose responses
pub const CORS_HEADERS: [(HeaderName, &str); 3] = [
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, PUT, DELETE, OPTIONS"),
    (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type, Authorization, auth-token"),
];

/// Answer CORS preflight requests for the compose route
pub async fn preflight() -> impl IntoResponse {
    (StatusCode::NO_CONTENT, CORS_HEADERS)
}
