use axum::{
    extract::State,
    http::{HeaderValue, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;

use crate::{
    error::{AppError, Result},
    models::session::SessionPayload,
    state::AppState,
};

/// The response payload for logout.
#[derive(Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
}

/// The response payload for a mobile handoff.
#[derive(Serialize)]
pub struct HandoffResponse {
    /// A sealed session the client presents later as its cookie value.
    pub token: String,
}

/// Returns the caller's (already refreshed) session.
pub async fn current_session(
    Extension(session): Extension<SessionPayload>,
) -> Json<SessionPayload> {
    tracing::debug!("👤 Session lookup for: {}", session.did);
    Json(session)
}

/// Issues a sealed token that carries the caller's identity to another client.
#[axum::debug_handler]
pub async fn handoff(
    State(state): State<AppState>,
    Extension(session): Extension<SessionPayload>,
) -> Result<Response> {
    tracing::info!("📱 Handoff token requested by: {}", session.did);

    let token = state.sessions.seal_token(&session.did).await?;

    Ok((StatusCode::OK, Json(HandoffResponse { token })).into_response())
}

/// Handles logout by telling the client to drop its session cookie.
///
/// Works without a valid session: the cookie is the only state.
#[axum::debug_handler]
pub async fn logout(State(state): State<AppState>) -> Result<Response> {
    let clear = state.sessions.get_clear_cookie_header();

    let response = AuthResponse {
        success: true,
        message: "Logout successful".to_string(),
    };

    tracing::info!("👋 Session cookie cleared");

    let mut response = (StatusCode::OK, Json(response)).into_response();
    let value = HeaderValue::from_str(&clear)
        .map_err(|e| AppError::Internal(format!("Invalid clear cookie header: {}", e)))?;
    response.headers_mut().append(SET_COOKIE, value);

    Ok(response)
}
