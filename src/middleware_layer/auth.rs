use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    error::{AppError, SessionErrorKind},
    models::session::SessionResult,
    state::AppState,
};

/// Appends a `Set-Cookie` header, skipping values that are not valid header bytes.
fn append_set_cookie(response: &mut Response, set_cookie: &str) {
    match HeaderValue::from_str(set_cookie) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(e) => {
            tracing::error!("❌ Refusing to emit invalid Set-Cookie header: {}", e);
        }
    }
}

/// A middleware that requires a valid session to be present.
///
/// On success the refreshed `SessionPayload` is placed in the request
/// extensions and the renewal cookie is attached to whatever the inner
/// handler returns. A cookie that is present but rejected is also cleared.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `request` - The incoming request.
/// * `next` - The next middleware in the chain.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    tracing::debug!("🔐 Checking session...");

    match state.sessions.get_session_from_request(&request).await {
        SessionResult::Active { data, set_cookie } => {
            tracing::debug!("✅ Session valid for: {}", data.did);

            request.extensions_mut().insert(data);
            let mut response = next.run(request).await;
            append_set_cookie(&mut response, &set_cookie);
            response
        }
        SessionResult::Rejected { error } => {
            let clear = matches!(
                error.kind(),
                SessionErrorKind::InvalidCookie | SessionErrorKind::SessionExpired
            );
            if let Some(detail) = error.detail() {
                tracing::debug!("❌ Session rejected ({}): {}", error.kind(), detail);
            }

            let mut response = AppError::Session(error).into_response();
            if clear {
                append_set_cookie(&mut response, &state.sessions.get_clear_cookie_header());
            }
            response
        }
    }
}
