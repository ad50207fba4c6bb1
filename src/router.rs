use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};
use tracing::Level;

use crate::{handlers, middleware_layer, state::AppState};

/// Builds the session routes.
///
/// `/api/session` and `/api/auth/handoff` need a valid session and refresh
/// it on every call. Logout is open.
pub fn build(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/session", get(handlers::session::current_session))
        .route("/api/auth/handoff", post(handlers::session::handoff))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_session,
        ))
        .with_state(state.clone());

    let public_routes = Router::new()
        .route("/api/auth/logout", post(handlers::session::logout))
        .with_state(state);

    Router::new()
        .merge(protected_routes)
        .merge(public_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::models::session::{SessionPayload, now_millis};
    use crate::session::manager::SessionManager;
    use axum::body::Body;
    use http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app() -> (Router, AppState) {
        let manager =
            SessionManager::new(SessionConfig::new("0123456789abcdef0123456789abcdef")).unwrap();
        let state = AppState::new(manager);
        (build(state.clone()), state)
    }

    fn set_cookie_header(response: &axum::response::Response) -> String {
        response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn session_route_requires_cookie() {
        let (app, _) = app();

        let response = app
            .oneshot(Request::get("/api/session").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert_eq!(body_json(response).await["error"], "NO_COOKIE");
    }

    #[tokio::test]
    async fn session_route_refreshes_cookie() {
        let (app, state) = app();
        let set_cookie = state
            .sessions
            .create_session(&SessionPayload::new("did:plc:abc123", now_millis()))
            .await
            .unwrap();
        let pair = set_cookie.split(';').next().unwrap().to_string();

        let response = app
            .oneshot(
                Request::get("/api/session")
                    .header(header::COOKIE, pair)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let renewal = set_cookie_header(&response);
        assert!(renewal.starts_with("did_session="));
        assert!(renewal.contains("HttpOnly"));

        let body = body_json(response).await;
        assert_eq!(body["did"], "did:plc:abc123");
        assert!(body["createdAt"].is_i64());
        assert!(body["lastAccessed"].as_i64() > body["createdAt"].as_i64());
    }

    #[tokio::test]
    async fn rejected_cookie_is_cleared() {
        let (app, _) = app();

        let response = app
            .oneshot(
                Request::get("/api/session")
                    .header(header::COOKIE, "did_session=garbage")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let clear = set_cookie_header(&response);
        assert!(clear.starts_with("did_session=;"));
        assert!(clear.contains("Max-Age=0"));
        assert_eq!(body_json(response).await["error"], "INVALID_COOKIE");
    }

    #[tokio::test]
    async fn logout_clears_without_session() {
        let (app, _) = app();

        let response = app
            .oneshot(Request::post("/api/auth/logout").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let clear = set_cookie_header(&response);
        assert!(clear.starts_with("did_session=;"));
        assert!(clear.contains("Max-Age=0"));
        assert_eq!(body_json(response).await["success"], true);
    }
}
