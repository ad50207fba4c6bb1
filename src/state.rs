use std::sync::Arc;

use crate::session::manager::SessionManager;

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The session manager shared by every handler.
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    /// Creates a new `AppState`.
    ///
    /// # Arguments
    ///
    /// * `sessions` - The session manager to serve requests with.
    pub fn new(sessions: SessionManager) -> Self {
        tracing::info!(
            cookie_name = sessions.cookie_name(),
            ttl_seconds = sessions.ttl_seconds(),
            "✅ Session manager initialized"
        );

        Self {
            sessions: Arc::new(sessions),
        }
    }
}
