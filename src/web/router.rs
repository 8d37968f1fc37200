//! HTTP router and shared state

use std::sync::Arc;

use axum::{Router, middleware, routing::get};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};

use super::{auth, handlers, session::SessionTokenRepository};
use crate::config::Config;
use crate::nextengine::NextEngineClient;

/// Shared application state
pub struct AppState {
    /// Configuration
    pub config: Arc<Config>,
    /// HTTP client shared across requests (connection pooling)
    pub http_client: reqwest::Client,
}

impl AppState {
    /// Create state from configuration
    #[must_use]
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Build a platform client bound to the request's session
    #[must_use]
    pub fn platform_client(&self, session: &Session) -> NextEngineClient {
        let repository = Arc::new(SessionTokenRepository::new(session.clone()));
        NextEngineClient::new(
            self.http_client.clone(),
            &self.config.oauth,
            &self.config.api,
            repository,
        )
    }
}

/// Create the router
///
/// Each router owns its session store; tokens live there for the lifetime of
/// the process and are lost on restart.
pub fn create_router(state: Arc<AppState>) -> Router {
    let session_config = &state.config.session;
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_name(session_config.cookie_name.clone())
        .with_secure(session_config.secure_cookie)
        .with_expiry(Expiry::OnInactivity(time::Duration::seconds(
            i64::try_from(session_config.inactivity_timeout_secs).unwrap_or(i64::MAX),
        )));

    // Full paths plus merge (rather than nest) so the gate sees the original
    // request URI when it builds previous_uri
    let private = Router::new()
        .route("/private/company", get(handlers::company))
        .route("/private/user", get(handlers::user))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_token,
        ));

    Router::new()
        .route("/", get(handlers::landing))
        .route("/callback", get(handlers::callback))
        .merge(private)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
