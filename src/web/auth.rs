//! Access-control gate for protected routes
//!
//! Two states: a session without a token is Unauthenticated and gets
//! redirected to the platform sign-in page with the originally requested
//! path carried as `previous_uri`; a session with a live token passes
//! through untouched. Tokens with a known-passed expiry are treated as
//! Unauthenticated and trigger re-authorization.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::{debug, error, warn};

use super::router::AppState;
use super::session::SessionTokenRepository;
use crate::nextengine::TokenRepository;

/// Gate middleware applied to everything under `/private`
pub async fn require_token(
    State(state): State<Arc<AppState>>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    let repository = SessionTokenRepository::new(session.clone());

    let token = match repository.token().await {
        Ok(token) => token,
        Err(e) => {
            // Unreadable session data counts as unauthenticated
            warn!(error = %e, "Failed to read token from session");
            None
        }
    };

    if let Some(token) = token {
        if token.is_expired() {
            debug!("Session token expired, redirecting to sign-in");
        } else {
            return next.run(request).await;
        }
    }

    let requested = request
        .uri()
        .path_and_query()
        .map_or("/", |pq| pq.as_str());

    let client = state.platform_client(&session);
    match client.sign_in_uri(&[("previous_uri", requested)]) {
        Ok(uri) => Redirect::temporary(uri.as_str()).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to build sign-in URI");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
