//! Session-backed token repository
//!
//! Bridges the in-memory session store to the platform client's
//! [`TokenRepository`] contract. The session holds at most one token under
//! [`SESSION_TOKEN_KEY`]; a save overwrites the previous one and persists the
//! session record within the same request.

use async_trait::async_trait;
use tower_sessions::Session;

use crate::nextengine::{Token, TokenRepository};
use crate::{Error, Result};

/// Key for storing the token in the session
pub const SESSION_TOKEN_KEY: &str = "token";

/// Token repository over the current request's session
#[derive(Debug, Clone)]
pub struct SessionTokenRepository {
    session: Session,
}

impl SessionTokenRepository {
    /// Wrap the request's session
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

#[async_trait]
impl TokenRepository for SessionTokenRepository {
    async fn token(&self) -> Result<Option<Token>> {
        self.session
            .get::<Token>(SESSION_TOKEN_KEY)
            .await
            .map_err(|e| Error::Session(e.to_string()))
    }

    async fn save(&self, token: &Token) -> Result<()> {
        self.session
            .insert(SESSION_TOKEN_KEY, token)
            .await
            .map_err(|e| Error::Session(e.to_string()))?;

        // Persist now so the token is visible to the session's next request
        self.session
            .save()
            .await
            .map_err(|e| Error::Session(e.to_string()))
    }
}
