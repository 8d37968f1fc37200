//! Token blob and the persistence seam

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Access token issued by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Access token
    pub access_token: String,

    /// Token type (usually "Bearer")
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Refresh token (optional)
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Token expiration time (Unix timestamp)
    #[serde(default)]
    pub expires_at: Option<u64>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl Token {
    /// Create a token from an exchange response
    #[must_use]
    pub fn from_response(
        access_token: String,
        token_type: Option<String>,
        refresh_token: Option<String>,
        expires_in: Option<u64>,
    ) -> Self {
        let expires_at = expires_in.map(|secs| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs()
                + secs
        });

        Self {
            access_token,
            token_type: token_type.unwrap_or_else(default_token_type),
            refresh_token,
            expires_at,
        }
    }

    /// Check if the token is expired (with 60 second buffer)
    ///
    /// Tokens without expiry metadata never report as expired; the platform
    /// decides their fate on the next API call.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        if let Some(expires_at) = self.expires_at {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs();

            // Consider expired 60 seconds before actual expiry
            now + 60 >= expires_at
        } else {
            false
        }
    }
}

/// Persistence contract for the current request's token.
///
/// `token` returns `Ok(None)` when nothing is stored; that is the
/// unauthenticated state, not an error. `save` must persist synchronously so
/// the token survives into the next request of the same session.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Load the most recently saved token, if any
    async fn token(&self) -> Result<Option<Token>>;

    /// Serialize and persist the token, overwriting any previous one
    async fn save(&self, token: &Token) -> Result<()>;
}
