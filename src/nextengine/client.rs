//! Platform API client
//!
//! One client is constructed per request, bound to the credentials from the
//! configuration and the current session's token repository.

use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use super::token::{Token, TokenRepository};
use crate::config::{ApiConfig, OAuthConfig};
use crate::{Error, Result};

/// Path of the platform sign-in page (on the auth base URL)
const SIGN_IN_PATH: &str = "/users/sign_in/";

/// Path of the token exchange endpoint (on the API base URL)
const AUTH_EXCHANGE_PATH: &str = "/api_neauth";

/// Client for the platform's authorization flow and REST API
pub struct NextEngineClient {
    /// HTTP client for token and API requests
    http_client: Client,

    /// Client ID issued by the platform
    client_id: String,

    /// Client secret issued by the platform
    client_secret: String,

    /// Redirect URI registered with the platform
    redirect_uri: String,

    /// Base URL of the sign-in page
    auth_base_url: String,

    /// Base URL of the API
    api_base_url: String,

    /// Token persistence for the current session
    repository: Arc<dyn TokenRepository>,
}

/// Token exchange response
#[derive(Debug, Deserialize)]
struct ExchangeResponse {
    access_token: Option<String>,
    token_type: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
    code: Option<String>,
    message: Option<String>,
}

/// Envelope every API endpoint replies with
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    result: Option<String>,
    count: Option<u64>,
    #[serde(default)]
    data: Option<Value>,
    code: Option<String>,
    message: Option<String>,
}

/// Decoded API response for a successful call
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// Record count reported by the platform
    pub count: Option<u64>,
    /// Result payload (shape depends on the endpoint)
    pub data: Value,
}

impl NextEngineClient {
    /// Create a client bound to credentials and a token repository
    #[must_use]
    pub fn new(
        http_client: Client,
        oauth: &OAuthConfig,
        api: &ApiConfig,
        repository: Arc<dyn TokenRepository>,
    ) -> Self {
        Self {
            http_client,
            client_id: oauth.client_id.clone(),
            client_secret: oauth.client_secret.clone(),
            redirect_uri: oauth.redirect_uri.clone(),
            auth_base_url: api.auth_base_url.clone(),
            api_base_url: api.api_base_url.clone(),
            repository,
        }
    }

    /// Build the sign-in URI the browser is redirected to.
    ///
    /// Extra query pairs (e.g. `previous_uri`) are appended after the client
    /// identifier and redirect URI.
    pub fn sign_in_uri(&self, extra: &[(&str, &str)]) -> Result<Url> {
        let mut uri = Url::parse(&self.auth_base_url)
            .and_then(|base| base.join(SIGN_IN_PATH))
            .map_err(|e| Error::Config(format!("Invalid auth base URL: {e}")))?;

        {
            let mut params = uri.query_pairs_mut();
            params.append_pair("client_id", &self.client_id);
            params.append_pair("redirect_uri", &self.redirect_uri);
            for (key, value) in extra {
                params.append_pair(key, value);
            }
        }

        Ok(uri)
    }

    /// Exchange the callback's `uid`/`state` pair for a token.
    ///
    /// The token is persisted through the repository before it is returned,
    /// so a successful exchange leaves the session authenticated.
    pub async fn authorize(&self, uid: &str, state: &str) -> Result<Token> {
        let endpoint = format!("{}{}", self.api_base_url, AUTH_EXCHANGE_PATH);

        let params: Vec<(&str, &str)> = vec![
            ("uid", uid),
            ("state", state),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
        ];

        let response = self
            .http_client
            .post(&endpoint)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Authorization(format!(
                "Token exchange failed: HTTP {status} - {body}"
            )));
        }

        let exchange: ExchangeResponse = response.json().await?;
        let token = token_from_exchange(exchange)?;

        self.repository.save(&token).await?;
        info!("Authorization exchange succeeded");

        Ok(token)
    }

    /// Execute an API endpoint with the session's token.
    ///
    /// Fails with [`Error::Authorization`] when the session holds no token;
    /// the gate normally prevents that from being reached.
    pub async fn api_execute(&self, path: &str, params: &[(&str, &str)]) -> Result<ApiResponse> {
        let token = self
            .repository
            .token()
            .await?
            .ok_or_else(|| Error::Authorization("No token in session".to_string()))?;

        let endpoint = format!("{}{}", self.api_base_url, path);

        let mut form: Vec<(&str, &str)> = vec![("access_token", token.access_token.as_str())];
        if let Some(ref refresh) = token.refresh_token {
            form.push(("refresh_token", refresh.as_str()));
        }
        form.extend_from_slice(params);

        debug!(path = %path, "Executing API call");

        let response = self.http_client.post(&endpoint).form(&form).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                code: status.as_str().to_string(),
                message: body,
            });
        }

        let envelope: ApiEnvelope = response.json().await?;
        decode_envelope(envelope)
    }
}

/// Map an exchange response to a token, or the platform's error report
fn token_from_exchange(exchange: ExchangeResponse) -> Result<Token> {
    match exchange.access_token {
        Some(access_token) => Ok(Token::from_response(
            access_token,
            exchange.token_type,
            exchange.refresh_token,
            exchange.expires_in,
        )),
        None => {
            let code = exchange.code.unwrap_or_else(|| "unknown".to_string());
            let message = exchange
                .message
                .unwrap_or_else(|| "no access token in exchange response".to_string());
            Err(Error::Authorization(format!("{code}: {message}")))
        }
    }
}

/// Unwrap the `{result, count, data}` envelope
fn decode_envelope(envelope: ApiEnvelope) -> Result<ApiResponse> {
    match envelope.result.as_deref() {
        Some("success") => Ok(ApiResponse {
            count: envelope.count,
            data: envelope.data.unwrap_or(Value::Null),
        }),
        _ => Err(Error::Api {
            code: envelope.code.unwrap_or_else(|| "unknown".to_string()),
            message: envelope
                .message
                .unwrap_or_else(|| "request was not successful".to_string()),
        }),
    }
}
