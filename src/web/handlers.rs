//! Route handlers
//!
//! The landing page is public; the callback performs the token exchange;
//! company and user pass the session's token through to one fixed platform
//! endpoint each and render the first record as an HTML table.
//!
//! Failures never surface an error page: a failed exchange redirects to the
//! landing page, a failed API call renders an empty body. Both leave an
//! operator-visible log line.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::Value;
use tower_sessions::Session;
use tracing::{error, warn};

use super::router::AppState;

/// Callback query parameters
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    /// Authorization identifier issued by the platform
    pub uid: Option<String>,

    /// State parameter (CSRF protection, issued by the platform)
    pub state: Option<String>,

    /// Path the user was originally headed to
    pub previous_uri: Option<String>,
}

/// GET / - public landing page
pub async fn landing() -> Html<String> {
    Html(landing_page())
}

/// GET /callback - exchange the authorization identifiers for a token
pub async fn callback(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(params): Query<CallbackParams>,
) -> Response {
    let (Some(uid), Some(auth_state)) = (params.uid, params.state) else {
        warn!("Callback missing uid or state");
        return Redirect::temporary("/").into_response();
    };

    let client = state.platform_client(&session);
    if let Err(e) = client.authorize(&uid, &auth_state).await {
        warn!(error = %e, "Authorization exchange failed");
        return Redirect::temporary("/").into_response();
    }

    Redirect::temporary(redirect_target(params.previous_uri.as_deref())).into_response()
}

/// GET /private/company - company info pass-through
pub async fn company(State(state): State<Arc<AppState>>, session: Session) -> Response {
    let client = state.platform_client(&session);
    match client.api_execute("/api_app/company", &[]).await {
        Ok(response) => {
            Html(record_page("Company", first_record(&response.data))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Company lookup failed");
            Html(String::new()).into_response()
        }
    }
}

/// GET /private/user - logged-in user info pass-through
pub async fn user(State(state): State<Arc<AppState>>, session: Session) -> Response {
    let client = state.platform_client(&session);
    match client.api_execute("/api_v1_login_user/info", &[]).await {
        Ok(response) => Html(record_page("User", first_record(&response.data))).into_response(),
        Err(e) => {
            error!(error = %e, "User lookup failed");
            Html(String::new()).into_response()
        }
    }
}

/// Pick the post-callback redirect target.
///
/// Only same-site relative paths are followed; anything else (absolute URLs,
/// protocol-relative `//host` forms, garbage) falls back to `/`.
fn redirect_target(previous_uri: Option<&str>) -> &str {
    match previous_uri {
        Some(uri) if uri.starts_with('/') && !uri.starts_with("//") => uri,
        _ => "/",
    }
}

/// First element of an array payload, or the payload itself
fn first_record(data: &Value) -> &Value {
    match data {
        Value::Array(items) => items.first().unwrap_or(&Value::Null),
        other => other,
    }
}

fn landing_page() -> String {
    r#"<!DOCTYPE html>
<html>
<head>
    <title>Next Engine Console</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 3rem auto; max-width: 40rem; }
        h1 { margin-bottom: 0.5rem; }
        ul { line-height: 1.8; }
    </style>
</head>
<body>
    <h1>Next Engine Console</h1>
    <p>Sign in happens automatically when you open a private page.</p>
    <ul>
        <li><a href="/private/company">Company info</a></li>
        <li><a href="/private/user">Logged-in user</a></li>
    </ul>
</body>
</html>"#
        .to_string()
}

/// Render one record as a key/value table
fn record_page(title: &str, record: &Value) -> String {
    let rows = match record.as_object() {
        Some(map) if !map.is_empty() => map
            .iter()
            .map(|(key, value)| {
                let rendered = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                format!(
                    "        <tr><th>{}</th><td>{}</td></tr>\n",
                    html_escape(key),
                    html_escape(&rendered)
                )
            })
            .collect::<String>(),
        _ => "        <tr><td>No data</td></tr>\n".to_string(),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>{title}</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 3rem auto; max-width: 40rem; }}
        table {{ border-collapse: collapse; }}
        th, td {{ border: 1px solid #ccc; padding: 0.4rem 0.8rem; text-align: left; }}
    </style>
</head>
<body>
    <h1>{title}</h1>
    <table>
{rows}    </table>
    <p><a href="/">Back</a></p>
</body>
</html>"#
    )
}

/// Minimal HTML escaping for untrusted platform data
fn html_escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn callback_params_deserialize() {
        let params: CallbackParams =
            serde_urlencoded::from_str("uid=abc123&state=xyz789&previous_uri=%2Fprivate%2Fuser")
                .unwrap();

        assert_eq!(params.uid, Some("abc123".to_string()));
        assert_eq!(params.state, Some("xyz789".to_string()));
        assert_eq!(params.previous_uri, Some("/private/user".to_string()));
    }

    #[test]
    fn redirect_target_accepts_relative_paths() {
        assert_eq!(redirect_target(Some("/private/user")), "/private/user");
        assert_eq!(redirect_target(Some("/private/company?x=1")), "/private/company?x=1");
    }

    #[test]
    fn redirect_target_defaults_to_root() {
        assert_eq!(redirect_target(None), "/");
        assert_eq!(redirect_target(Some("")), "/");
    }

    #[test]
    fn redirect_target_rejects_external_targets() {
        assert_eq!(redirect_target(Some("https://evil.example")), "/");
        assert_eq!(redirect_target(Some("//evil.example/path")), "/");
        assert_eq!(redirect_target(Some("javascript:alert(1)")), "/");
    }

    #[test]
    fn first_record_unwraps_arrays() {
        let data = json!([{"name": "Acme"}, {"name": "Other"}]);
        assert_eq!(first_record(&data), &json!({"name": "Acme"}));

        let empty = json!([]);
        assert_eq!(first_record(&empty), &Value::Null);

        let object = json!({"name": "Acme"});
        assert_eq!(first_record(&object), &object);
    }

    #[test]
    fn record_page_escapes_untrusted_values() {
        let record = json!({"company_name": "<script>alert(1)</script>"});
        let page = record_page("Company", &record);

        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<script>alert"));
    }

    #[test]
    fn record_page_without_data_says_so() {
        let page = record_page("User", &Value::Null);
        assert!(page.contains("No data"));
    }

    #[test]
    fn html_escape_handles_all_specials() {
        assert_eq!(
            html_escape(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;"
        );
    }
}
