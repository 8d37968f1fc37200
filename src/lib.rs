//! Next Engine web console
//!
//! A small web front-end for the Next Engine platform API:
//!
//! - redirects the browser to the platform sign-in page
//! - exchanges the `uid`/`state` callback for an access token
//! - keeps the token in a server-side session
//! - renders company and logged-in user information as HTML
//!
//! Tokens live only in the in-memory session store and disappear on restart.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod error;
pub mod nextengine;
pub mod web;

pub use error::{Error, Result};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Setup tracing/logging
pub fn setup_tracing(level: &str, format: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        Some("json") => {
            subscriber.with(fmt::layer().json()).init();
        }
        _ => {
            subscriber.with(fmt::layer()).init();
        }
    }

    Ok(())
}
