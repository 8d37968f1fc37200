//! Next Engine platform client
//!
//! Implements the platform's redirect-based authorization flow and the
//! form-POST API call convention:
//!
//! - Sign-in URI construction (browser redirect to the platform)
//! - `uid`/`state` callback exchange for an access token
//! - Authenticated API execution with the `{result, count, data}` envelope
//!
//! Token persistence is delegated to a [`TokenRepository`], so the client
//! stays decoupled from any particular session mechanism.

mod client;
mod token;

pub use client::{ApiResponse, NextEngineClient};
pub use token::{Token, TokenRepository};
