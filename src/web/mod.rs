//! HTTP surface of the console
//!
//! Routes:
//! - `GET /` — public landing page
//! - `GET /callback` — authorization redirect target
//! - `GET /private/company`, `GET /private/user` — session-gated views
//!
//! The access-control gate runs before everything under `/private` and
//! redirects tokenless sessions to the platform sign-in page.

pub mod auth;
pub mod handlers;
mod router;
mod server;
pub mod session;

pub use router::{AppState, create_router};
pub use server::ConsoleServer;
