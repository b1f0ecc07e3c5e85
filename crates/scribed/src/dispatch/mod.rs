//! JSONL request dispatch for theme file commands.
//!
//! Each connection carries exactly one request line:
//!
//! ```json
//! {"command":{"domain":"theme","operation":"edit-file"},"token":"s3cret","arguments":{"file":"style.css","code":"body{}","previous_hash":"..."}}
//! ```
//!
//! The daemon answers with `stream` messages and a terminal `exit`:
//!
//! ```json
//! {"kind":"stream","stream":"stdout","data":"{\"success\":true,\"file\":\"style.css\",\"hash\":\"...\"}\n"}
//! {"kind":"exit","status":0}
//! ```
//!
//! Failures are written to `stderr` as an error envelope carrying a stable
//! `code` and an HTTP-class status. Exit status 1 means the caller can fix
//! the request (4xx); 2 means the daemon failed (5xx).

mod auth;
mod errors;
mod handler;
mod request;
mod response;
mod router;
mod theme;

pub(crate) use self::auth::TokenAuthenticator;
pub(crate) use self::handler::DispatchConnectionHandler;

/// Tracing target for authentication and confinement audits.
pub(crate) const SECURITY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::security");
