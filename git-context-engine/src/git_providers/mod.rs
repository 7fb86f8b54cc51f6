//! GitHub provider facade.
//!
//! The review bot only talks to GitHub, through two REST operations:
//!   * reading the changed files of a pull request (diff collection)
//!   * creating a comment on the pull request's issue thread (publication)
//!
//! The HTTP client is built once at startup and shared between runs; every
//! run wraps it in its own [`GitHubClient`] bound to one installation token.

pub mod github;
pub mod types;

pub use github::{GitHubClient, PublishedComment};
pub use types::*;

use crate::errors::GitContextEngineResult;
use tracing::debug;

/// Public GitHub REST API base.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Stable user agent; GitHub rejects requests without one.
pub const USER_AGENT: &str = concat!("pr-review-bot/", env!("CARGO_PKG_VERSION"));

/// Builds the shared HTTP client used for all GitHub calls.
///
/// No request timeout is configured: calls rely on the transport defaults.
pub fn build_http_client() -> GitContextEngineResult<reqwest::Client> {
    debug!("Initializing GitHub HTTP client: user_agent={}", USER_AGENT);

    let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
    Ok(client)
}
