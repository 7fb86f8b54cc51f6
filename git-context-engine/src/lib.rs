//! GitHub access layer for the review bot.
//!
//! * [`git_providers::GitHubClient::collect`] — diff collector (changed files of a PR)
//! * [`git_providers::GitHubClient::publish_comment`] — publisher (issue comment)
//! * [`auth::TokenSource`] — installation-scoped credentials for both calls
//!
//! Errors are reported through [`errors::GitContextEngineError`]; callers
//! match on [`errors::GitContextEngineProviderError`] to tell a host answer
//! (`Api { status, message }`) from a transport failure.

pub mod auth;
pub mod errors;
pub mod git_providers;

pub use auth::{GitHubAppAuth, TokenSource};
pub use errors::{
    GitContextEngineAuthError, GitContextEngineError, GitContextEngineProviderError,
    GitContextEngineResult,
};
pub use git_providers::{ChangedFile, FileStatus, GitHubClient, PullRequestContext};
