//! Crate-wide error hierarchy for git-context-engine.

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type GitContextEngineResult<T> = Result<T, GitContextEngineError>;

/// Root error type for the git-context-engine crate.
#[derive(Debug, Error)]
pub enum GitContextEngineError {
    /// GitHub REST call failed (non-2xx answer or transport problem).
    #[error(transparent)]
    Provider(#[from] GitContextEngineProviderError),

    /// Installation token could not be obtained.
    #[error(transparent)]
    Auth(#[from] GitContextEngineAuthError),

    /// Input validation errors (empty owner/repo, zero PR number, ...).
    #[error("validation error: {0}")]
    Validation(String),
}

/// Remote fetch failure raised by the provider layer.
///
/// `Api` means the host answered with a non-success status; every other
/// variant means no usable HTTP answer was received.
#[derive(Debug, Error)]
pub enum GitContextEngineProviderError {
    /// Host answered with a non-2xx status.
    #[error("GitHub API error: status {status}: {message}")]
    Api {
        /// HTTP status code reported by the host.
        status: u16,
        /// `message` field of the JSON error body, or the raw body snippet.
        message: String,
    },

    /// Timeout at transport level.
    #[error("timeout")]
    Timeout,

    /// Network/transport failure without HTTP status (DNS/connect/reset).
    #[error("network error: {0}")]
    Transport(String),

    /// Response body did not have the expected shape.
    #[error("invalid provider response: {0}")]
    Decode(String),
}

impl GitContextEngineProviderError {
    /// HTTP status reported by the host, if the host answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Timeout | Self::Transport(_) | Self::Decode(_) => None,
        }
    }
}

/// GitHub App authentication errors.
#[derive(Debug, Error)]
pub enum GitContextEngineAuthError {
    /// The PEM private key could not be parsed as an RSA key.
    #[error("invalid GitHub App private key: {0}")]
    InvalidPrivateKey(String),

    /// The delivery carried no installation id, so no token can be minted.
    #[error("webhook delivery has no installation id")]
    MissingInstallation,

    /// GitHub rejected the app JWT or the installation token exchange.
    #[error("installation token exchange failed: {0}")]
    TokenExchange(String),
}

impl GitContextEngineError {
    /// HTTP status of the underlying host answer, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Provider(e) => e.status(),
            Self::Auth(_) | Self::Validation(_) => None,
        }
    }
}

// ===== Conversions for `?` ergonomics at the crate root =====

impl From<reqwest::Error> for GitContextEngineError {
    fn from(e: reqwest::Error) -> Self {
        GitContextEngineError::Provider(GitContextEngineProviderError::from(e))
    }
}

impl From<reqwest::Error> for GitContextEngineProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return GitContextEngineProviderError::Timeout;
        }
        if e.is_decode() {
            return GitContextEngineProviderError::Decode(e.to_string());
        }
        if let Some(status) = e.status() {
            return GitContextEngineProviderError::Api {
                status: status.as_u16(),
                message: e.to_string(),
            };
        }

        GitContextEngineProviderError::Transport(e.to_string())
    }
}

impl From<octocrab::Error> for GitContextEngineAuthError {
    fn from(e: octocrab::Error) -> Self {
        match e {
            octocrab::Error::GitHub { source, .. } => GitContextEngineAuthError::TokenExchange(
                format!("status {}: {}", source.status_code.as_u16(), source.message),
            ),
            other => GitContextEngineAuthError::TokenExchange(other.to_string()),
        }
    }
}
