//! Installation-scoped GitHub credentials.
//!
//! A GitHub App authenticates as itself with a short-lived RS256 JWT signed by
//! its private key, then trades that JWT for an installation access token:
//!   * POST /app/installations/{installation_id}/access_tokens
//!
//! The exchange is delegated to `octocrab`; the resulting token is handed to
//! the plain `reqwest` client in [`crate::git_providers::GitHubClient`].

use std::fmt;

use jsonwebtoken::EncodingKey;
use octocrab::Octocrab;
use octocrab::models::{AppId, InstallationId};
use secrecy::ExposeSecret;
use tracing::{debug, instrument};

use crate::errors::{GitContextEngineAuthError, GitContextEngineResult};

/// GitHub App identity: app id + private signing key.
#[derive(Clone)]
pub struct GitHubAppAuth {
    app_id: u64,
    key: EncodingKey,
    base_api: String,
}

impl GitHubAppAuth {
    /// Parses the PEM-encoded RSA private key downloaded from the App settings.
    pub fn from_pem(
        app_id: u64,
        pem: &[u8],
        base_api: impl Into<String>,
    ) -> Result<Self, GitContextEngineAuthError> {
        let key = EncodingKey::from_rsa_pem(pem)
            .map_err(|e| GitContextEngineAuthError::InvalidPrivateKey(e.to_string()))?;

        Ok(Self {
            app_id,
            key,
            base_api: base_api.into(),
        })
    }

    pub fn app_id(&self) -> u64 {
        self.app_id
    }

    /// Mints an installation access token for `installation_id`.
    #[instrument(skip(self), fields(app_id = self.app_id))]
    pub async fn installation_token(&self, installation_id: u64) -> GitContextEngineResult<String> {
        let app = Octocrab::builder()
            .base_uri(self.base_api.as_str())
            .map_err(GitContextEngineAuthError::from)?
            .app(AppId(self.app_id), self.key.clone())
            .build()
            .map_err(GitContextEngineAuthError::from)?;

        let (_installation, token) = app
            .installation_and_token(InstallationId(installation_id))
            .await
            .map_err(GitContextEngineAuthError::from)?;

        debug!("installation token minted");
        Ok(token.expose_secret().to_string())
    }
}

impl fmt::Debug for GitHubAppAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubAppAuth")
            .field("app_id", &self.app_id)
            .field("base_api", &self.base_api)
            .finish_non_exhaustive()
    }
}

/// Where a pipeline run gets its GitHub token from.
#[derive(Clone)]
pub enum TokenSource {
    /// Installation token minted per delivery from the App credentials.
    App(GitHubAppAuth),
    /// Fixed token (personal access token, local tooling).
    Static(String),
}

impl TokenSource {
    /// Resolves a bearer token for the given installation.
    ///
    /// `Static` ignores the installation id; `App` requires it.
    pub async fn token(&self, installation_id: Option<u64>) -> GitContextEngineResult<String> {
        match self {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::App(app) => {
                let id = installation_id.ok_or(GitContextEngineAuthError::MissingInstallation)?;
                app.installation_token(id).await
            }
        }
    }
}

impl fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::App(app) => f.debug_tuple("App").field(app).finish(),
            TokenSource::Static(_) => f.write_str("Static(<redacted>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_private_key() {
        let err = GitHubAppAuth::from_pem(1, b"not a pem", "https://api.github.com").unwrap_err();
        assert!(matches!(err, GitContextEngineAuthError::InvalidPrivateKey(_)));
    }

    #[tokio::test]
    async fn static_source_ignores_installation() {
        let source = TokenSource::Static("ghp_test".into());
        assert_eq!(source.token(None).await.unwrap(), "ghp_test");
        assert_eq!(source.token(Some(7)).await.unwrap(), "ghp_test");
    }

    #[test]
    fn debug_output_redacts_token() {
        let source = TokenSource::Static("ghp_secret".into());
        assert_eq!(format!("{source:?}"), "Static(<redacted>)");
    }
}
