//! Startup configuration and the state shared by all handlers.
//!
//! Everything is read once in `main` and handed to the router behind an
//! `Arc`; the review pipeline never reads the environment itself.

use std::{path::PathBuf, sync::Arc};

use ai_llm_service::{
    AiLlmError, LlmModelConfig, config::default_config::config_ollama_review_from,
    error_handler::non_empty,
};
use git_context_engine::{
    GitHubAppAuth, GitHubClient, TokenSource,
    git_providers::{DEFAULT_API_BASE, build_http_client},
};
use pr_reviewer::{PipelineReport, PromptOptions, ReviewEngine, ReviewPipeline};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{Instrument, info, info_span};

use crate::routes::github_webhook::webhook_event::PullRequestOpened;

pub const DEFAULT_API_ADDRESS: &str = "0.0.0.0:3000";

/// Startup-time configuration failures (fatal before the listener binds).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid number in {var}: {reason}")]
    InvalidNumber {
        var: &'static str,
        reason: &'static str,
    },

    #[error("cannot load GitHub App private key from {path}: {reason}")]
    PrivateKey { path: PathBuf, reason: String },

    #[error(transparent)]
    Llm(#[from] AiLlmError),

    #[error("cannot build HTTP client: {0}")]
    HttpClient(String),
}

/// Process configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listen address, e.g. `0.0.0.0:3000`.
    pub address: String,
    pub app_id: u64,
    pub webhook_secret: String,
    pub private_key_path: PathBuf,
    /// GitHub REST base, e.g. `https://api.github.com`.
    pub github_api_base: String,
    pub llm: LlmModelConfig,
    /// Per-file patch cap for the prompt; `0` disables truncation.
    pub max_patch_chars: usize,
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            non_empty(&lookup, name).ok_or(ConfigError::MissingVar(name))
        };

        let app_id = required("APP_ID")?
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber {
                var: "APP_ID",
                reason: "expected a positive integer",
            })?;
        let webhook_secret = required("WEBHOOK_SECRET")?;
        let private_key_path = PathBuf::from(required("PRIVATE_KEY_PATH")?);

        let max_patch_chars = match non_empty(&lookup, "REVIEW_MAX_PATCH_CHARS") {
            Some(v) => v.parse::<usize>().map_err(|_| ConfigError::InvalidNumber {
                var: "REVIEW_MAX_PATCH_CHARS",
                reason: "expected a non-negative integer",
            })?,
            None => pr_reviewer::review::prompt::DEFAULT_MAX_PATCH_CHARS,
        };

        Ok(Self {
            address: non_empty(&lookup, "API_ADDRESS").unwrap_or_else(|| DEFAULT_API_ADDRESS.into()),
            app_id,
            webhook_secret,
            private_key_path,
            github_api_base: non_empty(&lookup, "GITHUB_API_BASE")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE.into()),
            llm: config_ollama_review_from(&lookup)?,
            max_patch_chars,
        })
    }
}

/// Shared state for all HTTP handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// HTTP connection pool for GitHub calls.
    pub http: reqwest::Client,
    pub github_api_base: String,
    pub tokens: Arc<TokenSource>,
    pub pipeline: Arc<ReviewPipeline>,
    /// Shared secret for `X-Hub-Signature-256`.
    pub webhook_secret: String,
}

impl AppState {
    /// Builds the state from a loaded config, reading the App private key.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let pem = std::fs::read(&config.private_key_path).map_err(|e| ConfigError::PrivateKey {
            path: config.private_key_path.clone(),
            reason: e.to_string(),
        })?;
        let app = GitHubAppAuth::from_pem(config.app_id, &pem, &config.github_api_base).map_err(
            |e| ConfigError::PrivateKey {
                path: config.private_key_path.clone(),
                reason: e.to_string(),
            },
        )?;

        Self::new(config, TokenSource::App(app))
    }

    /// Builds the state with an explicit token source.
    pub fn new(config: &AppConfig, tokens: TokenSource) -> Result<Self, ConfigError> {
        let http = build_http_client().map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        let engine = ReviewEngine::new(config.llm.clone()).map_err(AiLlmError::from)?;
        let pipeline = ReviewPipeline::new(
            engine,
            PromptOptions::with_max_patch_chars(config.max_patch_chars),
        );

        info!(
            app_id = config.app_id,
            github_api_base = %config.github_api_base,
            ollama = %config.llm.endpoint,
            model = %config.llm.model,
            max_patch_chars = config.max_patch_chars,
            "application state ready"
        );

        Ok(Self {
            http,
            github_api_base: config.github_api_base.clone(),
            tokens: Arc::new(tokens),
            pipeline: Arc::new(pipeline),
            webhook_secret: config.webhook_secret.clone(),
        })
    }

    /// GitHub client bound to one delivery's installation.
    pub fn github_client(&self, installation_id: Option<u64>) -> GitHubClient {
        GitHubClient::new(
            self.http.clone(),
            self.github_api_base.clone(),
            Arc::clone(&self.tokens),
            installation_id,
        )
    }

    /// Starts one pipeline run in the background.
    pub fn spawn_review(&self, event: PullRequestOpened) -> JoinHandle<PipelineReport> {
        let span = info_span!(
            "review_run",
            delivery_id = %event.delivery_id,
            repo = %event.context.full_name(),
            pull_number = event.context.pull_number,
        );
        let host = self.github_client(event.installation_id);
        let pipeline = Arc::clone(&self.pipeline);

        tokio::spawn(
            async move {
                let description = event.description.as_deref().unwrap_or_default();
                pipeline.run(&host, &event.context, description).await
            }
            .instrument(span),
        )
    }
}
