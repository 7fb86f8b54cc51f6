//! Review engine: one non-streaming Ollama call per pipeline run.
//!
//! This is where inference failures stop. [`ReviewEngine::review`] never
//! returns an error; every failure is logged and turned into
//! [`ReviewResult::fallback`].

use ai_llm_service::{LlmModelConfig, OllamaError, OllamaService};
use tracing::{debug, error, info, instrument};

use crate::review::ReviewResult;

/// Thin wrapper around [`OllamaService`] with fallback semantics.
#[derive(Debug)]
pub struct ReviewEngine {
    ollama: OllamaService,
}

impl ReviewEngine {
    /// Builds the engine from a model config.
    ///
    /// # Errors
    /// Fails only on an invalid endpoint or when the HTTP client cannot be
    /// built (startup-time conditions).
    pub fn new(cfg: LlmModelConfig) -> Result<Self, OllamaError> {
        Ok(Self::from_service(OllamaService::new(cfg)?))
    }

    pub fn from_service(ollama: OllamaService) -> Self {
        Self { ollama }
    }

    pub fn model(&self) -> &str {
        self.ollama.model()
    }

    /// Sends `prompt` and waits for the complete answer.
    #[instrument(skip_all, fields(model = %self.ollama.model()))]
    pub async fn review(&self, prompt: &str) -> ReviewResult {
        info!("calling Ollama");
        match self.ollama.generate(prompt).await {
            Ok(text) => {
                debug!(chars = text.chars().count(), "Ollama response received");
                ReviewResult::generated(text)
            }
            Err(err) => {
                log_failure(&err);
                ReviewResult::fallback()
            }
        }
    }
}

fn log_failure(err: &OllamaError) {
    match err {
        OllamaError::HttpStatus {
            status,
            url,
            snippet,
        } => error!(status = status.as_u16(), %url, body = %snippet, "Ollama request failed"),
        OllamaError::Transport(e) => error!(error = %e, "Ollama unreachable"),
        OllamaError::Decode(msg) => error!(reason = %msg, "Ollama response could not be decoded"),
        OllamaError::InvalidEndpoint(ep) => error!(endpoint = %ep, "Ollama endpoint is invalid"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::{EMPTY_REVIEW, FALLBACK_REVIEW};

    fn engine(endpoint: &str) -> ReviewEngine {
        ReviewEngine::new(LlmModelConfig {
            model: "gemma3n:latest".into(),
            endpoint: endpoint.into(),
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn successful_generation() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/generate")
            .with_status(200)
            .with_body(r#"{"response":"Looks fine. Good to Ship 🚀"}"#)
            .create_async()
            .await;

        let r = engine(&server.url()).review("prompt").await;
        assert!(r.succeeded);
        assert_eq!(r.text, "Looks fine. Good to Ship 🚀");
    }

    #[tokio::test]
    async fn empty_generation_uses_placeholder() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/generate")
            .with_status(200)
            .with_body(r#"{"response":""}"#)
            .create_async()
            .await;

        let r = engine(&server.url()).review("prompt").await;
        assert!(r.succeeded);
        assert_eq!(r.text, EMPTY_REVIEW);
    }

    #[tokio::test]
    async fn error_status_falls_back() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/generate")
            .with_status(500)
            .with_body("model crashed")
            .create_async()
            .await;

        let r = engine(&server.url()).review("prompt").await;
        assert!(!r.succeeded);
        assert_eq!(r.text, FALLBACK_REVIEW);
    }

    #[tokio::test]
    async fn unreachable_endpoint_falls_back() {
        let r = engine("http://127.0.0.1:1").review("prompt").await;
        assert_eq!(r, ReviewResult::fallback());
    }
}
