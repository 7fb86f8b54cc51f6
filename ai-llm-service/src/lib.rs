//! Ollama access for the review bot.
//!
//! * [`config`] — environment-driven model configuration
//! * [`services::ollama_service::OllamaService`] — non-streaming `/api/generate` client
//! * [`telemetry`] — log layer scoped to this crate

pub mod config;
pub mod error_handler;
pub mod services;
pub mod telemetry;

pub use config::llm_model_config::LlmModelConfig;
pub use error_handler::{AiLlmError, ConfigError, OllamaError};
pub use services::ollama_service::OllamaService;
