//! Review pipeline for newly opened pull requests.
//!
//! 1) **Collecting** — changed files through [`git_context_engine::GitHubClient::collect`]
//! 2) **Building**   — deterministic prompt via [`review::prompt::build_prompt`]
//! 3) **Reviewing**  — one Ollama call via [`review::llm::ReviewEngine`], with fallback text
//! 4) **Publishing** — exactly one issue comment via [`git_context_engine::GitHubClient::publish_comment`]
//!
//! The orchestrator ([`pipeline::ReviewPipeline`]) isolates failures per
//! stage: every run ends in `Done`. Dispatch is plain `async fn` over
//! concrete clients; there is no `async-trait` and no `Box<dyn ...>`.

pub mod pipeline;
pub mod review;

pub use pipeline::{PipelineReport, PipelineState, ReviewPipeline};
pub use review::{
    EMPTY_REVIEW, FALLBACK_REVIEW, ReviewRequest, ReviewResult,
    llm::ReviewEngine,
    prompt::{PromptOptions, build_prompt, build_prompt_default},
};
