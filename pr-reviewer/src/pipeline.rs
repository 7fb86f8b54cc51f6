//! Pipeline orchestrator: one run per opened pull request.
//!
//! `Idle → Collecting → Building → Reviewing → Publishing → Done`
//!
//! No stage is retried and no stage aborts the run. A collection failure
//! degrades to an empty file list, the review stage cannot fail, and a
//! publication failure is logged before the run reaches `Done` anyway.

use std::fmt;
use std::time::Instant;

use git_context_engine::{
    ChangedFile, GitContextEngineError, GitContextEngineProviderError, GitHubClient,
    PullRequestContext,
};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::review::{
    ReviewRequest,
    llm::ReviewEngine,
    prompt::{PromptOptions, build_prompt},
};

/// States visited by a run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Collecting,
    Building,
    Reviewing,
    Publishing,
    Done,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineState::Idle => "idle",
            PipelineState::Collecting => "collecting",
            PipelineState::Building => "building",
            PipelineState::Reviewing => "reviewing",
            PipelineState::Publishing => "publishing",
            PipelineState::Done => "done",
        };
        f.write_str(s)
    }
}

/// Summary of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub states: Vec<PipelineState>,
    /// Files that went into the prompt (0 after a collection failure).
    pub files: usize,
    pub collected: bool,
    pub review_succeeded: bool,
    pub published: bool,
}

impl PipelineReport {
    fn new() -> Self {
        Self {
            states: vec![PipelineState::Idle],
            files: 0,
            collected: false,
            review_succeeded: false,
            published: false,
        }
    }

    fn enter(&mut self, state: PipelineState) {
        debug!(from = %self.state(), to = %state, "pipeline transition");
        self.states.push(state);
    }

    /// Current (last entered) state.
    pub fn state(&self) -> PipelineState {
        self.states.last().copied().unwrap_or(PipelineState::Idle)
    }
}

/// Collect → build → review → publish, shared by all runs.
///
/// Holds only immutable state; the per-run [`GitHubClient`] is passed to
/// [`ReviewPipeline::run`].
#[derive(Debug)]
pub struct ReviewPipeline {
    engine: ReviewEngine,
    prompt: PromptOptions,
}

impl ReviewPipeline {
    pub fn new(engine: ReviewEngine, prompt: PromptOptions) -> Self {
        Self { engine, prompt }
    }

    pub fn prompt_options(&self) -> &PromptOptions {
        &self.prompt
    }

    /// Runs all stages for one pull request and always reaches `Done`.
    ///
    /// Exactly one comment is attempted per call.
    #[instrument(skip_all, fields(repo = %ctx.full_name(), pull_number = ctx.pull_number))]
    pub async fn run(
        &self,
        host: &GitHubClient,
        ctx: &PullRequestContext,
        description: &str,
    ) -> PipelineReport {
        let started = Instant::now();
        let mut report = PipelineReport::new();

        report.enter(PipelineState::Collecting);
        let files = match host.collect(ctx).await {
            Ok(files) => {
                report.collected = true;
                files
            }
            Err(err) => {
                log_host_failure("collect changed files", &err);
                warn!("continuing with an empty file list");
                Vec::<ChangedFile>::new()
            }
        };
        report.files = files.len();

        report.enter(PipelineState::Building);
        let request = ReviewRequest::new(files, description);
        let prompt = build_prompt(&request, &self.prompt);
        debug!(prompt_chars = prompt.chars().count(), "prompt built");

        report.enter(PipelineState::Reviewing);
        let review = self.engine.review(&prompt).await;
        report.review_succeeded = review.succeeded;

        report.enter(PipelineState::Publishing);
        match host.publish_comment(ctx, &review.text).await {
            Ok(comment) => {
                report.published = true;
                info!(comment_id = comment.id, url = ?comment.html_url, "review comment posted");
            }
            Err(err) => log_host_failure("publish review comment", &err),
        }

        report.enter(PipelineState::Done);
        info!(
            files = report.files,
            collected = report.collected,
            review_succeeded = report.review_succeeded,
            published = report.published,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pipeline run finished"
        );
        report
    }
}

fn log_host_failure(stage: &str, err: &GitContextEngineError) {
    match err {
        GitContextEngineError::Provider(GitContextEngineProviderError::Api { status, message }) => {
            error!(status, %message, "{stage} failed");
        }
        GitContextEngineError::Provider(other) => error!(error = %other, "{stage} failed (transport)"),
        GitContextEngineError::Auth(e) => error!(error = %e, "{stage} failed (authentication)"),
        GitContextEngineError::Validation(msg) => error!(reason = %msg, "{stage} failed (invalid input)"),
    }
}
