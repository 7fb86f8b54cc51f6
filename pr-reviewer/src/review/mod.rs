//! Review stage: prompt rendering and the LLM call.
//!
//! [`prompt`] turns a [`ReviewRequest`] into the model prompt; [`llm`] sends
//! it to Ollama and always comes back with a [`ReviewResult`].

pub mod llm;
pub mod prompt;

use git_context_engine::ChangedFile;
use serde::{Deserialize, Serialize};

/// Posted when the model cannot be reached or answers with an error.
pub const FALLBACK_REVIEW: &str = "Sorry, I could not review the code at this time. Please check that Ollama is running with: `ollama serve`";

/// Posted when the model answers successfully but with an empty text.
pub const EMPTY_REVIEW: &str = "No review generated";

/// Input of the prompt builder: the collected files plus the PR description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub files: Vec<ChangedFile>,
    pub commit_message: String,
}

impl ReviewRequest {
    pub fn new(files: Vec<ChangedFile>, commit_message: impl Into<String>) -> Self {
        Self {
            files,
            commit_message: commit_message.into(),
        }
    }
}

/// Outcome of the review stage.
///
/// A failed review still carries publishable text ([`FALLBACK_REVIEW`]), so
/// the publisher never branches on the failure mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewResult {
    pub text: String,
    pub succeeded: bool,
}

impl ReviewResult {
    /// Successful review; an empty answer becomes [`EMPTY_REVIEW`].
    pub fn generated(text: impl Into<String>) -> Self {
        let text = text.into();
        let text = if text.is_empty() {
            EMPTY_REVIEW.to_string()
        } else {
            text
        };
        Self {
            text,
            succeeded: true,
        }
    }

    /// Failed review carrying [`FALLBACK_REVIEW`].
    pub fn fallback() -> Self {
        Self {
            text: FALLBACK_REVIEW.to_string(),
            succeeded: false,
        }
    }
}
