//! Data model shared by the diff collector, the prompt builder and the publisher.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{GitContextEngineError, GitContextEngineResult};

/// Coordinates of the pull request a pipeline run works on.
///
/// * `owner` / `repo` – repository coordinate (`owner/repo`).
/// * `pull_number`    – PR number used by the pulls API.
/// * `issue_number`   – number of the issue thread backing the PR (comments API).
///
/// On GitHub both numbers are the same value; they are kept apart because the
/// two endpoints address different resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestContext {
    pub owner: String,
    pub repo: String,
    pub pull_number: u64,
    pub issue_number: u64,
}

impl PullRequestContext {
    /// Builds a context for a pull request whose issue thread shares its number.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, number: u64) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            pull_number: number,
            issue_number: number,
        }
    }

    /// Rejects empty coordinates and zero PR/issue numbers.
    pub fn validate(&self) -> GitContextEngineResult<()> {
        if self.owner.trim().is_empty() || self.repo.trim().is_empty() {
            return Err(GitContextEngineError::Validation(format!(
                "invalid repository coordinate '{}/{}', expected non-empty owner and repo",
                self.owner, self.repo
            )));
        }
        if self.pull_number == 0 || self.issue_number == 0 {
            return Err(GitContextEngineError::Validation(
                "pull request and issue numbers must be positive".into(),
            ));
        }
        Ok(())
    }

    /// `owner/repo` form used in logs.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// File status as reported by `GET /pulls/{n}/files`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Renamed,
    Copied,
    Changed,
    Unchanged,
}

impl FileStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FileStatus::Added => "added",
            FileStatus::Modified => "modified",
            FileStatus::Removed => "removed",
            FileStatus::Renamed => "renamed",
            FileStatus::Copied => "copied",
            FileStatus::Changed => "changed",
            FileStatus::Unchanged => "unchanged",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One changed file of a pull request.
///
/// `patch` is `None` when GitHub omits the diff (binary file or a diff too
/// large to inline).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    pub filename: String,
    pub status: FileStatus,
    pub additions: u64,
    pub deletions: u64,
    #[serde(default)]
    pub patch: Option<String>,
    /// Old path for `renamed` files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_filename: Option<String>,
}
