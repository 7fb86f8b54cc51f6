//! GitHub provider (REST v3): changed files and issue comments.
//!
//! Endpoints used:
//!   * GET  /repos/{owner}/{repo}/pulls/{number}/files
//!   * POST /repos/{owner}/{repo}/issues/{number}/comments

use std::fmt;
use std::sync::Arc;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

use crate::auth::TokenSource;
use crate::errors::{GitContextEngineProviderError, GitContextEngineResult};
use crate::git_providers::types::*;

const GITHUB_JSON: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";

/// Page size for the files listing (GitHub maximum).
const FILES_PER_PAGE: usize = 100;
/// The files listing stops at 3000 entries.
const MAX_FILE_PAGES: usize = 30;

/// GitHub HTTP client bound to one installation.
///
/// The token is resolved lazily on first use and reused for the rest of the
/// run, so a single pipeline run mints at most one installation token.
#[derive(Clone)]
pub struct GitHubClient {
    http: Client,
    base_api: String,
    tokens: Arc<TokenSource>,
    installation_id: Option<u64>,
    token: OnceCell<String>,
}

impl GitHubClient {
    /// Constructs a client with a shared HTTP instance and a token source.
    pub fn new(
        http: Client,
        base_api: impl Into<String>,
        tokens: Arc<TokenSource>,
        installation_id: Option<u64>,
    ) -> Self {
        let base_api = base_api.into().trim_end_matches('/').to_string();
        debug!("Creating GitHubClient with base_api={}", base_api);
        Self {
            http,
            base_api,
            tokens,
            installation_id,
            token: OnceCell::new(),
        }
    }

    /// Lists the changed files of a pull request in GitHub's native order.
    ///
    /// Files without a patch (binary or oversized diffs) are returned with
    /// `patch: None`; they never fail the collection.
    #[instrument(skip_all, fields(repo = %ctx.full_name(), pull_number = ctx.pull_number))]
    pub async fn collect(&self, ctx: &PullRequestContext) -> GitContextEngineResult<Vec<ChangedFile>> {
        ctx.validate()?;
        let auth = self.authorization().await?;

        let url = format!(
            "{}/repos/{}/{}/pulls/{}/files",
            self.base_api,
            urlencoding::encode(&ctx.owner),
            urlencoding::encode(&ctx.repo),
            ctx.pull_number
        );

        let mut files: Vec<ChangedFile> = Vec::new();
        for page in 1..=MAX_FILE_PAGES {
            debug!("GitHub list files: {} page={}", url, page);

            let resp = self
                .http
                .get(&url)
                .query(&[("per_page", FILES_PER_PAGE), ("page", page)])
                .header(AUTHORIZATION, &auth)
                .header(ACCEPT, GITHUB_JSON)
                .header(API_VERSION_HEADER, API_VERSION)
                .send()
                .await?;

            let resp = ensure_success(resp).await?;
            let batch: Vec<ChangedFile> = resp.json().await?;
            let last_page = batch.len() < FILES_PER_PAGE;
            files.extend(batch);

            if last_page {
                break;
            }
        }

        info!(count = files.len(), "files changed in PR #{}", ctx.pull_number);
        for file in &files {
            info!(
                "  {}: {} (+{} -{}) patch={}",
                file.status,
                file.filename,
                file.additions,
                file.deletions,
                if file.patch.is_some() { "yes" } else { "no" }
            );
            if let Some(patch) = &file.patch {
                debug!(filename = %file.filename, "file patch:\n{}", patch);
            }
        }

        Ok(files)
    }

    /// Posts `body` verbatim as a new comment on the PR's issue thread.
    #[instrument(skip_all, fields(repo = %ctx.full_name(), issue_number = ctx.issue_number))]
    pub async fn publish_comment(
        &self,
        ctx: &PullRequestContext,
        body: &str,
    ) -> GitContextEngineResult<PublishedComment> {
        ctx.validate()?;
        let auth = self.authorization().await?;

        let url = format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.base_api,
            urlencoding::encode(&ctx.owner),
            urlencoding::encode(&ctx.repo),
            ctx.issue_number
        );
        debug!("GitHub create issue comment: {} ({} bytes)", url, body.len());

        let resp = self
            .http
            .post(&url)
            .header(AUTHORIZATION, &auth)
            .header(ACCEPT, GITHUB_JSON)
            .header(API_VERSION_HEADER, API_VERSION)
            .json(&IssueCommentCreate { body })
            .send()
            .await?;

        let resp = ensure_success(resp).await?;
        // A 2xx means the comment exists, even if the echo cannot be read.
        let created = match resp.json::<PublishedComment>().await {
            Ok(created) => created,
            Err(e) => {
                warn!(error = %e, "comment created but response body could not be decoded");
                PublishedComment::default()
            }
        };

        debug!(comment_id = created.id, url = ?created.html_url, "comment created");
        Ok(created)
    }

    /// `Authorization` header value for this run's installation.
    async fn authorization(&self) -> GitContextEngineResult<String> {
        let token = self
            .token
            .get_or_try_init(|| self.tokens.token(self.installation_id))
            .await?;
        Ok(format!("Bearer {token}"))
    }
}

impl fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base_api", &self.base_api)
            .field("tokens", &self.tokens)
            .field("installation_id", &self.installation_id)
            .finish_non_exhaustive()
    }
}

/// Comment created on an issue thread (subset of the GitHub response).
///
/// `id` is `0` when GitHub accepted the comment but its answer was unreadable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublishedComment {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Turns a non-2xx answer into `Api { status, message }`.
///
/// GitHub error bodies look like `{"message": "...", "documentation_url": "..."}`;
/// anything else is kept as a short raw snippet.
async fn ensure_success(resp: Response) -> Result<Response, GitContextEngineProviderError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<GitHubErrorBody>(&text)
        .map(|b| b.message)
        .unwrap_or_else(|_| text.chars().take(240).collect());

    Err(GitContextEngineProviderError::Api {
        status: status.as_u16(),
        message,
    })
}

#[derive(Debug, Deserialize)]
struct GitHubErrorBody {
    message: String,
}

#[derive(Debug, Serialize)]
struct IssueCommentCreate<'a> {
    body: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GitContextEngineError;
    use mockito::{Matcher, Server};

    fn client(base: &str) -> GitHubClient {
        GitHubClient::new(
            Client::new(),
            base,
            Arc::new(TokenSource::Static("t0ken".into())),
            Some(1),
        )
    }

    #[tokio::test]
    async fn collects_files_with_and_without_patch() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/octo/hello/pulls/42/files")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("per_page".into(), "100".into()),
                Matcher::UrlEncoded("page".into(), "1".into()),
            ]))
            .match_header("authorization", "Bearer t0ken")
            .match_header("x-github-api-version", "2022-11-28")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"filename":"a.ts","status":"modified","additions":3,"deletions":1,"patch":"+x=1"},
                    {"filename":"logo.png","status":"added","additions":0,"deletions":0}
                ]"#,
            )
            .expect(1)
            .create_async()
            .await;

        let files = client(&server.url())
            .collect(&PullRequestContext::new("octo", "hello", 42))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].filename, "a.ts");
        assert_eq!(files[0].patch.as_deref(), Some("+x=1"));
        assert_eq!(files[1].status, FileStatus::Added);
        assert!(files[1].patch.is_none());
    }

    #[tokio::test]
    async fn follows_pagination_until_short_page() {
        let mut server = Server::new_async().await;
        let full_page: Vec<serde_json::Value> = (0..FILES_PER_PAGE)
            .map(|i| {
                serde_json::json!({
                    "filename": format!("f{i}.rs"),
                    "status": "modified",
                    "additions": 1,
                    "deletions": 0,
                    "patch": "+a"
                })
            })
            .collect();

        let first = server
            .mock("GET", "/repos/octo/hello/pulls/7/files")
            .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
            .with_status(200)
            .with_body(serde_json::to_string(&full_page).unwrap())
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("GET", "/repos/octo/hello/pulls/7/files")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_status(200)
            .with_body(r#"[{"filename":"last.rs","status":"removed","additions":0,"deletions":9}]"#)
            .expect(1)
            .create_async()
            .await;

        let files = client(&server.url())
            .collect(&PullRequestContext::new("octo", "hello", 7))
            .await
            .unwrap();

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(files.len(), FILES_PER_PAGE + 1);
        assert_eq!(files[0].filename, "f0.rs");
        assert_eq!(files.last().unwrap().filename, "last.rs");
    }

    #[tokio::test]
    async fn host_error_carries_status_and_message() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/octo/hello/pulls/42/files")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"message":"Not Found","documentation_url":"https://docs.github.com"}"#)
            .create_async()
            .await;

        let err = client(&server.url())
            .collect(&PullRequestContext::new("octo", "hello", 42))
            .await
            .unwrap_err();

        match err {
            GitContextEngineError::Provider(GitContextEngineProviderError::Api { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "Not Found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_context_is_rejected_before_any_request() {
        let err = client("http://127.0.0.1:9")
            .collect(&PullRequestContext::new("", "hello", 42))
            .await
            .unwrap_err();
        assert!(matches!(err, GitContextEngineError::Validation(_)));
    }

    #[tokio::test]
    async fn publishes_comment_verbatim() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/repos/octo/hello/issues/42/comments")
            .match_header("authorization", "Bearer t0ken")
            .match_body(Matcher::Json(serde_json::json!({ "body": "Looks fine. Good to Ship 🚀" })))
            .with_status(201)
            .with_body(r#"{"id":99,"html_url":"https://github.com/octo/hello/pull/42#issuecomment-99"}"#)
            .expect(1)
            .create_async()
            .await;

        let created = client(&server.url())
            .publish_comment(
                &PullRequestContext::new("octo", "hello", 42),
                "Looks fine. Good to Ship 🚀",
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(created.id, 99);
    }

    #[tokio::test]
    async fn accepted_comment_with_unreadable_body_counts_as_published() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/repos/octo/hello/issues/42/comments")
            .with_status(201)
            .with_body("")
            .expect(1)
            .create_async()
            .await;

        let created = client(&server.url())
            .publish_comment(&PullRequestContext::new("octo", "hello", 42), "text")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(created.id, 0);
        assert!(created.html_url.is_none());
    }

    #[tokio::test]
    async fn publish_failure_is_reported_not_retried() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/repos/octo/hello/issues/42/comments")
            .with_status(403)
            .with_body(r#"{"message":"Resource not accessible by integration"}"#)
            .expect(1)
            .create_async()
            .await;

        let err = client(&server.url())
            .publish_comment(&PullRequestContext::new("octo", "hello", 42), "text")
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert_eq!(err.status(), Some(403));
        assert!(err.to_string().contains("Resource not accessible by integration"));
    }
}
