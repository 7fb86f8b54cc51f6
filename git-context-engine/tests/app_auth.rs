//! GitHub App credential flow against a mocked REST API.

use std::sync::Arc;

use git_context_engine::errors::{GitContextEngineAuthError, GitContextEngineError};
use git_context_engine::{GitHubAppAuth, GitHubClient, PullRequestContext, TokenSource};
use mockito::{Matcher, Server, ServerGuard};

const APP_ID: u64 = 1;
const INSTALLATION_ID: u64 = 7;
const TEST_KEY: &[u8] = include_bytes!("fixtures/app_key.pem");

fn app(server: &ServerGuard) -> GitHubAppAuth {
    GitHubAppAuth::from_pem(APP_ID, TEST_KEY, server.url()).unwrap()
}

#[tokio::test]
async fn minted_installation_token_authorizes_collection() {
    let mut server = Server::new_async().await;
    let exchange = server
        .mock("POST", "/app/installations/7/access_tokens")
        .match_header("authorization", Matcher::Regex("^Bearer eyJ".into()))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"token":"ghs_abc","expires_at":"2099-01-01T00:00:00Z","permissions":{}}"#)
        .expect(1)
        .create_async()
        .await;
    let files = server
        .mock("GET", "/repos/octo/hello/pulls/1/files")
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer ghs_abc")
        .with_status(200)
        .with_body("[]")
        .expect(1)
        .create_async()
        .await;

    let client = GitHubClient::new(
        reqwest::Client::new(),
        server.url(),
        Arc::new(TokenSource::App(app(&server))),
        Some(INSTALLATION_ID),
    );
    let collected = client
        .collect(&PullRequestContext::new("octo", "hello", 1))
        .await
        .unwrap();

    exchange.assert_async().await;
    files.assert_async().await;
    assert!(collected.is_empty());
}

#[tokio::test]
async fn app_source_requires_an_installation_id() {
    let server = Server::new_async().await;
    let source = TokenSource::App(app(&server));

    let err = source.token(None).await.unwrap_err();
    assert!(matches!(
        err,
        GitContextEngineError::Auth(GitContextEngineAuthError::MissingInstallation)
    ));
}
