//! Typed view of the GitHub deliveries the bot cares about.

use git_context_engine::PullRequestContext;
use serde::Deserialize;

/// A verified delivery, classified by `X-GitHub-Event` and `action`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    /// `pull_request` with `action: "opened"`.
    PullRequestOpened(PullRequestOpened),
    /// Sent by GitHub when the webhook is created.
    Ping { zen: Option<String> },
    /// Any other event or action; acknowledged and skipped.
    Ignored {
        event: String,
        action: Option<String>,
    },
}

/// Everything a pipeline run needs from an `opened` delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestOpened {
    pub context: PullRequestContext,
    pub title: String,
    /// PR body; GitHub sends `null` when it is empty.
    pub description: Option<String>,
    pub installation_id: Option<u64>,
    pub delivery_id: String,
}

impl WebhookEvent {
    /// Classifies a delivery body.
    ///
    /// # Errors
    /// Returns the JSON error when the body does not match the shape of the
    /// announced event.
    pub fn parse(event: &str, delivery_id: &str, body: &[u8]) -> Result<Self, serde_json::Error> {
        match event {
            "ping" => {
                let ping: PingPayload = serde_json::from_slice(body)?;
                Ok(WebhookEvent::Ping { zen: ping.zen })
            }
            "pull_request" => {
                let head: ActionOnly = serde_json::from_slice(body)?;
                if head.action.as_deref() != Some("opened") {
                    return Ok(WebhookEvent::Ignored {
                        event: event.to_string(),
                        action: head.action,
                    });
                }

                let p: PullRequestPayload = serde_json::from_slice(body)?;
                Ok(WebhookEvent::PullRequestOpened(PullRequestOpened {
                    context: PullRequestContext::new(
                        p.repository.owner.login,
                        p.repository.name,
                        p.pull_request.number,
                    ),
                    title: p.pull_request.title.unwrap_or_default(),
                    description: p.pull_request.body,
                    installation_id: p.installation.map(|i| i.id),
                    delivery_id: delivery_id.to_string(),
                }))
            }
            other => {
                let head: ActionOnly = serde_json::from_slice(body)?;
                Ok(WebhookEvent::Ignored {
                    event: other.to_string(),
                    action: head.action,
                })
            }
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            WebhookEvent::PullRequestOpened(_) => "pull_request.opened",
            WebhookEvent::Ping { .. } => "ping",
            WebhookEvent::Ignored { .. } => "ignored",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ActionOnly {
    #[serde(default)]
    action: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PingPayload {
    #[serde(default)]
    zen: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    pull_request: PullRequestBody,
    repository: RepositoryBody,
    #[serde(default)]
    installation: Option<InstallationBody>,
}

#[derive(Debug, Deserialize)]
struct PullRequestBody {
    number: u64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RepositoryBody {
    name: String,
    owner: OwnerBody,
}

#[derive(Debug, Deserialize)]
struct OwnerBody {
    login: String,
}

#[derive(Debug, Deserialize)]
struct InstallationBody {
    id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pr_payload(action: &str) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "action": action,
            "number": 42,
            "pull_request": {
                "number": 42,
                "title": "Fix parser",
                "body": "fix bug",
                "html_url": "https://github.com/octo/hello/pull/42"
            },
            "repository": {
                "name": "hello",
                "full_name": "octo/hello",
                "owner": { "login": "octo" }
            },
            "installation": { "id": 777 }
        }))
        .unwrap()
    }

    #[test]
    fn opened_pull_request_is_extracted() {
        let event = WebhookEvent::parse("pull_request", "d-1", &pr_payload("opened")).unwrap();
        let pr = match event {
            WebhookEvent::PullRequestOpened(pr) => pr,
            other => panic!("expected PullRequestOpened, got {other:?}"),
        };
        assert_eq!(pr.context.owner, "octo");
        assert_eq!(pr.context.repo, "hello");
        assert_eq!(pr.context.pull_number, 42);
        assert_eq!(pr.context.issue_number, 42);
        assert_eq!(pr.title, "Fix parser");
        assert_eq!(pr.description.as_deref(), Some("fix bug"));
        assert_eq!(pr.installation_id, Some(777));
        assert_eq!(pr.delivery_id, "d-1");
    }

    #[test]
    fn null_body_is_none() {
        let mut v: serde_json::Value = serde_json::from_slice(&pr_payload("opened")).unwrap();
        v["pull_request"]["body"] = serde_json::Value::Null;
        let event = WebhookEvent::parse("pull_request", "d", &serde_json::to_vec(&v).unwrap()).unwrap();
        match event {
            WebhookEvent::PullRequestOpened(pr) => assert!(pr.description.is_none()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn other_actions_are_ignored() {
        let event = WebhookEvent::parse("pull_request", "d", &pr_payload("synchronize")).unwrap();
        assert_eq!(
            event,
            WebhookEvent::Ignored {
                event: "pull_request".into(),
                action: Some("synchronize".into()),
            }
        );
    }

    #[test]
    fn ping_and_unknown_events() {
        let ping = WebhookEvent::parse("ping", "d", br#"{"zen":"Keep it logically awesome.","hook_id":1}"#)
            .unwrap();
        assert_eq!(ping.kind(), "ping");

        let push = WebhookEvent::parse("push", "d", br#"{"ref":"refs/heads/main"}"#).unwrap();
        assert_eq!(
            push,
            WebhookEvent::Ignored {
                event: "push".into(),
                action: None
            }
        );
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(WebhookEvent::parse("pull_request", "d", b"not json").is_err());
        assert!(WebhookEvent::parse("pull_request", "d", br#"{"action":"opened"}"#).is_err());
    }
}
