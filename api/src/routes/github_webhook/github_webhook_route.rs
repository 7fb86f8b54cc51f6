use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use tracing::{Span, info, instrument, warn};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult},
    routes::github_webhook::{
        github_webhook_response::WebhookAck,
        signature::verify_signature,
        webhook_event::WebhookEvent,
    },
};

const SIGNATURE: &str = "x-hub-signature-256";
const EVENT: &str = "x-github-event";
const DELIVERY: &str = "x-github-delivery";

/// `POST /api/webhook` — GitHub App delivery intake.
///
/// The signature is checked over the raw body before anything is parsed.
/// An opened pull request is answered with `202 Accepted` as soon as its
/// review run is spawned; the run itself finishes in the background.
#[instrument(
    name = "github_webhook_route",
    skip_all,
    fields(event = tracing::field::Empty, delivery_id = tracing::field::Empty)
)]
pub async fn github_webhook_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Response> {
    if let Err(err) = verify_signature(&state.webhook_secret, &body, header(&headers, SIGNATURE)) {
        warn!(reason = %err, "rejected webhook delivery");
        return Err(err.into());
    }

    let event_name = header(&headers, EVENT).ok_or(AppError::MissingHeader("X-GitHub-Event"))?;
    let delivery_id = header(&headers, DELIVERY).unwrap_or("unknown");
    Span::current()
        .record("event", event_name)
        .record("delivery_id", delivery_id);

    let event = WebhookEvent::parse(event_name, delivery_id, &body)
        .map_err(|e| AppError::BadRequest(format!("invalid `{event_name}` payload: {e}")))?;
    let kind = event.kind();

    let (status, message) = match event {
        WebhookEvent::PullRequestOpened(pr) => {
            info!(
                repo = %pr.context.full_name(),
                pull_number = pr.context.pull_number,
                title = %pr.title,
                "pull request opened, scheduling review"
            );
            let message = format!(
                "review scheduled for {}#{}",
                pr.context.full_name(),
                pr.context.pull_number
            );
            // Detached: the handle is not awaited.
            drop(state.spawn_review(pr));
            (StatusCode::ACCEPTED, message)
        }
        WebhookEvent::Ping { zen } => {
            info!(zen = zen.as_deref().unwrap_or_default(), "webhook ping");
            (StatusCode::OK, "pong".to_string())
        }
        WebhookEvent::Ignored { event, action } => {
            info!(%event, action = action.as_deref().unwrap_or("-"), "event ignored");
            let message = match action {
                Some(action) => format!("ignored {event}.{action}"),
                None => format!("ignored {event}"),
            };
            (StatusCode::OK, message)
        }
    };

    Ok(ApiResponse::success(WebhookAck {
        message,
        event: kind,
        delivery_id: delivery_id.to_string(),
    })
    .into_response_with_status(status))
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
