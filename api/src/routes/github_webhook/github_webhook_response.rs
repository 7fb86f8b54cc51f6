use serde::Serialize;

/// Body returned for every accepted delivery.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    /// What the bot did with the delivery.
    pub message: String,
    pub event: &'static str,
    pub delivery_id: String,
}
