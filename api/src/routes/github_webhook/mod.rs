pub mod github_webhook_response;
pub mod github_webhook_route;
pub mod signature;
pub mod webhook_event;
