use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    core::{
        app_state::ConfigError,
        http::response_envelope::{ApiErrorDetail, ApiResponse},
    },
    routes::github_webhook::signature::{SIGNATURE_HEADER, SignatureError},
};

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error(transparent)]
    Config(#[from] ConfigError),

    // --- IO / network / server ---
    #[error("failed to bind listener on {address}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request ---
    #[error("invalid webhook signature: {0}")]
    InvalidSignature(#[from] SignatureError),

    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            // 4xx
            AppError::InvalidSignature(_) => StatusCode::UNAUTHORIZED,
            AppError::MissingHeader(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,

            // 5xx
            AppError::Config(_) | AppError::Bind { .. } | AppError::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Bind { .. } => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::InvalidSignature(_) => "INVALID_SIGNATURE",
            AppError::MissingHeader(_) | AppError::BadRequest(_) => "BAD_REQUEST",
        }
    }

    fn details(&self) -> Vec<ApiErrorDetail> {
        match self {
            AppError::InvalidSignature(_) => vec![ApiErrorDetail {
                path: Some(SIGNATURE_HEADER.into()),
                hint: Some("Check that the webhook secret matches WEBHOOK_SECRET.".into()),
            }],
            AppError::MissingHeader(name) => vec![ApiErrorDetail {
                path: Some((*name).into()),
                hint: None,
            }],
            _ => Vec::new(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        ApiResponse::<()>::error(self.error_code(), self.to_string(), self.details())
            .into_response_with_status(self.status_code())
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;
