use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::clients::{
    MailError, ParserError, SchedulerError, SheetsError, StorageError, WebhookError,
};
use crate::intake::extraction::ExtractionError;
use crate::models::events::HandlerResponse;

/// Application-level error type.
/// Every variant renders as the `{statusCode, body}` envelope; details go to
/// the log, callers only see a code and a generic message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Malformed trigger event: {0}")]
    Trigger(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Resume parser error: {0}")]
    ResumeParser(#[from] ParserError),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] SheetsError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("Webhook error: {0}")]
    Webhook(#[from] WebhookError),

    #[error("Mail error: {0}")]
    Mail(#[from] MailError),

    #[error("Missing key: {0}")]
    MissingKey(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Status, machine-readable code and client-facing message.
    fn parts(&self) -> (u16, &'static str, String) {
        match self {
            AppError::MissingKey(key) => (400, "MISSING_KEY", format!("Missing key: {key}")),
            AppError::Validation(msg) => (400, "VALIDATION_ERROR", msg.clone()),
            AppError::Trigger(_) => (
                500,
                "TRIGGER_ERROR",
                "Failed to process S3 event".to_string(),
            ),
            AppError::Extraction(_) => (
                500,
                "EXTRACTION_ERROR",
                "Parsed resume is missing required fields".to_string(),
            ),
            AppError::Storage(_) => (500, "STORAGE_ERROR", "A storage error occurred".to_string()),
            AppError::ResumeParser(_) => (
                500,
                "PARSER_ERROR",
                "Failed to parse resume".to_string(),
            ),
            AppError::Spreadsheet(_) => (
                500,
                "SPREADSHEET_ERROR",
                "Failed to record application".to_string(),
            ),
            AppError::Scheduler(_) => (
                500,
                "SCHEDULER_ERROR",
                "Failed to schedule follow-up email".to_string(),
            ),
            AppError::Webhook(_) => (500, "WEBHOOK_ERROR", "Failed to send webhook".to_string()),
            AppError::Mail(_) => (500, "MAIL_ERROR", "Failed to send email".to_string()),
            AppError::Serialization(_) | AppError::Internal(_) => (
                500,
                "INTERNAL_ERROR",
                "An internal server error occurred".to_string(),
            ),
        }
    }

    pub fn to_handler_response(&self) -> HandlerResponse {
        let (status, code, message) = self.parts();
        if status >= 500 {
            tracing::error!("{self:?}");
        } else {
            tracing::warn!("{self}");
        }
        HandlerResponse::json(
            status,
            &json!({
                "error": {
                    "code": code,
                    "message": message
                }
            }),
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_handler_response().into_response()
    }
}
