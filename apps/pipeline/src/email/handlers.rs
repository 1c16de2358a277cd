use axum::extract::State;
use bytes::Bytes;

use crate::email::send_review_notice;
use crate::errors::AppError;
use crate::models::events::{HandlerResponse, InvocationEvent};
use crate::state::AppState;

/// POST /functions/email
pub async fn handle_email(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<HandlerResponse, AppError> {
    let event: InvocationEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("Invalid invocation event: {e}")))?;
    send_review_notice(
        state.services.mailer.as_ref(),
        state.services.scheduler.as_ref(),
        &event,
    )
    .await
}
