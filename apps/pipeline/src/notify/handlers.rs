use axum::extract::State;
use bytes::Bytes;

use crate::clients::WebhookError;
use crate::errors::AppError;
use crate::models::events::{HandlerResponse, InvocationEvent};
use crate::notify::forward_to_webhook;
use crate::state::AppState;

/// POST /functions/notify
pub async fn handle_notify(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<HandlerResponse, AppError> {
    let event: InvocationEvent =
        serde_json::from_slice(&body).map_err(|e| WebhookError::Payload(e.to_string()))?;
    forward_to_webhook(state.services.webhook.as_ref(), &event).await
}
