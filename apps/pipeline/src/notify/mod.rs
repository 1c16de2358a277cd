//! Forwards a normalized CV payload to the external webhook.

pub mod handlers;

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::clients::{WebhookError, WebhookSender};
use crate::errors::AppError;
use crate::models::events::{HandlerResponse, InvocationEvent};

/// Re-wraps `{cv_data, metadata}` from the invocation body and posts it.
/// The webhook's status and body are passed straight back to the caller.
pub async fn forward_to_webhook(
    webhook: &dyn WebhookSender,
    event: &InvocationEvent,
) -> Result<HandlerResponse, AppError> {
    let body = event
        .body_value()
        .map_err(|e| WebhookError::Payload(e.to_string()))?;
    let payload = json!({
        "cv_data": take_field(&body, "cv_data")?,
        "metadata": take_field(&body, "metadata")?,
    });
    debug!("Sending webhook with payload: {payload}");

    let response = webhook.post(&payload).await?;
    info!("Webhook response: {} - {}", response.status, response.body);

    Ok(HandlerResponse {
        status_code: response.status,
        body: response.body,
    })
}

fn take_field(body: &Value, key: &str) -> Result<Value, WebhookError> {
    body.get(key)
        .cloned()
        .ok_or_else(|| WebhookError::Payload(format!("missing `{key}`")))
}
