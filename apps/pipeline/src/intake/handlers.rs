use axum::extract::State;
use bytes::Bytes;
use chrono::Utc;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::intake::pipeline::{parse_upload_event, run_intake};
use crate::models::events::HandlerResponse;
use crate::state::AppState;

/// POST /functions/intake
///
/// The body is read raw so that a non-JSON trigger still gets the envelope.
pub async fn handle_intake(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<HandlerResponse, AppError> {
    let raw: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::Trigger(format!("event is not valid JSON: {e}")))?;
    let event = parse_upload_event(raw)?;
    let report = run_intake(&state, &event, Utc::now()).await?;
    Ok(HandlerResponse::json(
        200,
        &json!({
            "message": format!("Processed {} and invoked webhook", report.key),
            "report": serde_json::to_value(&report)?,
        }),
    ))
}
