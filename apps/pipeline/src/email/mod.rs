//! Delayed "CV under review" email to the applicant.

pub mod handlers;

use std::fmt::{self, Display};

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::clients::{EmailScheduler, Mailer, OutgoingMail};
use crate::errors::AppError;
use crate::models::events::{HandlerResponse, InvocationEvent};

pub const REVIEW_SUBJECT: &str = "Your CV Under Review";

/// Plain-text body of the review notice.
pub struct ReviewNotice<'a> {
    pub name: &'a str,
}

impl<'a> Display for ReviewNotice<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Hi {},\n\n\
             Your CV is under review. Only those candidates moving on to the next stage \
             of the hiring process will be contacted.\n\n\
             We wish you a nice day and the best of luck with your job search.\n\n\
             Thank you,\n\
             Team at Interceptor mCamp",
            self.name
        )
    }
}

/// Reads `metadata.applicant_name` and `metadata.email` from the invocation
/// body and sends the review notice. The one-time rule named by
/// `schedule_id`, when present, is deleted after a successful send.
pub async fn send_review_notice(
    mailer: &dyn Mailer,
    scheduler: &dyn EmailScheduler,
    event: &InvocationEvent,
) -> Result<HandlerResponse, AppError> {
    let body = event
        .body_value()
        .map_err(|e| AppError::Validation(format!("Invalid invocation body: {e}")))?;
    let metadata = body
        .get("metadata")
        .ok_or_else(|| AppError::MissingKey("metadata".to_string()))?;
    let name = string_field(metadata, "applicant_name")?;
    let email = string_field(metadata, "email")?;

    mailer
        .send(OutgoingMail {
            to_name: name.to_string(),
            to_address: email.to_string(),
            subject: REVIEW_SUBJECT.to_string(),
            body: ReviewNotice { name }.to_string(),
        })
        .await?;
    info!("Email sent to {email}");

    if let Some(rule) = body.get("schedule_id").and_then(Value::as_str) {
        if let Err(e) = scheduler.remove(rule).await {
            warn!("Email sent but rule {rule} was not removed: {e}");
        }
    }

    Ok(HandlerResponse::json(
        200,
        &json!({ "applicant_name": name, "email": email }),
    ))
}

fn string_field<'a>(metadata: &'a Value, key: &str) -> Result<&'a str, AppError> {
    metadata
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::MissingKey(key.to_string()))
}
