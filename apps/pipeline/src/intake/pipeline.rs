use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::intake::extraction::extract_cv_data;
use crate::intake::outcome::{EffectOutcome, EffectReport, IntakeReport, SideEffect};
use crate::intake::schedule::compute_schedule;
use crate::models::cv::{CvRecord, UploadMetadata};
use crate::models::events::{InvocationEvent, UploadEvent};
use crate::models::payloads::{
    ApplicantContact, CvData, EmailPayload, NotifyMetadata, NotifyPayload, METADATA_NOT_FOUND,
};
use crate::state::AppState;

/// Processes one upload notification end to end.
///
/// Side effects run in order: spreadsheet row, notify dispatch, email
/// schedule. The spreadsheet and schedule steps are hard failures; a failed
/// notify dispatch is recorded as a soft failure and the run continues.
/// Nothing is rolled back when a later step fails.
pub async fn run_intake(
    state: &AppState,
    event: &UploadEvent,
    now: DateTime<Utc>,
) -> Result<IntakeReport, AppError> {
    let services = &state.services;
    let config = &state.config;

    let location = event
        .first_location()
        .ok_or_else(|| AppError::Trigger("event contains no records".to_string()))?;
    info!("New file uploaded: {}/{}", location.bucket, location.key);

    let object = services.store.fetch(&location.bucket, &location.key).await?;
    let metadata = UploadMetadata::from_object_metadata(&object.metadata);
    let public_url = location.public_url();

    let document = services
        .parser
        .parse(location.file_name(), object.body)
        .await?;
    let cv = extract_cv_data(&document)?;
    debug!("Extracted CV data: {}", serde_json::to_string(&cv)?);

    let mut effects = Vec::with_capacity(3);

    let row = spreadsheet_row(now, &public_url, &metadata, &cv)?;
    services.sheet.append_row(row).await?;
    info!("Appended spreadsheet row for {}", location.key);
    effects.push(EffectReport {
        effect: SideEffect::SpreadsheetRow,
        outcome: EffectOutcome::Completed,
    });

    let notify_invocation =
        notify_event(now, &public_url, &metadata, &cv, &config.pipeline_status)?;
    let notify_outcome = match services
        .invoker
        .invoke_async(&config.notify_function_name, &notify_invocation)
        .await
    {
        Ok(()) => {
            info!("Invoked {}", config.notify_function_name);
            EffectOutcome::Completed
        }
        Err(e) => {
            warn!("Notify dispatch failed for {}: {e}", location.key);
            EffectOutcome::SoftFailed {
                reason: e.to_string(),
            }
        }
    };
    effects.push(EffectReport {
        effect: SideEffect::NotifyDispatch,
        outcome: notify_outcome,
    });

    let schedule = compute_schedule(&location.key, now, config.email_delay);
    let email_invocation = email_event(&metadata, &schedule.id)?;
    services
        .scheduler
        .register(&schedule, &config.email_function_arn, &email_invocation)
        .await?;
    info!(
        "Scheduled {} for {}",
        schedule.id,
        schedule.trigger_time.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    effects.push(EffectReport {
        effect: SideEffect::EmailSchedule,
        outcome: EffectOutcome::Completed,
    });

    let report = IntakeReport {
        key: location.key.clone(),
        public_url,
        schedule_id: schedule.id,
        effects,
    };
    if report.soft_failures() > 0 {
        warn!(
            "Intake for {} finished with {} soft failure(s)",
            report.key,
            report.soft_failures()
        );
    }
    Ok(report)
}

/// Parses the raw trigger payload, reporting shape errors as trigger errors.
pub fn parse_upload_event(raw: serde_json::Value) -> Result<UploadEvent, AppError> {
    serde_json::from_value(raw).map_err(|e| AppError::Trigger(e.to_string()))
}

/// Column order: timestamp, public URL, metadata name/email/phone, education,
/// qualifications, projects, parsed name/email/phone, other contact.
pub fn spreadsheet_row(
    now: DateTime<Utc>,
    public_url: &str,
    metadata: &UploadMetadata,
    cv: &CvRecord,
) -> Result<Vec<String>, serde_json::Error> {
    Ok(vec![
        timestamp(now),
        public_url.to_string(),
        metadata.name.clone().unwrap_or_default(),
        metadata.email.clone().unwrap_or_default(),
        metadata.phone.clone().unwrap_or_default(),
        serde_json::to_string(&cv.education)?,
        serde_json::to_string(&cv.qualifications)?,
        serde_json::to_string(&cv.projects)?,
        cv.personal_info.name.clone(),
        cv.personal_info.email.clone(),
        cv.personal_info.phone.clone(),
        serde_json::to_string(&cv.other_contact)?,
    ])
}

fn notify_event(
    now: DateTime<Utc>,
    public_url: &str,
    metadata: &UploadMetadata,
    cv: &CvRecord,
    status: &str,
) -> Result<InvocationEvent, serde_json::Error> {
    let contact = applicant_contact(metadata);
    InvocationEvent::wrap(&NotifyPayload {
        cv_data: CvData::from_record(cv, public_url),
        metadata: NotifyMetadata {
            applicant_name: contact.applicant_name,
            email: contact.email,
            status: status.to_string(),
            cv_processed: true,
            processed_timestamp: timestamp(now),
        },
    })
}

fn email_event(
    metadata: &UploadMetadata,
    schedule_id: &str,
) -> Result<InvocationEvent, serde_json::Error> {
    InvocationEvent::wrap(&EmailPayload {
        metadata: applicant_contact(metadata),
        schedule_id: Some(schedule_id.to_string()),
    })
}

fn applicant_contact(metadata: &UploadMetadata) -> ApplicantContact {
    ApplicantContact {
        applicant_name: metadata
            .name
            .clone()
            .unwrap_or_else(|| METADATA_NOT_FOUND.to_string()),
        email: metadata
            .email
            .clone()
            .unwrap_or_else(|| METADATA_NOT_FOUND.to_string()),
    }
}

fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Micros, true)
}
