//! Applicant CV submission: stores the file in the upload bucket with the
//! applicant's details as object metadata, which in turn fires intake.

pub mod handlers;

use std::collections::{BTreeMap, HashMap};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::clients::ObjectStore;
use crate::errors::AppError;
use crate::models::cv::encode_metadata_value;
use crate::models::events::UploadLocation;

const UNKNOWN: &str = "Unknown";
const DEFAULT_FILE_NAME: &str = "uploaded-file";
const METADATA_FIELDS: [&str; 3] = ["name", "email", "phone"];

#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    /// Text fields as submitted.
    pub fields: BTreeMap<String, String>,
    pub file: Option<UploadedFile>,
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub contents: Bytes,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub cv_url: String,
    pub fields: BTreeMap<String, String>,
}

/// `<unix-millis>-<original file name>`
pub fn object_key(now: DateTime<Utc>, file_name: Option<&str>) -> String {
    let name = file_name
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_FILE_NAME);
    format!("{}-{name}", now.timestamp_millis())
}

pub async fn store_upload(
    store: &dyn ObjectStore,
    bucket: &str,
    form: UploadForm,
    now: DateTime<Utc>,
) -> Result<UploadResponse, AppError> {
    let file = form
        .file
        .ok_or_else(|| AppError::Validation("No CV file uploaded".to_string()))?;

    let metadata: HashMap<String, String> = METADATA_FIELDS
        .iter()
        .map(|key| {
            let value = form
                .fields
                .get(*key)
                .filter(|v| !v.is_empty())
                .map(|v| encode_metadata_value(v))
                .unwrap_or_else(|| UNKNOWN.to_string());
            (key.to_string(), value)
        })
        .collect();

    let location = UploadLocation {
        bucket: bucket.to_string(),
        key: object_key(now, file.file_name.as_deref()),
    };
    store
        .put(
            &location.bucket,
            &location.key,
            file.contents,
            file.content_type,
            metadata,
        )
        .await?;
    info!("Stored CV upload at {}/{}", location.bucket, location.key);

    Ok(UploadResponse {
        cv_url: location.public_url(),
        fields: form.fields,
    })
}
