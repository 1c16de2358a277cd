use axum::{
    extract::{Multipart, State},
    Json,
};
use chrono::Utc;

use crate::errors::AppError;
use crate::state::AppState;
use crate::uploads::{store_upload, UploadForm, UploadResponse, UploadedFile};

/// Multipart part carrying the CV file.
const FILE_PART: &str = "cv";

/// POST /api/v1/uploads
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == FILE_PART {
            let file_name = field.file_name().map(String::from);
            let content_type = field.content_type().map(String::from);
            let contents = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read CV file: {e}")))?;
            form.file = Some(UploadedFile {
                file_name,
                content_type,
                contents,
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Invalid field '{name}': {e}")))?;
            form.fields.insert(name, value);
        }
    }

    let response = store_upload(
        state.services.store.as_ref(),
        &state.config.upload_bucket,
        form,
        Utc::now(),
    )
    .await?;
    Ok(Json(response))
}
