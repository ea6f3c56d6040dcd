use std::collections::HashMap;

use axum::{
    extract::{Multipart, multipart::MultipartError},
    http::StatusCode,
};

use crate::error::{AppError, AppResult};

/// A single file part buffered in memory.
#[derive(Debug)]
pub struct ReceivedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Parsed multipart form: at most one file plus any text fields.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<ReceivedFile>,
    pub text_fields: HashMap<String, String>,
}

impl UploadForm {
    pub fn text(&self, field_name: &str) -> Option<String> {
        self.text_fields.get(field_name).cloned()
    }
}

/// Reads the multipart body, accepting one file under `file_field`. Reading stops as soon as
/// the file grows past `max_bytes`, so oversized uploads are never fully buffered.
pub async fn read_upload_form(
    mut multipart: Multipart,
    file_field: &str,
    max_bytes: u64,
) -> AppResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|err| multipart_error(err, max_bytes))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        let Some(file_name) = field.file_name().map(str::to_string) else {
            let value = field
                .text()
                .await
                .map_err(|err| multipart_error(err, max_bytes))?;
            form.text_fields.insert(field_name, value);
            continue;
        };

        if field_name != file_field {
            return Err(AppError::validation(format!(
                "Unsupported file field `{field_name}`"
            )));
        }
        if form.file.is_some() {
            return Err(AppError::validation("Only one file may be uploaded"));
        }

        let content_type = field.content_type().map(str::to_string);
        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|err| multipart_error(err, max_bytes))?
        {
            if (bytes.len() + chunk.len()) as u64 > max_bytes {
                return Err(AppError::TooLarge { limit: max_bytes });
            }
            bytes.extend_from_slice(&chunk);
        }

        form.file = Some(ReceivedFile {
            file_name,
            content_type,
            bytes,
        });
    }

    Ok(form)
}

fn multipart_error(err: MultipartError, max_bytes: u64) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::TooLarge { limit: max_bytes }
    } else {
        AppError::validation(format!("Failed to parse upload form: {}", err.body_text()))
    }
}
