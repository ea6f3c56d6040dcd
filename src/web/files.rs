use axum::{
    Json,
    extract::{Multipart, Path, Query, State, multipart::MultipartRejection},
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    files::{FileFilters, FileRecord, FileStats, NewUpload},
    web::{
        AppState,
        auth::current_user,
        responses::Success,
        storage::attachment_response,
        uploads::read_upload_form,
    },
};

const FILE_FIELD: &str = "file";

#[derive(Debug, Default, Deserialize)]
pub struct FilesQuery {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub file: FileRecord,
}

#[derive(Debug, Serialize)]
pub struct FileListResponse {
    pub files: Vec<FileRecord>,
}

pub async fn upload(
    State(state): State<AppState>,
    jar: CookieJar,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<UploadResponse>> {
    let user = current_user(&state, &jar).await?;
    let multipart = multipart.map_err(|rejection| {
        AppError::validation(format!("Invalid upload form: {}", rejection.body_text()))
    })?;

    let store = state.files();
    let form = read_upload_form(multipart, FILE_FIELD, store.max_bytes()).await?;
    let subject = form.text("subject");
    let grade = form.text("grade");
    let description = form.text("description");
    let file = form
        .file
        .ok_or_else(|| AppError::validation("No file uploaded"))?;

    let record = store
        .save(
            user.id,
            NewUpload {
                original_name: file.file_name,
                content_type: file.content_type,
                bytes: file.bytes,
                subject,
                grade,
                description,
            },
        )
        .await?;

    Ok(Json(UploadResponse {
        success: true,
        file: record,
    }))
}

pub async fn my_files(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<FilesQuery>,
) -> AppResult<Json<FileListResponse>> {
    let user = current_user(&state, &jar).await?;

    let filters = FileFilters::new(query.subject, query.grade);
    let files = state.files().list_for_owner(user.id, &filters).await?;

    Ok(Json(FileListResponse { files }))
}

pub async fn download(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(file_id): Path<String>,
) -> AppResult<Response> {
    let user = current_user(&state, &jar).await?;
    let file_id = parse_file_id(&file_id)?;

    let download = state.files().download(user.id, file_id).await?;
    Ok(attachment_response(download))
}

pub async fn delete(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(file_id): Path<String>,
) -> AppResult<Json<Success>> {
    let user = current_user(&state, &jar).await?;
    let file_id = parse_file_id(&file_id)?;

    state.files().delete(user.id, file_id).await?;
    Ok(Success::ok())
}

pub async fn stats(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<Json<FileStats>> {
    let user = current_user(&state, &jar).await?;
    Ok(Json(state.files().stats(user.id).await?))
}

/// Malformed ids cannot name any file, so they are reported like missing ones.
fn parse_file_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::NotFound)
}
