use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use serde_json::{Value, json};

use crate::web::{AppState, auth, files};

/// Allowance for multipart boundaries and the text fields sent next to the file.
const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = usize::try_from(state.files().max_bytes() + MULTIPART_OVERHEAD_BYTES)
        .unwrap_or(usize::MAX);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route(
            "/api/files/upload",
            post(files::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/files/my-files", get(files::my_files))
        .route("/api/files/download/:id", get(files::download))
        .route("/api/files/delete/:id", delete(files::delete))
        .route("/api/files/stats", get(files::stats))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "edushare API is running" }))
}
