use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{debug, instrument, warn};

use super::dto::UploadResponse;
use super::repo_types::FeedItem;
use super::services::{self, UploadItem};
use crate::{
    auth::extractors::SessionUser,
    error::{AppError, AppResult},
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/feed", get(feed))
}

pub fn write_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

/// POST /upload (multipart): `file` plus optional `emotion` text field.
#[instrument(skip(state, mp))]
pub async fn upload(
    State(state): State<AppState>,
    SessionUser(user_id): SessionUser,
    mut mp: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let mut file: Option<UploadItem> = None;
    let mut emotion: Option<String> = None;

    while let Some(field) = mp.next_field().await.map_err(bad_multipart)? {
        match field.name() {
            Some("file") => {
                let original_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let body = field.bytes().await.map_err(bad_multipart)?;
                file = Some(UploadItem {
                    original_name,
                    body,
                    content_type,
                });
            }
            Some("emotion") => {
                emotion = Some(field.text().await.map_err(bad_multipart)?);
            }
            _ => {}
        }
    }

    let Some(file) = file else {
        warn!(user_id, "upload without file part");
        return Err(AppError::MissingFile("No file part"));
    };

    let shared = services::create_moment(&state, user_id, file, emotion).await?;
    debug!(filename = %shared.filename, file_type = shared.file_type, "upload stored");
    Ok(Json(UploadResponse {
        message: "Moment shared! +10 Bubbles!",
        points: shared.points,
    }))
}

#[instrument(skip(state))]
pub async fn feed(State(state): State<AppState>) -> AppResult<Json<Vec<FeedItem>>> {
    Ok(Json(services::list_feed(&state).await?))
}

fn bad_multipart(e: axum::extract::multipart::MultipartError) -> AppError {
    warn!(error = %e, "rejected multipart body");
    if e.status() == axum::http::StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::BadRequest(e.body_text())
    }
}
