use anyhow::Context;
use bytes::Bytes;
use time::OffsetDateTime;
use tracing::{info, warn};

use super::filename::{classify, stored_name};
use super::repo::{self, NewMoment};
use super::repo_types::FeedItem;
use crate::error::{AppError, AppResult};
use crate::points::{self, POINTS_PER_MOMENT};
use crate::state::AppState;

pub struct UploadItem {
    pub original_name: String,
    pub body: Bytes,
    pub content_type: String,
}

#[derive(Debug)]
pub struct SharedMoment {
    pub filename: String,
    pub file_type: &'static str,
    pub points: i64,
}

/// Stores the blob, then records the moment and awards points in one transaction.
/// The blob is removed again if the transaction does not commit.
pub async fn create_moment(
    st: &AppState,
    user_id: i64,
    upload: UploadItem,
    emotion: Option<String>,
) -> AppResult<SharedMoment> {
    if upload.original_name.is_empty() {
        return Err(AppError::MissingFile("No selected file"));
    }

    let filename = stored_name(&upload.original_name, OffsetDateTime::now_utc());
    let file_type = classify(&filename, &st.config.video_extensions).as_str();

    st.storage
        .put_object(&filename, upload.body, &upload.content_type)
        .await
        .with_context(|| format!("put_object {}", filename))
        .map_err(AppError::Storage)?;

    let recorded = record_moment(st, user_id, &filename, file_type, emotion.as_deref()).await;
    let points = match recorded {
        Ok(p) => p,
        Err(e) => {
            if let Err(cleanup) = st.storage.delete_object(&filename).await {
                warn!(error = %cleanup, %filename, "orphaned upload left behind");
            }
            return Err(e);
        }
    };

    info!(user_id, %filename, file_type, points, "moment shared");
    Ok(SharedMoment {
        filename,
        file_type,
        points,
    })
}

async fn record_moment(
    st: &AppState,
    user_id: i64,
    filename: &str,
    file_type: &str,
    emotion: Option<&str>,
) -> AppResult<i64> {
    let mut tx = st.db.begin().await?;
    repo::insert_moment(
        &mut *tx,
        &NewMoment {
            user_id,
            filename,
            file_type,
            emotion,
        },
    )
    .await?;

    // a session can outlive its user row; the moment must not
    let Some(points) = points::repo::award(&mut *tx, user_id, POINTS_PER_MOMENT).await? else {
        warn!(user_id, "session user has no record");
        return Err(AppError::Unauthorized);
    };
    tx.commit().await?;
    Ok(points)
}

pub async fn list_feed(st: &AppState) -> AppResult<Vec<FeedItem>> {
    let moments = repo::list_feed(&st.db).await?;
    Ok(moments.into_iter().map(FeedItem::from).collect())
}
