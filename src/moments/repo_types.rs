use serde::Serialize;
use sqlx::FromRow;

/// Moment record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Moment {
    pub id: i64,
    pub user_id: i64,
    pub filename: String,
    pub file_type: String,
    pub emotion: Option<String>,
    pub created_at: String,
}

/// One feed entry as the client sees it.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct FeedItem {
    pub filename: String,
    #[serde(rename = "type")]
    pub file_type: String,
    pub emotion: Option<String>,
    pub time: String,
}

impl From<Moment> for FeedItem {
    fn from(m: Moment) -> Self {
        Self {
            filename: m.filename,
            file_type: m.file_type,
            emotion: m.emotion,
            time: m.created_at,
        }
    }
}
