use crate::auth::session::SessionStore;
use crate::config::AppConfig;
use crate::db;
use crate::storage::{LocalStorage, StorageClient};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub storage: Arc<dyn StorageClient>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = db::connect(&config.database_url).await?;
        let storage = Arc::new(LocalStorage::new(&config.upload_dir)) as Arc<dyn StorageClient>;

        Ok(Self::from_parts(db, config, storage))
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>, storage: Arc<dyn StorageClient>) -> Self {
        Self {
            db,
            config,
            storage,
            sessions: Arc::new(SessionStore::new()),
        }
    }
}
