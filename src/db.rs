use std::{str::FromStr, time::Duration};

use anyhow::Context;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Executor, SqlitePool,
};
use tracing::info;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    points        INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
);

CREATE TABLE IF NOT EXISTS moments (
    id         INTEGER PRIMARY KEY,
    user_id    INTEGER NOT NULL,
    filename   TEXT NOT NULL,
    file_type  TEXT NOT NULL,
    emotion    TEXT,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
);
"#;

/// Opens the SQLite pool, creating the database file if needed.
pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("parse DATABASE_URL {}", database_url))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let db = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await
        .context("connect to database")?;

    init_schema(&db).await?;
    info!(%database_url, "database ready");
    Ok(db)
}

/// In-memory database on a single long-lived connection; every pooled
/// connection to `:memory:` would otherwise see its own empty database.
#[cfg(test)]
pub async fn connect_in_memory() -> anyhow::Result<SqlitePool> {
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .context("open in-memory database")?;

    init_schema(&db).await?;
    Ok(db)
}

pub async fn init_schema(db: &SqlitePool) -> anyhow::Result<()> {
    db.execute(SCHEMA)
        .await
        .context("create schema")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_bootstrap_is_idempotent() {
        let db = connect_in_memory().await.expect("open db");
        init_schema(&db).await.expect("second init");

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(&db)
        .await
        .unwrap();
        let names: Vec<_> = tables.into_iter().map(|t| t.0).collect();
        assert_eq!(names, vec!["moments", "users"]);
    }
}
