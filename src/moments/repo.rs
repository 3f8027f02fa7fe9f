use sqlx::{Executor, Sqlite};

use super::repo_types::Moment;

pub struct NewMoment<'a> {
    pub user_id: i64,
    pub filename: &'a str,
    pub file_type: &'a str,
    pub emotion: Option<&'a str>,
}

/// Insert a moment; `created_at` is stamped by the store.
pub async fn insert_moment<'e, E>(db: E, new: &NewMoment<'_>) -> Result<Moment, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Moment>(
        r#"
        INSERT INTO moments (user_id, filename, file_type, emotion)
        VALUES (?, ?, ?, ?)
        RETURNING id, user_id, filename, file_type, emotion, created_at
        "#,
    )
    .bind(new.user_id)
    .bind(new.filename)
    .bind(new.file_type)
    .bind(new.emotion)
    .fetch_one(db)
    .await
}

/// Every moment, newest first. Same-instant inserts fall back to insertion order.
pub async fn list_feed<'e, E>(db: E) -> Result<Vec<Moment>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Moment>(
        r#"
        SELECT id, user_id, filename, file_type, emotion, created_at
          FROM moments
         ORDER BY created_at DESC, id DESC
        "#,
    )
    .fetch_all(db)
    .await
}

#[cfg(test)]
pub async fn count_by_user<'e, E>(db: E, user_id: i64) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM moments WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(db)
        .await?;
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    fn moment(user_id: i64, filename: &str) -> NewMoment<'_> {
        NewMoment {
            user_id,
            filename,
            file_type: "image",
            emotion: Some("calm"),
        }
    }

    #[tokio::test]
    async fn insert_stamps_creation_time() {
        let db = connect_in_memory().await.unwrap();
        let m = insert_moment(&db, &moment(1, "a.png")).await.unwrap();
        assert_eq!(m.user_id, 1);
        assert_eq!(m.emotion.as_deref(), Some("calm"));
        // YYYY-MM-DD HH:MM:SS.SSS
        assert_eq!(m.created_at.len(), 23);
    }

    #[tokio::test]
    async fn feed_is_newest_first() {
        let db = connect_in_memory().await.unwrap();
        for name in ["first.png", "second.png", "third.png"] {
            insert_moment(&db, &moment(1, name)).await.unwrap();
        }
        // an older row inserted last must not jump the queue
        sqlx::query(
            "INSERT INTO moments (user_id, filename, file_type, created_at) \
             VALUES (1, 'old.png', 'image', '2000-01-01 00:00:00.000')",
        )
        .execute(&db)
        .await
        .unwrap();

        let feed = list_feed(&db).await.unwrap();
        let names: Vec<_> = feed.iter().map(|m| m.filename.as_str()).collect();
        assert_eq!(names, vec!["third.png", "second.png", "first.png", "old.png"]);
        assert!(feed.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[tokio::test]
    async fn empty_feed() {
        let db = connect_in_memory().await.unwrap();
        assert!(list_feed(&db).await.unwrap().is_empty());
        assert_eq!(count_by_user(&db, 1).await.unwrap(), 0);
    }
}
