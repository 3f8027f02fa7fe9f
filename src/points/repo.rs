use sqlx::{Executor, Sqlite};

/// Current balance, `None` when the user has no record.
pub async fn get_points<'e, E>(db: E, user_id: i64) -> Result<Option<i64>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row: Option<(i64,)> = sqlx::query_as("SELECT points FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(db)
        .await?;
    Ok(row.map(|r| r.0))
}

/// Adds `amount` and returns the new balance in the same statement.
/// `None` when no user row matched, in which case nothing changed.
pub async fn award<'e, E>(db: E, user_id: i64, amount: i64) -> Result<Option<i64>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row: Option<(i64,)> =
        sqlx::query_as("UPDATE users SET points = points + ? WHERE id = ? RETURNING points")
            .bind(amount)
            .bind(user_id)
            .fetch_optional(db)
            .await?;
    Ok(row.map(|r| r.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::User;
    use crate::db::connect_in_memory;

    #[tokio::test]
    async fn new_user_starts_at_zero() {
        let db = connect_in_memory().await.unwrap();
        let user = User::create(&db, "a@x.com", "hash").await.unwrap();
        assert_eq!(user.points, 0);
        assert_eq!(get_points(&db, user.id).await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn award_accumulates() {
        let db = connect_in_memory().await.unwrap();
        let user = User::create(&db, "a@x.com", "hash").await.unwrap();
        assert_eq!(award(&db, user.id, 10).await.unwrap(), Some(10));
        assert_eq!(award(&db, user.id, 10).await.unwrap(), Some(20));
        assert_eq!(get_points(&db, user.id).await.unwrap(), Some(20));
    }

    #[tokio::test]
    async fn missing_user_has_no_balance() {
        let db = connect_in_memory().await.unwrap();
        assert_eq!(get_points(&db, 404).await.unwrap(), None);
        assert_eq!(award(&db, 404, 10).await.unwrap(), None);
    }

    #[tokio::test]
    async fn award_rolls_back_with_its_transaction() {
        let db = connect_in_memory().await.unwrap();
        let user = User::create(&db, "a@x.com", "hash").await.unwrap();

        let mut tx = db.begin().await.unwrap();
        assert_eq!(award(&mut *tx, user.id, 10).await.unwrap(), Some(10));
        tx.rollback().await.unwrap();

        assert_eq!(get_points(&db, user.id).await.unwrap(), Some(0));
    }
}
