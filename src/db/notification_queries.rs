use crate::models::{NewNotification, Notification};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn create_notification(
    pool: &PgPool,
    new: &NewNotification,
) -> Result<Notification, sqlx::Error> {
    let notification = sqlx::query_as::<_, Notification>(
        r#"
        INSERT INTO notifications (id, user_id, sender_id, message, type)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.user_id)
    .bind(new.sender_id)
    .bind(&new.message)
    .bind(new.kind.as_str())
    .fetch_one(pool)
    .await?;

    Ok(notification)
}

pub async fn get_user_notifications(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<Notification>, sqlx::Error> {
    let notifications = sqlx::query_as::<_, Notification>(
        r#"
        SELECT * FROM notifications
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(notifications)
}

pub async fn count_unread(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read = FALSE
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Only notifications addressed to `user_id` can be toggled.
pub async fn set_read(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
    read: bool,
) -> Result<Option<Notification>, sqlx::Error> {
    let notification = sqlx::query_as::<_, Notification>(
        r#"
        UPDATE notifications
        SET read = $3
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(read)
    .fetch_optional(pool)
    .await?;

    Ok(notification)
}

pub async fn mark_all_read(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE notifications SET read = TRUE WHERE user_id = $1 AND read = FALSE
        "#,
    )
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
