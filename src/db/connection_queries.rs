use crate::models::UserSummary;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn get_user_summary(pool: &PgPool, id: Uuid) -> Result<Option<UserSummary>, sqlx::Error> {
    let user = sqlx::query_as::<_, UserSummary>(
        "SELECT u.id, u.name, u.email, u.phone, u.role, u.created_at FROM users u WHERE u.id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn are_connected(pool: &PgPool, user_id: Uuid, other_id: Uuid) -> Result<bool, sqlx::Error> {
    let connected: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM connections WHERE user_id = $1 AND connection_id = $2)",
    )
    .bind(user_id)
    .bind(other_id)
    .fetch_one(pool)
    .await?;

    Ok(connected)
}

/// Returns false when the request is already pending.
pub async fn create_request(pool: &PgPool, sender_id: Uuid, receiver_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO connection_requests (sender_id, receiver_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(sender_id)
    .bind(receiver_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_request(pool: &PgPool, sender_id: Uuid, receiver_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM connection_requests WHERE sender_id = $1 AND receiver_id = $2")
        .bind(sender_id)
        .bind(receiver_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Consumes the pending request and links both users in one statement.
/// Returns false when there was no such request.
pub async fn accept_request(pool: &PgPool, sender_id: Uuid, receiver_id: Uuid) -> Result<bool, sqlx::Error> {
    let accepted: bool = sqlx::query_scalar(
        r#"
        WITH accepted AS (
            DELETE FROM connection_requests
            WHERE sender_id = $1 AND receiver_id = $2
            RETURNING sender_id, receiver_id
        ),
        linked AS (
            INSERT INTO connections (user_id, connection_id)
            SELECT sender_id, receiver_id FROM accepted
            UNION ALL
            SELECT receiver_id, sender_id FROM accepted
            ON CONFLICT DO NOTHING
        )
        SELECT EXISTS(SELECT 1 FROM accepted)
        "#,
    )
    .bind(sender_id)
    .bind(receiver_id)
    .fetch_one(pool)
    .await?;

    Ok(accepted)
}

pub async fn delete_connection(pool: &PgPool, user_id: Uuid, other_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM connections
        WHERE (user_id = $1 AND connection_id = $2)
           OR (user_id = $2 AND connection_id = $1)
        "#,
    )
    .bind(user_id)
    .bind(other_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn get_connections(pool: &PgPool, user_id: Uuid) -> Result<Vec<UserSummary>, sqlx::Error> {
    let users = sqlx::query_as::<_, UserSummary>(
        r#"
        SELECT u.id, u.name, u.email, u.phone, u.role, u.created_at FROM connections c
        JOIN users u ON u.id = c.connection_id
        WHERE c.user_id = $1
        ORDER BY c.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Users who sent `user_id` a request that is still pending.
pub async fn get_pending_requests(pool: &PgPool, user_id: Uuid) -> Result<Vec<UserSummary>, sqlx::Error> {
    let users = sqlx::query_as::<_, UserSummary>(
        r#"
        SELECT u.id, u.name, u.email, u.phone, u.role, u.created_at FROM connection_requests r
        JOIN users u ON u.id = r.sender_id
        WHERE r.receiver_id = $1
        ORDER BY r.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(users)
}
