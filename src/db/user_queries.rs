use crate::models::{Role, User};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn get_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn create_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    phone: &str,
    password_hash: &str,
    role: Role,
) -> Result<User, sqlx::Error> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, name, email, phone, password_hash, role)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(phone)
    .bind(password_hash)
    .bind(role.as_str())
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn mark_verified(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET is_verified = TRUE WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn update_password(pool: &PgPool, email: &str, password_hash: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE email = $1")
        .bind(email)
        .bind(password_hash)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

// ==============================================================================
// Applied jobs (kept in sync with the application lifecycle)
// ==============================================================================

pub async fn add_applied_job(pool: &PgPool, user_id: Uuid, job_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE users
        SET applied_jobs = array_append(applied_jobs, $2)
        WHERE id = $1 AND NOT ($2 = ANY(applied_jobs))
        "#,
    )
    .bind(user_id)
    .bind(job_id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn remove_applied_job(pool: &PgPool, user_id: Uuid, job_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET applied_jobs = array_remove(applied_jobs, $2) WHERE id = $1")
        .bind(user_id)
        .bind(job_id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn get_applied_jobs(pool: &PgPool, user_id: Uuid) -> Result<Option<Vec<Uuid>>, sqlx::Error> {
    let applied: Option<Vec<Uuid>> = sqlx::query_scalar("SELECT applied_jobs FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(applied)
}

// ==============================================================================
// Saved jobs
// ==============================================================================

/// Adds the job when absent, removes it when present. `None` when the user does not exist.
pub async fn toggle_saved_job(
    pool: &PgPool,
    user_id: Uuid,
    job_id: Uuid,
) -> Result<Option<Vec<Uuid>>, sqlx::Error> {
    let saved: Option<Vec<Uuid>> = sqlx::query_scalar(
        r#"
        UPDATE users
        SET saved_jobs = CASE
            WHEN $2 = ANY(saved_jobs) THEN array_remove(saved_jobs, $2)
            ELSE array_append(saved_jobs, $2)
        END
        WHERE id = $1
        RETURNING saved_jobs
        "#,
    )
    .bind(user_id)
    .bind(job_id)
    .fetch_optional(pool)
    .await?;

    Ok(saved)
}

pub async fn get_saved_job_ids(pool: &PgPool, user_id: Uuid) -> Result<Option<Vec<Uuid>>, sqlx::Error> {
    let saved: Option<Vec<Uuid>> = sqlx::query_scalar("SELECT saved_jobs FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(saved)
}
