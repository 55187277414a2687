use crate::models::{Otp, OtpPurpose};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Replaces any outstanding code for the same email and purpose.
pub async fn replace_otp(
    pool: &PgPool,
    email: &str,
    purpose: OtpPurpose,
    code: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM otps WHERE email = $1 AND purpose = $2")
        .bind(email)
        .bind(purpose.as_str())
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO otps (id, email, code, purpose, expires_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(code)
    .bind(purpose.as_str())
    .bind(expires_at)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

pub async fn find_otp(
    pool: &PgPool,
    email: &str,
    purpose: OtpPurpose,
    code: &str,
) -> Result<Option<Otp>, sqlx::Error> {
    let otp = sqlx::query_as::<_, Otp>(
        r#"
        SELECT id, email, code, expires_at FROM otps
        WHERE email = $1 AND purpose = $2 AND code = $3
        "#,
    )
    .bind(email)
    .bind(purpose.as_str())
    .bind(code)
    .fetch_optional(pool)
    .await?;

    Ok(otp)
}

pub async fn delete_otps(pool: &PgPool, email: &str, purpose: OtpPurpose) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM otps WHERE email = $1 AND purpose = $2")
        .bind(email)
        .bind(purpose.as_str())
        .execute(pool)
        .await?;

    Ok(())
}
