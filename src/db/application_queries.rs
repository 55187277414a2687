use crate::models::{Application, NewApplication, StatusChange};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

// ==============================================================================
// Reads
// ==============================================================================

pub async fn get_application(pool: &PgPool, id: Uuid) -> Result<Option<Application>, sqlx::Error> {
    let application = sqlx::query_as::<_, Application>(
        r#"
        SELECT * FROM applications WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(application)
}

pub async fn get_applications_by_ids(
    pool: &PgPool,
    ids: &[Uuid],
) -> Result<Vec<Application>, sqlx::Error> {
    let applications = sqlx::query_as::<_, Application>(
        r#"
        SELECT * FROM applications
        WHERE id = ANY($1)
        ORDER BY created_at
        "#,
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;

    Ok(applications)
}

pub async fn get_all_applications(pool: &PgPool) -> Result<Vec<Application>, sqlx::Error> {
    let applications = sqlx::query_as::<_, Application>(
        r#"
        SELECT * FROM applications ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(applications)
}

pub async fn get_applications_for_job(
    pool: &PgPool,
    job_id: Uuid,
) -> Result<Vec<Application>, sqlx::Error> {
    let applications = sqlx::query_as::<_, Application>(
        r#"
        SELECT * FROM applications
        WHERE job_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(job_id)
    .fetch_all(pool)
    .await?;

    Ok(applications)
}

pub async fn application_exists(
    pool: &PgPool,
    user_id: Uuid,
    job_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(SELECT 1 FROM applications WHERE user_id = $1 AND job_id = $2)
        "#,
    )
    .bind(user_id)
    .bind(job_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

// ==============================================================================
// Writes
// ==============================================================================

pub async fn create_application(
    pool: &PgPool,
    new: &NewApplication,
) -> Result<Application, sqlx::Error> {
    let application = sqlx::query_as::<_, Application>(
        r#"
        INSERT INTO applications (
            id, user_id, job_id, company_id, name, email, phone, location,
            experience, resume, education, experience_details, questions_and_answers
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.user_id)
    .bind(new.job_id)
    .bind(new.company_id)
    .bind(&new.name)
    .bind(&new.email)
    .bind(&new.phone)
    .bind(&new.location)
    .bind(new.experience)
    .bind(&new.resume)
    .bind(Json(&new.education))
    .bind(Json(&new.experience_details))
    .bind(Json(&new.questions_and_answers))
    .fetch_one(pool)
    .await?;

    Ok(application)
}

/// Status and `rejected_at` are written in one statement so readers never
/// observe one without the other. Notes are kept when the change carries none.
pub async fn update_status(
    pool: &PgPool,
    id: Uuid,
    change: &StatusChange,
) -> Result<Option<Application>, sqlx::Error> {
    let application = sqlx::query_as::<_, Application>(
        r#"
        UPDATE applications
        SET status = $2,
            rejected_at = $3,
            notes = COALESCE($4, notes),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(change.status.as_str())
    .bind(change.rejected_at)
    .bind(change.notes.as_deref())
    .fetch_optional(pool)
    .await?;

    Ok(application)
}

pub async fn update_status_many(
    pool: &PgPool,
    ids: &[Uuid],
    change: &StatusChange,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE applications
        SET status = $2,
            rejected_at = $3,
            notes = COALESCE($4, notes),
            updated_at = NOW()
        WHERE id = ANY($1)
        "#,
    )
    .bind(ids)
    .bind(change.status.as_str())
    .bind(change.rejected_at)
    .bind(change.notes.as_deref())
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub async fn delete_application(pool: &PgPool, id: Uuid) -> Result<Option<Application>, sqlx::Error> {
    let application = sqlx::query_as::<_, Application>(
        r#"
        DELETE FROM applications WHERE id = $1 RETURNING *
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(application)
}

/// Returns the deleted rows so callers clean up only what was actually removed.
pub async fn delete_rejected_before(
    pool: &PgPool,
    cutoff: DateTime<Utc>,
) -> Result<Vec<Application>, sqlx::Error> {
    let applications = sqlx::query_as::<_, Application>(
        r#"
        DELETE FROM applications
        WHERE status = 'rejected' AND rejected_at < $1
        RETURNING *
        "#,
    )
    .bind(cutoff)
    .fetch_all(pool)
    .await?;

    Ok(applications)
}
