use crate::models::JobRun;
use sqlx::PgPool;

pub async fn record_job_start(pool: &PgPool, job_name: &str) -> Result<i32, sqlx::Error> {
    let id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO job_runs (job_name, status)
        VALUES ($1, 'running')
        RETURNING id
        "#,
    )
    .bind(job_name)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

pub async fn record_job_success(
    pool: &PgPool,
    job_id: i32,
    items_processed: i32,
    items_failed: i32,
    duration_ms: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE job_runs
        SET completed_at = NOW(),
            status = 'success',
            items_processed = $2,
            items_failed = $3,
            duration_ms = $4
        WHERE id = $1
        "#,
    )
    .bind(job_id)
    .bind(items_processed)
    .bind(items_failed)
    .bind(duration_ms)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn record_job_failure(
    pool: &PgPool,
    job_id: i32,
    error_message: &str,
    duration_ms: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE job_runs
        SET completed_at = NOW(),
            status = 'failed',
            error_message = $2,
            duration_ms = $3
        WHERE id = $1
        "#,
    )
    .bind(job_id)
    .bind(error_message)
    .bind(duration_ms)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_recent_job_runs(pool: &PgPool, limit: i64) -> Result<Vec<JobRun>, sqlx::Error> {
    let runs = sqlx::query_as::<_, JobRun>(
        r#"
        SELECT * FROM job_runs
        ORDER BY started_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(runs)
}
