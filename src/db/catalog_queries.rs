use crate::models::{Company, CreateCompany, CreateJob, Job, UpdateCompany, UpdateJob};
use sqlx::PgPool;
use uuid::Uuid;

// ==============================================================================
// Companies
// ==============================================================================

pub async fn create_company(
    pool: &PgPool,
    created_by: Uuid,
    req: &CreateCompany,
) -> Result<Company, sqlx::Error> {
    let company = sqlx::query_as::<_, Company>(
        r#"
        INSERT INTO companies (id, company_name, company_type, location, company_logo, site_url, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&req.company_name)
    .bind(req.company_type.as_deref())
    .bind(req.location.as_deref())
    .bind(req.company_logo.as_deref())
    .bind(req.site_url.as_deref())
    .bind(created_by)
    .fetch_one(pool)
    .await?;

    Ok(company)
}

pub async fn get_company(pool: &PgPool, id: Uuid) -> Result<Option<Company>, sqlx::Error> {
    let company = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(company)
}

pub async fn get_all_companies(pool: &PgPool) -> Result<Vec<Company>, sqlx::Error> {
    let companies = sqlx::query_as::<_, Company>("SELECT * FROM companies ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;

    Ok(companies)
}

pub async fn update_company(
    pool: &PgPool,
    id: Uuid,
    req: &UpdateCompany,
) -> Result<Option<Company>, sqlx::Error> {
    let company = sqlx::query_as::<_, Company>(
        r#"
        UPDATE companies
        SET company_name = COALESCE($2, company_name),
            company_type = COALESCE($3, company_type),
            location = COALESCE($4, location),
            company_logo = COALESCE($5, company_logo),
            site_url = COALESCE($6, site_url)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(req.company_name.as_deref())
    .bind(req.company_type.as_deref())
    .bind(req.location.as_deref())
    .bind(req.company_logo.as_deref())
    .bind(req.site_url.as_deref())
    .fetch_optional(pool)
    .await?;

    Ok(company)
}

/// Deletes the company; its jobs go with it through the foreign key and are
/// pulled from every user's saved jobs in the same statement.
pub async fn delete_company(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        WITH company_jobs AS (
            SELECT id FROM jobs WHERE company_id = $1
        ),
        unsaved AS (
            UPDATE users
            SET saved_jobs = ARRAY(
                SELECT saved FROM unnest(saved_jobs) AS saved
                WHERE saved NOT IN (SELECT id FROM company_jobs)
            )
            WHERE saved_jobs && ARRAY(SELECT id FROM company_jobs)
        )
        DELETE FROM companies WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

// ==============================================================================
// Jobs
// ==============================================================================

pub async fn create_job(pool: &PgPool, req: &CreateJob) -> Result<Job, sqlx::Error> {
    let job = sqlx::query_as::<_, Job>(
        r#"
        INSERT INTO jobs (id, company_id, position, location, workplace, salary_range, description, deadline_to_apply)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(req.company_id)
    .bind(&req.position)
    .bind(req.location.as_deref())
    .bind(req.workplace.as_deref())
    .bind(req.salary_range.as_deref())
    .bind(req.description.as_deref())
    .bind(req.deadline_to_apply)
    .fetch_one(pool)
    .await?;

    Ok(job)
}

pub async fn get_job(pool: &PgPool, id: Uuid) -> Result<Option<Job>, sqlx::Error> {
    let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(job)
}

pub async fn get_jobs_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Job>, sqlx::Error> {
    let jobs = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await?;

    Ok(jobs)
}

pub async fn get_all_jobs(pool: &PgPool) -> Result<Vec<Job>, sqlx::Error> {
    let jobs = sqlx::query_as::<_, Job>("SELECT * FROM jobs ORDER BY posted_at DESC")
        .fetch_all(pool)
        .await?;

    Ok(jobs)
}

pub async fn update_job(pool: &PgPool, id: Uuid, req: &UpdateJob) -> Result<Option<Job>, sqlx::Error> {
    let job = sqlx::query_as::<_, Job>(
        r#"
        UPDATE jobs
        SET position = COALESCE($2, position),
            location = COALESCE($3, location),
            workplace = COALESCE($4, workplace),
            salary_range = COALESCE($5, salary_range),
            description = COALESCE($6, description),
            deadline_to_apply = COALESCE($7, deadline_to_apply)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(req.position.as_deref())
    .bind(req.location.as_deref())
    .bind(req.workplace.as_deref())
    .bind(req.salary_range.as_deref())
    .bind(req.description.as_deref())
    .bind(req.deadline_to_apply)
    .fetch_optional(pool)
    .await?;

    Ok(job)
}

/// Applications keep pointing at the deleted job; saved jobs are cleaned up.
pub async fn delete_job(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        WITH unsaved AS (
            UPDATE users
            SET saved_jobs = array_remove(saved_jobs, $1)
            WHERE $1 = ANY(saved_jobs)
        )
        DELETE FROM jobs WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
