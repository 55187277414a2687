use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::{
    Company, CreateCompany, CreateJob, Job, Role, SavedJobToggleResponse, UpdateCompany, UpdateJob,
};
use crate::services::Services;

fn company_not_found() -> AppError {
    AppError::NotFound("Company not found".to_string())
}

fn job_not_found() -> AppError {
    AppError::NotFound("Job not found".to_string())
}

fn ensure_owner(user: &AuthUser, company: &Company, denied: &str) -> Result<(), AppError> {
    if user.is_admin() || company.created_by == user.id {
        Ok(())
    } else {
        Err(AppError::Forbidden(denied.to_string()))
    }
}

fn reject_blank(value: Option<&str>, message: &str) -> Result<(), AppError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(AppError::Validation(message.to_string())),
        _ => Ok(()),
    }
}

async fn find_company(services: &Services, id: Uuid) -> Result<Company, AppError> {
    services.catalog.company(id).await?.ok_or_else(company_not_found)
}

/// The job and the company that posted it.
async fn find_job_with_company(services: &Services, id: Uuid) -> Result<(Job, Company), AppError> {
    let job = services.catalog.job(id).await?.ok_or_else(job_not_found)?;
    let company = find_company(services, job.company_id).await?;
    Ok((job, company))
}

// ==============================================================================
// Companies
// ==============================================================================

pub async fn create_company(
    services: &Services,
    user: &AuthUser,
    request: &CreateCompany,
) -> Result<Company, AppError> {
    user.require_role(&[Role::Employer, Role::Admin])?;
    reject_blank(Some(&request.company_name), "Company name is required")?;

    let company = services.catalog.create_company(user.id, request).await?;
    info!("Company {} created by {}", company.id, user.id);
    Ok(company)
}

pub async fn list_companies(services: &Services) -> Result<Vec<Company>, AppError> {
    Ok(services.catalog.companies().await?)
}

pub async fn get_company(services: &Services, id: Uuid) -> Result<Company, AppError> {
    find_company(services, id).await
}

pub async fn update_company(
    services: &Services,
    user: &AuthUser,
    id: Uuid,
    update: &UpdateCompany,
) -> Result<Company, AppError> {
    reject_blank(update.company_name.as_deref(), "Company name is required")?;

    let company = find_company(services, id).await?;
    ensure_owner(user, &company, "Access denied. Unauthorized to update this company.")?;

    services
        .catalog
        .update_company(id, update)
        .await?
        .ok_or_else(company_not_found)
}

/// Deletes the company together with its jobs.
pub async fn delete_company(services: &Services, user: &AuthUser, id: Uuid) -> Result<(), AppError> {
    let company = find_company(services, id).await?;
    ensure_owner(user, &company, "Access denied")?;

    if !services.catalog.delete_company(id).await? {
        return Err(company_not_found());
    }
    info!("Company {} deleted by {}", id, user.id);
    Ok(())
}

// ==============================================================================
// Jobs
// ==============================================================================

/// Employers may only post for companies they created; admins for any company.
pub async fn create_job(services: &Services, user: &AuthUser, request: &CreateJob) -> Result<Job, AppError> {
    user.require_role(&[Role::Employer, Role::Admin])?;
    reject_blank(Some(&request.position), "Position is required")?;

    let company = find_company(services, request.company_id).await?;
    ensure_owner(user, &company, "Not authorized to post jobs for this company")?;

    Ok(services.catalog.create_job(request).await?)
}

pub async fn list_jobs(services: &Services) -> Result<Vec<Job>, AppError> {
    Ok(services.catalog.all_jobs().await?)
}

pub async fn get_job(services: &Services, id: Uuid) -> Result<Job, AppError> {
    services.catalog.job(id).await?.ok_or_else(job_not_found)
}

pub async fn update_job(
    services: &Services,
    user: &AuthUser,
    id: Uuid,
    update: &UpdateJob,
) -> Result<Job, AppError> {
    reject_blank(update.position.as_deref(), "Position is required")?;

    let (_, company) = find_job_with_company(services, id).await?;
    ensure_owner(user, &company, "Access denied")?;

    services.catalog.update_job(id, update).await?.ok_or_else(job_not_found)
}

/// Removes the posting. Existing applications for it are left in place.
pub async fn delete_job(services: &Services, user: &AuthUser, id: Uuid) -> Result<(), AppError> {
    let (_, company) = find_job_with_company(services, id).await?;
    ensure_owner(user, &company, "Access denied")?;

    if !services.catalog.delete_job(id).await? {
        return Err(job_not_found());
    }
    info!("Job {} deleted by {}", id, user.id);
    Ok(())
}

// ==============================================================================
// Saved jobs
// ==============================================================================

pub async fn toggle_saved_job(
    services: &Services,
    user: &AuthUser,
    job_id: Uuid,
) -> Result<SavedJobToggleResponse, AppError> {
    services.catalog.job(job_id).await?.ok_or_else(job_not_found)?;

    let saved_jobs = services
        .catalog
        .toggle_saved_job(user.id, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let saved = saved_jobs.contains(&job_id);
    Ok(SavedJobToggleResponse {
        message: if saved { "Job saved successfully" } else { "Job unsaved successfully" },
        saved,
        saved_jobs,
    })
}

pub async fn saved_jobs(services: &Services, user: &AuthUser) -> Result<Vec<Job>, AppError> {
    let ids = services
        .catalog
        .saved_job_ids(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(services.catalog.jobs(&ids).await?)
}
