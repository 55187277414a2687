use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::{is_unique_violation, AppError};
use crate::models::{Application, CreateApplicationRequest, Job, NewApplication, Role};
use crate::services::email_service::{send_application_created_email, send_application_deleted_email};
use crate::services::side_effect::SideEffect;
use crate::services::Services;

const DUPLICATE_APPLICATION: &str = "You have already applied for this job.";

fn application_not_found() -> AppError {
    AppError::NotFound("Application not found".to_string())
}

async fn find_job(services: &Services, job_id: Uuid) -> Result<Job, AppError> {
    services
        .catalog
        .job(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))
}

/// True when `user` created the company.
pub(crate) async fn owns_company(services: &Services, user: &AuthUser, company_id: Uuid) -> Result<bool, AppError> {
    Ok(services
        .catalog
        .company(company_id)
        .await?
        .map(|company| company.created_by == user.id)
        .unwrap_or(false))
}

/// True when `user` owns the company that posted `job`.
async fn owns_job(services: &Services, user: &AuthUser, job: &Job) -> Result<bool, AppError> {
    owns_company(services, user, job.company_id).await
}

/// Employer owning the application's company, or admin.
pub(crate) async fn ensure_can_manage(
    services: &Services,
    user: &AuthUser,
    application: &Application,
) -> Result<(), AppError> {
    user.require_role(&[Role::Employer, Role::Admin])?;
    if user.is_admin() || owns_company(services, user, application.company_id).await? {
        return Ok(());
    }
    Err(AppError::Forbidden("Not authorized to update this application".to_string()))
}

/// Applicant, employer owning the job, or admin.
async fn ensure_can_access(
    services: &Services,
    user: &AuthUser,
    application: &Application,
) -> Result<(), AppError> {
    if user.is_admin() || application.user_id == user.id {
        return Ok(());
    }
    if user.role == Role::Employer {
        if let Some(job) = services.catalog.job(application.job_id).await? {
            if owns_job(services, user, &job).await? {
                return Ok(());
            }
        }
    }
    Err(AppError::Forbidden("Not authorized to access this application".to_string()))
}

// ==============================================================================
// Create
// ==============================================================================

pub async fn create_application(
    services: &Services,
    user: &AuthUser,
    request: CreateApplicationRequest,
) -> Result<Application, AppError> {
    user.require_role(&[Role::Employee])?;

    let resume = request
        .resume_path
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Resume is required.".to_string()))?;

    if services.applications.exists_for(user.id, request.job_id).await? {
        return Err(AppError::Conflict(DUPLICATE_APPLICATION.to_string()));
    }

    let job = find_job(services, request.job_id).await?;
    if job.company_id != request.company_id {
        return Err(AppError::Validation("Job does not belong to this company".to_string()));
    }

    let new = NewApplication {
        user_id: user.id,
        job_id: job.id,
        company_id: job.company_id,
        name: request.name,
        email: request.email,
        phone: request.phone,
        location: request.location,
        experience: request.experience,
        resume,
        education: request.education,
        experience_details: request.experience_details,
        questions_and_answers: request.questions_and_answers,
    };

    let application = services.applications.insert(new).await.map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(DUPLICATE_APPLICATION.to_string())
        } else {
            AppError::from(e)
        }
    })?;

    services.catalog.add_applied_job(user.id, job.id).await?;
    info!("Application {} created by {} for job {}", application.id, user.id, job.id);

    SideEffect::from_result(
        "Application created email",
        send_application_created_email(
            services.mailer.as_ref(),
            services.catalog.as_ref(),
            &services.branding,
            &application,
            &job.position,
        )
        .await,
    );

    Ok(application)
}

// ==============================================================================
// Read
// ==============================================================================

pub async fn get_application(services: &Services, user: &AuthUser, id: Uuid) -> Result<Application, AppError> {
    let application = services.applications.find(id).await?.ok_or_else(application_not_found)?;
    ensure_can_access(services, user, &application).await?;
    Ok(application)
}

/// Every application in the system. Admin only.
pub async fn list_applications(services: &Services, user: &AuthUser) -> Result<Vec<Application>, AppError> {
    user.require_role(&[Role::Admin])?;
    Ok(services.applications.list_all().await?)
}

pub async fn list_applications_for_job(
    services: &Services,
    user: &AuthUser,
    job_id: Uuid,
) -> Result<Vec<Application>, AppError> {
    let job = find_job(services, job_id).await?;

    if !user.is_admin() && !owns_job(services, user, &job).await? {
        return Err(AppError::Forbidden(
            "Not authorized to view applications for this job".to_string(),
        ));
    }

    Ok(services.applications.list_for_job(job_id).await?)
}

pub async fn applied_jobs(services: &Services, user: &AuthUser, user_id: Uuid) -> Result<Vec<Uuid>, AppError> {
    if user.id != user_id && !user.is_admin() {
        return Err(AppError::Forbidden("Not authorized to view applied jobs".to_string()));
    }

    services
        .catalog
        .applied_jobs(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

// ==============================================================================
// Delete
// ==============================================================================

/// Deletes an application, pulls the job from the applicant's applied jobs and
/// emails the applicant.
pub async fn delete_application(services: &Services, user: &AuthUser, id: Uuid) -> Result<Application, AppError> {
    let existing = services.applications.find(id).await?.ok_or_else(application_not_found)?;
    ensure_can_access(services, user, &existing).await?;

    let application = services.applications.delete(id).await?.ok_or_else(application_not_found)?;
    services
        .catalog
        .remove_applied_job(application.user_id, application.job_id)
        .await?;
    info!("Application {} deleted by {}", id, user.id);

    let job_title = match services.catalog.job(application.job_id).await {
        Ok(Some(job)) => job.position,
        Ok(None) => "the position".to_string(),
        Err(e) => {
            warn!("Failed to load job {} for deletion email: {}", application.job_id, e);
            "the position".to_string()
        }
    };

    SideEffect::from_result(
        "Application deleted email",
        send_application_deleted_email(
            services.mailer.as_ref(),
            services.catalog.as_ref(),
            &services.branding,
            &application,
            &job_title,
        )
        .await,
    );

    Ok(application)
}

// ==============================================================================
// Resume download
// ==============================================================================

/// Reduces a stored resume reference to its bare file name.
fn resume_file_name(stored: &str) -> Option<String> {
    let normalized = stored.replace('\\', "/");
    Path::new(&normalized)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty() && *name != "..")
        .map(str::to_string)
}

/// Locates the resume file for an application under `uploads_dir`, checking
/// `uploads/`, `uploads/resumes/` and `uploads/resumes/uploads/` in order.
pub async fn find_resume(
    services: &Services,
    user: &AuthUser,
    uploads_dir: &Path,
    id: Uuid,
) -> Result<(Application, PathBuf), AppError> {
    let application = get_application(services, user, id).await?;

    let file_name = resume_file_name(&application.resume)
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;

    let candidates = [
        uploads_dir.join(&file_name),
        uploads_dir.join("resumes").join(&file_name),
        uploads_dir.join("resumes").join("uploads").join(&file_name),
    ];

    for candidate in candidates {
        if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
            return Ok((application, candidate));
        }
    }

    warn!("Resume file {} for application {} not found on disk", file_name, id);
    Err(AppError::NotFound("Resume file not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ApplicationStatus;
    use crate::services::testing::fixture;

    fn auth(id: Uuid, role: Role) -> AuthUser {
        AuthUser {
            id,
            role,
            email: format!("{}@example.com", role),
            name: role.to_string(),
        }
    }

    fn request(job: &Job) -> CreateApplicationRequest {
        CreateApplicationRequest {
            job_id: job.id,
            company_id: job.company_id,
            name: "Jane Applicant".to_string(),
            email: "jane@example.com".to_string(),
            phone: "555-0100".to_string(),
            location: "Remote".to_string(),
            experience: 4,
            resume_path: Some("uploads\\resumes\\jane.pdf".to_string()),
            education: Vec::new(),
            experience_details: Vec::new(),
            questions_and_answers: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_create_application_records_applied_job_and_emails() {
        let f = fixture();
        let job = f.store.seed_job(f.store.seed_company(None).id, "Backend Engineer");
        let employee = auth(Uuid::new_v4(), Role::Employee);

        let app = create_application(&f.services, &employee, request(&job)).await.unwrap();

        assert_eq!(app.status, ApplicationStatus::Pending);
        assert!(app.rejected_at.is_none());
        assert_eq!(f.store.applied_jobs_of(employee.id), vec![job.id]);
        let sent = f.mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].template, "application-created");
    }

    #[tokio::test]
    async fn test_duplicate_application_conflicts() {
        let f = fixture();
        let job = f.store.seed_job(f.store.seed_company(None).id, "Backend Engineer");
        let employee = auth(Uuid::new_v4(), Role::Employee);

        create_application(&f.services, &employee, request(&job)).await.unwrap();
        let err = create_application(&f.services, &employee, request(&job)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m == DUPLICATE_APPLICATION));
    }

    #[tokio::test]
    async fn test_only_employees_apply_and_resume_is_required() {
        let f = fixture();
        let job = f.store.seed_job(f.store.seed_company(None).id, "Backend Engineer");

        let err = create_application(&f.services, &auth(Uuid::new_v4(), Role::Employer), request(&job))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let mut no_resume = request(&job);
        no_resume.resume_path = None;
        let err = create_application(&f.services, &auth(Uuid::new_v4(), Role::Employee), no_resume)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Resume is required."));
    }

    #[tokio::test]
    async fn test_mailer_failure_does_not_fail_create() {
        let f = fixture();
        let job = f.store.seed_job(f.store.seed_company(None).id, "Backend Engineer");
        f.mailer.fail(true);

        let result = create_application(&f.services, &auth(Uuid::new_v4(), Role::Employee), request(&job)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_list_for_job_requires_owner() {
        let f = fixture();
        let company = f.store.seed_company(None);
        let job = f.store.seed_job(company.id, "Backend Engineer");
        f.store.seed_application(Uuid::new_v4(), &job);

        let owner = auth(company.created_by, Role::Employer);
        assert_eq!(list_applications_for_job(&f.services, &owner, job.id).await.unwrap().len(), 1);

        let stranger = auth(Uuid::new_v4(), Role::Employer);
        let err = list_applications_for_job(&f.services, &stranger, job.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let admin = auth(Uuid::new_v4(), Role::Admin);
        assert!(list_applications_for_job(&f.services, &admin, job.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_pulls_applied_job_and_emails() {
        let f = fixture();
        let job = f.store.seed_job(f.store.seed_company(None).id, "Backend Engineer");
        let applicant = Uuid::new_v4();
        let app = f.store.seed_application(applicant, &job);

        let deleted = delete_application(&f.services, &auth(applicant, Role::Employee), app.id)
            .await
            .unwrap();
        assert_eq!(deleted.id, app.id);
        assert!(f.store.application(app.id).is_none());
        assert!(f.store.applied_jobs_of(applicant).is_empty());

        let sent = f.mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Application Deleted for Backend Engineer");
    }

    #[tokio::test]
    async fn test_other_employee_cannot_read_application() {
        let f = fixture();
        let job = f.store.seed_job(f.store.seed_company(None).id, "Backend Engineer");
        let app = f.store.seed_application(Uuid::new_v4(), &job);

        let err = get_application(&f.services, &auth(Uuid::new_v4(), Role::Employee), app.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_find_resume_searches_nested_upload_dirs() {
        let f = fixture();
        let job = f.store.seed_job(f.store.seed_company(None).id, "Backend Engineer");
        let applicant = Uuid::new_v4();
        let app = f.store.seed_application(applicant, &job);

        let uploads = std::env::temp_dir().join(format!("jobportal-uploads-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(uploads.join("resumes/uploads")).await.unwrap();
        tokio::fs::write(uploads.join("resumes/uploads/jane.pdf"), b"%PDF").await.unwrap();

        let (_, path) = find_resume(&f.services, &auth(applicant, Role::Employee), &uploads, app.id)
            .await
            .unwrap();
        assert_eq!(path, uploads.join("resumes/uploads/jane.pdf"));

        tokio::fs::remove_dir_all(&uploads).await.unwrap();
        let err = find_resume(&f.services, &auth(applicant, Role::Employee), &uploads, app.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "Resume file not found"));
    }

    #[test]
    fn test_resume_file_name_strips_directories() {
        assert_eq!(resume_file_name("uploads\\resumes\\cv.pdf").as_deref(), Some("cv.pdf"));
        assert_eq!(resume_file_name("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(resume_file_name(""), None);
    }
}
