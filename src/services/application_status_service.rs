use chrono::Utc;
use futures::future::join_all;
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::{
    Application, ApplicationStatus, BulkStatusSummary, NewNotification, Role, StatusChange,
};
use crate::services::application_service::{ensure_can_manage, owns_company};
use crate::services::email_service::send_status_email;
use crate::services::notification_service::notify;
use crate::services::side_effect::SideEffect;
use crate::services::Services;

const UNKNOWN_JOB_TITLE: &str = "the position";

/// Result of a single status update along with what happened to its side effects.
#[derive(Debug)]
pub struct StatusUpdate {
    pub application: Application,
    pub notification: SideEffect,
    pub email: SideEffect,
}

/// Result of a bulk status update. `side_effect_failures` counts notifications
/// and emails that were attempted and failed.
#[derive(Debug)]
pub struct BulkStatusUpdate {
    pub summary: BulkStatusSummary,
    pub side_effect_failures: usize,
}

fn parse_status(status: &str) -> Result<ApplicationStatus, AppError> {
    ApplicationStatus::parse_target(status).ok_or_else(|| AppError::Validation("Invalid status".to_string()))
}

// ==============================================================================
// Single update
// ==============================================================================

/// Moves one application to `status`. Only the employer owning the
/// application's company, or an admin, may do so.
///
/// The owning job is resolved before anything is written, so a missing job
/// fails the request without touching the application.
pub async fn update_application_status(
    services: &Services,
    id: Uuid,
    status: &str,
    notes: Option<String>,
    actor: &AuthUser,
) -> Result<StatusUpdate, AppError> {
    actor.require_role(&[Role::Employer, Role::Admin])?;
    let status = parse_status(status)?;

    let existing = services
        .applications
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;
    ensure_can_manage(services, actor, &existing).await?;

    let job = services
        .catalog
        .job(existing.job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;

    let change = StatusChange::new(status, notes, Utc::now());
    let application = services
        .applications
        .update_status(id, &change)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;

    info!(
        "Application {} moved to '{}' by {} (was '{}')",
        id, status, actor.id, existing.status
    );

    let (notification, email) = tokio::join!(
        notify_applicant(services, &application, &job.position, status, actor.id),
        email_applicant(services, &application, &job.position, status),
    );

    Ok(StatusUpdate {
        application,
        notification,
        email,
    })
}

// ==============================================================================
// Bulk update
// ==============================================================================

/// Moves every listed application to `status` in one write and fans out the
/// notifications and emails per application.
///
/// A non-admin actor must own the company of every matched application; one
/// foreign application rejects the whole batch before anything is written.
pub async fn bulk_update_application_status(
    services: &Services,
    ids: &[String],
    status: &str,
    notes: Option<String>,
    actor: &AuthUser,
) -> Result<BulkStatusUpdate, AppError> {
    actor.require_role(&[Role::Employer, Role::Admin])?;
    if ids.is_empty() {
        return Err(AppError::Validation("IDs should be a non-empty array".to_string()));
    }

    let ids = ids
        .iter()
        .map(|id| Uuid::parse_str(id))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| AppError::Validation("One or more IDs are invalid".to_string()))?;

    let status = parse_status(status)?;

    let applications = services.applications.find_many(&ids).await?;
    if applications.is_empty() {
        return Err(AppError::NotFound("No applications found to update".to_string()));
    }

    if !actor.is_admin() {
        let mut company_ids: Vec<Uuid> = applications.iter().map(|a| a.company_id).collect();
        company_ids.sort();
        company_ids.dedup();
        for company_id in company_ids {
            if !owns_company(services, actor, company_id).await? {
                return Err(AppError::Forbidden(
                    "Not authorized to update one or more applications".to_string(),
                ));
            }
        }
    }

    let mut job_ids: Vec<Uuid> = applications.iter().map(|a| a.job_id).collect();
    job_ids.sort();
    job_ids.dedup();
    let job_titles: HashMap<Uuid, String> = services
        .catalog
        .jobs(&job_ids)
        .await?
        .into_iter()
        .map(|job| (job.id, job.position))
        .collect();

    let matched: Vec<Uuid> = applications.iter().map(|a| a.id).collect();
    let change = StatusChange::new(status, notes, Utc::now());
    let written = services.applications.update_status_many(&matched, &change).await?;

    info!(
        "Bulk status update to '{}' by {}: {} requested, {} matched, {} written",
        status,
        actor.id,
        ids.len(),
        applications.len(),
        written
    );

    let actor = actor.id;
    let outcomes = join_all(applications.iter().map(|application| {
        let title = job_titles.get(&application.job_id);
        async move {
            let notification = notify_applicant(
                services,
                application,
                title.map(String::as_str).unwrap_or(UNKNOWN_JOB_TITLE),
                status,
                actor,
            )
            .await;
            let email = match title {
                Some(title) => email_applicant(services, application, title, status).await,
                None => SideEffect::Skipped,
            };
            (notification, email)
        }
    }))
    .await;

    let side_effect_failures = outcomes
        .iter()
        .map(|(n, e)| usize::from(n.is_failed()) + usize::from(e.is_failed()))
        .sum::<usize>();
    if side_effect_failures > 0 {
        warn!("Bulk status update: {} side effects failed", side_effect_failures);
    }

    Ok(BulkStatusUpdate {
        summary: BulkStatusSummary {
            matched_count: applications.len(),
            modified_count: applications.len(),
        },
        side_effect_failures,
    })
}

// ==============================================================================
// Side effects
// ==============================================================================

async fn notify_applicant(
    services: &Services,
    application: &Application,
    job_title: &str,
    status: ApplicationStatus,
    actor: Uuid,
) -> SideEffect {
    let new = NewNotification::application_status(application.user_id, Some(actor), job_title, status);
    SideEffect::from_result(
        "Status notification",
        notify(services.notifications.as_ref(), services.notifier.as_ref(), new).await,
    )
}

async fn email_applicant(
    services: &Services,
    application: &Application,
    job_title: &str,
    status: ApplicationStatus,
) -> SideEffect {
    let result = send_status_email(
        services.mailer.as_ref(),
        services.catalog.as_ref(),
        &services.branding,
        application,
        job_title,
        status,
    )
    .await;

    match result {
        Ok(true) => SideEffect::Completed,
        Ok(false) => SideEffect::Skipped,
        Err(e) => SideEffect::from_result::<(), _>(&format!("Status email to {}", application.email), Err(e)),
    }
}
