//! Rejected Application Expiry Job
//!
//! Purges applications that have been in `rejected` status for longer than
//! the configured retention window and pulls the job from each applicant's
//! applied-jobs list.
//!
//! The delete returns the rows it removed and only those drive the per-user
//! cleanup, so an application moved out of `rejected` concurrently keeps its
//! applied-jobs entry. The two steps are not wrapped in a transaction. A crash
//! between them can leave an applied-jobs entry that points at a deleted
//! application. No notification or email is sent.

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::services::job_scheduler_service::{JobContext, JobResult};
use crate::services::Services;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepOutcome {
    pub deleted: u64,
    pub cleanup_failures: usize,
}

/// Scheduler entry point.
pub async fn run(ctx: JobContext) -> Result<JobResult, AppError> {
    let outcome = sweep_expired_applications(&ctx.services, Utc::now(), ctx.retention).await?;

    Ok(JobResult {
        items_processed: i32::try_from(outcome.deleted).unwrap_or(i32::MAX),
        items_failed: i32::try_from(outcome.cleanup_failures).unwrap_or(i32::MAX),
    })
}

/// Deletes applications rejected strictly before `now - retention`.
pub async fn sweep_expired_applications(
    services: &Services,
    now: DateTime<Utc>,
    retention: Duration,
) -> Result<SweepOutcome, AppError> {
    let cutoff = now - retention;

    let deleted = services.applications.delete_rejected_before(cutoff).await?;
    if deleted.is_empty() {
        return Ok(SweepOutcome::default());
    }

    let mut cleanup_failures = 0;
    for application in &deleted {
        if let Err(e) = services
            .catalog
            .remove_applied_job(application.user_id, application.job_id)
            .await
        {
            cleanup_failures += 1;
            warn!(
                "Failed to pull job {} from applied jobs of user {}: {}",
                application.job_id, application.user_id, e
            );
        }
    }

    info!(
        "🗑️ Deleted {} rejected applications older than {}",
        deleted.len(),
        cutoff
    );

    Ok(SweepOutcome {
        deleted: deleted.len() as u64,
        cleanup_failures,
    })
}
