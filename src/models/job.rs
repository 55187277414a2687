use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// A job posting. `position` doubles as the title in notifications and emails.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub company_id: Uuid,
    pub position: String,
    pub location: Option<String>,
    pub workplace: Option<String>,
    pub salary_range: Option<String>,
    pub description: Option<String>,
    pub deadline_to_apply: Option<DateTime<Utc>>,
    pub posted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateJob {
    pub company_id: Uuid,
    pub position: String,
    pub location: Option<String>,
    pub workplace: Option<String>,
    pub salary_range: Option<String>,
    pub description: Option<String>,
    pub deadline_to_apply: Option<DateTime<Utc>>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateJob {
    pub position: Option<String>,
    pub location: Option<String>,
    pub workplace: Option<String>,
    pub salary_range: Option<String>,
    pub description: Option<String>,
    pub deadline_to_apply: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToggleSavedJobRequest {
    pub job_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SavedJobToggleResponse {
    pub message: &'static str,
    pub saved: bool,
    pub saved_jobs: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct SavedJobsResponse {
    pub saved_jobs: Vec<Job>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JobRun {
    pub id: i32,
    pub job_name: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: String,
    pub error_message: Option<String>,
    pub items_processed: Option<i32>,
    pub items_failed: Option<i32>,
    pub duration_ms: Option<i64>,
}
