use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use crate::auth::AuthUser;
use crate::db::job_run_queries;
use crate::errors::AppError;
use crate::models::{JobRun, Role};
use crate::state::AppState;

const DEFAULT_RECENT_RUNS: i64 = 50;
const MAX_RECENT_RUNS: i64 = 500;

pub fn router() -> Router<AppState> {
    Router::new().route("/jobs/recent", get(get_recent_job_runs))
}

#[derive(Debug, Deserialize)]
pub struct RecentRunsQuery {
    pub limit: Option<i64>,
}

/// Most recent scheduled job runs, newest first.
pub async fn get_recent_job_runs(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<RecentRunsQuery>,
) -> Result<Json<Vec<JobRun>>, AppError> {
    info!("GET /api/admin/jobs/recent");
    user.require_role(&[Role::Admin])?;

    let limit = query.limit.unwrap_or(DEFAULT_RECENT_RUNS).clamp(1, MAX_RECENT_RUNS);
    let runs = job_run_queries::get_recent_job_runs(&state.pool, limit).await?;
    Ok(Json(runs))
}
