use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::{
    CreateJob, Job, SavedJobToggleResponse, SavedJobsResponse, ToggleSavedJobRequest, UpdateJob,
};
use crate::services::catalog_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_jobs).post(create_job))
        .route("/saved", get(saved_jobs))
        .route("/toggle-save-job", post(toggle_saved_job))
        .route("/:id", get(get_job).put(update_job).delete(delete_job))
}

pub async fn create_job(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateJob>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    info!("POST /api/jobs - {} for company {}", request.position, request.company_id);
    let job = catalog_service::create_job(&state.services, &user, &request).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

pub async fn list_jobs(State(state): State<AppState>) -> Result<Json<Vec<Job>>, AppError> {
    info!("GET /api/jobs");
    Ok(Json(catalog_service::list_jobs(&state.services).await?))
}

pub async fn get_job(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Job>, AppError> {
    info!("GET /api/jobs/{}", id);
    Ok(Json(catalog_service::get_job(&state.services, id).await?))
}

pub async fn update_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateJob>,
) -> Result<Json<Job>, AppError> {
    info!("PUT /api/jobs/{}", id);
    Ok(Json(catalog_service::update_job(&state.services, &user, id, &request).await?))
}

pub async fn delete_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    info!("DELETE /api/jobs/{}", id);
    catalog_service::delete_job(&state.services, &user, id).await?;
    Ok(Json(json!({ "message": "Job deleted successfully" })))
}

pub async fn toggle_saved_job(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<ToggleSavedJobRequest>,
) -> Result<Json<SavedJobToggleResponse>, AppError> {
    info!("POST /api/jobs/toggle-save-job - {} toggling {}", user.id, request.job_id);
    Ok(Json(catalog_service::toggle_saved_job(&state.services, &user, request.job_id).await?))
}

pub async fn saved_jobs(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<SavedJobsResponse>, AppError> {
    info!("GET /api/jobs/saved - {}", user.id);
    let saved_jobs = catalog_service::saved_jobs(&state.services, &user).await?;
    Ok(Json(SavedJobsResponse { saved_jobs }))
}
