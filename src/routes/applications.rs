use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::{error, info};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::{
    Application, AppliedJobsResponse, BulkUpdateStatusRequest, CreateApplicationRequest,
    UpdateStatusRequest,
};
use crate::services::{application_service, application_status_service};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_applications).post(create_application))
        .route("/bulk/status", patch(bulk_update_status))
        .route("/job/:id", get(list_applications_for_job))
        .route("/download/:id", get(download_resume))
        .route("/:id", get(get_application).delete(delete_application))
        .route("/:id/status", patch(update_status))
        .route("/:id/applied-jobs", get(applied_jobs))
}

pub async fn create_application(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<Application>), AppError> {
    info!("POST /api/applications - {} applying to job {}", user.id, request.job_id);
    let application = application_service::create_application(&state.services, &user, request).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

pub async fn list_applications(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Application>>, AppError> {
    info!("GET /api/applications - Listing applications");
    let applications = application_service::list_applications(&state.services, &user).await?;
    Ok(Json(applications))
}

pub async fn get_application(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Application>, AppError> {
    info!("GET /api/applications/{}", id);
    let application = application_service::get_application(&state.services, &user, id).await?;
    Ok(Json(application))
}

pub async fn delete_application(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    info!("DELETE /api/applications/{}", id);
    application_service::delete_application(&state.services, &user, id).await?;
    Ok(Json(json!({ "message": "Application deleted successfully" })))
}

pub async fn list_applications_for_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Vec<Application>>, AppError> {
    info!("GET /api/applications/job/{}", job_id);
    let applications = application_service::list_applications_for_job(&state.services, &user, job_id).await?;
    Ok(Json(applications))
}

pub async fn applied_jobs(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<AppliedJobsResponse>, AppError> {
    info!("GET /api/applications/{}/applied-jobs", user_id);
    let applied_jobs = application_service::applied_jobs(&state.services, &user, user_id).await?;
    Ok(Json(AppliedJobsResponse { applied_jobs }))
}

pub async fn download_resume(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    info!("GET /api/applications/download/{}", id);
    let (application, path) =
        application_service::find_resume(&state.services, &user, &state.config.uploads_dir, id).await?;

    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        error!("Failed to read resume {}: {}", path.display(), e);
        AppError::Internal(format!("Failed to read resume: {}", e))
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"resume-{}.pdf\"", application.id),
            ),
        ],
        Body::from(bytes),
    )
        .into_response())
}

pub async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    info!("PATCH /api/applications/{}/status - {}", id, request.status);
    let update = application_status_service::update_application_status(
        &state.services,
        id,
        &request.status,
        request.notes,
        &user,
    )
    .await?;

    Ok(Json(json!({
        "message": "Status updated successfully",
        "application": update.application,
    })))
}

pub async fn bulk_update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<BulkUpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    info!(
        "PATCH /api/applications/bulk/status - {} ids to {}",
        request.ids.len(),
        request.status
    );
    let result = application_status_service::bulk_update_application_status(
        &state.services,
        &request.ids,
        &request.status,
        request.notes,
        &user,
    )
    .await?;

    Ok(Json(json!({
        "message": "Bulk status update completed and emails sent",
        "matchedCount": result.summary.matched_count,
        "modifiedCount": result.summary.modified_count,
    })))
}
