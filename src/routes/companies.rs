use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::{Company, CreateCompany, UpdateCompany};
use crate::services::catalog_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_companies).post(create_company))
        .route("/:id", get(get_company).put(update_company).delete(delete_company))
}

pub async fn create_company(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateCompany>,
) -> Result<(StatusCode, Json<Company>), AppError> {
    info!("POST /api/companies - {}", request.company_name);
    let company = catalog_service::create_company(&state.services, &user, &request).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

pub async fn list_companies(State(state): State<AppState>) -> Result<Json<Vec<Company>>, AppError> {
    info!("GET /api/companies");
    Ok(Json(catalog_service::list_companies(&state.services).await?))
}

pub async fn get_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Company>, AppError> {
    info!("GET /api/companies/{}", id);
    Ok(Json(catalog_service::get_company(&state.services, id).await?))
}

pub async fn update_company(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCompany>,
) -> Result<Json<Company>, AppError> {
    info!("PUT /api/companies/{}", id);
    Ok(Json(catalog_service::update_company(&state.services, &user, id, &request).await?))
}

pub async fn delete_company(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    info!("DELETE /api/companies/{}", id);
    catalog_service::delete_company(&state.services, &user, id).await?;
    Ok(Json(json!({ "message": "Company deleted successfully" })))
}
