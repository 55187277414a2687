use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::{
    ConnectionsResponse, PendingRequestsResponse, RespondToConnectionRequest, SendConnectionRequest,
    UnconnectRequest,
};
use crate::services::connection_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/request", post(send_request))
        .route("/accept", post(accept_request))
        .route("/reject", post(reject_request))
        .route("/unconnect", post(unconnect))
        .route("/requests", get(pending_requests))
        .route("/:id/connections", get(list_connections))
}

pub async fn send_request(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<SendConnectionRequest>,
) -> Result<Json<Value>, AppError> {
    info!("POST /api/connections/request - {} -> {}", user.id, request.receiver_id);
    connection_service::send_request(&state.services, &user, request.receiver_id).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn accept_request(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<RespondToConnectionRequest>,
) -> Result<Json<Value>, AppError> {
    info!("POST /api/connections/accept - {} -> {}", request.sender_id, user.id);
    connection_service::accept_request(&state.services, &user, request.sender_id).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn reject_request(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<RespondToConnectionRequest>,
) -> Result<Json<Value>, AppError> {
    info!("POST /api/connections/reject - {} -> {}", request.sender_id, user.id);
    connection_service::reject_request(&state.services, &user, request.sender_id).await?;
    Ok(Json(json!({ "success": true, "message": "Connection request rejected." })))
}

pub async fn unconnect(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<UnconnectRequest>,
) -> Result<Json<Value>, AppError> {
    info!("POST /api/connections/unconnect - {} and {}", user.id, request.user_id);
    connection_service::unconnect(&state.services, &user, request.user_id).await?;
    Ok(Json(json!({ "success": true, "message": "Users unconnected." })))
}

pub async fn pending_requests(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<PendingRequestsResponse>, AppError> {
    info!("GET /api/connections/requests - {}", user.id);
    let requests = connection_service::pending_requests(&state.services, &user).await?;
    Ok(Json(PendingRequestsResponse { requests }))
}

pub async fn list_connections(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ConnectionsResponse>, AppError> {
    info!("GET /api/connections/{}/connections", id);
    let connections = connection_service::list_connections(&state.services, id).await?;
    Ok(Json(ConnectionsResponse { connections }))
}
