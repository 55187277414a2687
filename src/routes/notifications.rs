use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, patch};
use axum::{Json, Router};
use futures::stream::{self, Stream};
use serde_json::{json, Value};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::{Notification, UnreadCountResponse};
use crate::services::notification_service;
use crate::services::session_registry::PushEvent;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/unread-count", get(unread_count))
        .route("/mark-read/:id", patch(mark_read))
        .route("/mark-unread/:id", patch(mark_unread))
        .route("/mark-all-read", patch(mark_all_read))
        .route("/stream", get(stream_notifications))
}

pub async fn list_notifications(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Notification>>, AppError> {
    info!("GET /api/notifications - user {}", user.id);
    let notifications =
        notification_service::list_notifications(state.services.notifications.as_ref(), user.id).await?;
    Ok(Json(notifications))
}

pub async fn unread_count(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UnreadCountResponse>, AppError> {
    let count = notification_service::unread_count(state.services.notifications.as_ref(), user.id).await?;
    Ok(Json(UnreadCountResponse { count }))
}

pub async fn mark_read(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Notification>, AppError> {
    info!("PATCH /api/notifications/mark-read/{}", id);
    let notification =
        notification_service::set_read(state.services.notifications.as_ref(), id, user.id, true).await?;
    Ok(Json(notification))
}

pub async fn mark_unread(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Notification>, AppError> {
    info!("PATCH /api/notifications/mark-unread/{}", id);
    let notification =
        notification_service::set_read(state.services.notifications.as_ref(), id, user.id, false).await?;
    Ok(Json(notification))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Value>, AppError> {
    info!("PATCH /api/notifications/mark-all-read - user {}", user.id);
    let updated = notification_service::mark_all_read(state.services.notifications.as_ref(), user.id).await?;
    Ok(Json(json!({
        "message": "All notifications marked as read",
        "updated": updated,
    })))
}

/// Server-sent events carrying the caller's new notifications.
pub async fn stream_notifications(
    State(state): State<AppState>,
    user: AuthUser,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    info!("GET /api/notifications/stream - user {} connected", user.id);
    let user_id = user.id;
    if state.sessions.is_connected(user_id) {
        info!("User {} opened an additional live session", user_id);
    }
    let rx = state.sessions.subscribe(user_id);

    // dropping the stream drops the subscription, which prunes the channel
    let events = stream::unfold(rx, move |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(PushEvent::Notification(notification)) => {
                    let event = Event::default().event("notification").json_data(&notification);
                    return Some((event, rx));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Notification stream for user {} lagged, skipped {}", user_id, skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
