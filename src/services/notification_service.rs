use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{NewNotification, Notification};
use crate::services::session_registry::{Notifier, PushEvent};
use crate::store::NotificationStore;

// ==============================================================================
// Notification Service
// ==============================================================================

/// Persists a notification and forwards it to the recipient's live session.
pub async fn notify(
    store: &dyn NotificationStore,
    notifier: &dyn Notifier,
    new: NewNotification,
) -> Result<Notification, sqlx::Error> {
    let notification = store.create(new).await?;
    debug!("Created {} notification {} for user {}", notification.kind, notification.id, notification.user_id);

    notifier.push(notification.user_id, PushEvent::Notification(notification.clone()));
    Ok(notification)
}

pub async fn list_notifications(
    store: &dyn NotificationStore,
    user_id: Uuid,
) -> Result<Vec<Notification>, AppError> {
    Ok(store.list_for_user(user_id).await?)
}

pub async fn unread_count(store: &dyn NotificationStore, user_id: Uuid) -> Result<i64, AppError> {
    Ok(store.unread_count(user_id).await?)
}

/// Toggles the read flag on one of the caller's notifications.
pub async fn set_read(
    store: &dyn NotificationStore,
    id: Uuid,
    user_id: Uuid,
    read: bool,
) -> Result<Notification, AppError> {
    store
        .set_read(id, user_id, read)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))
}

pub async fn mark_all_read(store: &dyn NotificationStore, user_id: Uuid) -> Result<u64, AppError> {
    Ok(store.mark_all_read(user_id).await?)
}
