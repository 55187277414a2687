use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::{ConnectionEvent, NewNotification, UserSummary};
use crate::services::notification_service::notify;
use crate::services::side_effect::SideEffect;
use crate::services::Services;

fn request_not_found() -> AppError {
    AppError::NotFound("Connection request not found".to_string())
}

/// Stores and pushes the notification for `event`; failures are logged, never returned.
async fn notify_connection(services: &Services, recipient: Uuid, actor: Uuid, event: ConnectionEvent) -> SideEffect {
    let result = notify(
        services.notifications.as_ref(),
        services.notifier.as_ref(),
        NewNotification::connection(recipient, actor, event),
    )
    .await;
    SideEffect::from_result("Connection notification", result)
}

// ==============================================================================
// Requests
// ==============================================================================

/// Sends a request from the caller to `receiver_id`. A request that is already
/// pending is left as is and not notified again.
pub async fn send_request(services: &Services, user: &AuthUser, receiver_id: Uuid) -> Result<SideEffect, AppError> {
    if receiver_id == user.id {
        return Err(AppError::Validation("Cannot connect with yourself".to_string()));
    }
    services
        .connections
        .user(receiver_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    if services.connections.are_connected(user.id, receiver_id).await? {
        return Err(AppError::Conflict("Already connected".to_string()));
    }

    if !services.connections.add_request(user.id, receiver_id).await? {
        debug!("Connection request {} -> {} already pending", user.id, receiver_id);
        return Ok(SideEffect::Skipped);
    }
    info!("Connection request {} -> {}", user.id, receiver_id);

    Ok(notify_connection(services, receiver_id, user.id, ConnectionEvent::Requested).await)
}

/// Accepts the request `sender_id` sent to the caller and connects both users.
pub async fn accept_request(services: &Services, user: &AuthUser, sender_id: Uuid) -> Result<SideEffect, AppError> {
    if !services.connections.accept_request(sender_id, user.id).await? {
        return Err(request_not_found());
    }
    info!("Connection request {} -> {} accepted", sender_id, user.id);

    Ok(notify_connection(services, sender_id, user.id, ConnectionEvent::Accepted).await)
}

pub async fn reject_request(services: &Services, user: &AuthUser, sender_id: Uuid) -> Result<SideEffect, AppError> {
    if !services.connections.remove_request(sender_id, user.id).await? {
        return Err(request_not_found());
    }
    info!("Connection request {} -> {} rejected", sender_id, user.id);

    Ok(notify_connection(services, sender_id, user.id, ConnectionEvent::Rejected).await)
}

/// Users who are waiting for the caller's answer.
pub async fn pending_requests(services: &Services, user: &AuthUser) -> Result<Vec<UserSummary>, AppError> {
    Ok(services.connections.pending_requests_for(user.id).await?)
}

// ==============================================================================
// Connections
// ==============================================================================

/// Removes the connection in both directions. Nobody is notified.
pub async fn unconnect(services: &Services, user: &AuthUser, other_id: Uuid) -> Result<(), AppError> {
    if !services.connections.remove_connection(user.id, other_id).await? {
        return Err(AppError::NotFound("Users are not connected".to_string()));
    }
    info!("Users {} and {} unconnected", user.id, other_id);
    Ok(())
}

pub async fn list_connections(services: &Services, user_id: Uuid) -> Result<Vec<UserSummary>, AppError> {
    services
        .connections
        .user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(services.connections.connections_of(user_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NotificationType, Role};
    use crate::services::session_registry::PushEvent;
    use crate::services::testing::{acting_as, fixture};

    #[tokio::test]
    async fn test_request_is_stored_notified_and_pushed() {
        let f = fixture();
        let alice = f.store.seed_user("Alice", Role::Employee);
        let bob = f.store.seed_user("Bob", Role::Employer);
        let mut bob_session = f.sessions.subscribe(bob.id);

        let outcome = send_request(&f.services, &acting_as(alice.id, Role::Employee), bob.id)
            .await
            .unwrap();

        assert_eq!(outcome, SideEffect::Completed);
        assert!(f.store.has_request(alice.id, bob.id));
        let stored = f.store.notifications();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].user_id, bob.id);
        assert_eq!(stored[0].sender_id, Some(alice.id));
        assert_eq!(stored[0].kind, NotificationType::ConnectionRequest);
        assert_eq!(bob_session.recv().await.unwrap(), PushEvent::Notification(stored[0].clone()));

        let pending = pending_requests(&f.services, &acting_as(bob.id, Role::Employer)).await.unwrap();
        assert_eq!(pending, vec![alice]);
    }

    #[tokio::test]
    async fn test_repeated_request_is_not_notified_again() {
        let f = fixture();
        let alice = f.store.seed_user("Alice", Role::Employee);
        let bob = f.store.seed_user("Bob", Role::Employee);
        let caller = acting_as(alice.id, Role::Employee);

        send_request(&f.services, &caller, bob.id).await.unwrap();
        let again = send_request(&f.services, &caller, bob.id).await.unwrap();

        assert_eq!(again, SideEffect::Skipped);
        assert_eq!(f.store.notifications().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_requests_are_rejected() {
        let f = fixture();
        let alice = f.store.seed_user("Alice", Role::Employee);
        let caller = acting_as(alice.id, Role::Employee);

        let err = send_request(&f.services, &caller, alice.id).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = send_request(&f.services, &caller, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(f.store.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_accept_connects_both_users_and_notifies_sender() {
        let f = fixture();
        let alice = f.store.seed_user("Alice", Role::Employee);
        let bob = f.store.seed_user("Bob", Role::Employee);
        send_request(&f.services, &acting_as(alice.id, Role::Employee), bob.id)
            .await
            .unwrap();
        let mut alice_session = f.sessions.subscribe(alice.id);

        let outcome = accept_request(&f.services, &acting_as(bob.id, Role::Employee), alice.id)
            .await
            .unwrap();

        assert_eq!(outcome, SideEffect::Completed);
        assert!(!f.store.has_request(alice.id, bob.id));
        assert_eq!(list_connections(&f.services, alice.id).await.unwrap(), vec![bob.clone()]);
        assert_eq!(list_connections(&f.services, bob.id).await.unwrap(), vec![alice.clone()]);

        let accepted = f.store.notifications().pop().unwrap();
        assert_eq!(accepted.user_id, alice.id);
        assert_eq!(accepted.kind, NotificationType::ConnectionAccepted);
        assert_eq!(alice_session.recv().await.unwrap(), PushEvent::Notification(accepted));

        let err = send_request(&f.services, &acting_as(alice.id, Role::Employee), bob.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_reject_drops_request_and_notifies_sender() {
        let f = fixture();
        let alice = f.store.seed_user("Alice", Role::Employee);
        let bob = f.store.seed_user("Bob", Role::Employee);
        send_request(&f.services, &acting_as(alice.id, Role::Employee), bob.id)
            .await
            .unwrap();

        reject_request(&f.services, &acting_as(bob.id, Role::Employee), alice.id)
            .await
            .unwrap();

        assert!(!f.store.has_request(alice.id, bob.id));
        assert!(list_connections(&f.services, alice.id).await.unwrap().is_empty());
        let rejected = f.store.notifications().pop().unwrap();
        assert_eq!(rejected.user_id, alice.id);
        assert_eq!(rejected.kind, NotificationType::ConnectionRejected);
    }

    #[tokio::test]
    async fn test_answering_missing_request_is_not_found() {
        let f = fixture();
        let alice = f.store.seed_user("Alice", Role::Employee);
        let bob = f.store.seed_user("Bob", Role::Employee);
        // only the receiver can answer
        send_request(&f.services, &acting_as(alice.id, Role::Employee), bob.id)
            .await
            .unwrap();
        let sender = acting_as(alice.id, Role::Employee);

        let err = accept_request(&f.services, &sender, bob.id).await.unwrap_err();
        assert_eq!(err.to_string(), request_not_found().to_string());
        let err = reject_request(&f.services, &sender, bob.id).await.unwrap_err();
        assert_eq!(err.to_string(), request_not_found().to_string());
        assert!(f.store.has_request(alice.id, bob.id));
    }

    #[tokio::test]
    async fn test_failed_notification_keeps_the_request() {
        let f = fixture();
        let alice = f.store.seed_user("Alice", Role::Employee);
        let bob = f.store.seed_user("Bob", Role::Employee);
        f.store.fail_notifications(true);

        let outcome = send_request(&f.services, &acting_as(alice.id, Role::Employee), bob.id)
            .await
            .unwrap();

        assert!(outcome.is_failed());
        assert!(f.store.has_request(alice.id, bob.id));
    }

    #[tokio::test]
    async fn test_unconnect_removes_both_directions_silently() {
        let f = fixture();
        let alice = f.store.seed_user("Alice", Role::Employee);
        let bob = f.store.seed_user("Bob", Role::Employee);
        send_request(&f.services, &acting_as(alice.id, Role::Employee), bob.id)
            .await
            .unwrap();
        accept_request(&f.services, &acting_as(bob.id, Role::Employee), alice.id)
            .await
            .unwrap();
        let sent = f.store.notifications().len();

        unconnect(&f.services, &acting_as(bob.id, Role::Employee), alice.id)
            .await
            .unwrap();

        assert!(list_connections(&f.services, alice.id).await.unwrap().is_empty());
        assert!(list_connections(&f.services, bob.id).await.unwrap().is_empty());
        assert_eq!(f.store.notifications().len(), sent);

        let err = unconnect(&f.services, &acting_as(bob.id, Role::Employee), alice.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_connections_of_unknown_user_is_not_found() {
        let f = fixture();

        let err = list_connections(&f.services, Uuid::new_v4()).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }
}
