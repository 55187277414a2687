use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;
use uuid::Uuid;

use crate::models::Notification;

const CHANNEL_CAPACITY: usize = 32;

/// Event delivered to a user's live session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum PushEvent {
    Notification(Notification),
}

impl PushEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PushEvent::Notification(_) => "notification",
        }
    }
}

/// Real-time push capability handed to the workflows.
pub trait Notifier: Send + Sync {
    /// Delivers `event` to `user_id`'s live sessions. A user without a live
    /// session is not an error; the event is dropped.
    fn push(&self, user_id: Uuid, event: PushEvent);
}

/// Registry of live push subscriptions keyed by user id.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    channels: Arc<DashMap<Uuid, broadcast::Sender<PushEvent>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new subscription for `user_id`. Several sessions per user share one channel.
    pub fn subscribe(&self, user_id: Uuid) -> Subscription {
        let rx = self
            .channels
            .entry(user_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe();

        Subscription {
            user_id,
            rx: Some(rx),
            registry: self.clone(),
        }
    }

    pub fn is_connected(&self, user_id: Uuid) -> bool {
        self.channels
            .get(&user_id)
            .map(|tx| tx.receiver_count() > 0)
            .unwrap_or(false)
    }
}

/// A live session. Dropping the last subscription of a user removes the
/// user's channel from the registry.
pub struct Subscription {
    user_id: Uuid,
    rx: Option<broadcast::Receiver<PushEvent>>,
    registry: SessionRegistry,
}

impl Subscription {
    pub async fn recv(&mut self) -> Result<PushEvent, RecvError> {
        match self.rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => Err(RecvError::Closed),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // the receiver must be gone before the count is checked
        drop(self.rx.take());
        self.registry
            .channels
            .remove_if(&self.user_id, |_, tx| tx.receiver_count() == 0);
    }
}

impl Notifier for SessionRegistry {
    fn push(&self, user_id: Uuid, event: PushEvent) {
        let Some(tx) = self.channels.get(&user_id).map(|entry| entry.value().clone()) else {
            debug!("No live session for user {}, dropping {} event", user_id, event.name());
            return;
        };

        if tx.send(event).is_err() {
            // every receiver is gone
            self.channels.remove_if(&user_id, |_, tx| tx.receiver_count() == 0);
        }
    }
}
