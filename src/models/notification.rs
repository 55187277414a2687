use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

use super::application::UnknownValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    ConnectionRequest,
    ConnectionAccepted,
    ConnectionRejected,
    ApplicationStatus,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::ConnectionRequest => "connection_request",
            NotificationType::ConnectionAccepted => "connection_accepted",
            NotificationType::ConnectionRejected => "connection_rejected",
            NotificationType::ApplicationStatus => "application_status",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for NotificationType {
    type Error = UnknownValue;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "connection_request" => Ok(NotificationType::ConnectionRequest),
            "connection_accepted" => Ok(NotificationType::ConnectionAccepted),
            "connection_rejected" => Ok(NotificationType::ConnectionRejected),
            "application_status" => Ok(NotificationType::ApplicationStatus),
            _ => Err(UnknownValue(value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub message: String,
    #[sqlx(rename = "type", try_from = "String")]
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    Requested,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub message: String,
    pub kind: NotificationType,
}

impl NewNotification {
    /// Applicant-facing message for an application status change.
    pub fn application_status(
        user_id: Uuid,
        sender_id: Option<Uuid>,
        job_title: &str,
        status: impl fmt::Display,
    ) -> Self {
        Self {
            user_id,
            sender_id,
            message: format!("Your application for \"{}\" has been {}.", job_title, status),
            kind: NotificationType::ApplicationStatus,
        }
    }

    /// Connection event addressed to `user_id` on behalf of `sender_id`.
    pub fn connection(user_id: Uuid, sender_id: Uuid, event: ConnectionEvent) -> Self {
        let (message, kind) = match event {
            ConnectionEvent::Requested => ("Sent you a connection request", NotificationType::ConnectionRequest),
            ConnectionEvent::Accepted => ("Accepted your connection request", NotificationType::ConnectionAccepted),
            ConnectionEvent::Rejected => ("Rejected your connection request", NotificationType::ConnectionRejected),
        };
        Self {
            user_id,
            sender_id: Some(sender_id),
            message: message.to_string(),
            kind,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}
