use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::Role;

/// Public view of a user, as shown in connection lists.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendConnectionRequest {
    pub receiver_id: Uuid,
}

/// Accept or reject the request `sender_id` sent to the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct RespondToConnectionRequest {
    pub sender_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnconnectRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ConnectionsResponse {
    pub connections: Vec<UserSummary>,
}

#[derive(Debug, Serialize)]
pub struct PendingRequestsResponse {
    pub requests: Vec<UserSummary>,
}
