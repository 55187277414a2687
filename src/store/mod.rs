//! Storage seams used by the application workflows.
//!
//! The HTTP layer and the scheduler reach persistence through these traits so
//! the status workflows and the expiry sweep can run against Postgres in
//! production and against an in-memory store in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{
    Application, Company, CreateCompany, CreateJob, Job, NewApplication, NewNotification,
    Notification, StatusChange, UpdateCompany, UpdateJob, UserSummary,
};

pub mod postgres;

#[cfg(test)]
pub mod memory;

pub use postgres::PgStore;

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn insert(&self, new: NewApplication) -> Result<Application, sqlx::Error>;

    async fn find(&self, id: Uuid) -> Result<Option<Application>, sqlx::Error>;

    /// Unknown ids are skipped.
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Application>, sqlx::Error>;

    async fn list_all(&self) -> Result<Vec<Application>, sqlx::Error>;

    async fn list_for_job(&self, job_id: Uuid) -> Result<Vec<Application>, sqlx::Error>;

    async fn exists_for(&self, user_id: Uuid, job_id: Uuid) -> Result<bool, sqlx::Error>;

    async fn update_status(
        &self,
        id: Uuid,
        change: &StatusChange,
    ) -> Result<Option<Application>, sqlx::Error>;

    /// Returns the number of rows written.
    async fn update_status_many(&self, ids: &[Uuid], change: &StatusChange) -> Result<u64, sqlx::Error>;

    async fn delete(&self, id: Uuid) -> Result<Option<Application>, sqlx::Error>;

    /// Deletes applications rejected before `cutoff` and returns the rows removed.
    async fn delete_rejected_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Application>, sqlx::Error>;
}

/// Jobs, companies and the per-user applied and saved job sets.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn create_company(&self, created_by: Uuid, new: &CreateCompany) -> Result<Company, sqlx::Error>;

    async fn company(&self, id: Uuid) -> Result<Option<Company>, sqlx::Error>;

    async fn companies(&self) -> Result<Vec<Company>, sqlx::Error>;

    async fn update_company(&self, id: Uuid, update: &UpdateCompany) -> Result<Option<Company>, sqlx::Error>;

    /// Removes the company and its jobs, and pulls those jobs from saved jobs.
    async fn delete_company(&self, id: Uuid) -> Result<bool, sqlx::Error>;

    async fn create_job(&self, new: &CreateJob) -> Result<Job, sqlx::Error>;

    async fn job(&self, id: Uuid) -> Result<Option<Job>, sqlx::Error>;

    async fn jobs(&self, ids: &[Uuid]) -> Result<Vec<Job>, sqlx::Error>;

    /// Newest first.
    async fn all_jobs(&self) -> Result<Vec<Job>, sqlx::Error>;

    async fn update_job(&self, id: Uuid, update: &UpdateJob) -> Result<Option<Job>, sqlx::Error>;

    /// Removes the job and pulls it from saved jobs. Applications are kept.
    async fn delete_job(&self, id: Uuid) -> Result<bool, sqlx::Error>;

    /// Returns the user's saved job ids after the toggle, `None` for an unknown user.
    async fn toggle_saved_job(&self, user_id: Uuid, job_id: Uuid) -> Result<Option<Vec<Uuid>>, sqlx::Error>;

    async fn saved_job_ids(&self, user_id: Uuid) -> Result<Option<Vec<Uuid>>, sqlx::Error>;

    async fn add_applied_job(&self, user_id: Uuid, job_id: Uuid) -> Result<(), sqlx::Error>;

    async fn remove_applied_job(&self, user_id: Uuid, job_id: Uuid) -> Result<(), sqlx::Error>;

    async fn applied_jobs(&self, user_id: Uuid) -> Result<Option<Vec<Uuid>>, sqlx::Error>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create(&self, new: NewNotification) -> Result<Notification, sqlx::Error>;

    /// Newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>, sqlx::Error>;

    async fn unread_count(&self, user_id: Uuid) -> Result<i64, sqlx::Error>;

    async fn set_read(
        &self,
        id: Uuid,
        user_id: Uuid,
        read: bool,
    ) -> Result<Option<Notification>, sqlx::Error>;

    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, sqlx::Error>;
}

/// Connection requests and the symmetric connection graph between users.
#[async_trait]
pub trait ConnectionStore: Send + Sync {
    async fn user(&self, id: Uuid) -> Result<Option<UserSummary>, sqlx::Error>;

    async fn are_connected(&self, user_id: Uuid, other_id: Uuid) -> Result<bool, sqlx::Error>;

    /// False when the request is already pending.
    async fn add_request(&self, sender_id: Uuid, receiver_id: Uuid) -> Result<bool, sqlx::Error>;

    async fn remove_request(&self, sender_id: Uuid, receiver_id: Uuid) -> Result<bool, sqlx::Error>;

    /// Consumes the pending request and connects both users. False when no request was pending.
    async fn accept_request(&self, sender_id: Uuid, receiver_id: Uuid) -> Result<bool, sqlx::Error>;

    async fn remove_connection(&self, user_id: Uuid, other_id: Uuid) -> Result<bool, sqlx::Error>;

    async fn connections_of(&self, user_id: Uuid) -> Result<Vec<UserSummary>, sqlx::Error>;

    async fn pending_requests_for(&self, user_id: Uuid) -> Result<Vec<UserSummary>, sqlx::Error>;
}
