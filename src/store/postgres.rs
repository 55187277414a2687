use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{ApplicationStore, CatalogStore, ConnectionStore, NotificationStore};
use crate::db::{
    application_queries, catalog_queries, connection_queries, notification_queries, user_queries,
};
use crate::models::{
    Application, Company, CreateCompany, CreateJob, Job, NewApplication, NewNotification,
    Notification, StatusChange, UpdateCompany, UpdateJob, UserSummary,
};

/// Postgres-backed implementation of every store trait.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationStore for PgStore {
    async fn insert(&self, new: NewApplication) -> Result<Application, sqlx::Error> {
        application_queries::create_application(&self.pool, &new).await
    }

    async fn find(&self, id: Uuid) -> Result<Option<Application>, sqlx::Error> {
        application_queries::get_application(&self.pool, id).await
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Application>, sqlx::Error> {
        application_queries::get_applications_by_ids(&self.pool, ids).await
    }

    async fn list_all(&self) -> Result<Vec<Application>, sqlx::Error> {
        application_queries::get_all_applications(&self.pool).await
    }

    async fn list_for_job(&self, job_id: Uuid) -> Result<Vec<Application>, sqlx::Error> {
        application_queries::get_applications_for_job(&self.pool, job_id).await
    }

    async fn exists_for(&self, user_id: Uuid, job_id: Uuid) -> Result<bool, sqlx::Error> {
        application_queries::application_exists(&self.pool, user_id, job_id).await
    }

    async fn update_status(
        &self,
        id: Uuid,
        change: &StatusChange,
    ) -> Result<Option<Application>, sqlx::Error> {
        application_queries::update_status(&self.pool, id, change).await
    }

    async fn update_status_many(&self, ids: &[Uuid], change: &StatusChange) -> Result<u64, sqlx::Error> {
        application_queries::update_status_many(&self.pool, ids, change).await
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Application>, sqlx::Error> {
        application_queries::delete_application(&self.pool, id).await
    }

    async fn delete_rejected_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Application>, sqlx::Error> {
        application_queries::delete_rejected_before(&self.pool, cutoff).await
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn create_company(&self, created_by: Uuid, new: &CreateCompany) -> Result<Company, sqlx::Error> {
        catalog_queries::create_company(&self.pool, created_by, new).await
    }

    async fn company(&self, id: Uuid) -> Result<Option<Company>, sqlx::Error> {
        catalog_queries::get_company(&self.pool, id).await
    }

    async fn companies(&self) -> Result<Vec<Company>, sqlx::Error> {
        catalog_queries::get_all_companies(&self.pool).await
    }

    async fn update_company(&self, id: Uuid, update: &UpdateCompany) -> Result<Option<Company>, sqlx::Error> {
        catalog_queries::update_company(&self.pool, id, update).await
    }

    async fn delete_company(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        catalog_queries::delete_company(&self.pool, id).await
    }

    async fn create_job(&self, new: &CreateJob) -> Result<Job, sqlx::Error> {
        catalog_queries::create_job(&self.pool, new).await
    }

    async fn job(&self, id: Uuid) -> Result<Option<Job>, sqlx::Error> {
        catalog_queries::get_job(&self.pool, id).await
    }

    async fn jobs(&self, ids: &[Uuid]) -> Result<Vec<Job>, sqlx::Error> {
        catalog_queries::get_jobs_by_ids(&self.pool, ids).await
    }

    async fn all_jobs(&self) -> Result<Vec<Job>, sqlx::Error> {
        catalog_queries::get_all_jobs(&self.pool).await
    }

    async fn update_job(&self, id: Uuid, update: &UpdateJob) -> Result<Option<Job>, sqlx::Error> {
        catalog_queries::update_job(&self.pool, id, update).await
    }

    async fn delete_job(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        catalog_queries::delete_job(&self.pool, id).await
    }

    async fn toggle_saved_job(&self, user_id: Uuid, job_id: Uuid) -> Result<Option<Vec<Uuid>>, sqlx::Error> {
        user_queries::toggle_saved_job(&self.pool, user_id, job_id).await
    }

    async fn saved_job_ids(&self, user_id: Uuid) -> Result<Option<Vec<Uuid>>, sqlx::Error> {
        user_queries::get_saved_job_ids(&self.pool, user_id).await
    }

    async fn add_applied_job(&self, user_id: Uuid, job_id: Uuid) -> Result<(), sqlx::Error> {
        user_queries::add_applied_job(&self.pool, user_id, job_id).await
    }

    async fn remove_applied_job(&self, user_id: Uuid, job_id: Uuid) -> Result<(), sqlx::Error> {
        user_queries::remove_applied_job(&self.pool, user_id, job_id).await
    }

    async fn applied_jobs(&self, user_id: Uuid) -> Result<Option<Vec<Uuid>>, sqlx::Error> {
        user_queries::get_applied_jobs(&self.pool, user_id).await
    }
}

#[async_trait]
impl NotificationStore for PgStore {
    async fn create(&self, new: NewNotification) -> Result<Notification, sqlx::Error> {
        notification_queries::create_notification(&self.pool, &new).await
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>, sqlx::Error> {
        notification_queries::get_user_notifications(&self.pool, user_id).await
    }

    async fn unread_count(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        notification_queries::count_unread(&self.pool, user_id).await
    }

    async fn set_read(
        &self,
        id: Uuid,
        user_id: Uuid,
        read: bool,
    ) -> Result<Option<Notification>, sqlx::Error> {
        notification_queries::set_read(&self.pool, id, user_id, read).await
    }

    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        notification_queries::mark_all_read(&self.pool, user_id).await
    }
}

#[async_trait]
impl ConnectionStore for PgStore {
    async fn user(&self, id: Uuid) -> Result<Option<UserSummary>, sqlx::Error> {
        connection_queries::get_user_summary(&self.pool, id).await
    }

    async fn are_connected(&self, user_id: Uuid, other_id: Uuid) -> Result<bool, sqlx::Error> {
        connection_queries::are_connected(&self.pool, user_id, other_id).await
    }

    async fn add_request(&self, sender_id: Uuid, receiver_id: Uuid) -> Result<bool, sqlx::Error> {
        connection_queries::create_request(&self.pool, sender_id, receiver_id).await
    }

    async fn remove_request(&self, sender_id: Uuid, receiver_id: Uuid) -> Result<bool, sqlx::Error> {
        connection_queries::delete_request(&self.pool, sender_id, receiver_id).await
    }

    async fn accept_request(&self, sender_id: Uuid, receiver_id: Uuid) -> Result<bool, sqlx::Error> {
        connection_queries::accept_request(&self.pool, sender_id, receiver_id).await
    }

    async fn remove_connection(&self, user_id: Uuid, other_id: Uuid) -> Result<bool, sqlx::Error> {
        connection_queries::delete_connection(&self.pool, user_id, other_id).await
    }

    async fn connections_of(&self, user_id: Uuid) -> Result<Vec<UserSummary>, sqlx::Error> {
        connection_queries::get_connections(&self.pool, user_id).await
    }

    async fn pending_requests_for(&self, user_id: Uuid) -> Result<Vec<UserSummary>, sqlx::Error> {
        connection_queries::get_pending_requests(&self.pool, user_id).await
    }
}
