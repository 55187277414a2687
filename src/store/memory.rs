use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use sqlx::types::Json;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

use super::{ApplicationStore, CatalogStore, ConnectionStore, NotificationStore};
use crate::models::{
    Application, ApplicationStatus, Company, CreateCompany, CreateJob, Job, NewApplication,
    NewNotification, Notification, Role, StatusChange, UpdateCompany, UpdateJob, UserSummary,
};

/// In-memory store for workflow tests.
#[derive(Default)]
pub struct MemoryStore {
    applications: Mutex<HashMap<Uuid, Application>>,
    jobs: Mutex<HashMap<Uuid, Job>>,
    companies: Mutex<HashMap<Uuid, Company>>,
    applied_jobs: Mutex<HashMap<Uuid, Vec<Uuid>>>,
    users: Mutex<HashMap<Uuid, UserSummary>>,
    saved_jobs: Mutex<HashMap<Uuid, Vec<Uuid>>>,
    // (sender, receiver)
    requests: Mutex<HashSet<(Uuid, Uuid)>>,
    // stored in both directions
    connections: Mutex<HashSet<(Uuid, Uuid)>>,
    notifications: Mutex<Vec<Notification>>,
    fail_notifications: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_notifications(&self, fail: bool) {
        self.fail_notifications.store(fail, Ordering::SeqCst);
    }

    pub fn seed_user(&self, name: &str, role: Role) -> UserSummary {
        let user = UserSummary {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: "555-0100".to_string(),
            role,
            created_at: Utc::now(),
        };
        self.users.lock().insert(user.id, user.clone());
        self.saved_jobs.lock().insert(user.id, Vec::new());
        user
    }

    pub fn seed_company(&self, logo: Option<&str>) -> Company {
        self.seed_company_owned_by(Uuid::new_v4(), logo)
    }

    pub fn seed_company_owned_by(&self, created_by: Uuid, logo: Option<&str>) -> Company {
        let company = Company {
            id: Uuid::new_v4(),
            company_name: "Acme Corp".to_string(),
            company_type: None,
            location: None,
            company_logo: logo.map(str::to_string),
            site_url: None,
            created_by,
            created_at: Utc::now(),
        };
        self.companies.lock().insert(company.id, company.clone());
        company
    }

    pub fn seed_job(&self, company_id: Uuid, position: &str) -> Job {
        let job = Job {
            id: Uuid::new_v4(),
            company_id,
            position: position.to_string(),
            location: None,
            workplace: None,
            salary_range: None,
            description: None,
            deadline_to_apply: None,
            posted_at: Utc::now(),
        };
        self.jobs.lock().insert(job.id, job.clone());
        job
    }

    pub fn remove_job(&self, id: Uuid) {
        self.jobs.lock().remove(&id);
    }

    /// Seeds a pending application and registers the job in the applicant's applied set.
    pub fn seed_application(&self, user_id: Uuid, job: &Job) -> Application {
        let now = Utc::now();
        let application = Application {
            id: Uuid::new_v4(),
            user_id,
            job_id: job.id,
            company_id: job.company_id,
            name: "Jane Applicant".to_string(),
            email: "jane@example.com".to_string(),
            phone: "555-0100".to_string(),
            location: "Remote".to_string(),
            experience: 3,
            resume: "uploads/resumes/jane.pdf".to_string(),
            education: Json(Vec::new()),
            experience_details: Json(Vec::new()),
            questions_and_answers: Json(Vec::new()),
            status: ApplicationStatus::Pending,
            rejected_at: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        self.applications.lock().insert(application.id, application.clone());
        self.applied_jobs.lock().entry(user_id).or_default().push(job.id);
        application
    }

    pub fn application(&self, id: Uuid) -> Option<Application> {
        self.applications.lock().get(&id).cloned()
    }

    pub fn set_rejected_at(&self, id: Uuid, at: DateTime<Utc>) {
        if let Some(app) = self.applications.lock().get_mut(&id) {
            app.status = ApplicationStatus::Rejected;
            app.rejected_at = Some(at);
        }
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }

    pub fn applied_jobs_of(&self, user_id: Uuid) -> Vec<Uuid> {
        self.applied_jobs.lock().get(&user_id).cloned().unwrap_or_default()
    }

    pub fn saved_jobs_of(&self, user_id: Uuid) -> Vec<Uuid> {
        self.saved_jobs.lock().get(&user_id).cloned().unwrap_or_default()
    }

    pub fn has_request(&self, sender_id: Uuid, receiver_id: Uuid) -> bool {
        self.requests.lock().contains(&(sender_id, receiver_id))
    }

    fn unsave_jobs(&self, job_ids: &[Uuid]) {
        for saved in self.saved_jobs.lock().values_mut() {
            saved.retain(|j| !job_ids.contains(j));
        }
    }

    fn summaries(&self, ids: impl Iterator<Item = Uuid>) -> Vec<UserSummary> {
        let users = self.users.lock();
        let mut list: Vec<UserSummary> = ids.filter_map(|id| users.get(&id).cloned()).collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }
}

fn apply_change(app: &mut Application, change: &StatusChange) {
    app.status = change.status;
    app.rejected_at = change.rejected_at;
    if let Some(notes) = &change.notes {
        app.notes = Some(notes.clone());
    }
    app.updated_at = Utc::now();
}

fn is_expired(app: &Application, cutoff: DateTime<Utc>) -> bool {
    app.status == ApplicationStatus::Rejected && app.rejected_at.map(|at| at < cutoff).unwrap_or(false)
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn insert(&self, new: NewApplication) -> Result<Application, sqlx::Error> {
        let now = Utc::now();
        let application = Application {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            job_id: new.job_id,
            company_id: new.company_id,
            name: new.name,
            email: new.email,
            phone: new.phone,
            location: new.location,
            experience: new.experience,
            resume: new.resume,
            education: Json(new.education),
            experience_details: Json(new.experience_details),
            questions_and_answers: Json(new.questions_and_answers),
            status: ApplicationStatus::Pending,
            rejected_at: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        self.applications.lock().insert(application.id, application.clone());
        Ok(application)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Application>, sqlx::Error> {
        Ok(self.applications.lock().get(&id).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Application>, sqlx::Error> {
        let apps = self.applications.lock();
        Ok(ids.iter().filter_map(|id| apps.get(id).cloned()).collect())
    }

    async fn list_all(&self) -> Result<Vec<Application>, sqlx::Error> {
        Ok(self.applications.lock().values().cloned().collect())
    }

    async fn list_for_job(&self, job_id: Uuid) -> Result<Vec<Application>, sqlx::Error> {
        Ok(self
            .applications
            .lock()
            .values()
            .filter(|a| a.job_id == job_id)
            .cloned()
            .collect())
    }

    async fn exists_for(&self, user_id: Uuid, job_id: Uuid) -> Result<bool, sqlx::Error> {
        Ok(self
            .applications
            .lock()
            .values()
            .any(|a| a.user_id == user_id && a.job_id == job_id))
    }

    async fn update_status(
        &self,
        id: Uuid,
        change: &StatusChange,
    ) -> Result<Option<Application>, sqlx::Error> {
        let mut apps = self.applications.lock();
        Ok(apps.get_mut(&id).map(|app| {
            apply_change(app, change);
            app.clone()
        }))
    }

    async fn update_status_many(&self, ids: &[Uuid], change: &StatusChange) -> Result<u64, sqlx::Error> {
        let mut apps = self.applications.lock();
        let mut written = 0;
        for id in ids {
            if let Some(app) = apps.get_mut(id) {
                apply_change(app, change);
                written += 1;
            }
        }
        Ok(written)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Application>, sqlx::Error> {
        Ok(self.applications.lock().remove(&id))
    }

    async fn delete_rejected_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Application>, sqlx::Error> {
        let mut apps = self.applications.lock();
        let expired: Vec<Uuid> = apps
            .values()
            .filter(|a| is_expired(a, cutoff))
            .map(|a| a.id)
            .collect();
        Ok(expired.iter().filter_map(|id| apps.remove(id)).collect())
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn create_company(&self, created_by: Uuid, new: &CreateCompany) -> Result<Company, sqlx::Error> {
        let company = Company {
            id: Uuid::new_v4(),
            company_name: new.company_name.clone(),
            company_type: new.company_type.clone(),
            location: new.location.clone(),
            company_logo: new.company_logo.clone(),
            site_url: new.site_url.clone(),
            created_by,
            created_at: Utc::now(),
        };
        self.companies.lock().insert(company.id, company.clone());
        Ok(company)
    }

    async fn company(&self, id: Uuid) -> Result<Option<Company>, sqlx::Error> {
        Ok(self.companies.lock().get(&id).cloned())
    }

    async fn companies(&self) -> Result<Vec<Company>, sqlx::Error> {
        let mut list: Vec<Company> = self.companies.lock().values().cloned().collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    async fn update_company(&self, id: Uuid, update: &UpdateCompany) -> Result<Option<Company>, sqlx::Error> {
        let mut companies = self.companies.lock();
        Ok(companies.get_mut(&id).map(|company| {
            if let Some(name) = &update.company_name {
                company.company_name = name.clone();
            }
            if update.company_type.is_some() {
                company.company_type = update.company_type.clone();
            }
            if update.location.is_some() {
                company.location = update.location.clone();
            }
            if update.company_logo.is_some() {
                company.company_logo = update.company_logo.clone();
            }
            if update.site_url.is_some() {
                company.site_url = update.site_url.clone();
            }
            company.clone()
        }))
    }

    async fn delete_company(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        if self.companies.lock().remove(&id).is_none() {
            return Ok(false);
        }
        let removed: Vec<Uuid> = {
            let mut jobs = self.jobs.lock();
            let ids: Vec<Uuid> = jobs.values().filter(|j| j.company_id == id).map(|j| j.id).collect();
            for job_id in &ids {
                jobs.remove(job_id);
            }
            ids
        };
        self.unsave_jobs(&removed);
        Ok(true)
    }

    async fn create_job(&self, new: &CreateJob) -> Result<Job, sqlx::Error> {
        let job = Job {
            id: Uuid::new_v4(),
            company_id: new.company_id,
            position: new.position.clone(),
            location: new.location.clone(),
            workplace: new.workplace.clone(),
            salary_range: new.salary_range.clone(),
            description: new.description.clone(),
            deadline_to_apply: new.deadline_to_apply,
            posted_at: Utc::now(),
        };
        self.jobs.lock().insert(job.id, job.clone());
        Ok(job)
    }

    async fn job(&self, id: Uuid) -> Result<Option<Job>, sqlx::Error> {
        Ok(self.jobs.lock().get(&id).cloned())
    }

    async fn jobs(&self, ids: &[Uuid]) -> Result<Vec<Job>, sqlx::Error> {
        let jobs = self.jobs.lock();
        Ok(ids.iter().filter_map(|id| jobs.get(id).cloned()).collect())
    }

    async fn all_jobs(&self) -> Result<Vec<Job>, sqlx::Error> {
        let mut list: Vec<Job> = self.jobs.lock().values().cloned().collect();
        list.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));
        Ok(list)
    }

    async fn update_job(&self, id: Uuid, update: &UpdateJob) -> Result<Option<Job>, sqlx::Error> {
        let mut jobs = self.jobs.lock();
        Ok(jobs.get_mut(&id).map(|job| {
            if let Some(position) = &update.position {
                job.position = position.clone();
            }
            if update.location.is_some() {
                job.location = update.location.clone();
            }
            if update.workplace.is_some() {
                job.workplace = update.workplace.clone();
            }
            if update.salary_range.is_some() {
                job.salary_range = update.salary_range.clone();
            }
            if update.description.is_some() {
                job.description = update.description.clone();
            }
            if update.deadline_to_apply.is_some() {
                job.deadline_to_apply = update.deadline_to_apply;
            }
            job.clone()
        }))
    }

    async fn delete_job(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        if self.jobs.lock().remove(&id).is_none() {
            return Ok(false);
        }
        self.unsave_jobs(&[id]);
        Ok(true)
    }

    async fn toggle_saved_job(&self, user_id: Uuid, job_id: Uuid) -> Result<Option<Vec<Uuid>>, sqlx::Error> {
        let mut saved = self.saved_jobs.lock();
        Ok(saved.get_mut(&user_id).map(|jobs| {
            if jobs.contains(&job_id) {
                jobs.retain(|j| *j != job_id);
            } else {
                jobs.push(job_id);
            }
            jobs.clone()
        }))
    }

    async fn saved_job_ids(&self, user_id: Uuid) -> Result<Option<Vec<Uuid>>, sqlx::Error> {
        Ok(self.saved_jobs.lock().get(&user_id).cloned())
    }

    async fn add_applied_job(&self, user_id: Uuid, job_id: Uuid) -> Result<(), sqlx::Error> {
        let mut applied = self.applied_jobs.lock();
        let jobs = applied.entry(user_id).or_default();
        if !jobs.contains(&job_id) {
            jobs.push(job_id);
        }
        Ok(())
    }

    async fn remove_applied_job(&self, user_id: Uuid, job_id: Uuid) -> Result<(), sqlx::Error> {
        if let Some(jobs) = self.applied_jobs.lock().get_mut(&user_id) {
            jobs.retain(|j| *j != job_id);
        }
        Ok(())
    }

    async fn applied_jobs(&self, user_id: Uuid) -> Result<Option<Vec<Uuid>>, sqlx::Error> {
        Ok(self.applied_jobs.lock().get(&user_id).cloned())
    }
}

#[async_trait]
impl ConnectionStore for MemoryStore {
    async fn user(&self, id: Uuid) -> Result<Option<UserSummary>, sqlx::Error> {
        Ok(self.users.lock().get(&id).cloned())
    }

    async fn are_connected(&self, user_id: Uuid, other_id: Uuid) -> Result<bool, sqlx::Error> {
        Ok(self.connections.lock().contains(&(user_id, other_id)))
    }

    async fn add_request(&self, sender_id: Uuid, receiver_id: Uuid) -> Result<bool, sqlx::Error> {
        Ok(self.requests.lock().insert((sender_id, receiver_id)))
    }

    async fn remove_request(&self, sender_id: Uuid, receiver_id: Uuid) -> Result<bool, sqlx::Error> {
        Ok(self.requests.lock().remove(&(sender_id, receiver_id)))
    }

    async fn accept_request(&self, sender_id: Uuid, receiver_id: Uuid) -> Result<bool, sqlx::Error> {
        if !self.requests.lock().remove(&(sender_id, receiver_id)) {
            return Ok(false);
        }
        let mut connections = self.connections.lock();
        connections.insert((sender_id, receiver_id));
        connections.insert((receiver_id, sender_id));
        Ok(true)
    }

    async fn remove_connection(&self, user_id: Uuid, other_id: Uuid) -> Result<bool, sqlx::Error> {
        let mut connections = self.connections.lock();
        let forward = connections.remove(&(user_id, other_id));
        let backward = connections.remove(&(other_id, user_id));
        Ok(forward || backward)
    }

    async fn connections_of(&self, user_id: Uuid) -> Result<Vec<UserSummary>, sqlx::Error> {
        let others: Vec<Uuid> = self
            .connections
            .lock()
            .iter()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, other)| *other)
            .collect();
        Ok(self.summaries(others.into_iter()))
    }

    async fn pending_requests_for(&self, user_id: Uuid) -> Result<Vec<UserSummary>, sqlx::Error> {
        let senders: Vec<Uuid> = self
            .requests
            .lock()
            .iter()
            .filter(|(_, receiver)| *receiver == user_id)
            .map(|(sender, _)| *sender)
            .collect();
        Ok(self.summaries(senders.into_iter()))
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn create(&self, new: NewNotification) -> Result<Notification, sqlx::Error> {
        if self.fail_notifications.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolTimedOut);
        }
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            sender_id: new.sender_id,
            message: new.message,
            kind: new.kind,
            read: false,
            created_at: Utc::now(),
        };
        self.notifications.lock().push(notification.clone());
        Ok(notification)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>, sqlx::Error> {
        let mut list: Vec<Notification> = self
            .notifications
            .lock()
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    async fn unread_count(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        Ok(self
            .notifications
            .lock()
            .iter()
            .filter(|n| n.user_id == user_id && !n.read)
            .count() as i64)
    }

    async fn set_read(
        &self,
        id: Uuid,
        user_id: Uuid,
        read: bool,
    ) -> Result<Option<Notification>, sqlx::Error> {
        let mut list = self.notifications.lock();
        Ok(list
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
            .map(|n| {
                n.read = read;
                n.clone()
            }))
    }

    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let mut count = 0;
        for n in self.notifications.lock().iter_mut() {
            if n.user_id == user_id && !n.read {
                n.read = true;
                count += 1;
            }
        }
        Ok(count)
    }
}
