pub mod application_service;
pub mod application_status_service;
pub mod auth_service;
pub mod catalog_service;
pub mod connection_service;
pub mod email_service;
pub mod email_templates;
pub mod job_scheduler_service;
pub mod notification_service;
pub mod session_registry;
pub mod side_effect;

use std::sync::Arc;

use crate::config::BrandingConfig;
use crate::services::email_service::Mailer;
use crate::services::session_registry::Notifier;
use crate::store::{ApplicationStore, CatalogStore, ConnectionStore, NotificationStore};

/// Collaborators shared by the application workflows, the HTTP handlers and
/// the scheduled jobs.
#[derive(Clone)]
pub struct Services {
    pub applications: Arc<dyn ApplicationStore>,
    pub catalog: Arc<dyn CatalogStore>,
    pub connections: Arc<dyn ConnectionStore>,
    pub notifications: Arc<dyn NotificationStore>,
    pub mailer: Arc<dyn Mailer>,
    pub notifier: Arc<dyn Notifier>,
    pub branding: Arc<BrandingConfig>,
}
