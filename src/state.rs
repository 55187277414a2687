use sqlx::PgPool;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::email_service::Mailer;
use crate::services::session_registry::SessionRegistry;
use crate::services::Services;
use crate::store::PgStore;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub services: Services,
    pub sessions: SessionRegistry,
}

impl AppState {
    /// Wires the Postgres store, the mailer and the live-session registry together.
    pub fn new(pool: PgPool, config: AppConfig, mailer: Arc<dyn Mailer>) -> Self {
        let store = Arc::new(PgStore::new(pool.clone()));
        let sessions = SessionRegistry::new();

        let services = Services {
            applications: store.clone(),
            catalog: store.clone(),
            connections: store.clone(),
            notifications: store,
            mailer,
            notifier: Arc::new(sessions.clone()),
            branding: Arc::new(config.branding.clone()),
        };

        Self {
            pool,
            config: Arc::new(config),
            services,
            sessions,
        }
    }
}
