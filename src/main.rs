mod app;
mod auth;
mod config;
mod db;
mod errors;
mod jobs;
mod logging;
mod models;
mod routes;
mod services;
mod state;
mod store;

use chrono::Duration;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::logging::LoggingConfig;
use crate::services::email_service::{LogMailer, Mailer, SmtpMailer};
use crate::services::job_scheduler_service::{JobContext, JobSchedulerService};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    logging::init_logging(LoggingConfig::from_env())?;

    let config = AppConfig::from_env()?;
    config.validate()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("📦 Database migrations applied");

    let mailer: Arc<dyn Mailer> = if config.smtp.enabled {
        Arc::new(SmtpMailer::new(&config.smtp, &config.branding)?)
    } else {
        tracing::info!("📧 SMTP disabled, emails will be logged only");
        Arc::new(LogMailer)
    };

    let port = config.port;
    let sweep_schedule = config.expiry_sweep_schedule.clone();
    let retention = Duration::seconds(config.retention_secs);
    let state = AppState::new(pool.clone(), config, mailer);

    let mut scheduler = JobSchedulerService::new(JobContext {
        pool,
        services: state.services.clone(),
        retention,
    })
    .await?;
    scheduler.start(&sweep_schedule).await?;

    let app = app::create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Job portal backend running at http://{}/", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.stop().await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
