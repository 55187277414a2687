use anyhow::{Context, Result};
use std::path::PathBuf;

/// SMTP settings. When `enabled` is false emails are only logged.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
}

/// Branding used when composing transactional emails.
#[derive(Debug, Clone)]
pub struct BrandingConfig {
    /// Root that stored company logo paths are resolved against.
    pub asset_root: PathBuf,
    pub assets_dir: PathBuf,
    pub careers_page: String,
    pub support_email: String,
}

impl BrandingConfig {
    pub fn default_logo(&self) -> PathBuf {
        self.assets_dir.join("default-company-logo.png")
    }

    pub fn top_logo(&self) -> PathBuf {
        self.assets_dir.join("top-logo.png")
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub admin_email: Option<String>,
    pub cors_allowed_origins: Vec<String>,
    pub uploads_dir: PathBuf,
    pub retention_secs: i64,
    pub expiry_sweep_schedule: String,
    pub smtp: SmtpConfig,
    pub branding: BrandingConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let smtp_enabled = env_or("SMTP_ENABLED", "false").to_lowercase() == "true";

        let smtp = SmtpConfig {
            enabled: smtp_enabled,
            host: env_or("SMTP_HOST", "smtp.gmail.com"),
            port: env_or("SMTP_PORT", "587")
                .parse::<u16>()
                .context("SMTP_PORT must be a valid port number")?,
            username: env_or("SMTP_USERNAME", ""),
            password: env_or("SMTP_PASSWORD", ""),
            from_email: env_or("SMTP_FROM_EMAIL", "no-reply@jobportal.local"),
            from_name: env_or("SMTP_FROM_NAME", "Job Portal"),
        };

        let assets_dir = PathBuf::from(env_or("EMAIL_ASSETS_DIR", "emails/assets"));
        let branding = BrandingConfig {
            asset_root: PathBuf::from(env_or("ASSET_ROOT", ".")),
            assets_dir,
            careers_page: env_or("CAREERS_PAGE", "https://yourcompany.com/careers"),
            support_email: env_or("SUPPORT_EMAIL", "support@yourcompany.com"),
        };

        Ok(Self {
            database_url: require_env("DATABASE_URL")?,
            port: env_or("PORT", "3000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            jwt_secret: require_env("JWT_SECRET")?,
            admin_email: std::env::var("ADMIN_EMAIL").ok().filter(|s| !s.is_empty()),
            cors_allowed_origins: parse_list(&env_or("CORS_ALLOWED_ORIGINS", "http://localhost:5173")),
            uploads_dir: PathBuf::from(env_or("UPLOADS_DIR", "uploads")),
            retention_secs: env_or("APPLICATION_RETENTION_SECS", "60")
                .parse::<i64>()
                .context("APPLICATION_RETENTION_SECS must be an integer")?,
            expiry_sweep_schedule: env_or("EXPIRY_SWEEP_SCHEDULE", "0 */1 * * * *"),
            smtp,
            branding,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.retention_secs < 0 {
            anyhow::bail!("APPLICATION_RETENTION_SECS must not be negative");
        }
        if self.smtp.enabled && (self.smtp.username.is_empty() || self.smtp.password.is_empty()) {
            anyhow::bail!("SMTP_ENABLED is true but SMTP_USERNAME or SMTP_PASSWORD is not set");
        }
        Ok(())
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://localhost/jobportal_test".to_string(),
        port: 0,
        jwt_secret: "test-secret".to_string(),
        admin_email: Some("admin@example.com".to_string()),
        cors_allowed_origins: vec!["http://localhost:5173".to_string()],
        uploads_dir: PathBuf::from("uploads"),
        retention_secs: 60,
        expiry_sweep_schedule: "0 */1 * * * *".to_string(),
        smtp: SmtpConfig {
            enabled: false,
            host: "localhost".to_string(),
            port: 25,
            username: String::new(),
            password: String::new(),
            from_email: "no-reply@example.com".to_string(),
            from_name: "Job Portal".to_string(),
        },
        branding: BrandingConfig {
            asset_root: PathBuf::from("/nonexistent-root"),
            assets_dir: PathBuf::from("/nonexistent-root/emails/assets"),
            careers_page: "https://example.com/careers".to_string(),
            support_email: "support@example.com".to_string(),
        },
    }
}
