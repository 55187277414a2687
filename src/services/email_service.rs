use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{BrandingConfig, SmtpConfig};
use crate::models::{Application, ApplicationStatus};
use crate::services::email_templates::{self, ApplicationContext, RenderedEmail};
use crate::store::CatalogStore;

// ==============================================================================
// Mailer
// ==============================================================================

/// An inline image referenced from the HTML body as `cid:<cid>`.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineAsset {
    pub cid: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub template: &'static str,
    pub html: String,
    pub text: String,
    pub inline: Vec<InlineAsset>,
}

impl OutgoingEmail {
    pub fn new(to: &str, rendered: RenderedEmail, inline: Vec<InlineAsset>) -> Self {
        Self {
            to: to.to_string(),
            subject: rendered.subject,
            template: rendered.template,
            html: rendered.html,
            text: rendered.text,
            inline,
        }
    }
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}

/// Sends mail through an SMTP relay with STARTTLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    footer_icons: Vec<InlineAsset>,
}

impl SmtpMailer {
    pub fn new(smtp: &SmtpConfig, branding: &BrandingConfig) -> Result<Self, MailError> {
        let creds = Credentials::new(smtp.username.clone(), smtp.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)?
            .port(smtp.port)
            .credentials(creds)
            .build();

        let from = format!("{} <{}>", smtp.from_name, smtp.from_email).parse::<Mailbox>()?;

        info!("📧 SMTP mailer configured for {}:{}", smtp.host, smtp.port);

        Ok(Self {
            transport,
            from,
            footer_icons: footer_icons(branding),
        })
    }

    async fn build_message(&self, email: &OutgoingEmail) -> Result<Message, MailError> {
        let to = email.to.parse::<Mailbox>()?;

        let alternative = MultiPart::alternative()
            .singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_PLAIN)
                    .body(email.text.clone()),
            )
            .singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_HTML)
                    .body(email.html.clone()),
            );

        let mut related = MultiPart::related().multipart(alternative);
        for asset in email.inline.iter().chain(self.footer_icons.iter()) {
            match tokio::fs::read(&asset.path).await {
                Ok(bytes) => {
                    related = related.singlepart(
                        Attachment::new_inline(asset.cid.clone()).body(bytes, image_content_type(&asset.path)),
                    );
                }
                Err(e) => {
                    warn!("Skipping inline asset {}: {}", asset.path.display(), e);
                }
            }
        }

        Ok(Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone())
            .multipart(related)?)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let message = self.build_message(&email).await?;
        self.transport.send(message).await?;
        info!("✅ Email \"{}\" sent to {}", email.subject, email.to);
        Ok(())
    }
}

/// Used when SMTP is disabled: records the email in the log and reports success.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        info!(
            "📧 [SMTP disabled] {} email to {}: {}",
            email.template, email.to, email.subject
        );
        Ok(())
    }
}

fn footer_icons(branding: &BrandingConfig) -> Vec<InlineAsset> {
    [
        ("iconFacebook", "facebook.png"),
        ("iconInstagram", "instagram.png"),
        ("iconLinkedin", "linkedin.png"),
    ]
    .into_iter()
    .map(|(cid, file)| InlineAsset {
        cid: cid.to_string(),
        path: branding.assets_dir.join(file),
    })
    .collect()
}

fn image_content_type(path: &Path) -> ContentType {
    let mime = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    };
    ContentType::parse(mime).unwrap_or(ContentType::TEXT_PLAIN)
}

// ==============================================================================
// Logo resolution
// ==============================================================================

/// Resolves a stored company logo path to a file on disk.
///
/// Backslashes are treated as path separators. A missing or unset logo falls
/// back to the bundled default logo.
pub async fn normalize_logo_path(stored: Option<&str>, branding: &BrandingConfig) -> PathBuf {
    let Some(stored) = stored.filter(|s| !s.trim().is_empty()) else {
        return branding.default_logo();
    };

    let relative = stored.replace('\\', "/");
    let candidate = branding.asset_root.join(relative.trim_start_matches('/'));

    match tokio::fs::try_exists(&candidate).await {
        Ok(true) => candidate,
        _ => {
            warn!("Company logo not found: {}, using default", candidate.display());
            branding.default_logo()
        }
    }
}

// ==============================================================================
// Application emails
// ==============================================================================

struct CompanyDetails {
    name: String,
    logo: PathBuf,
}

/// Company name and logo for an application email. Lookup failures fall back
/// to generic values so the email still goes out.
async fn company_details(
    catalog: &dyn CatalogStore,
    branding: &BrandingConfig,
    application: &Application,
) -> CompanyDetails {
    let company = match catalog.company(application.company_id).await {
        Ok(company) => company,
        Err(e) => {
            warn!("Failed to load company {} for email: {}", application.company_id, e);
            None
        }
    };

    let name = company
        .as_ref()
        .map(|c| c.company_name.clone())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "the company".to_string());
    let logo = normalize_logo_path(company.as_ref().and_then(|c| c.company_logo.as_deref()), branding).await;

    CompanyDetails { name, logo }
}

fn company_logo(path: PathBuf) -> Vec<InlineAsset> {
    vec![InlineAsset {
        cid: "companyLogo".to_string(),
        path,
    }]
}

/// Emails the applicant about a status change. Statuses without a template
/// send nothing and return `Ok(false)`.
pub async fn send_status_email(
    mailer: &dyn Mailer,
    catalog: &dyn CatalogStore,
    branding: &BrandingConfig,
    application: &Application,
    job_title: &str,
    status: ApplicationStatus,
) -> Result<bool, MailError> {
    if !status.is_terminal() {
        return Ok(false);
    }

    let company = company_details(catalog, branding, application).await;
    let Some(rendered) =
        email_templates::application_status(status, &application.name, job_title, &company.name)
    else {
        return Ok(false);
    };

    mailer
        .send(OutgoingEmail::new(&application.email, rendered, company_logo(company.logo)))
        .await?;
    Ok(true)
}

pub async fn send_application_created_email(
    mailer: &dyn Mailer,
    catalog: &dyn CatalogStore,
    branding: &BrandingConfig,
    application: &Application,
    job_title: &str,
) -> Result<(), MailError> {
    let company = company_details(catalog, branding, application).await;
    let rendered = email_templates::application_created(&ApplicationContext {
        applicant_name: &application.name,
        job_title,
        company_name: &company.name,
        careers_page: &branding.careers_page,
        support_email: &branding.support_email,
    });

    mailer
        .send(OutgoingEmail::new(&application.email, rendered, company_logo(company.logo)))
        .await
}

pub async fn send_application_deleted_email(
    mailer: &dyn Mailer,
    catalog: &dyn CatalogStore,
    branding: &BrandingConfig,
    application: &Application,
    job_title: &str,
) -> Result<(), MailError> {
    let company = company_details(catalog, branding, application).await;
    let rendered = email_templates::application_deleted(&ApplicationContext {
        applicant_name: &application.name,
        job_title,
        company_name: &company.name,
        careers_page: &branding.careers_page,
        support_email: &branding.support_email,
    });

    mailer
        .send(OutgoingEmail::new(&application.email, rendered, company_logo(company.logo)))
        .await
}

/// Sends a one-time code. Uses the portal's top logo rather than a company logo.
pub async fn send_otp_email(
    mailer: &dyn Mailer,
    branding: &BrandingConfig,
    to: &str,
    rendered: RenderedEmail,
) -> Result<(), MailError> {
    let inline = vec![InlineAsset {
        cid: "topLogo".to_string(),
        path: branding.top_logo(),
    }];
    mailer.send(OutgoingEmail::new(to, rendered, inline)).await
}

// ==============================================================================
// Test support
// ==============================================================================


#[cfg(test)]
mod tests {
    use super::testing::RecordingMailer;
    use super::*;
    use crate::config::test_config;
    use crate::store::memory::MemoryStore;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_normalize_logo_path_falls_back_to_default() {
        let branding = test_config().branding;
        assert_eq!(normalize_logo_path(None, &branding).await, branding.default_logo());
        assert_eq!(
            normalize_logo_path(Some("uploads\\logos\\missing.png"), &branding).await,
            branding.default_logo()
        );
    }

    #[tokio::test]
    async fn test_normalize_logo_path_resolves_existing_file() {
        let dir = std::env::temp_dir().join(format!("jobportal-logo-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(dir.join("uploads/logos")).await.unwrap();
        tokio::fs::write(dir.join("uploads/logos/acme.png"), b"png").await.unwrap();

        let mut branding = test_config().branding;
        branding.asset_root = dir.clone();

        let resolved = normalize_logo_path(Some("uploads\\logos\\acme.png"), &branding).await;
        assert_eq!(resolved, dir.join("uploads/logos/acme.png"));

        tokio::fs::remove_dir_all(dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_status_email_uses_company_name_and_logo() {
        let store = MemoryStore::new();
        let company = store.seed_company(None);
        let job = store.seed_job(company.id, "Backend Engineer");
        let app = store.seed_application(Uuid::new_v4(), &job);
        let mailer = RecordingMailer::new();
        let branding = test_config().branding;

        let sent = send_status_email(&mailer, &store, &branding, &app, &job.position, ApplicationStatus::Rejected)
            .await
            .unwrap();
        assert!(sent);

        let emails = mailer.sent();
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].to, "jane@example.com");
        assert_eq!(emails[0].subject, "Application Update: Rejected for Backend Engineer");
        assert!(emails[0].html.contains("Acme Corp"));
        assert_eq!(emails[0].inline[0].cid, "companyLogo");
        assert_eq!(emails[0].inline[0].path, branding.default_logo());
    }

    #[tokio::test]
    async fn test_status_email_skips_in_progress() {
        let store = MemoryStore::new();
        let company = store.seed_company(None);
        let job = store.seed_job(company.id, "Backend Engineer");
        let app = store.seed_application(Uuid::new_v4(), &job);
        let mailer = RecordingMailer::new();

        let sent = send_status_email(
            &mailer,
            &store,
            &test_config().branding,
            &app,
            &job.position,
            ApplicationStatus::InProgress,
        )
        .await
        .unwrap();
        assert!(!sent);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_missing_company_uses_generic_name() {
        let store = MemoryStore::new();
        let job = store.seed_job(Uuid::new_v4(), "Analyst");
        let app = store.seed_application(Uuid::new_v4(), &job);
        let mailer = RecordingMailer::new();

        send_application_created_email(&mailer, &store, &test_config().branding, &app, &job.position)
            .await
            .unwrap();

        let emails = mailer.sent();
        assert!(emails[0].html.contains("the company"));
        assert_eq!(emails[0].subject, "Application Received for Analyst");
    }

    #[test]
    fn test_image_content_type_by_extension() {
        assert_eq!(image_content_type(Path::new("a.PNG")), ContentType::parse("image/png").unwrap());
        assert_eq!(image_content_type(Path::new("a.jpeg")), ContentType::parse("image/jpeg").unwrap());
    }
}
