use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Duration, Utc};
use rand::{Rng, RngCore};
use regex::Regex;
use sqlx::PgPool;
use std::sync::OnceLock;
use tracing::info;

use crate::auth::issue_token;
use crate::config::AppConfig;
use crate::db::{otp_queries, user_queries};
use crate::errors::{is_unique_violation, AppError};
use crate::models::{
    LoginRequest, LoginResponse, Otp, OtpPurpose, RegisterRequest, ResetPasswordRequest, Role, User,
    VerifyOtpRequest,
};
use crate::services::email_service::{send_otp_email, Mailer};
use crate::services::email_templates;
use crate::services::side_effect::SideEffect;

const OTP_TTL_MINUTES: i64 = 10;
const MIN_PASSWORD_LEN: usize = 6;

// ==============================================================================
// Primitives
// ==============================================================================

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let mut salt_bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AppError::Internal(format!("Failed to encode salt: {}", e)))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}

/// Six-digit one-time code.
pub fn generate_otp() -> String {
    rand::rng().random_range(100_000..1_000_000).to_string()
}

fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
        .map(|re| re.is_match(email))
        .unwrap_or(false)
}

pub fn validate_registration(request: &RegisterRequest) -> Result<(), AppError> {
    if request.name.trim().is_empty() || request.phone.trim().is_empty() {
        return Err(AppError::Validation("Name and phone are required".to_string()));
    }
    if !is_valid_email(request.email.trim()) {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }
    validate_password(&request.password)
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Checks a looked-up code: missing is invalid, past `expires_at` is expired.
pub fn check_otp(otp: Option<&Otp>, now: DateTime<Utc>) -> Result<(), AppError> {
    match otp {
        None => Err(AppError::Validation("Invalid OTP".to_string())),
        Some(otp) if otp.expires_at < now => Err(AppError::Validation("Expired OTP".to_string())),
        Some(_) => Ok(()),
    }
}

/// Admin accounts may only be created for the configured admin address.
pub fn ensure_admin_allowed(config: &AppConfig, email: &str) -> Result<(), AppError> {
    match &config.admin_email {
        Some(admin) if admin.eq_ignore_ascii_case(email.trim()) => Ok(()),
        _ => Err(AppError::Forbidden("Unauthorized to create an admin account".to_string())),
    }
}

async fn issue_otp(pool: &PgPool, email: &str, purpose: OtpPurpose) -> Result<String, AppError> {
    let code = generate_otp();
    let expires_at = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);
    otp_queries::replace_otp(pool, email, purpose, &code, expires_at).await?;
    Ok(code)
}

async fn find_user(pool: &PgPool, email: &str) -> Result<User, AppError> {
    user_queries::get_user_by_email(pool, email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

// ==============================================================================
// Flows
// ==============================================================================

pub async fn register(
    pool: &PgPool,
    config: &AppConfig,
    mailer: &dyn Mailer,
    request: RegisterRequest,
    role: Role,
) -> Result<User, AppError> {
    if role == Role::Admin {
        ensure_admin_allowed(config, &request.email)?;
    }
    validate_registration(&request)?;

    let email = request.email.trim().to_lowercase();
    if user_queries::get_user_by_email(pool, &email).await?.is_some() {
        return Err(AppError::Validation("User already exists".to_string()));
    }

    let password_hash = hash_password(&request.password)?;
    let user = user_queries::create_user(pool, request.name.trim(), &email, request.phone.trim(), &password_hash, role)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Validation("User already exists".to_string())
            } else {
                AppError::from(e)
            }
        })?;

    let code = issue_otp(pool, &email, OtpPurpose::Signup).await?;
    SideEffect::from_result(
        "Signup OTP email",
        send_otp_email(mailer, &config.branding, &email, email_templates::signup_otp(&user.name, &code)).await,
    );

    info!("Registered {} user {}", role, user.id);
    Ok(user)
}

pub async fn verify_otp(pool: &PgPool, request: VerifyOtpRequest) -> Result<(), AppError> {
    let email = request.email.trim().to_lowercase();
    let otp = otp_queries::find_otp(pool, &email, OtpPurpose::Signup, request.otp.trim()).await?;
    check_otp(otp.as_ref(), Utc::now())?;

    if !user_queries::mark_verified(pool, &email).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    otp_queries::delete_otps(pool, &email, OtpPurpose::Signup).await?;

    info!("Verified email {}", email);
    Ok(())
}

pub async fn resend_verification_otp(
    pool: &PgPool,
    config: &AppConfig,
    mailer: &dyn Mailer,
    email: &str,
) -> Result<(), AppError> {
    let user = find_user(pool, &email.trim().to_lowercase()).await?;
    if user.is_verified {
        return Err(AppError::Validation("User already verified".to_string()));
    }

    let code = issue_otp(pool, &user.email, OtpPurpose::Signup).await?;
    send_otp_email(mailer, &config.branding, &user.email, email_templates::signup_otp(&user.name, &code))
        .await
        .map_err(|e| AppError::External(format!("Failed to send OTP email: {}", e)))
}

pub async fn login(pool: &PgPool, config: &AppConfig, request: LoginRequest) -> Result<LoginResponse, AppError> {
    let user = user_queries::get_user_by_email(pool, &request.email.trim().to_lowercase())
        .await?
        .filter(|u| u.is_verified)
        .ok_or_else(|| AppError::Validation("User not verified or does not exist".to_string()))?;

    if !verify_password(&request.password, &user.password_hash) {
        return Err(AppError::Validation("Invalid credentials".to_string()));
    }

    let token = issue_token(&user, &config.jwt_secret)?;
    info!("User {} logged in", user.id);

    Ok(LoginResponse {
        message: "Login successful",
        token,
    })
}

pub async fn send_reset_otp(
    pool: &PgPool,
    config: &AppConfig,
    mailer: &dyn Mailer,
    email: &str,
) -> Result<(), AppError> {
    let user = find_user(pool, &email.trim().to_lowercase()).await?;

    let code = issue_otp(pool, &user.email, OtpPurpose::PasswordReset).await?;
    send_otp_email(
        mailer,
        &config.branding,
        &user.email,
        email_templates::password_reset_otp(&user.name, &code),
    )
    .await
    .map_err(|e| AppError::External(format!("Failed to send reset email: {}", e)))
}

pub async fn reset_password(pool: &PgPool, request: ResetPasswordRequest) -> Result<(), AppError> {
    validate_password(&request.new_password)?;
    let email = request.email.trim().to_lowercase();

    let otp = otp_queries::find_otp(pool, &email, OtpPurpose::PasswordReset, request.otp.trim()).await?;
    check_otp(otp.as_ref(), Utc::now())?;

    let password_hash = hash_password(&request.new_password)?;
    if !user_queries::update_password(pool, &email, &password_hash).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    otp_queries::delete_otps(pool, &email, OtpPurpose::PasswordReset).await?;

    info!("Password reset for {}", email);
    Ok(())
}
