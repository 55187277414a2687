use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::models::{
    EmailRequest, LoginRequest, LoginResponse, RegisterRequest, ResetPasswordRequest, Role,
    VerifyOtpRequest,
};
use crate::services::auth_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register-employee", post(register_employee))
        .route("/register-employer", post(register_employer))
        .route("/register-admin", post(register_admin))
        .route("/verify-otp", post(verify_otp))
        .route("/resend-verification-otp", post(resend_verification_otp))
        .route("/login", post(login))
        .route("/send-reset-otp", post(send_reset_otp))
        .route("/reset-password", post(reset_password))
}

fn message(text: &str) -> Json<Value> {
    Json(json!({ "message": text }))
}

async fn register(state: AppState, request: RegisterRequest, role: Role) -> Result<(StatusCode, Json<Value>), AppError> {
    info!("POST /api/auth/register-{} - {}", role, request.email);
    auth_service::register(&state.pool, &state.config, state.services.mailer.as_ref(), request, role).await?;
    Ok((
        StatusCode::CREATED,
        message("OTP sent to email. Please verify your account."),
    ))
}

pub async fn register_employee(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    register(state, request, Role::Employee).await
}

pub async fn register_employer(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    register(state, request, Role::Employer).await
}

pub async fn register_admin(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    register(state, request, Role::Admin).await
}

pub async fn verify_otp(
    State(state): State<AppState>,
    Json(request): Json<VerifyOtpRequest>,
) -> Result<Json<Value>, AppError> {
    info!("POST /api/auth/verify-otp - {}", request.email);
    auth_service::verify_otp(&state.pool, request).await?;
    Ok(message("Email verified successfully. You can now log in."))
}

pub async fn resend_verification_otp(
    State(state): State<AppState>,
    Json(request): Json<EmailRequest>,
) -> Result<Json<Value>, AppError> {
    info!("POST /api/auth/resend-verification-otp - {}", request.email);
    auth_service::resend_verification_otp(&state.pool, &state.config, state.services.mailer.as_ref(), &request.email)
        .await?;
    Ok(message("A new OTP has been sent to your email."))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    info!("POST /api/auth/login - {}", request.email);
    let response = auth_service::login(&state.pool, &state.config, request).await?;
    Ok(Json(response))
}

pub async fn send_reset_otp(
    State(state): State<AppState>,
    Json(request): Json<EmailRequest>,
) -> Result<Json<Value>, AppError> {
    info!("POST /api/auth/send-reset-otp - {}", request.email);
    auth_service::send_reset_otp(&state.pool, &state.config, state.services.mailer.as_ref(), &request.email).await?;
    Ok(message("Password reset OTP sent to email."))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<Value>, AppError> {
    info!("POST /api/auth/reset-password - {}", request.email);
    auth_service::reset_password(&state.pool, request).await?;
    Ok(message("Password has been reset successfully."))
}
