use actix_web::{web, HttpResponse};
use chrono::{Duration, Utc};
use validator::Validate;

use crate::error::AppError;
use crate::models::{
    AccountSummary, ApiResponse, AuthPayload, ForgotPasswordRequest, LoginRequest, RegisterRequest,
    ResetPasswordRequest,
};
use crate::routes::AppState;
use crate::services::{generate_opaque_token, normalize_email, PasswordHasher, PostgresError};

const EMAIL_TAKEN: &str = "Email is already registered";
const BAD_CREDENTIALS: &str = "Invalid email or password";
const RESET_REQUESTED: &str = "If your email is registered, you will receive a reset link shortly";

/// Configure all authentication routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/register", web::post().to(register))
        .route("/login", web::post().to(login))
        .route("/verify-email/{token}", web::get().to(verify_email))
        .route("/forgot-password", web::post().to(forgot_password))
        .route("/reset-password/{token}", web::post().to(reset_password));
}

/// Hash on the blocking thread pool
async fn hash_password(hasher: &PasswordHasher, password: String, context: &str) -> Result<String, AppError> {
    let hasher = hasher.clone();
    web::block(move || hasher.hash(&password))
        .await
        .map_err(|e| AppError::external(context, e))?
        .map_err(|e| AppError::external(context, e))
}

/// POST /api/auth/register
async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    const CONTEXT: &str = "Server error during registration";

    let request = body.into_inner();
    request.validate()?;
    let email = normalize_email(&request.email);

    if state
        .postgres
        .email_exists(&email)
        .await
        .map_err(|e| AppError::external(CONTEXT, e))?
    {
        return Err(AppError::validation(EMAIL_TAKEN));
    }

    let password_hash = hash_password(&state.hasher, request.password, CONTEXT).await?;
    let verification_token = generate_opaque_token();

    let user = state
        .postgres
        .create_user(request.name.trim(), &email, &password_hash, &verification_token)
        .await
        .map_err(|e| match e {
            // Lost a race with a concurrent registration
            PostgresError::Conflict(_) => AppError::validation(EMAIL_TAKEN),
            other => AppError::external(CONTEXT, other),
        })?;

    tracing::info!("Registered user {}; verification token issued", user.id);

    let token = state
        .tokens
        .issue(user.id, &user.email)
        .map_err(|e| AppError::external(CONTEXT, e))?;

    Ok(HttpResponse::Created().json(ApiResponse::success(AuthPayload {
        user: AccountSummary::from(&user),
        token,
    })))
}

/// POST /api/auth/login
async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    const CONTEXT: &str = "Server error during login";

    let request = body.into_inner();
    let (Some(email), Some(password)) = (
        request.email.filter(|e| !e.trim().is_empty()),
        request.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::validation("Please provide email and password"));
    };

    let credentials = state
        .postgres
        .find_credentials_by_email(&normalize_email(&email))
        .await
        .map_err(|e| AppError::external(CONTEXT, e))?;

    // Unknown emails still cost one argon2 run
    let hasher = state.hasher.clone();
    let hash = credentials.as_ref().map(|c| c.password_hash.clone());
    let matches = web::block(move || hasher.verify_account(&password, hash.as_deref()))
        .await
        .map_err(|e| AppError::external(CONTEXT, e))?
        .map_err(|e| AppError::external(CONTEXT, e))?;

    let credentials = match credentials {
        Some(credentials) if matches => credentials,
        Some(credentials) => {
            tracing::info!("Failed login for user {}", credentials.user.id);
            return Err(AppError::Auth(BAD_CREDENTIALS.to_string()));
        }
        None => return Err(AppError::Auth(BAD_CREDENTIALS.to_string())),
    };

    let user = credentials.user;
    let token = state
        .tokens
        .issue(user.id, &user.email)
        .map_err(|e| AppError::external(CONTEXT, e))?;

    tracing::info!("User {} logged in", user.id);

    Ok(HttpResponse::Ok().json(ApiResponse::success(AuthPayload {
        user: AccountSummary::from(&user),
        token,
    })))
}

/// GET /api/auth/verify-email/{token}
async fn verify_email(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user_id = state
        .postgres
        .verify_email(&path.into_inner())
        .await
        .map_err(|e| AppError::external("Server error during email verification", e))?
        .ok_or_else(|| AppError::validation("Invalid or expired verification token"))?;

    tracing::info!("User {} verified their email", user_id);

    Ok(HttpResponse::Ok().json(ApiResponse::message("Email verified successfully")))
}

/// POST /api/auth/forgot-password
///
/// Answers the same way whether or not the email is registered.
async fn forgot_password(
    state: web::Data<AppState>,
    body: web::Json<ForgotPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    let email = normalize_email(&body.email);

    if !email.is_empty() {
        let ttl = state.auth.reset_token_ttl_secs.min(i64::MAX as u64 / 1000) as i64;
        let expires_at = Utc::now() + Duration::seconds(ttl);

        let user_id = state
            .postgres
            .set_reset_token(&email, &generate_opaque_token(), expires_at)
            .await
            .map_err(|e| AppError::external("Server error during password reset request", e))?;

        if let Some(user_id) = user_id {
            tracing::info!("Issued password reset token for user {}", user_id);
        }
    }

    Ok(HttpResponse::Ok().json(ApiResponse::message(RESET_REQUESTED)))
}

/// POST /api/auth/reset-password/{token}
async fn reset_password(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    const CONTEXT: &str = "Server error during password reset";

    let request = body.into_inner();
    request.validate()?;

    let password_hash = hash_password(&state.hasher, request.password, CONTEXT).await?;

    let user_id = state
        .postgres
        .reset_password(&path.into_inner(), &password_hash)
        .await
        .map_err(|e| AppError::external(CONTEXT, e))?
        .ok_or_else(|| AppError::validation("Invalid or expired reset token"))?;

    tracing::info!("User {} reset their password", user_id);

    Ok(HttpResponse::Ok().json(ApiResponse::message("Password has been reset successfully")))
}
