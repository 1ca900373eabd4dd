use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::models::{ApiResponse, UpdateUserRequest};
use crate::routes::{AppState, AuthUser};

/// Configure all user routes. Every route requires a token.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/me", web::get().to(get_me))
        .route("/{id}", web::get().to(get_user))
        .route("/{id}", web::put().to(update_user))
        .route("/{id}", web::delete().to(delete_user));
}

/// GET /api/users/me
async fn get_me(state: web::Data<AppState>, user: AuthUser) -> Result<HttpResponse, AppError> {
    let profile = state
        .postgres
        .find_user(user.id())
        .await
        .map_err(|e| AppError::external("Server error while fetching user profile", e))?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(profile)))
}

/// GET /api/users/{id}
async fn get_user(
    state: web::Data<AppState>,
    _user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let profile = state
        .postgres
        .find_user(path.into_inner())
        .await
        .map_err(|e| AppError::external("Server error while fetching user", e))?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(profile)))
}

/// PUT /api/users/{id}
///
/// Only the account owner may update it.
async fn update_user(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    if id != user.id() {
        return Err(AppError::forbidden("You are not authorized to update this user"));
    }

    let update = body.into_inner();
    update.validate()?;

    let profile = state
        .postgres
        .update_user(id, &update)
        .await
        .map_err(|e| AppError::external("Server error while updating user", e))?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    tracing::info!("User {} updated their profile", id);

    Ok(HttpResponse::Ok().json(ApiResponse::success(profile)))
}

/// DELETE /api/users/{id}
///
/// Only the account owner may delete it. Their listings are removed too.
async fn delete_user(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    if id != user.id() {
        return Err(AppError::forbidden("You are not authorized to delete this user"));
    }

    let deleted = state
        .postgres
        .delete_user(id)
        .await
        .map_err(|e| AppError::external("Server error while deleting user", e))?;

    if !deleted {
        return Err(AppError::not_found("User not found"));
    }

    tracing::info!("User {} deleted their account", id);

    Ok(HttpResponse::Ok().json(ApiResponse::message("User deleted successfully")))
}
