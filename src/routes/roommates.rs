use actix_web::{web, HttpResponse};

use crate::core::{find_matches, MatchError};
use crate::error::AppError;
use crate::models::{ApiResponse, PreferencesUpdate, RoommatePreference, User};
use crate::routes::{AppState, AuthUser};

/// Configure all roommate routes. Every route requires a token.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/preferences", web::get().to(get_preferences))
        .route("/preferences", web::put().to(update_preferences))
        .route("/matches", web::get().to(get_matches));
}

async fn load_user(state: &AppState, user: &AuthUser, context: &str) -> Result<User, AppError> {
    state
        .postgres
        .find_user(user.id())
        .await
        .map_err(|e| AppError::external(context, e))?
        .ok_or_else(|| AppError::not_found("User not found"))
}

/// GET /api/roommates/preferences
///
/// Returns `{}` when the user has not set any.
async fn get_preferences(
    state: web::Data<AppState>,
    user: AuthUser,
) -> Result<HttpResponse, AppError> {
    let profile = load_user(&state, &user, "Server error while fetching roommate preferences").await?;

    let data = match profile.roommate_preferences {
        Some(preferences) => serde_json::to_value(preferences)
            .map_err(|e| AppError::external("Server error while fetching roommate preferences", e))?,
        None => serde_json::json!({}),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
}

/// PUT /api/roommates/preferences
///
/// Merges into the stored record. The first record needs sleepSchedule,
/// cleanliness, studyHabits and visitors.
async fn update_preferences(
    state: web::Data<AppState>,
    user: AuthUser,
    body: web::Json<PreferencesUpdate>,
) -> Result<HttpResponse, AppError> {
    const CONTEXT: &str = "Server error while updating roommate preferences";

    let profile = load_user(&state, &user, CONTEXT).await?;
    let preferences =
        RoommatePreference::merged(profile.roommate_preferences.as_ref(), &body.into_inner())?;

    let saved = state
        .postgres
        .set_preferences(user.id(), &preferences)
        .await
        .map_err(|e| AppError::external(CONTEXT, e))?;

    if !saved {
        return Err(AppError::not_found("User not found"));
    }

    tracing::info!("User {} updated roommate preferences", user.id());

    Ok(HttpResponse::Ok().json(ApiResponse::success(preferences)))
}

/// GET /api/roommates/matches
///
/// Every other user with preferences, best match first.
async fn get_matches(
    state: web::Data<AppState>,
    user: AuthUser,
) -> Result<HttpResponse, AppError> {
    const CONTEXT: &str = "Server error while finding roommate matches";

    let profile = load_user(&state, &user, CONTEXT).await?;
    let Some(preferences) = profile.roommate_preferences else {
        return Err(MatchError::PreferencesNotSet.into());
    };

    let candidates = state
        .postgres
        .list_match_candidates(user.id())
        .await
        .map_err(|e| AppError::external(CONTEXT, e))?;

    let matches = find_matches(user.id(), Some(&preferences), candidates)?;

    tracing::info!("Ranked {} roommate matches for user {}", matches.len(), user.id());

    Ok(HttpResponse::Ok().json(ApiResponse::success(matches)))
}
