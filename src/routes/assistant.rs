use actix_web::{web, HttpResponse};
use chrono::Utc;

use crate::core::ListingFilter;
use crate::error::AppError;
use crate::models::{AiSearchResult, ApiResponse, ChatReply, ChatRequest, SearchCriteria, SearchDormsRequest};
use crate::routes::{AppState, AuthUser};
use crate::services::{CacheError, CacheKey};

/// Configure all assistant routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/chat", web::post().to(chat))
        .route("/search-dorms", web::post().to(search_dorms));
}

/// POST /api/ai/chat
async fn chat(
    state: web::Data<AppState>,
    body: web::Json<ChatRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    if request.message.trim().is_empty() {
        return Err(AppError::validation("Message is required"));
    }

    let response = state
        .assistant
        .chat(&request.message, &request.conversation_history)
        .await
        .map_err(|e| AppError::external("Server error while processing chat request", e))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(ChatReply {
        response,
        timestamp: Utc::now(),
    })))
}

/// Criteria for `query`, from cache when the same query was seen recently
async fn criteria_for(state: &AppState, query: &str) -> Result<SearchCriteria, AppError> {
    let key = CacheKey::criteria(query);

    match state.cache.get::<SearchCriteria>(&key).await {
        Ok(criteria) => {
            tracing::debug!("Using cached criteria for {}", key);
            return Ok(criteria);
        }
        Err(CacheError::CacheMiss(_)) => {}
        Err(e) => tracing::warn!("Criteria cache read failed: {}", e),
    }

    let criteria = state
        .assistant
        .extract_criteria(query)
        .await
        .map_err(|e| AppError::external("Server error while processing search request", e))?;

    if let Err(e) = state.cache.set(&key, &criteria).await {
        tracing::warn!("Criteria cache write failed: {}", e);
    }

    Ok(criteria)
}

/// POST /api/ai/search-dorms
///
/// Natural-language search: extract criteria, query listings, then summarise.
async fn search_dorms(
    state: web::Data<AppState>,
    _user: AuthUser,
    body: web::Json<SearchDormsRequest>,
) -> Result<HttpResponse, AppError> {
    const CONTEXT: &str = "Server error while processing search request";

    let query = body.into_inner().query;
    if query.trim().is_empty() {
        return Err(AppError::validation("Search query is required"));
    }

    let criteria = criteria_for(&state, &query).await?;
    let filter = ListingFilter::from_criteria(&criteria, state.listings.ai_search_radius_km);

    tracing::debug!("Search criteria {:?} -> filter {:?}", criteria, filter);

    let dorms = state
        .postgres
        .find_listings(&filter, Some(state.listings.ai_search_limit))
        .await
        .map_err(|e| AppError::external(CONTEXT, e))?;

    let ai_response = state
        .assistant
        .generate_summary(&query, &dorms)
        .await
        .map_err(|e| AppError::external(CONTEXT, e))?;

    tracing::info!("AI search returned {} dorms", dorms.len());

    Ok(HttpResponse::Ok().json(ApiResponse::success(AiSearchResult {
        dorms,
        ai_response,
        search_criteria: criteria,
    })))
}
