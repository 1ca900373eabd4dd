use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::core::{parse_near, ListingFilter, Pagination};
use crate::error::AppError;
use crate::models::{ApiResponse, ListingForm, ListingPage, ListingQueryParams, ListingUpdate, NearPath};
use crate::routes::{AppState, AuthUser};

/// Configure all dorm listing routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list_dorms))
        .route("", web::post().to(create_dorm))
        .route("/near/{lat}/{lng}", web::get().to(dorms_near))
        .route("/near/{lat}/{lng}/{distance}", web::get().to(dorms_near))
        .route("/{id}", web::get().to(get_dorm))
        .route("/{id}", web::put().to(update_dorm))
        .route("/{id}", web::delete().to(delete_dorm));
}

/// GET /api/dorms?page&limit&minPrice&maxPrice&university&bedrooms&bathrooms&isAvailable
async fn list_dorms(
    state: web::Data<AppState>,
    query: web::Query<ListingQueryParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let pagination = Pagination::from_params(
        params.page.as_ref(),
        params.limit.as_ref(),
        state.listings.default_limit,
        state.listings.max_limit,
    );
    let filter = ListingFilter::from_query(&params);

    tracing::debug!("Listing dorms: {:?} {:?}", filter, pagination);

    let (dorms, total) = state
        .postgres
        .list_listings(&filter, pagination)
        .await
        .map_err(|e| AppError::external("Server error while fetching dorms", e))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(ListingPage {
        dorms,
        total_pages: pagination.total_pages(total),
        current_page: pagination.page,
        total,
    })))
}

/// GET /api/dorms/{id}
///
/// Counts as a view.
async fn get_dorm(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let detail = state
        .postgres
        .view_listing(id)
        .await
        .map_err(|e| AppError::external("Server error while fetching dorm", e))?
        .ok_or_else(|| AppError::not_found("Dorm not found"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(detail)))
}

/// GET /api/dorms/near/{lat}/{lng}/{distance?}
///
/// `distance` is in kilometers.
async fn dorms_near(
    state: web::Data<AppState>,
    path: web::Path<NearPath>,
) -> Result<HttpResponse, AppError> {
    let path = path.into_inner();

    let radius = parse_near(
        &path.lat,
        &path.lng,
        path.distance.as_deref(),
        state.listings.near_distance_km,
    )
    .ok_or_else(|| AppError::validation("Invalid coordinates"))?;

    let dorms = state
        .postgres
        .find_listings(&ListingFilter::within(radius), None)
        .await
        .map_err(|e| AppError::external("Server error while fetching nearby dorms", e))?;

    tracing::info!(
        "Found {} dorms within {}km of ({}, {})",
        dorms.len(),
        radius.distance_km,
        radius.center.y(),
        radius.center.x()
    );

    let results = dorms.len();
    Ok(HttpResponse::Ok().json(ApiResponse::counted(dorms, results)))
}

/// POST /api/dorms
async fn create_dorm(
    state: web::Data<AppState>,
    user: AuthUser,
    body: web::Json<ListingForm>,
) -> Result<HttpResponse, AppError> {
    let form = body.into_inner();
    form.validate()?;

    let dorm = state
        .postgres
        .create_listing(user.id(), &form)
        .await
        .map_err(|e| AppError::external("Server error while creating dorm", e))?;

    tracing::info!("User {} created dorm {}", user.id(), dorm.id);

    Ok(HttpResponse::Created().json(ApiResponse::success(dorm)))
}

/// PUT /api/dorms/{id}
///
/// Owner only. Fields not present in the body are left unchanged.
async fn update_dorm(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<ListingUpdate>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let update = body.into_inner();
    update.validate()?;

    let mut dorm = state
        .postgres
        .find_listing(id)
        .await
        .map_err(|e| AppError::external("Server error while updating dorm", e))?
        .ok_or_else(|| AppError::not_found("Dorm not found"))?;

    if dorm.owner_id != user.id() {
        return Err(AppError::forbidden("You are not authorized to update this dorm"));
    }

    update.apply_to(&mut dorm);

    let dorm = state
        .postgres
        .save_listing(&dorm)
        .await
        .map_err(|e| AppError::external("Server error while updating dorm", e))?
        .ok_or_else(|| AppError::not_found("Dorm not found"))?;

    tracing::info!("User {} updated dorm {}", user.id(), dorm.id);

    Ok(HttpResponse::Ok().json(ApiResponse::success(dorm)))
}

/// DELETE /api/dorms/{id}
///
/// Owner only.
async fn delete_dorm(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let dorm = state
        .postgres
        .find_listing(id)
        .await
        .map_err(|e| AppError::external("Server error while deleting dorm", e))?
        .ok_or_else(|| AppError::not_found("Dorm not found"))?;

    if dorm.owner_id != user.id() {
        return Err(AppError::forbidden("You are not authorized to delete this dorm"));
    }

    if !state
        .postgres
        .delete_listing(id)
        .await
        .map_err(|e| AppError::external("Server error while deleting dorm", e))?
    {
        return Err(AppError::not_found("Dorm not found"));
    }

    tracing::info!("User {} deleted dorm {}", user.id(), id);

    Ok(HttpResponse::Ok().json(ApiResponse::message("Dorm deleted successfully")))
}
