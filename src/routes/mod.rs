// Route exports
pub mod assistant;
pub mod auth;
pub mod health;
pub mod listings;
pub mod principal;
pub mod roommates;
pub mod users;

use actix_web::web;
use std::sync::Arc;

use crate::config::{AuthSettings, ListingSettings};
use crate::services::{AssistantClient, CacheManager, PasswordHasher, PostgresClient, TokenService};

pub use principal::AuthUser;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub postgres: Arc<PostgresClient>,
    pub cache: Arc<CacheManager>,
    pub assistant: Arc<AssistantClient>,
    pub tokens: Arc<TokenService>,
    pub hasher: PasswordHasher,
    pub listings: ListingSettings,
    pub auth: AuthSettings,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure)
        .service(web::scope("/api/dorms").configure(listings::configure))
        .service(web::scope("/api/users").configure(users::configure))
        .service(web::scope("/api/auth").configure(auth::configure))
        .service(web::scope("/api/roommates").configure(roommates::configure))
        .service(web::scope("/api/ai").configure(assistant::configure));
}
