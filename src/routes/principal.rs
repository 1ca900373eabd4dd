use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use std::future::Future;
use std::pin::Pin;
use uuid::Uuid;

use crate::error::AppError;
use crate::routes::AppState;
use crate::services::{Claims, TokenService};

pub const NOT_AUTHORIZED: &str = "Not authorized to access this route";
pub const INVALID_TOKEN: &str = "Invalid token";
pub const USER_NOT_FOUND: &str = "User not found";

/// The caller identified by a verified `Authorization: Bearer` token whose
/// account still exists
///
/// Requires `web::Data<TokenService>` and `web::Data<AppState>` to be
/// registered on the app.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn id(&self) -> Uuid {
        self.0.sub
    }

    pub fn claims(&self) -> &Claims {
        &self.0
    }
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let verified = authenticate(req);
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let user = verified?;
            let state = state
                .ok_or_else(|| AppError::external("Server error", "application state not registered"))?;

            let exists = state
                .postgres
                .user_exists(user.id())
                .await
                .map_err(|e| AppError::external("Server error while authenticating", e))?;

            if !exists {
                tracing::info!("Rejected token for deleted user {}", user.id());
                return Err(AppError::Auth(USER_NOT_FOUND.to_string()));
            }

            Ok(user)
        })
    }
}

/// Check the bearer token's signature and expiry
fn authenticate(req: &HttpRequest) -> Result<AuthUser, AppError> {
    let token = bearer_token(req).ok_or_else(|| AppError::Auth(NOT_AUTHORIZED.to_string()))?;

    let tokens = req
        .app_data::<web::Data<TokenService>>()
        .ok_or_else(|| AppError::external("Server error", "token service not registered"))?;

    tokens.verify(token).map(AuthUser).map_err(|e| {
        tracing::debug!("Rejected token on {}: {}", req.path(), e);
        AppError::Auth(INVALID_TOKEN.to_string())
    })
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
