// Service exports
pub mod assistant;
pub mod auth;
pub mod cache;
pub mod postgres;

pub use assistant::{parse_criteria, AssistantClient, AssistantError};
pub use auth::{generate_opaque_token, normalize_email, AuthError, Claims, PasswordHasher, TokenService};
pub use cache::{CacheError, CacheKey, CacheManager};
pub use postgres::{Credentials, PostgresClient, PostgresError};
