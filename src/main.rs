use actix_cors::Cors;
use actix_web::{http::header, middleware, web, App, HttpServer};
use campusnest::config::{LogFormat, LoggingSettings, Settings};
use campusnest::error::{handle_json_payload_error, handle_path_error, handle_query_payload_error};
use campusnest::routes::{self, AppState};
use campusnest::services::{AssistantClient, CacheManager, PasswordHasher, PostgresClient, TokenService};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingSettings) {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT")
        .ok()
        .and_then(|f| LogFormat::parse(&f))
        .unwrap_or(logging.format);

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true);

    match log_format {
        LogFormat::Full => subscriber.init(),
        LogFormat::Compact => subscriber.compact().init(),
        LogFormat::Pretty => subscriber.pretty().init(),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load();

    // LOG_LEVEL and LOG_FORMAT override the [logging] section
    let logging = settings
        .as_ref()
        .map(|s| s.logging.clone())
        .unwrap_or_default();
    init_tracing(&logging);

    info!("Starting CampusNest API...");

    let settings = settings.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    info!("Configuration loaded successfully");

    if settings.auth.jwt_secret == "change-me" {
        warn!("Using the default JWT secret; set JWT_SECRET in production");
    }

    let postgres = Arc::new(PostgresClient::from_settings(&settings.database).await.map_err(|e| {
        error!("Failed to connect to PostgreSQL: {}", e);
        std::io::Error::other(format!("PostgreSQL connection error: {}", e))
    })?);

    info!(
        "PostgreSQL client initialized (max: {} connections)",
        settings.database.max_connections.unwrap_or(10)
    );

    // Cache is optional - without Redis only the in-process tier is used
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);
    let cache = Arc::new(
        CacheManager::connect(settings.cache.redis_url.as_deref(), l1_cache_size, cache_ttl).await,
    );

    info!(
        "Cache manager initialized (L1: {} entries, TTL: {}s, Redis: {})",
        l1_cache_size,
        cache_ttl,
        cache.has_redis()
    );

    let assistant = Arc::new(
        AssistantClient::new(
            settings.assistant.endpoint.clone(),
            settings.assistant.api_key.clone(),
            settings.assistant.model.clone(),
            Duration::from_secs(settings.assistant.timeout_secs.unwrap_or(30)),
        )
        .map_err(|e| {
            error!("Failed to create assistant client: {}", e);
            std::io::Error::other(format!("Assistant client error: {}", e))
        })?,
    );

    if settings.assistant.api_key.is_empty() {
        warn!("No assistant API key configured; /api/ai requests will fail");
    }

    let tokens = Arc::new(TokenService::new(
        settings.auth.jwt_secret.as_bytes(),
        settings.auth.token_ttl_secs,
    ));

    let app_state = AppState {
        postgres,
        cache,
        assistant,
        tokens: tokens.clone(),
        hasher: PasswordHasher::new(),
        listings: settings.listings.clone(),
        auth: settings.auth.clone(),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);
    let allowed_origins = settings.server.allowed_origins.clone();

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::Data::from(tokens.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
