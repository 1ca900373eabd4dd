use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub assistant: AssistantSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub listings: ListingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:4173".to_string(),
    ]
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
    #[serde(default = "default_reset_token_ttl")]
    pub reset_token_ttl_secs: u64,
}

fn default_token_ttl() -> u64 { 86_400 }
fn default_reset_token_ttl() -> u64 { 3_600 }

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantSettings {
    #[serde(default = "default_assistant_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_assistant_model")]
    pub model: String,
    pub timeout_secs: Option<u64>,
}

fn default_assistant_endpoint() -> String { "https://api.openai.com/v1".to_string() }
fn default_assistant_model() -> String { "gpt-4".to_string() }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    /// Leave unset to run with the in-process tier only
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingSettings {
    #[serde(default = "default_limit")]
    pub default_limit: u32,
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,
    #[serde(default = "default_near_distance")]
    pub near_distance_km: f64,
    #[serde(default = "default_ai_radius")]
    pub ai_search_radius_km: f64,
    #[serde(default = "default_ai_limit")]
    pub ai_search_limit: u32,
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            near_distance_km: default_near_distance(),
            ai_search_radius_km: default_ai_radius(),
            ai_search_limit: default_ai_limit(),
        }
    }
}

fn default_limit() -> u32 { 10 }
fn default_max_limit() -> u32 { 100 }
fn default_near_distance() -> f64 { 10.0 }
fn default_ai_radius() -> f64 { 5.0 }
fn default_ai_limit() -> u32 { 10 }

/// Output style of the `tracing_subscriber::fmt` layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Full,
    #[default]
    Compact,
    Pretty,
}

impl LogFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "full" => Some(Self::Full),
            "compact" => Some(Self::Compact),
            "pretty" => Some(Self::Pretty),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml, then config/local.toml)
    /// 3. Environment variables (prefixed with CAMPUSNEST__)
    /// 4. DATABASE_URL, JWT_SECRET and OPENAI_API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            // Development overrides
            .add_source(File::with_name("config/local").required(false))
            // e.g., CAMPUSNEST__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("CAMPUSNEST")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("CAMPUSNEST")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply the conventional unprefixed variables on top of the layered config
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    for (var, key) in [
        ("DATABASE_URL", "database.url"),
        ("JWT_SECRET", "auth.jwt_secret"),
        ("OPENAI_API_KEY", "assistant.api_key"),
        ("REDIS_URL", "cache.redis_url"),
    ] {
        if let Ok(value) = env::var(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_listing_settings() {
        let listings = ListingSettings::default();
        assert_eq!(listings.default_limit, 10);
        assert_eq!(listings.max_limit, 100);
        assert_eq!(listings.near_distance_km, 10.0);
        assert_eq!(listings.ai_search_radius_km, 5.0);
        assert_eq!(listings.ai_search_limit, 10);
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, LogFormat::Compact);
    }

    #[test]
    fn test_log_format_from_file_and_env_value() {
        let settings = Config::builder()
            .add_source(File::from_str(
                "[logging]\nlevel = \"debug\"\nformat = \"pretty\"",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let logging: LoggingSettings = settings.get("logging").unwrap();
        assert_eq!(logging.format, LogFormat::Pretty);

        assert_eq!(LogFormat::parse(" Full "), Some(LogFormat::Full));
        assert_eq!(LogFormat::parse("compact"), Some(LogFormat::Compact));
        assert_eq!(LogFormat::parse("json"), None);
    }

    #[test]
    fn test_default_origins() {
        assert_eq!(
            default_allowed_origins(),
            vec!["http://localhost:5173", "http://localhost:4173"]
        );
    }

    #[test]
    fn test_load_from_file() {
        let settings = Settings::load_from("config/default.toml").expect("default config parses");
        assert_eq!(settings.auth.token_ttl_secs, 86_400);
        assert_eq!(settings.listings.max_limit, 100);
    }
}
