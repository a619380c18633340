//! Configuration module for the EcoParrain backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Email that logs in as the admin role
    pub admin_email: String,
    /// Password for the admin email (demo credential, not a real secret)
    pub admin_password: String,
    /// API key for the coach LLM upstream; coach endpoint is disabled without it
    pub coach_api_key: Option<String>,
    /// Base URL of the coach LLM upstream (overridable for tests)
    pub coach_base_url: String,
    /// Model name sent to the coach upstream
    pub coach_model: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let db_path = env::var("ECOPARRAIN_DB_PATH")
            .unwrap_or_else(|_| "./data/app.sqlite".to_string())
            .into();

        let bind_addr = env::var("ECOPARRAIN_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid ECOPARRAIN_BIND_ADDR format");

        let log_level = env::var("ECOPARRAIN_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let admin_email = env::var("ECOPARRAIN_ADMIN_EMAIL")
            .unwrap_or_else(|_| "admin@ecoparrain.com".to_string());

        let admin_password =
            env::var("ECOPARRAIN_ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());

        let coach_api_key = env::var("ECOPARRAIN_COACH_API_KEY").ok();

        let coach_base_url = env::var("ECOPARRAIN_COACH_BASE_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());

        let coach_model =
            env::var("ECOPARRAIN_COACH_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string());

        Self {
            db_path,
            bind_addr,
            log_level,
            admin_email,
            admin_password,
            coach_api_key,
            coach_base_url,
            coach_model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("ECOPARRAIN_DB_PATH");
        env::remove_var("ECOPARRAIN_BIND_ADDR");
        env::remove_var("ECOPARRAIN_LOG_LEVEL");
        env::remove_var("ECOPARRAIN_ADMIN_EMAIL");
        env::remove_var("ECOPARRAIN_ADMIN_PASSWORD");
        env::remove_var("ECOPARRAIN_COACH_API_KEY");
        env::remove_var("ECOPARRAIN_COACH_BASE_URL");
        env::remove_var("ECOPARRAIN_COACH_MODEL");

        let config = Config::from_env();

        assert_eq!(config.db_path, PathBuf::from("./data/app.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.admin_email, "admin@ecoparrain.com");
        assert!(config.coach_api_key.is_none());
        assert_eq!(
            config.coach_base_url,
            "https://generativelanguage.googleapis.com"
        );
        assert_eq!(config.coach_model, "gemini-2.5-flash");
    }
}
