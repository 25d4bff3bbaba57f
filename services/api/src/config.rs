//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub db_max_connections: u32,
    pub log_level: Level,
    pub jwt_secret: String,
    pub admin_email: String,
    pub openai_api_key: String,
    pub embedding_model: String,
    pub company_model: String,
    pub cors_origin: String,
    /// Adds the `Secure` attribute to session cookies.
    pub secure_cookies: bool,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| ConfigError::MissingVar(key.to_string()));
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // --- Server and Database Settings ---
        let bind_address_str = or_default("BIND_ADDRESS", "0.0.0.0:3000");
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = required("DATABASE_URL")?;

        let db_max_connections_str = or_default("DB_MAX_CONNECTIONS", "5");
        let db_max_connections = db_max_connections_str.parse::<u32>().map_err(|e| {
            ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string(), e.to_string())
        })?;

        let log_level_str = or_default("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Auth Settings ---
        let jwt_secret = required("JWT_SECRET")?;
        if jwt_secret.is_empty() {
            return Err(ConfigError::InvalidValue(
                "JWT_SECRET".to_string(),
                "must not be empty".to_string(),
            ));
        }
        let admin_email = required("ADMIN_EMAIL")?;

        // --- External AI Service ---
        let openai_api_key = required("OPENAI_API_KEY")?;
        let embedding_model = or_default("EMBEDDING_MODEL", "text-embedding-ada-002");
        let company_model = or_default("COMPANY_MODEL", "gpt-4o");

        // --- HTTP Surface ---
        let cors_origin = or_default("CORS_ORIGIN", "http://localhost:3000");
        let secure_cookies = or_default("APP_ENV", "development").eq_ignore_ascii_case("production");

        let max_upload_str = or_default("MAX_UPLOAD_BYTES", "10485760");
        let max_upload_bytes = max_upload_str.parse::<usize>().map_err(|e| {
            ConfigError::InvalidValue("MAX_UPLOAD_BYTES".to_string(), e.to_string())
        })?;

        Ok(Self {
            bind_address,
            database_url,
            db_max_connections,
            log_level,
            jwt_secret,
            admin_email,
            openai_api_key,
            embedding_model,
            company_model,
            cors_origin,
            secure_cookies,
            max_upload_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn required_vars() -> HashMap<String, String> {
        vars(&[
            ("DATABASE_URL", "postgres://localhost/casebook"),
            ("JWT_SECRET", "test-secret"),
            ("ADMIN_EMAIL", "admin@club.org"),
            ("OPENAI_API_KEY", "sk-test"),
        ])
    }

    #[test]
    fn defaults_apply_when_optional_vars_are_absent() {
        let env = required_vars();
        let config = Config::from_lookup(|k| env.get(k).cloned()).unwrap();

        assert_eq!(config.bind_address, "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.embedding_model, "text-embedding-ada-002");
        assert_eq!(config.company_model, "gpt-4o");
        assert!(!config.secure_cookies);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn each_required_var_is_fatal_when_missing() {
        for key in ["DATABASE_URL", "JWT_SECRET", "ADMIN_EMAIL", "OPENAI_API_KEY"] {
            let mut env = required_vars();
            env.remove(key);
            let err = Config::from_lookup(|k| env.get(k).cloned()).unwrap_err();
            assert!(
                matches!(&err, ConfigError::MissingVar(name) if name == key),
                "unexpected error for {key}: {err}"
            );
        }
    }

    #[test]
    fn production_enables_secure_cookies() {
        let mut env = required_vars();
        env.insert("APP_ENV".to_string(), "production".to_string());
        let config = Config::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert!(config.secure_cookies);
    }

    #[test]
    fn invalid_values_are_reported() {
        let mut env = required_vars();
        env.insert("BIND_ADDRESS".to_string(), "not-an-address".to_string());
        let err = Config::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "BIND_ADDRESS"));
    }
}
