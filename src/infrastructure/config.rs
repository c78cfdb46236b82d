use std::net::{IpAddr, SocketAddr};
use thiserror::Error;
use tracing::info;

const DEFAULT_DB_NAME: &str = "expenseManagementDB";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub mongodb_uri: String,
    pub db_name: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Loads settings from the environment, reading `.env` first when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenv::dotenv();

        let host = get_env_or_default("HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PORT", "5000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;

        let config = Self {
            mongodb_uri: get_required_env("MONGODB_URI")?,
            db_name: get_env_or_default("DB_NAME", DEFAULT_DB_NAME),
            jwt_secret: get_required_env("ACCESS_TOKEN_SECRET")?,
            host,
            port,
            cors_origins: parse_origins(&get_env_or_default("CORS_ORIGINS", DEFAULT_CORS_ORIGINS)),
        };
        info!(
            db_name = %config.db_name,
            port = config.port,
            origins = ?config.cors_origins,
            "Configuration loaded"
        );
        Ok(config)
    }

    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnvVar(key.to_string())),
    }
}

fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Splits a comma separated origin list, dropping blanks and trailing slashes.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_single() {
        assert_eq!(
            parse_origins("http://localhost:5173"),
            vec!["http://localhost:5173"]
        );
    }

    #[test]
    fn test_parse_origins_trims_and_skips_blanks() {
        assert_eq!(
            parse_origins(" https://a.example.com/ ,, http://localhost:5173 ,"),
            vec!["https://a.example.com", "http://localhost:5173"]
        );
    }

    #[test]
    fn test_parse_origins_empty() {
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_socket_addr() {
        let config = Config {
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            db_name: DEFAULT_DB_NAME.to_string(),
            jwt_secret: "secret".to_string(),
            host: "127.0.0.1".parse().unwrap(),
            port: 5000,
            cors_origins: vec![],
        };
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:5000");
    }
}
