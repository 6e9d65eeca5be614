use anyhow::{bail, Result};
use std::env;

/// Runtime environment mode. Controls the cookie `Secure` flag and whether
/// error responses carry diagnostic detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
    pub llm: LlmConfig,
    pub logging: LoggingConfig,
    pub environment: Environment,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite connection URL, e.g. `sqlite:./data/chatbridge.db?mode=rwc`.
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Symmetric secret used to sign session tokens (HS256).
    pub jwt_secret: String,
    /// Session token lifetime in hours.
    pub token_ttl_hours: i64,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Allowed cross-origin values, parsed once at startup.
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Upstream API key. Optional at startup; generation requests fail with
    /// an upstream error without it.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-5-nano".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Split a comma-separated origin list into trimmed, non-empty entries.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect()
}

impl Config {
    /// Load configuration from the environment. Missing `DATABASE_URL` or
    /// `JWT_SECRET` is a fatal startup condition.
    pub fn from_env() -> Result<Self> {
        let database_url = match env::var("DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => url,
            _ => bail!("DATABASE_URL is not set in environment"),
        };

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ => bail!("JWT_SECRET is not set in environment"),
        };

        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") => Environment::Production,
            _ => Environment::Development,
        };

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("PORT is not a valid port number: {}", raw))?,
            Err(_) => default_port(),
        };

        let allowed_origins = env::var("CLIENT_ORIGIN")
            .map(|raw| parse_origins(&raw))
            .unwrap_or_default();

        Ok(Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| default_host()),
                port,
            },
            database: DatabaseConfig { url: database_url },
            auth: AuthConfig {
                jwt_secret,
                token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            },
            cors: CorsConfig { allowed_origins },
            llm: LlmConfig {
                api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
                base_url: env::var("OPENAI_BASE_URL").unwrap_or_else(|_| default_base_url()),
                model: env::var("OPENAI_MODEL").unwrap_or_else(|_| default_model()),
            },
            logging: LoggingConfig {
                level: env::var("LOG_LEVEL").unwrap_or_else(|_| default_log_level()),
            },
            environment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_splits_and_trims() {
        let origins = parse_origins("https://app.example.com, http://localhost:5173 ,");
        assert_eq!(
            origins,
            vec![
                "https://app.example.com".to_string(),
                "http://localhost:5173".to_string()
            ]
        );
    }

    #[test]
    fn test_parse_origins_empty() {
        assert!(parse_origins("").is_empty());
        assert!(parse_origins(" , ,").is_empty());
    }

    #[test]
    fn test_environment_mode() {
        assert!(Environment::Production.is_production());
        assert!(!Environment::Development.is_production());
    }
}
