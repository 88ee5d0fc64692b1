use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use catalog_core::store::S3Config;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{var} has an invalid value `{value}`")]
    Invalid { var: &'static str, value: String },
}

/// Where category documents live.
#[derive(Debug, Clone)]
pub enum StoreBackend {
    Memory,
    Postgres {
        database_url: String,
        max_connections: u32,
        min_connections: u32,
    },
}

/// Where images live.
#[derive(Debug, Clone)]
pub enum BlobBackend {
    Memory { public_base_url: String },
    S3(S3Config),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host to bind to.
    pub host: String,
    /// Server port to bind to.
    pub port: u16,
    /// JWT signing secret for admin tokens.
    pub jwt_secret: String,
    /// Event bus channel capacity.
    pub event_bus_capacity: usize,
    /// Log level (e.g., "info", "debug", "trace").
    pub log_level: String,
    /// Largest accepted request body; leaves headroom over the image limit.
    pub max_request_bytes: usize,
    pub store: StoreBackend,
    pub blobs: BlobBackend,
    /// Optional JSON file overriding the built-in taxonomy.
    pub taxonomy_path: Option<PathBuf>,
    /// Origins allowed by CORS; empty means any.
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = var_or("HOST", "0.0.0.0");
        let port = var_or("PORT", "3030");
        let public_base_url =
            env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| format!("http://{host}:{port}/blobs"));

        Ok(Self {
            port: parse("PORT", &port)?,
            host,
            jwt_secret: var_or("JWT_SECRET", "dev-secret-change-me-in-production"),
            event_bus_capacity: parse("EVENT_BUS_CAPACITY", &var_or("EVENT_BUS_CAPACITY", "1024"))?,
            log_level: var_or("LOG_LEVEL", "info"),
            max_request_bytes: parse("MAX_REQUEST_BYTES", &var_or("MAX_REQUEST_BYTES", "6291456"))?,
            store: store_from_env()?,
            blobs: blobs_from_env(public_base_url)?,
            taxonomy_path: env::var("TAXONOMY_PATH").ok().map(PathBuf::from),
            cors_origins: split_list(&var_or("CORS_ALLOWED_ORIGINS", "")),
        })
    }

    /// Build the socket address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn store_from_env() -> Result<StoreBackend, ConfigError> {
    match var_or("STORE_BACKEND", "memory").as_str() {
        "memory" => Ok(StoreBackend::Memory),
        "postgres" => Ok(StoreBackend::Postgres {
            database_url: env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            max_connections: parse("DB_MAX_CONNECTIONS", &var_or("DB_MAX_CONNECTIONS", "20"))?,
            min_connections: parse("DB_MIN_CONNECTIONS", &var_or("DB_MIN_CONNECTIONS", "5"))?,
        }),
        other => Err(ConfigError::Invalid {
            var: "STORE_BACKEND",
            value: other.to_string(),
        }),
    }
}

fn blobs_from_env(public_base_url: String) -> Result<BlobBackend, ConfigError> {
    match var_or("BLOB_BACKEND", "memory").as_str() {
        "memory" => Ok(BlobBackend::Memory { public_base_url }),
        "s3" => {
            let endpoint = required("S3_ENDPOINT")?;
            Ok(BlobBackend::S3(S3Config {
                public_endpoint: env::var("S3_PUBLIC_ENDPOINT").unwrap_or_else(|_| endpoint.clone()),
                endpoint,
                access_key: required("S3_ACCESS_KEY")?,
                secret_key: required("S3_SECRET_KEY")?,
                bucket: var_or("S3_BUCKET", "catalog"),
                region: var_or("S3_REGION", "us-east-1"),
            }))
        }
        other => Err(ConfigError::Invalid {
            var: "BLOB_BACKEND",
            value: other.to_string(),
        }),
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse<T: FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        var,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reports_the_variable() {
        let err = parse::<u16>("PORT", "eighty").unwrap_err();
        assert_eq!(err.to_string(), "PORT has an invalid value `eighty`");
        assert_eq!(parse::<u16>("PORT", "8080").unwrap(), 8080);
    }

    #[test]
    fn split_list_drops_blanks() {
        assert_eq!(
            split_list(" https://admin.example.com, ,http://localhost:5173 "),
            vec!["https://admin.example.com", "http://localhost:5173"]
        );
        assert!(split_list("").is_empty());
    }
}
