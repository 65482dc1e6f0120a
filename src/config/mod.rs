use anyhow::{anyhow, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

/// 16 MiB, the largest request body the server accepts.
pub const DEFAULT_UPLOAD_MAX_BYTES: usize = 16 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub http_addr: SocketAddr,
    pub database_url: String,
    pub upload_dir: PathBuf,
    pub upload_max_bytes: usize,
    pub db_max_connections: u32,
    pub db_connect_timeout_seconds: u64,
    pub db_busy_timeout_seconds: u64,
    pub admin_token: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let http_addr: SocketAddr = env_or_parse("HTTP_ADDR", "0.0.0.0:8080")?;

        let upload_max_bytes: usize =
            env_or_parse("UPLOAD_MAX_BYTES", &DEFAULT_UPLOAD_MAX_BYTES.to_string())?;
        if upload_max_bytes == 0 {
            return Err(anyhow!("invalid UPLOAD_MAX_BYTES: must be greater than zero"));
        }

        Ok(Self {
            http_addr,
            database_url: env_or("DATABASE_URL", "sqlite://guestbook.db"),
            upload_dir: PathBuf::from(env_or("UPLOAD_DIR", "static/uploads")),
            upload_max_bytes,
            db_max_connections: env_or_parse("DB_MAX_CONNECTIONS", "5")?,
            db_connect_timeout_seconds: env_or_parse("DB_CONNECT_TIMEOUT_SECONDS", "5")?,
            db_busy_timeout_seconds: env_or_parse("DB_BUSY_TIMEOUT_SECONDS", "5")?,
            admin_token: std::env::var("ADMIN_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty()),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    let value = std::env::var(key).unwrap_or_else(|_| default.to_string());
    value
        .parse::<T>()
        .map_err(|err| anyhow!("invalid {}: {}", key, err))
}
