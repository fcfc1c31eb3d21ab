pub mod visibility;

use anyhow::{anyhow, Result};
use std::net::SocketAddr;
use std::str::FromStr;

use self::visibility::VisibilityPolicy;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "memory" => Ok(Self::Memory),
            "postgres" => Ok(Self::Postgres),
            other => Err(anyhow!("expected memory or postgres, got {}", other)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub http_addr: String,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_connect_timeout_seconds: u64,
    pub db_idle_timeout_seconds: u64,
    pub db_max_lifetime_seconds: u64,
    pub admin_token: Option<String>,
    pub max_body_bytes: usize,
    pub visibility: VisibilityPolicy,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let http_addr = env_or("HTTP_ADDR", "0.0.0.0:8080");
        let _parsed_http_addr = SocketAddr::from_str(&http_addr)
            .map_err(|err| anyhow!("invalid HTTP_ADDR: {}", err))?;

        let store_backend: StoreBackend = env_or_parse("STORE_BACKEND", "memory")?;
        let database_url = match store_backend {
            StoreBackend::Postgres => Some(env_or_err("DATABASE_URL")?),
            StoreBackend::Memory => std::env::var("DATABASE_URL").ok(),
        };

        Ok(Self {
            http_addr,
            store_backend,
            database_url,
            db_max_connections: env_or_parse("DB_MAX_CONNECTIONS", "25")?,
            db_connect_timeout_seconds: env_or_parse("DB_CONNECT_TIMEOUT_SECONDS", "5")?,
            db_idle_timeout_seconds: env_or_parse("DB_IDLE_TIMEOUT_SECONDS", "300")?,
            db_max_lifetime_seconds: env_or_parse("DB_MAX_LIFETIME_SECONDS", "1800")?,
            admin_token: std::env::var("ADMIN_TOKEN")
                .ok()
                .filter(|token| !token.is_empty()),
            max_body_bytes: env_or_parse("MAX_BODY_BYTES", "16384")?,
            visibility: VisibilityPolicy {
                moderated: env_or_parse("MODERATED_VISIBILITY", "author")?,
                deleted: env_or_parse("DELETED_VISIBILITY", "hidden")?,
            },
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_err(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| anyhow!("missing required env var: {}", key))
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
