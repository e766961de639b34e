use anyhow::{anyhow, Result};
use std::net::SocketAddr;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(anyhow!("unknown STORE_BACKEND: {}", other)),
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
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let http_addr = env_or("HTTP_ADDR", "0.0.0.0:8080");
        let _parsed_http_addr = SocketAddr::from_str(&http_addr)
            .map_err(|err| anyhow!("invalid HTTP_ADDR: {}", err))?;

        let store_backend: StoreBackend = env_or("STORE_BACKEND", "postgres").parse()?;
        let database_url = lookup("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(anyhow!("missing required env var: DATABASE_URL"));
        }

        Ok(Self {
            http_addr,
            store_backend,
            database_url,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", &env_or("DB_MAX_CONNECTIONS", "25"))?,
            db_connect_timeout_seconds: parse_var(
                "DB_CONNECT_TIMEOUT_SECONDS",
                &env_or("DB_CONNECT_TIMEOUT_SECONDS", "5"),
            )?,
            db_idle_timeout_seconds: parse_var(
                "DB_IDLE_TIMEOUT_SECONDS",
                &env_or("DB_IDLE_TIMEOUT_SECONDS", "300"),
            )?,
            db_max_lifetime_seconds: parse_var(
                "DB_MAX_LIFETIME_SECONDS",
                &env_or("DB_MAX_LIFETIME_SECONDS", "1800"),
            )?,
            admin_token: lookup("ADMIN_TOKEN").filter(|token| !token.is_empty()),
            max_body_bytes: parse_var("MAX_BODY_BYTES", &env_or("MAX_BODY_BYTES", "65536"))?,
        })
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|err| anyhow!("invalid {}: {}", key, err))
}
