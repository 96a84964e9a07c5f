use anyhow::{Context, Result};
use dotenvy::dotenv;

pub const DEFAULT_PAGE_SIZE: usize = 20;
const MAX_PAGE_SIZE: usize = 500;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub database_url: String,
    pub db_pool_size: u32,
    pub http_host: String,
    pub http_port: u16,
    /// Results per page for paginated listings.
    pub page_size: usize,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let value = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let database_url = value("METER_DATABASE_URL")
            .or_else(|| value("DATABASE_URL"))
            .context("METER_DATABASE_URL or DATABASE_URL is required")?;
        let database_url = normalize_database_url(database_url);

        let db_pool_size = parsed(value("METER_DB_POOL_SIZE"), "METER_DB_POOL_SIZE", 10u32);
        let http_host = value("METER_HTTP_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let http_port = parsed(value("METER_HTTP_PORT"), "METER_HTTP_PORT", 8000u16);
        let page_size = parsed(value("METER_PAGE_SIZE"), "METER_PAGE_SIZE", DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        Ok(Self {
            database_url,
            db_pool_size,
            http_host,
            http_port,
            page_size,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}

fn parsed<T: std::str::FromStr>(raw: Option<String>, key: &str, default: T) -> T {
    let Some(raw) = raw else {
        return default;
    };
    match raw.parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable setting; using default");
            default
        }
    }
}

fn normalize_database_url(url: String) -> String {
    if let Some(stripped) = url.strip_prefix("postgresql+psycopg://") {
        return format!("postgresql://{stripped}");
    }
    if let Some(stripped) = url.strip_prefix("postgresql+asyncpg://") {
        return format!("postgresql://{stripped}");
    }
    if let Some(stripped) = url.strip_prefix("postgis://") {
        return format!("postgresql://{stripped}");
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn database_url_is_required() {
        let err = ServiceConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config =
            ServiceConfig::from_lookup(lookup(&[("DATABASE_URL", "postgresql://db/meters")]))
                .expect("config");
        assert_eq!(config.database_url, "postgresql://db/meters");
        assert_eq!(config.db_pool_size, 10);
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.bind_addr(), "127.0.0.1:8000");
    }

    #[test]
    fn prefixed_url_wins_and_is_normalized() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgresql://fallback/db"),
            ("METER_DATABASE_URL", " postgresql+psycopg://primary/db "),
            ("METER_PAGE_SIZE", "10000"),
            ("METER_HTTP_PORT", "not-a-port"),
        ]))
        .expect("config");
        assert_eq!(config.database_url, "postgresql://primary/db");
        assert_eq!(config.page_size, MAX_PAGE_SIZE);
        assert_eq!(config.http_port, 8000);
    }

    #[test]
    fn page_size_never_drops_to_zero() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgresql://db/meters"),
            ("METER_PAGE_SIZE", "0"),
        ]))
        .expect("config");
        assert_eq!(config.page_size, 1);
    }
}
